use sqlx::Error as SqlxError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("Database error: {0}")]
    Sqlx(#[from] SqlxError),

    #[error("Not found")]
    NotFound,

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Already exists: {0}")]
    AlreadyExists(String),

    #[error("Foreign key violation: {0}")]
    ForeignKey(String),
}

impl RepositoryError {
    /// Classifies a driver error by its Postgres SQLSTATE.
    ///
    /// Lock timeouts, serialization failures and deadlocks surface as
    /// [`RepositoryError::Conflict`] so callers can treat them as a lost race
    /// instead of a storage failure.
    pub fn from_sqlx(err: SqlxError) -> Self {
        if let SqlxError::RowNotFound = err {
            return RepositoryError::NotFound;
        }

        let Some(db_err) = err.as_database_error() else {
            return RepositoryError::Sqlx(err);
        };

        let message = db_err.message().to_string();

        match db_err.code().as_deref() {
            Some("23505") => RepositoryError::AlreadyExists(message),
            Some("23503") => RepositoryError::ForeignKey(message),
            Some("23514") => RepositoryError::Conflict(message),
            Some("55P03") => RepositoryError::Conflict(format!("lock wait timed out: {message}")),
            Some("40001") | Some("40P01") => {
                RepositoryError::Conflict(format!("concurrent update: {message}"))
            }
            _ => RepositoryError::Sqlx(err),
        }
    }
}

pub mod cart;
pub mod category;
pub mod checkout;
pub mod inventory;
pub mod order;
pub mod product;

use crate::abstract_trait::unit_of_work::UnitOfWorkTrait;
use shared::errors::ServiceError;
use tracing::error;

/// Commits the unit of work when `outcome` is `Ok`, rolls it back otherwise.
pub(crate) async fn settle<T: Send>(
    uow: Box<dyn UnitOfWorkTrait>,
    outcome: Result<T, ServiceError>,
) -> Result<T, ServiceError> {
    match outcome {
        Ok(value) => {
            uow.commit().await?;
            Ok(value)
        }
        Err(err) => {
            if let Err(rollback_err) = uow.rollback().await {
                error!("❌ Rollback failed after {err}: {rollback_err:?}");
            }
            Err(err)
        }
    }
}

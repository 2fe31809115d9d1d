use axum::{
    extract::{FromRequest, Request},
    http::StatusCode,
};
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use validator::{Validate, ValidationError, ValidationErrors};

/// JSON body that must also pass its `validator` rules.
///
/// Rejections use the same `{status, message}` envelope as every other
/// error, with per-field messages under `details`.
pub struct SimpleValidatedJson<T>(pub T);

impl<S, T> FromRequest<S> for SimpleValidatedJson<T>
where
    T: DeserializeOwned + Validate + Send,
    S: Send + Sync,
{
    type Rejection = (StatusCode, axum::Json<Value>);

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let axum::Json(value) = axum::Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| {
                let payload = json!({
                    "status": "error",
                    "message": format!("Invalid JSON: {}", rejection.body_text()),
                });
                (rejection.status(), axum::Json(payload))
            })?;

        value.validate().map_err(|errors| {
            let payload = json!({
                "status": "error",
                "message": summarize(&errors),
                "details": details(&errors),
            });
            (StatusCode::BAD_REQUEST, axum::Json(payload))
        })?;

        Ok(Self(value))
    }
}

fn describe(field: &str, error: &ValidationError) -> String {
    if let Some(message) = &error.message {
        return message.to_string();
    }

    match error.code.as_ref() {
        "length" => match (error.params.get("min"), error.params.get("max")) {
            (Some(min), Some(max)) => format!("must be between {min} and {max} characters"),
            (None, Some(max)) => format!("must be at most {max} characters"),
            _ => "has an invalid length".to_string(),
        },
        "range" => match error.params.get("min") {
            Some(min) => format!("must be at least {min}"),
            None => "is out of range".to_string(),
        },
        _ => format!("invalid {field}"),
    }
}

fn summarize(errors: &ValidationErrors) -> String {
    let mut messages: Vec<String> = errors
        .field_errors()
        .into_iter()
        .flat_map(|(field, field_errors)| {
            field_errors
                .iter()
                .map(move |error| format!("{field} {}", describe(&field, error)))
        })
        .collect();
    messages.sort();

    if messages.is_empty() {
        "Validation failed".to_string()
    } else {
        messages.join("; ")
    }
}

fn details(errors: &ValidationErrors) -> Value {
    let map: serde_json::Map<String, Value> = errors
        .field_errors()
        .into_iter()
        .map(|(field, field_errors)| {
            let messages: Vec<String> = field_errors
                .iter()
                .map(|error| describe(&field, error))
                .collect();
            (field.to_string(), json!(messages))
        })
        .collect();

    Value::Object(map)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::requests::order::CreateOrderRequest;

    #[test]
    fn short_address_is_explained() {
        let errors = CreateOrderRequest {
            shipping_address: "short".into(),
        }
        .validate()
        .unwrap_err();

        assert_eq!(
            summarize(&errors),
            "shipping_address must be between 10 and 500 characters"
        );
        assert!(details(&errors).get("shipping_address").is_some());
    }
}

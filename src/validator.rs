//! JSON body extractor that also runs `validator` rules.

use anyhow::anyhow;
use axum::{
    Json,
    extract::{FromRequest, Request, rejection::JsonRejection},
    http::StatusCode,
};
use serde::de::DeserializeOwned;
use validator::{Validate, ValidationErrors, ValidationErrorsKind};

use pei_core::AppError;

/// Flattens nested errors (`checks[3].action: ...`) into one message.
fn format_errors(errors: &ValidationErrors) -> String {
    let mut messages = Vec::new();
    collect_errors(errors, "", &mut messages);
    messages.join(", ")
}

fn collect_errors(errors: &ValidationErrors, prefix: &str, out: &mut Vec<String>) {
    for (field, kind) in errors.errors() {
        let path = if prefix.is_empty() {
            field.to_string()
        } else {
            format!("{prefix}.{field}")
        };

        match kind {
            ValidationErrorsKind::Field(field_errors) => {
                for error in field_errors {
                    match &error.message {
                        Some(msg) => out.push(format!("{path}: {msg}")),
                        None => out.push(format!("{path} is invalid")),
                    }
                }
            }
            ValidationErrorsKind::Struct(inner) => collect_errors(inner, &path, out),
            ValidationErrorsKind::List(items) => {
                for (index, inner) in items {
                    collect_errors(inner, &format!("{path}[{index}]"), out);
                }
            }
        }
    }
}

fn rejection_to_error(rejection: JsonRejection) -> AppError {
    match rejection {
        JsonRejection::MissingJsonContentType(_) => AppError::new(
            StatusCode::BAD_REQUEST,
            anyhow!("Missing 'Content-Type: application/json' header"),
        ),
        JsonRejection::JsonSyntaxError(_) => {
            AppError::new(StatusCode::BAD_REQUEST, anyhow!("Malformed JSON body"))
        }
        JsonRejection::JsonDataError(e) => {
            AppError::new(StatusCode::BAD_REQUEST, anyhow!("{}", e.body_text()))
        }
        _ => AppError::new(StatusCode::BAD_REQUEST, anyhow!("Invalid request body")),
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(rejection_to_error)?;

        value.validate().map_err(|errors| {
            AppError::new(
                StatusCode::UNPROCESSABLE_ENTITY,
                anyhow!("{}", format_errors(&errors)),
            )
        })?;

        Ok(ValidatedJson(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pei_models::{BatchCheckDto, FieldVisibilityDto, PermissionCheckDto, ResourceScopeDto};

    #[test]
    fn test_format_field_error() {
        let dto = FieldVisibilityDto { fields: vec![] };
        let errors = dto.validate().unwrap_err();
        assert_eq!(
            format_errors(&errors),
            "fields: Between 1 and 100 fields per request"
        );
    }

    #[test]
    fn test_format_nested_error() {
        let dto = BatchCheckDto {
            checks: vec![PermissionCheckDto {
                action: String::new(),
                resource_type: "student".to_string(),
                resource: ResourceScopeDto::default(),
            }],
        };
        let errors = dto.validate().unwrap_err();
        assert_eq!(
            format_errors(&errors),
            "checks[0].action: Action must be between 1 and 64 characters"
        );
    }
}

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use crate::domain::DomainError;
use crate::product_actor::ProductError;

pub fn product_error_to_response(err: ProductError) -> axum::response::Response {
    match &err {
        ProductError::DuplicateKey(_) => json_error(StatusCode::CONFLICT, "duplicate_key", err.to_string()),
        ProductError::NotFound(_) => json_error(StatusCode::NOT_FOUND, "not_found", err.to_string()),
        ProductError::ActorCommunicationError(_) => {
            json_error(StatusCode::SERVICE_UNAVAILABLE, "unavailable", err.to_string())
        }
    }
}

pub fn domain_error_to_response(err: DomainError) -> axum::response::Response {
    json_error(StatusCode::UNPROCESSABLE_ENTITY, "invalid_input", err.to_string())
}

pub fn rejection_to_response(rejection: JsonRejection) -> axum::response::Response {
    json_error(rejection.status(), "invalid_body", rejection.body_text())
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}

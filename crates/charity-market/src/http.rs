use axum::extract::rejection::JsonRejection;
use axum::http::{header, HeaderName, Method};
use axum::Json;
use tower_http::cors::{Any, CorsLayer};

use crate::error::AppError;

/// Permissive CORS for browser callers; preflight `OPTIONS` is answered with 200.
pub fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::POST, Method::OPTIONS])
        .allow_headers([
            header::AUTHORIZATION,
            header::CONTENT_TYPE,
            HeaderName::from_static("x-client-info"),
            HeaderName::from_static("apikey"),
        ])
}

/// Maps axum's JSON rejection (422 by default) onto a 400 validation error.
pub fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, AppError> {
    match payload {
        Ok(Json(value)) => Ok(value),
        Err(rejection) => Err(AppError::validation(rejection.body_text())),
    }
}

/// Trimmed, non-empty text or a validation error naming the field.
pub fn required<'a>(field: &str, value: Option<&'a str>) -> Result<&'a str, AppError> {
    match value.map(str::trim) {
        Some(text) if !text.is_empty() => Ok(text),
        _ => Err(AppError::validation(format!("{field} is required"))),
    }
}

// --- File: crates/calproxy_common/src/http.rs ---
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::fmt::Display;

use crate::error::HttpStatusCode;

pub mod client;

/// Builds the JSON error body used by every handler:
/// `{"error": {"message": ..., "code": ...}}`.
pub fn error_response(status: u16, message: impl Display) -> Response {
    let status_code = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

    let body = Json(json!({
        "error": {
            "message": message.to_string(),
            "code": status_code.as_u16(),
        }
    }));

    (status_code, body).into_response()
}

/// Extension trait to convert a domain error into an Axum HTTP response.
pub trait IntoHttpResponse {
    /// Converts the error into an Axum HTTP response.
    fn into_http_response(self) -> Response;
}

impl<E> IntoHttpResponse for E
where
    E: HttpStatusCode + Display,
{
    fn into_http_response(self) -> Response {
        error_response(self.status_code(), &self)
    }
}

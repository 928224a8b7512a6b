//! Handlers shared by the application modules.

use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use bookit_http::error::AppError;

/// Plain `OPTIONS` answer: permissive CORS headers, empty body.
pub async fn send_options() -> impl IntoResponse {
    (
        StatusCode::OK,
        [
            (header::ACCESS_CONTROL_ALLOW_ORIGIN, "*"),
            (header::ACCESS_CONTROL_ALLOW_METHODS, "GET, POST, PUT, DELETE"),
            (header::ACCESS_CONTROL_ALLOW_HEADERS, "Content-Type"),
        ],
    )
}

/// Method fallback for routes whose path matched.
pub async fn method_not_allowed() -> AppError {
    AppError::MethodNotAllowed
}

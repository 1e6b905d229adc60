use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use super::login_page::LOGIN_PAGE;
use super::upstream::UpstreamError;

pub const UNAUTHORIZED_ERROR: &str = "Unauthorized";
pub const UNAUTHORIZED_MESSAGE: &str = "Invalid or missing PWA access token";
pub const UPSTREAM_ERROR: &str = "Internal Server Error";
pub const UPSTREAM_MESSAGE: &str = "Failed to fetch data from upstream";

#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("missing or invalid access token")]
    AuthDenied { wants_json: bool },
    #[error(transparent)]
    UpstreamUnreachable(#[from] UpstreamError),
    #[error("upstream task failed: {0}")]
    UpstreamTask(#[from] tokio::task::JoinError),
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        match self {
            GatewayError::AuthDenied { wants_json: true } => (
                StatusCode::UNAUTHORIZED,
                Json(json!({ "error": UNAUTHORIZED_ERROR, "message": UNAUTHORIZED_MESSAGE })),
            )
                .into_response(),
            GatewayError::AuthDenied { wants_json: false } => {
                (StatusCode::UNAUTHORIZED, Html(LOGIN_PAGE)).into_response()
            }
            // Details stay in the log; callers get a fixed body
            GatewayError::UpstreamUnreachable(_) | GatewayError::UpstreamTask(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": UPSTREAM_ERROR, "message": UPSTREAM_MESSAGE })),
            )
                .into_response(),
        }
    }
}

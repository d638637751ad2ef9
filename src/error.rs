use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use tracing::info;

#[derive(Debug)]
pub enum HttpError {
    Validation(String),
    Upstream(anyhow::Error),
}

impl HttpError {
    pub fn validation(message: impl Into<String>) -> Self {
        HttpError::Validation(message.into())
    }
}

impl From<anyhow::Error> for HttpError {
    fn from(inner: anyhow::Error) -> Self {
        HttpError::Upstream(inner)
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let (status, error) = match self {
            HttpError::Validation(message) => (StatusCode::BAD_REQUEST, message),
            HttpError::Upstream(inner) => (StatusCode::INTERNAL_SERVER_ERROR, inner.to_string()),
        };
        let json = json!({
            "ok": false,
            "error": error,
        });
        info!("Returning http error: {json}");
        (status, Json(json)).into_response()
    }
}

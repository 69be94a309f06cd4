// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;
use voltura_core::CoreError;

#[derive(Error, Debug)]
pub enum NodeError {
    #[error(transparent)]
    Core(#[from] CoreError),
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("not found")]
    NotFound,
    #[error("internal error")]
    Internal,
}

impl From<std::io::Error> for NodeError {
    fn from(e: std::io::Error) -> Self {
        NodeError::Core(CoreError::Io(e))
    }
}

impl IntoResponse for NodeError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            NodeError::NotFound => (StatusCode::NOT_FOUND, "Resource not found".to_string()),
            NodeError::InvalidInput(msg) => (StatusCode::BAD_REQUEST, msg),
            NodeError::Core(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
            NodeError::Internal => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
            }
        };

        let body = Json(json!({
            "error": message
        }));

        (status, body).into_response()
    }
}

// src/api/errors.rs

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CompletionError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("JSON parsing failed: {0}")]
    Json(#[from] serde_json::Error),
    #[error("API returned an error: {0}")]
    Api(String),
    #[error("API response contained no message content")]
    EmptyResponse,
}

use crate::api::errors::CompletionError;
use std::fmt;

#[derive(Debug)]
pub enum AppError {
    IoError(std::io::Error),
    CompletionError(CompletionError),
    TomlError(toml::de::Error),
    TomlSerializeError(toml::ser::Error),
    JsonError(serde_json::Error),
    StoreError(String),
    MissingPrompt,
    MissingApiKey,
    RollbackError(String),
    InvalidInput(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::IoError(e) => write!(f, "IO error: {}", e),
            AppError::CompletionError(e) => write!(f, "Completion API error: {}", e),
            AppError::TomlError(e) => write!(f, "TOML parsing error: {}", e),
            AppError::TomlSerializeError(e) => write!(f, "TOML serialization error: {}", e),
            AppError::JsonError(e) => write!(f, "JSON error: {}", e),
            AppError::StoreError(e) => write!(f, "Project store error: {}", e),
            AppError::MissingPrompt => write!(f, "Prompt is required"),
            AppError::MissingApiKey => write!(f, "API key is required"),
            AppError::RollbackError(e) => write!(f, "Rollback error: {}", e),
            AppError::InvalidInput(e) => write!(f, "Invalid input: {}", e),
        }
    }
}

impl std::error::Error for AppError {}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::IoError(err)
    }
}

impl From<toml::de::Error> for AppError {
    fn from(err: toml::de::Error) -> Self {
        AppError::TomlError(err)
    }
}

impl From<toml::ser::Error> for AppError {
    fn from(err: toml::ser::Error) -> Self {
        AppError::TomlSerializeError(err)
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::JsonError(err)
    }
}

impl From<CompletionError> for AppError {
    fn from(err: CompletionError) -> Self {
        AppError::CompletionError(err)
    }
}

//! Error types for curlsharp
//!
//! Conversion problems are not errors in this sense: they travel inside a
//! [`ConvertResult`](crate::models::ConvertResult). These variants cover the
//! command-line driver around the converter.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CurlsharpError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Invalid argument: {0}")]
    Argument(String),

    #[error("Conversion failed: {}", .0.join("; "))]
    Conversion(Vec<String>),
}

pub type Result<T> = std::result::Result<T, CurlsharpError>;

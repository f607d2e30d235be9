//! Error types for Quill.

use thiserror::Error;

/// Library-level error type for Quill operations.
#[derive(Error, Debug)]
pub enum QuillError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Language model error: {0}")]
    Llm(String),

    #[error("Failed to parse response: {0}")]
    Parse(String),

    #[error("Tool failed: {0}")]
    Tool(String),

    #[error("Agent error: {0}")]
    Agent(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Result type alias for Quill operations.
pub type Result<T> = std::result::Result<T, QuillError>;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SfError {
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Server returned {status}: {message}")]
    Api { status: u16, message: String },
}

impl SfError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        SfError::InvalidInput(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, SfError>;

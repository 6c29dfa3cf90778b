use thiserror::Error;

#[derive(Error, Debug)]
pub enum CollectorError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON deserialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML deserialization failed: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Source '{source_id}' failed: {message}")]
    Source { source_id: String, message: String },

    #[error("Report error: {0}")]
    Report(String),
}

impl CollectorError {
    pub fn source(source_id: &str, message: impl Into<String>) -> Self {
        CollectorError::Source {
            source_id: source_id.to_string(),
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, CollectorError>;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum BlogError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Post not found: {0}")]
    NotFound(String),

    #[error("Malformed record '{record}': {reason}")]
    MalformedRecord { record: String, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Store error: {0}")]
    Store(String),

    #[error("Render error: {0}")]
    Render(String),

    #[error("Api Error: {0}")]
    Api(String),
}

impl BlogError {
    pub fn malformed(record: impl Into<String>, reason: impl ToString) -> Self {
        BlogError::MalformedRecord {
            record: record.into(),
            reason: reason.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, BlogError>;

use thiserror::Error;

/// Domain-specific errors using thiserror
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Missing required field: {field}")]
    Validation { field: &'static str },

    #[error("Storage error: {message}")]
    Persistence { message: String },
}

impl DomainError {
    pub fn validation(field: &'static str) -> Self {
        Self::Validation { field }
    }

    pub fn persistence(message: impl Into<String>) -> Self {
        Self::Persistence {
            message: message.into(),
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation { .. })
    }
}

impl From<anyhow::Error> for DomainError {
    fn from(e: anyhow::Error) -> Self {
        // keep the whole context chain for the log line
        Self::persistence(format!("{e:#}"))
    }
}

use thiserror::Error;

#[derive(Debug, Error)]
pub enum FinControlError {
    #[error("Invalid argument: {field}: {reason}")]
    InvalidArgument { field: String, reason: String },

    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Export error: {0}")]
    ExportError(String),
}

impl FinControlError {
    pub(crate) fn invalid(field: &str, reason: impl Into<String>) -> Self {
        FinControlError::InvalidArgument {
            field: field.to_string(),
            reason: reason.into(),
        }
    }
}

impl From<serde_json::Error> for FinControlError {
    fn from(e: serde_json::Error) -> Self {
        FinControlError::SerializationError(e.to_string())
    }
}

impl From<std::io::Error> for FinControlError {
    fn from(e: std::io::Error) -> Self {
        FinControlError::ExportError(e.to_string())
    }
}

#[cfg(feature = "export")]
impl From<csv::Error> for FinControlError {
    fn from(e: csv::Error) -> Self {
        FinControlError::ExportError(e.to_string())
    }
}

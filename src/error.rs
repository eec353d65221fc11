use thiserror::Error;

pub type Result<T> = std::result::Result<T, GraphError>;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GraphError {
    #[error("malformed input: {reason}")]
    MalformedInput { reason: String },
    #[error("failed to read data from {source_name}: {reason}")]
    ReadFailure { source_name: String, reason: String },
    #[error("stored settings could not be decoded: {reason}")]
    SettingsDecode { reason: String },
}

impl GraphError {
    pub fn malformed(reason: impl Into<String>) -> Self {
        Self::MalformedInput {
            reason: reason.into(),
        }
    }

    pub fn read_failure(source_name: impl Into<String>, reason: impl ToString) -> Self {
        Self::ReadFailure {
            source_name: source_name.into(),
            reason: reason.to_string(),
        }
    }
}

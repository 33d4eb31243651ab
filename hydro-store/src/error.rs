use std::path::PathBuf;

#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    #[error("failed to read dataset {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("dataset {path} is missing columns: {}", .columns.join(", "))]
    MissingColumns { path: PathBuf, columns: Vec<String> },
    #[error("invalid row in {path} at line {line}: {reason}")]
    DataLoad {
        path: PathBuf,
        line: u64,
        reason: String,
    },
    #[error("invalid parameter '{field}': {message}")]
    InvalidParameter { field: String, message: String },
}

impl StoreError {
    pub fn invalid_parameter(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidParameter {
            field: field.into(),
            message: message.into(),
        }
    }

    /// True for errors caused by the caller rather than by the dataset.
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::InvalidParameter { .. })
    }
}

use crate::patient::Violations;

#[derive(Debug, thiserror::Error)]
pub enum PatientError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("invalid patient: {0}")]
    Validation(Violations),
    #[error("patient id not found: {0}")]
    NotFound(String),
    #[error("patient already exists: {0}")]
    AlreadyExists(String),
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("patient store unavailable: {0}")]
    StorageUnavailable(std::io::Error),
    #[error("patient store is malformed: {0}")]
    MalformedData(serde_json::Error),
    #[error("failed to serialize patient store: {0}")]
    Serialization(serde_json::Error),
}

impl PatientError {
    /// Whether the failure came from the backing store rather than the caller's input.
    pub fn is_storage(&self) -> bool {
        matches!(
            self,
            PatientError::StorageUnavailable(_)
                | PatientError::MalformedData(_)
                | PatientError::Serialization(_)
        )
    }
}

pub type PatientResult<T> = std::result::Result<T, PatientError>;

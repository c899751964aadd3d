use thiserror::Error;

#[derive(Error, Debug)]
pub enum DiaryError {
    #[error("Entry content cannot be empty")]
    EmptyContent,

    #[error("Stored diary data is corrupt: {0}")]
    CorruptStorage(String),

    #[error("Could not generate a unique entry id after {0} attempts")]
    IdExhausted(usize),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl DiaryError {
    pub fn is_corrupt_storage(&self) -> bool {
        matches!(self, DiaryError::CorruptStorage(_))
    }
}

pub type Result<T> = std::result::Result<T, DiaryError>;

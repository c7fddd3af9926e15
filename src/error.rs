use thiserror::Error;

#[derive(Error, Debug)]
pub enum EnhanceError {
    #[error("Failed to decode image: {0}")]
    Decode(String),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Unsupported pixel layout: {0}")]
    UnsupportedLayout(String),

    #[error("Failed to encode image: {0}")]
    Encode(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl EnhanceError {
    /// Whether the batch driver should skip the file and keep going
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            EnhanceError::Decode(_) | EnhanceError::Encode(_) | EnhanceError::UnsupportedLayout(_)
        )
    }
}

use thiserror::Error as ThisError;

#[derive(ThisError, Debug)]
pub enum AccessoryError {
    #[error("Accessory '{0}' has not configured a controller yet")]
    NotConfigured(String),

    #[error(transparent)]
    IoError(#[from] std::io::Error),

    #[error(transparent)]
    SerdeJsonError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, AccessoryError>;

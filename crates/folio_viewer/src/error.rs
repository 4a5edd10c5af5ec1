use thiserror::Error;

#[derive(Debug, Error)]
pub enum ViewerError {
    #[error("Invalid viewer configuration: {0}")]
    InvalidConfig(String),

    #[error("Failed to preload {url}: {message}")]
    Preload { url: String, message: String },

    #[error("Failed to install document listeners: {0}")]
    Listeners(String),

    #[error("Pointer capture failed for pointer {0}")]
    PointerCapture(i32),
}

pub type Result<T> = std::result::Result<T, ViewerError>;

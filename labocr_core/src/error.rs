use thiserror::Error;

/// Failure while acquiring or recognizing a single image.
///
/// These never abort a whole run: the orchestrator logs them and carries on
/// with the remaining images.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("request to {locator} failed: {message}")]
    Request { locator: String, message: String },

    #[error("{locator} returned HTTP {status}")]
    Status { locator: String, status: u16 },

    #[error("{locator} is {size} bytes (limit {limit})")]
    TooLarge {
        locator: String,
        size: usize,
        limit: usize,
    },

    #[error("invalid locator: {0}")]
    InvalidLocator(String),

    #[error("OCR failed: {0}")]
    Ocr(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl SourceError {
    pub fn request(locator: impl Into<String>, message: impl std::fmt::Display) -> Self {
        Self::Request {
            locator: locator.into(),
            message: message.to_string(),
        }
    }
}

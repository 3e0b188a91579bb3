#![deny(
    clippy::all,
    clippy::nursery,
    clippy::pedantic,
    clippy::style,
    clippy::complexity,
    clippy::perf,
    clippy::correctness,
    clippy::suspicious,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(
    clippy::similar_names,
    clippy::missing_safety_doc,
    clippy::missing_panics_doc,
    clippy::missing_errors_doc
)]

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub mod error;
pub mod result;

pub use error::SourceError;
pub use result::ResultMap;

/// One image belonging to a subject, in document order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageRef {
    /// Position of the image on the source page (0-based).
    pub index: usize,
    /// URL or file path the bytes are fetched from.
    pub locator: String,
}

impl ImageRef {
    #[must_use]
    pub fn new(index: usize, locator: impl Into<String>) -> Self {
        Self {
            index,
            locator: locator.into(),
        }
    }
}

/// Supplies the images for one subject (a patient chart, a scan directory).
#[async_trait]
pub trait ImageSource: Send + Sync {
    fn name(&self) -> &str;

    /// List the subject's images in the order they appear at the source.
    async fn list_images(&self, subject: &str) -> Result<Vec<ImageRef>, SourceError>;

    async fn fetch_image(&self, image: &ImageRef) -> Result<Vec<u8>, SourceError>;
}

/// Turns image bytes into raw, line-break-delimited text.
///
/// The output is treated as untrusted: any amount of recognition noise is
/// tolerated downstream.
#[async_trait]
pub trait TextRecognizer: Send + Sync {
    fn name(&self) -> &str;

    async fn recognize_text(&self, image: Vec<u8>) -> Result<String, SourceError>;
}

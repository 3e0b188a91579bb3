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

//! Image sources and OCR backends feeding the extraction engine.

pub mod command;
pub mod directory;
pub mod http;
pub mod retry;
pub mod tesseract;

pub use directory::DirectoryImageSource;
pub use http::{HttpImageSource, HttpSourceConfig, image_sources};
pub use retry::retry_with_backoff;
pub use tesseract::{TesseractConfig, TesseractRecognizer};

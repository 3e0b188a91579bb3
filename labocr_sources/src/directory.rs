use async_trait::async_trait;
use labocr_core::{ImageRef, ImageSource, SourceError};
use std::path::Path;
use tracing::debug;

const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "tif", "tiff", "bmp", "gif", "webp"];

/// Local scans: the subject is a directory and every image file in it is one
/// page, ordered by file name.
#[derive(Debug, Default, Clone, Copy)]
pub struct DirectoryImageSource;

impl DirectoryImageSource {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

fn is_image(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            IMAGE_EXTENSIONS
                .iter()
                .any(|known| known.eq_ignore_ascii_case(ext))
        })
}

#[async_trait]
impl ImageSource for DirectoryImageSource {
    fn name(&self) -> &'static str {
        "directory"
    }

    async fn list_images(&self, subject: &str) -> Result<Vec<ImageRef>, SourceError> {
        let mut entries = tokio::fs::read_dir(subject).await?;
        let mut paths = Vec::new();

        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if entry.file_type().await?.is_file() && is_image(&path) {
                paths.push(path);
            }
        }
        paths.sort();

        debug!("Found {} images in {subject}", paths.len());
        Ok(paths
            .into_iter()
            .enumerate()
            .map(|(index, path)| ImageRef::new(index, path.to_string_lossy()))
            .collect())
    }

    async fn fetch_image(&self, image: &ImageRef) -> Result<Vec<u8>, SourceError> {
        Ok(tokio::fs::read(&image.locator).await?)
    }
}

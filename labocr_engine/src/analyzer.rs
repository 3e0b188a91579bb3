//! Concurrent acquire → OCR → extract pipeline for one subject.
//!
//! Each image runs as its own task. A task that fails (fetch, OCR or a
//! panic) is logged and left out of the merge; it never cancels its siblings.

use labocr_core::{ImageRef, ImageSource, ResultMap, SourceError, TextRecognizer};
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use crate::engine::Extractor;

const DEFAULT_MAX_TASKS: usize = 4;

/// Errors that stop a whole run before any image is processed.
#[derive(Debug, Error)]
pub enum AnalyzeError {
    #[error("failed to list images for '{subject}': {source}")]
    Listing {
        subject: String,
        #[source]
        source: SourceError,
    },

    #[error("no images found for '{0}'")]
    NoImages(String),
}

/// Outcome of one run.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    pub subject: String,
    /// Images listed for the subject.
    pub images: usize,
    /// Images whose fetch or OCR failed.
    pub failed: usize,
    pub results: ResultMap,
}

/// Drives an [`ImageSource`] and a [`TextRecognizer`] into an [`Extractor`].
pub struct Analyzer<S, R> {
    source: Arc<S>,
    recognizer: Arc<R>,
    extractor: Extractor,
    max_tasks: usize,
}

impl<S, R> Analyzer<S, R>
where
    S: ImageSource + 'static,
    R: TextRecognizer + 'static,
{
    #[must_use]
    pub const fn new(source: Arc<S>, recognizer: Arc<R>, extractor: Extractor) -> Self {
        Self {
            source,
            recognizer,
            extractor,
            max_tasks: DEFAULT_MAX_TASKS,
        }
    }

    /// Limit how many images are fetched and recognized at once.
    #[must_use]
    pub fn with_max_tasks(mut self, max_tasks: usize) -> Self {
        self.max_tasks = max_tasks.max(1);
        self
    }

    /// List, fetch, recognize and extract every image of `subject`.
    ///
    /// # Errors
    /// Fails only when the image list cannot be obtained or is empty.
    /// Per-image failures are counted in the report instead.
    pub async fn analyze(&self, subject: &str) -> Result<AnalysisReport, AnalyzeError> {
        let images = self
            .source
            .list_images(subject)
            .await
            .map_err(|source| AnalyzeError::Listing {
                subject: subject.to_string(),
                source,
            })?;

        if images.is_empty() {
            return Err(AnalyzeError::NoImages(subject.to_string()));
        }

        info!(
            "Analyzing {} images for '{subject}' via {} + {}",
            images.len(),
            self.source.name(),
            self.recognizer.name()
        );

        let total = images.len();
        let (partials, failed) = self.run_tasks(images).await;
        let results = self.extractor.merge(&partials);

        info!(
            "Finished '{subject}': {} values, {failed}/{total} images failed",
            results.total_values()
        );

        Ok(AnalysisReport {
            subject: subject.to_string(),
            images: total,
            failed,
            results,
        })
    }

    /// Run one task per image and return the partials in image order along
    /// with the number of failed images.
    async fn run_tasks(&self, images: Vec<ImageRef>) -> (Vec<ResultMap>, usize) {
        let permits = Arc::new(Semaphore::new(self.max_tasks));
        let mut tasks = JoinSet::new();

        for image in images {
            let source = Arc::clone(&self.source);
            let recognizer = Arc::clone(&self.recognizer);
            let extractor = self.extractor.clone();
            let permits = Arc::clone(&permits);

            tasks.spawn(async move {
                let _permit = permits.acquire_owned().await.ok();
                let outcome = extract_image(&*source, &*recognizer, &extractor, &image).await;
                (image, outcome)
            });
        }

        let mut partials = Vec::with_capacity(tasks.len());
        let mut failed = 0;
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((image, Ok(partial))) => partials.push((image.index, partial)),
                Ok((image, Err(e))) => {
                    warn!("Skipping image #{} ({}): {e}", image.index, image.locator);
                    failed += 1;
                }
                Err(e) => {
                    warn!("Image task aborted: {e}");
                    failed += 1;
                }
            }
        }

        partials.sort_by_key(|(index, _)| *index);
        (partials.into_iter().map(|(_, p)| p).collect(), failed)
    }
}

async fn extract_image<S, R>(
    source: &S,
    recognizer: &R,
    extractor: &Extractor,
    image: &ImageRef,
) -> Result<ResultMap, SourceError>
where
    S: ImageSource + ?Sized,
    R: TextRecognizer + ?Sized,
{
    let bytes = source.fetch_image(image).await?;
    debug!("Fetched image #{} ({} bytes)", image.index, bytes.len());

    let text = recognizer.recognize_text(bytes).await?;
    debug!(
        "Recognized {} lines from image #{}",
        text.lines().count(),
        image.index
    );

    Ok(extractor.process_block(&text))
}

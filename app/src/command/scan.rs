use labocr_config::Config;
use labocr_engine::Analyzer;
use labocr_sources::{DirectoryImageSource, TesseractRecognizer};
use std::path::PathBuf;
use std::sync::Arc;

use super::output::OutputFormat;

/// Input parameters for the Scan command strategy.
#[derive(Debug, Clone)]
pub struct ScanInput {
    pub config: Option<PathBuf>,
    pub format: OutputFormat,
    /// Directory holding the scanned report images
    pub dir: PathBuf,
}

/// Strategy for OCR-ing a local directory of report images.
#[derive(Debug, Clone, Copy)]
pub struct ScanStrategy;

impl super::CommandStrategy for ScanStrategy {
    type Input = ScanInput;

    async fn execute(&self, input: Self::Input) -> anyhow::Result<()> {
        let config = Config::load_or_default(input.config.as_deref())?;
        let extractor = super::build_extractor(&config)?;

        let analyzer = Analyzer::new(
            Arc::new(DirectoryImageSource::new()),
            Arc::new(TesseractRecognizer::new(config.ocr.clone())),
            extractor,
        )
        .with_max_tasks(config.concurrency.max_tasks);

        let report = analyzer.analyze(&input.dir.to_string_lossy()).await?;
        super::print_report(&report, input.format)
    }
}

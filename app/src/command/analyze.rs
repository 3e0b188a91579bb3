use labocr_config::Config;
use labocr_engine::Analyzer;
use labocr_sources::{HttpImageSource, TesseractRecognizer};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

use super::output::OutputFormat;

/// Input parameters for the Analyze command strategy.
#[derive(Debug, Clone)]
pub struct AnalyzeInput {
    pub config: Option<PathBuf>,
    pub format: OutputFormat,
    /// Subject identifier substituted into the page path
    pub subject: String,
}

/// Strategy for pulling a subject's report images from the records system.
///
/// Needs a config file: the session cookie and base URL live there.
#[derive(Debug, Clone, Copy)]
pub struct AnalyzeStrategy;

impl super::CommandStrategy for AnalyzeStrategy {
    type Input = AnalyzeInput;

    async fn execute(&self, input: Self::Input) -> anyhow::Result<()> {
        let config = Config::load(input.config.as_deref())?;
        let extractor = super::build_extractor(&config)?;

        if config.source.cookie.is_none() {
            warn!("No session cookie configured; the records system may refuse the request");
        }
        info!("Using records system at {}", config.source.base_url);

        let analyzer = Analyzer::new(
            Arc::new(HttpImageSource::new(config.source.clone())?),
            Arc::new(TesseractRecognizer::new(config.ocr.clone())),
            extractor,
        )
        .with_max_tasks(config.concurrency.max_tasks);

        let report = analyzer.analyze(&input.subject).await?;
        super::print_report(&report, input.format)
    }
}

use anyhow::Context;
use labocr_config::Config;
use std::path::PathBuf;
use tokio::io::AsyncReadExt;
use tracing::info;

use super::output::{OutputFormat, render_results};

/// Input parameters for the Extract command strategy.
#[derive(Debug, Clone)]
pub struct ExtractInput {
    pub config: Option<PathBuf>,
    pub format: OutputFormat,
    /// Text files, one block each; stdin is read when empty
    pub files: Vec<PathBuf>,
}

/// Strategy for extracting from text that has already been through OCR.
#[derive(Debug, Clone, Copy)]
pub struct ExtractStrategy;

impl super::CommandStrategy for ExtractStrategy {
    type Input = ExtractInput;

    async fn execute(&self, input: Self::Input) -> anyhow::Result<()> {
        let config = Config::load_or_default(input.config.as_deref())?;
        let extractor = super::build_extractor(&config)?;

        let mut blocks = Vec::with_capacity(input.files.len().max(1));
        if input.files.is_empty() {
            let mut text = String::new();
            tokio::io::stdin()
                .read_to_string(&mut text)
                .await
                .context("Failed to read stdin")?;
            blocks.push(text);
        } else {
            for path in &input.files {
                let text = tokio::fs::read_to_string(path)
                    .await
                    .with_context(|| format!("Failed to read {}", path.display()))?;
                blocks.push(text);
            }
        }

        info!("Extracting from {} text blocks", blocks.len());
        let results = extractor.extract_from_blocks(&blocks);

        println!("{}", render_results(&results, input.format)?.trim_end());
        Ok(())
    }
}

//! OCR through the `tesseract` command-line tool.

use async_trait::async_trait;
use labocr_core::{SourceError, TextRecognizer};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tracing::debug;

use crate::command::{CommandSpec, build_piped_command};

/// Tesseract invocation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TesseractConfig {
    /// Binary name or path.
    #[serde(default = "TesseractConfig::default_binary")]
    pub binary: String,

    #[serde(default = "TesseractConfig::default_language")]
    pub language: String,

    /// Page segmentation mode; 6 treats the page as one uniform text block.
    #[serde(default = "TesseractConfig::default_psm")]
    pub psm: u8,

    /// Per-image time limit (seconds).
    #[serde(default = "TesseractConfig::default_timeout")]
    pub timeout: u64,
}

impl TesseractConfig {
    fn default_binary() -> String {
        "tesseract".to_string()
    }

    fn default_language() -> String {
        "eng".to_string()
    }

    const fn default_psm() -> u8 {
        6
    }

    const fn default_timeout() -> u64 {
        120
    }
}

impl Default for TesseractConfig {
    fn default() -> Self {
        Self {
            binary: Self::default_binary(),
            language: Self::default_language(),
            psm: Self::default_psm(),
            timeout: Self::default_timeout(),
        }
    }
}

pub struct TesseractRecognizer {
    config: TesseractConfig,
}

impl TesseractRecognizer {
    #[must_use]
    pub const fn new(config: TesseractConfig) -> Self {
        Self { config }
    }

    /// `tesseract stdin stdout -l <lang> --psm <n>`
    #[must_use]
    pub fn command_spec(&self) -> CommandSpec {
        CommandSpec {
            program: self.config.binary.clone(),
            args: vec![
                "stdin".to_string(),
                "stdout".to_string(),
                "-l".to_string(),
                self.config.language.clone(),
                "--psm".to_string(),
                self.config.psm.to_string(),
            ],
        }
    }

    async fn run(&self, spec: &CommandSpec, image: Vec<u8>) -> Result<String, SourceError> {
        let mut child = build_piped_command(spec)
            .spawn()
            .map_err(|e| SourceError::Ocr(format!("failed to start {}: {e}", spec.program)))?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| SourceError::Ocr("stdin not captured".to_string()))?;
        let writer = async move {
            stdin.write_all(&image).await?;
            stdin.shutdown().await
        };

        let (written, output) = tokio::join!(writer, child.wait_with_output());
        let output = output?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(SourceError::Ocr(format!(
                "{} exited with {}: {}",
                spec.program,
                output.status.code().unwrap_or(-1),
                stderr.trim()
            )));
        }
        if let Err(e) = written {
            // the process may legitimately stop reading early
            debug!("stdin write to {} ended early: {e}", spec.program);
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

#[async_trait]
impl TextRecognizer for TesseractRecognizer {
    fn name(&self) -> &'static str {
        "tesseract"
    }

    async fn recognize_text(&self, image: Vec<u8>) -> Result<String, SourceError> {
        let spec = self.command_spec();
        debug!("Running {} on {} bytes", spec.display(), image.len());

        tokio::time::timeout(
            Duration::from_secs(self.config.timeout),
            self.run(&spec, image),
        )
        .await
        .map_err(|_| {
            SourceError::Ocr(format!(
                "{} timed out after {} seconds",
                spec.program, self.config.timeout
            ))
        })?
    }
}

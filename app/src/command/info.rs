use labocr_config::Config;
use labocr_engine::Registry;
use std::path::PathBuf;

/// Strategy for displaying the effective configuration.
///
/// Prints the source, OCR, engine and concurrency settings (cookie masked)
/// followed by the parameter table the engine will match against.
#[derive(Debug, Clone, Copy)]
pub struct InfoStrategy;

impl super::CommandStrategy for InfoStrategy {
    type Input = Option<PathBuf>;

    async fn execute(&self, input: Self::Input) -> anyhow::Result<()> {
        let config = Config::load_or_default(input.as_deref())?;
        let registry = config.registry()?;

        println!("=== labocr Configuration ===\n");

        println!("Source:");
        println!("  Base URL: {}", config.source.base_url);
        println!("  Page Path: {}", config.source.page_path);
        let cookie = config
            .source
            .cookie
            .as_deref()
            .map_or_else(|| "(not set)".to_string(), mask_cookie);
        println!("  Cookie: {cookie}");
        println!("  Timeout: {}s", config.source.timeout);
        println!("  Max Image Bytes: {}", config.source.max_image_bytes);
        println!();

        println!("OCR:");
        println!("  Binary: {}", config.ocr.binary);
        println!("  Language: {}", config.ocr.language);
        println!("  Page Segmentation Mode: {}", config.ocr.psm);
        println!();

        println!("Engine:");
        println!("  Match Threshold: {}", config.engine.match_threshold);
        println!("  Per-Block Cap: {}", config.engine.per_block_cap);
        match config.engine.global_cap {
            Some(cap) => println!("  Global Cap: {cap}"),
            None => println!("  Global Cap: (none)"),
        }
        println!("  Found Scope: {:?}", config.engine.found_scope);
        println!("  Max Tasks: {}", config.concurrency.max_tasks);
        println!();

        let origin = if config.parameters.is_some() {
            "config"
        } else {
            "built-in"
        };
        println!("Parameters ({}, {origin}):", registry.len());
        print_parameters(&registry);

        Ok(())
    }
}

fn print_parameters(registry: &Registry) {
    for param in registry.all_parameters() {
        let mut line = format!("  {}: {}", param.name(), param.aliases().join(" | "));
        if let Some(format) = param.format() {
            line.push_str(&format!("  format={format}"));
        }
        if let Some((min, max)) = param.range() {
            line.push_str(&format!("  range=[{min}, {max}]"));
        }
        println!("{line}");
    }
}

fn mask_cookie(cookie: &str) -> String {
    match cookie.split_once('=') {
        Some((name, _)) => format!("{name}=***"),
        None => "***".to_string(),
    }
}

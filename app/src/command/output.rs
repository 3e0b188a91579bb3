use anyhow::Result;
use clap::ValueEnum;
use labocr_core::ResultMap;
use labocr_engine::AnalysisReport;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Aligned `parameter  values` table
    Table,
    /// JSON object in parameter order
    Json,
}

pub fn render_results(results: &ResultMap, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Table => Ok(results.render_table()),
        OutputFormat::Json => Ok(serde_json::to_string_pretty(results)?),
    }
}

pub fn render_report(report: &AnalysisReport, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Table => Ok(format!(
            "Subject: {} ({} images, {} failed)\n\n{}",
            report.subject,
            report.images,
            report.failed,
            report.results.render_table()
        )),
        OutputFormat::Json => Ok(serde_json::to_string_pretty(report)?),
    }
}

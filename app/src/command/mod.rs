//! Static strategy pattern for CLI commands.
//!
//! Each command is a separate strategy with its own input type, dispatched
//! statically from `main`.

use anyhow::Result;
use labocr_config::Config;
use labocr_engine::{AnalysisReport, Extractor};
use std::sync::Arc;

mod analyze;
mod extract;
mod info;
mod init;
mod output;
mod scan;
mod version;

pub use analyze::{AnalyzeInput, AnalyzeStrategy};
pub use extract::{ExtractInput, ExtractStrategy};
pub use info::InfoStrategy;
pub use init::InitStrategy;
pub use output::OutputFormat;
pub use scan::{ScanInput, ScanStrategy};
pub use version::VersionStrategy;

/// Core trait defining the contract for all command strategies.
///
/// # Example
/// ```rust
/// struct MyStrategy;
///
/// impl CommandStrategy for MyStrategy {
///     type Input = MyInput;
///
///     async fn execute(&self, input: Self::Input) -> anyhow::Result<()> {
///         // Command logic here
///         Ok(())
///     }
/// }
/// ```
pub trait CommandStrategy: Send + Sync + 'static {
    /// The input type this strategy accepts.
    type Input;

    /// Execute the command with the given input.
    ///
    /// # Errors
    /// Returns an error if command execution fails.
    async fn execute(&self, input: Self::Input) -> anyhow::Result<()>;
}

/// Build the extractor from the config's registry and engine options.
fn build_extractor(config: &Config) -> Result<Extractor> {
    let registry = config.registry()?;
    Ok(Extractor::new(Arc::new(registry), config.engine.clone()))
}

fn print_report(report: &AnalysisReport, format: OutputFormat) -> Result<()> {
    println!("{}", output::render_report(report, format)?.trim_end());
    Ok(())
}

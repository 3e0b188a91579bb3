use labocr_config::Config;
use std::path::PathBuf;

/// Strategy for initializing the configuration.
///
/// Writes the config template to `~/labocr/config.json`, or to `--config`
/// when given.
#[derive(Debug, Clone, Copy)]
pub struct InitStrategy;

impl super::CommandStrategy for InitStrategy {
    type Input = Option<PathBuf>;

    async fn execute(&self, input: Self::Input) -> anyhow::Result<()> {
        let config_path = Config::create_config(input.as_deref())?;

        println!("✅ Created config file at: {}", config_path.display());
        println!();
        println!("📝 Next steps:");
        println!("   1. Set source.cookie to a logged-in session cookie");
        println!("   2. Make sure the tesseract binary is installed and on PATH");
        println!("   3. Run 'labocr analyze <SUBJECT>' or 'labocr scan <DIR>'");
        println!();
        println!("🔧 Configuration options:");
        println!("   - engine.found_scope: 'block' (one value per report) or 'line'");
        println!("   - engine.global_cap: limit values per parameter after merging");
        println!("   - parameters: replace the built-in parameter table");
        println!();
        Ok(())
    }
}

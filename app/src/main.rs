#![deny(
    clippy::all,
    clippy::nursery,
    clippy::pedantic,
    clippy::style,
    clippy::complexity,
    clippy::perf,
    clippy::correctness,
    clippy::suspicious,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(
    clippy::similar_names,
    clippy::missing_safety_doc,
    clippy::missing_panics_doc,
    clippy::missing_errors_doc
)]

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

mod command;

use command::{
    AnalyzeInput, AnalyzeStrategy, CommandStrategy, ExtractInput, ExtractStrategy, InfoStrategy,
    InitStrategy, OutputFormat, ScanInput, ScanStrategy, VersionStrategy,
};

#[derive(Parser)]
#[command(name = "labocr")]
#[command(about = "Extract lab values from OCR'd lab reports", long_about = None)]
struct Cli {
    /// Config file (default: ~/labocr/config.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Table, global = true)]
    format: OutputFormat,

    /// More logging (-v debug, -vv trace); RUST_LOG takes precedence
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract from OCR text files (stdin when none are given)
    Extract {
        /// Each file is one text block
        files: Vec<PathBuf>,
    },
    /// OCR every image in a directory and extract
    Scan {
        dir: PathBuf,
    },
    /// Fetch a subject's report images over HTTP, OCR and extract
    Analyze {
        subject: String,
    },
    /// Initialize configuration
    Init,
    /// Show effective configuration and parameter table
    Info,
    /// Show version
    Version,
}

fn init_tracing(verbose: u8) -> anyhow::Result<()> {
    let filter = if std::env::var_os(EnvFilter::DEFAULT_ENV).is_some() {
        EnvFilter::from_default_env()
    } else {
        EnvFilter::new(match verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        })
    };

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose)?;

    let config = cli.config;
    let format = cli.format;

    match cli.command {
        Commands::Extract { files } => {
            ExtractStrategy
                .execute(ExtractInput {
                    config,
                    format,
                    files,
                })
                .await
        }
        Commands::Scan { dir } => {
            ScanStrategy
                .execute(ScanInput {
                    config,
                    format,
                    dir,
                })
                .await
        }
        Commands::Analyze { subject } => {
            AnalyzeStrategy
                .execute(AnalyzeInput {
                    config,
                    format,
                    subject,
                })
                .await
        }
        Commands::Init => InitStrategy.execute(config).await,
        Commands::Info => InfoStrategy.execute(config).await,
        Commands::Version => VersionStrategy.execute(()).await,
    }
}

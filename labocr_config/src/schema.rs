use anyhow::{Context, Result};
use labocr_engine::{EngineOptions, ParameterDef, Registry};
use labocr_sources::{HttpSourceConfig, TesseractConfig};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub source: HttpSourceConfig,
    #[serde(default)]
    pub ocr: TesseractConfig,
    #[serde(default)]
    pub engine: EngineOptions,
    #[serde(default)]
    pub concurrency: ConcurrencyConfig,
    /// Replaces the built-in parameter table when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameters: Option<Vec<ParameterDef>>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ConcurrencyConfig {
    /// Images fetched and recognized at the same time
    #[serde(default = "ConcurrencyConfig::default_max_tasks")]
    pub max_tasks: usize,
}

impl Default for ConcurrencyConfig {
    fn default() -> Self {
        Self {
            max_tasks: Self::default_max_tasks(),
        }
    }
}

impl ConcurrencyConfig {
    const fn default_max_tasks() -> usize {
        4
    }
}

const CONFIG_TEMPLATE: &str = r#"{
  "source": {
    "base_url": "https://njkidneydoctors.emnemr.com",
    "page_path": "/ci/paper/sign2/8/4/{subject}",
    "cookie": "ci_session=your-session-cookie-here",
    "timeout": 30,
    "max_image_bytes": 20971520,
    "retry_delays": [1, 2, 4]
  },
  "ocr": {
    "binary": "tesseract",
    "language": "eng",
    "psm": 6,
    "timeout": 120
  },
  "engine": {
    "match_threshold": 80,
    "per_block_cap": 6,
    "found_scope": "block"
  },
  "concurrency": {
    "max_tasks": 4
  }
}"#;

impl Config {
    pub fn config_dir() -> Result<PathBuf> {
        Ok(dirs::home_dir()
            .ok_or_else(|| anyhow::anyhow!("Cannot find home directory"))?
            .join("labocr"))
    }

    pub fn default_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.json"))
    }

    pub fn from_json(content: &str) -> Result<Self> {
        serde_json::from_str(content).context("Invalid config file")
    }

    /// Load the config file; a missing file is an error.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config_path = match path {
            Some(p) => p.to_path_buf(),
            None => Self::default_path()?,
        };

        if !config_path.exists() {
            anyhow::bail!(
                "Config file not found at: {}. Please run 'labocr init' to create config.",
                config_path.display()
            );
        }

        let content = std::fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read {}", config_path.display()))?;
        let config = Self::from_json(&content)
            .with_context(|| format!("Failed to parse {}", config_path.display()))?;

        debug!("Loaded config from {}", config_path.display());
        Ok(config)
    }

    /// Like [`Config::load`], but falls back to defaults when the default
    /// config file does not exist. An explicit path must exist.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        if path.is_none() && !Self::default_path()?.exists() {
            debug!("No config file, using defaults");
            return Ok(Self::default());
        }
        Self::load(path)
    }

    /// Build the parameter registry, failing on the first invalid definition.
    pub fn registry(&self) -> Result<Registry> {
        match &self.parameters {
            Some(defs) => Registry::from_defs(defs).context("Invalid parameter definitions"),
            None => Registry::with_defaults().context("Invalid built-in parameter table"),
        }
    }

    pub fn ensure_config_dir() -> Result<PathBuf> {
        let config_dir = Self::config_dir()?;
        std::fs::create_dir_all(&config_dir)?;
        Ok(config_dir)
    }

    /// Write the config template, refusing to overwrite an existing file.
    pub fn create_config(path: Option<&Path>) -> Result<PathBuf> {
        let config_path = match path {
            Some(p) => {
                if let Some(parent) = p.parent().filter(|d| !d.as_os_str().is_empty()) {
                    std::fs::create_dir_all(parent)?;
                }
                p.to_path_buf()
            }
            None => Self::ensure_config_dir()?.join("config.json"),
        };

        if config_path.exists() {
            anyhow::bail!(
                "Config file already exists at: {}. Please edit it directly.",
                config_path.display()
            );
        }

        std::fs::write(&config_path, CONFIG_TEMPLATE)
            .with_context(|| format!("Failed to write {}", config_path.display()))?;
        Ok(config_path)
    }
}

//! Chart pages served over HTTP: one HTML page per subject, each `<img>` on
//! it is a scanned report.

use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use labocr_core::{ImageRef, ImageSource, SourceError};
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::Client;
use reqwest::header::{COOKIE, HeaderMap, HeaderValue};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

use crate::retry::retry_with_backoff;

#[expect(clippy::expect_used, reason = "literal pattern")]
static IMG_SRC: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)<img\s[^>]*src=["']([^"']+)["'][^>]*>"#).expect("valid img regex")
});

/// HTTP image source configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpSourceConfig {
    /// Scheme and host of the records system
    #[serde(default = "HttpSourceConfig::default_base_url")]
    pub base_url: String,

    /// Page path; `{subject}` is replaced by the subject identifier
    #[serde(default = "HttpSourceConfig::default_page_path")]
    pub page_path: String,

    /// Raw `Cookie` header carrying the authenticated session
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cookie: Option<String>,

    /// Request timeout (seconds)
    #[serde(default = "HttpSourceConfig::default_timeout")]
    pub timeout: u64,

    /// User-Agent header
    #[serde(default = "HttpSourceConfig::default_user_agent")]
    pub user_agent: String,

    /// Maximum image size (bytes)
    #[serde(default = "HttpSourceConfig::default_max_image_bytes")]
    pub max_image_bytes: usize,

    /// Seconds to wait between page fetch attempts
    #[serde(default = "HttpSourceConfig::default_retry_delays")]
    pub retry_delays: Vec<u64>,
}

impl HttpSourceConfig {
    fn default_base_url() -> String {
        "https://njkidneydoctors.emnemr.com".to_string()
    }

    fn default_page_path() -> String {
        "/ci/paper/sign2/8/4/{subject}".to_string()
    }

    const fn default_timeout() -> u64 {
        30
    }

    fn default_user_agent() -> String {
        format!("labocr/{}", env!("CARGO_PKG_VERSION"))
    }

    const fn default_max_image_bytes() -> usize {
        20 * 1024 * 1024 // 20MB
    }

    fn default_retry_delays() -> Vec<u64> {
        vec![1, 2, 4]
    }
}

impl Default for HttpSourceConfig {
    fn default() -> Self {
        Self {
            base_url: Self::default_base_url(),
            page_path: Self::default_page_path(),
            cookie: None,
            timeout: Self::default_timeout(),
            user_agent: Self::default_user_agent(),
            max_image_bytes: Self::default_max_image_bytes(),
            retry_delays: Self::default_retry_delays(),
        }
    }
}

/// Every `src` of an `<img>` tag, in document order.
#[must_use]
pub fn image_sources(html: &str) -> Vec<String> {
    IMG_SRC
        .captures_iter(html)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|src| !src.is_empty())
        .collect()
}

fn is_valid_subject(subject: &str) -> bool {
    !subject.is_empty()
        && subject
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

fn ensure_http(url: &Url) -> Result<(), SourceError> {
    if matches!(url.scheme(), "http" | "https") {
        Ok(())
    } else {
        Err(SourceError::InvalidLocator(url.to_string()))
    }
}

pub struct HttpImageSource {
    client: Client,
    base: Url,
    config: HttpSourceConfig,
}

impl HttpImageSource {
    pub fn new(config: HttpSourceConfig) -> Result<Self> {
        let base = Url::parse(&config.base_url)
            .with_context(|| format!("Invalid base_url: {}", config.base_url))?;
        if !matches!(base.scheme(), "http" | "https") {
            bail!("base_url must be http or https, got {}", base.scheme());
        }
        if !config.page_path.contains("{subject}") {
            bail!("page_path must contain {{subject}}: {}", config.page_path);
        }

        let mut headers = HeaderMap::new();
        if let Some(cookie) = &config.cookie {
            let mut value =
                HeaderValue::from_str(cookie).context("Cookie contains invalid characters")?;
            value.set_sensitive(true);
            headers.insert(COOKIE, value);
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout))
            .user_agent(config.user_agent.clone())
            .default_headers(headers)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base,
            config,
        })
    }

    /// Absolute URL of the subject's chart page.
    pub fn page_url(&self, subject: &str) -> Result<Url, SourceError> {
        if !is_valid_subject(subject) {
            return Err(SourceError::InvalidLocator(subject.to_string()));
        }
        let path = self.config.page_path.replace("{subject}", subject);
        self.base
            .join(&path)
            .map_err(|e| SourceError::InvalidLocator(format!("{path}: {e}")))
    }

    async fn fetch_page(&self, url: &Url) -> Result<String, SourceError> {
        let response = self
            .client
            .get(url.clone())
            .header("Accept", "text/html")
            .send()
            .await
            .map_err(|e| SourceError::request(url.as_str(), e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Status {
                locator: url.to_string(),
                status: status.as_u16(),
            });
        }

        response
            .text()
            .await
            .map_err(|e| SourceError::request(url.as_str(), e))
    }

    fn check_size(&self, locator: &str, size: usize) -> Result<(), SourceError> {
        if size > self.config.max_image_bytes {
            return Err(SourceError::TooLarge {
                locator: locator.to_string(),
                size,
                limit: self.config.max_image_bytes,
            });
        }
        Ok(())
    }
}

#[async_trait]
impl ImageSource for HttpImageSource {
    fn name(&self) -> &'static str {
        "http"
    }

    async fn list_images(&self, subject: &str) -> Result<Vec<ImageRef>, SourceError> {
        let page = self.page_url(subject)?;
        info!("Fetching chart page {page}");

        let html = retry_with_backoff(|| self.fetch_page(&page), &self.config.retry_delays).await?;

        let mut images = Vec::new();
        for src in image_sources(&html) {
            match page.join(&src) {
                Ok(url) if ensure_http(&url).is_ok() => {
                    images.push(ImageRef::new(images.len(), url.to_string()));
                }
                Ok(url) => debug!("Skipping non-http image {url}"),
                Err(e) => warn!("Skipping unresolvable image src {src:?}: {e}"),
            }
        }

        debug!("Found {} images on {page}", images.len());
        Ok(images)
    }

    async fn fetch_image(&self, image: &ImageRef) -> Result<Vec<u8>, SourceError> {
        let url = Url::parse(&image.locator)
            .map_err(|e| SourceError::InvalidLocator(format!("{}: {e}", image.locator)))?;
        ensure_http(&url)?;

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| SourceError::request(&image.locator, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Status {
                locator: image.locator.clone(),
                status: status.as_u16(),
            });
        }

        if let Some(length) = response.content_length() {
            self.check_size(
                &image.locator,
                usize::try_from(length).unwrap_or(usize::MAX),
            )?;
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| SourceError::request(&image.locator, e))?;
        self.check_size(&image.locator, bytes.len())?;

        Ok(bytes.to_vec())
    }
}

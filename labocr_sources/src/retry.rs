use std::fmt::Display;
use std::time::Duration;
use tokio::time::sleep;
use tracing::warn;

/// Retry an async operation, sleeping `delays[i]` seconds after the i-th
/// failure.
///
/// The operation runs `delays.len() + 1` times at most; the last error is
/// returned once every attempt has failed.
pub async fn retry_with_backoff<F, Fut, T, E>(mut operation: F, delays: &[u64]) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Result<T, E>>,
    E: Display,
{
    let attempts = delays.len() + 1;

    for (i, delay_secs) in delays.iter().enumerate() {
        match operation().await {
            Ok(result) => return Ok(result),
            Err(e) => {
                warn!(
                    "Request failed (attempt {}/{attempts}): {e}. Retrying after {delay_secs}s...",
                    i + 1
                );
                sleep(Duration::from_secs(*delay_secs)).await;
            }
        }
    }

    operation().await
}

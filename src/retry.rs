// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
//
// SPDX-License-Identifier: MIT

//! Retry utilities with exponential backoff for API calls.
//!
//! Provides helpers for retrying transient collection failures with
//! configurable delays and maximum attempts. Non-retryable errors such as
//! credential rejections are surfaced immediately.

use std::time::Duration;

use tokio::time::sleep;
use tracing::{debug, warn};

use crate::error::Error;

/// Configuration for retry behavior with exponential backoff.
///
/// The default allows a single retry: the pipeline runs on a schedule and
/// the next tick is the real recovery mechanism.
#[derive(Debug, Clone,)]
pub struct RetryConfig
{
    /// Maximum number of attempts including the first (default: 2).
    pub max_attempts:     u32,
    /// Initial delay between retries in milliseconds (default: 1000).
    pub initial_delay_ms: u64,
    /// Multiplier for exponential backoff (default: 2.0).
    pub backoff_factor:   f64,
}

impl Default for RetryConfig
{
    fn default() -> Self
    {
        Self {
            max_attempts: 2, initial_delay_ms: 1000, backoff_factor: 2.0,
        }
    }
}

/// Executes an async operation, retrying transient failures with backoff.
///
/// # Arguments
///
/// * `config` - Retry configuration (max attempts, delays)
/// * `operation_name` - Name of the operation for logging
/// * `f` - Async function to retry
///
/// # Errors
///
/// Returns the first non-retryable error immediately, or the last error
/// encountered once all attempts are exhausted. Retryability is decided by
/// [`Error::is_retryable`].
///
/// # Example
///
/// ```no_run
/// use risp::{Error, RetryConfig, retry_with_backoff};
///
/// # async fn example() -> Result<(), Error> {
/// let config = RetryConfig::default();
/// let result = retry_with_backoff(&config, "fetch statistics", || async {
///     Ok::<_, Error,>(42,)
/// },)
/// .await?;
/// # Ok(())
/// # }
/// ```
pub async fn retry_with_backoff<F, Fut, T,>(
    config: &RetryConfig,
    operation_name: &str,
    mut f: F,
) -> Result<T, Error,>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Result<T, Error,>,>,
{
    let mut attempt = 1;
    let mut delay_ms = config.initial_delay_ms;

    loop {
        match f().await {
            Ok(result,) => {
                if attempt > 1 {
                    debug!("{} succeeded on attempt {}", operation_name, attempt);
                }
                return Ok(result,);
            }
            Err(error,) => {
                if !error.is_retryable() {
                    debug!("{} failed with non-retryable error: {}", operation_name, error);
                    return Err(error,);
                }

                if attempt >= config.max_attempts {
                    warn!(
                        "{} failed after {} attempts: {}",
                        operation_name, config.max_attempts, error
                    );
                    return Err(error,);
                }

                warn!(
                    "{} failed on attempt {}/{}: {}. Retrying in {}ms...",
                    operation_name, attempt, config.max_attempts, error, delay_ms
                );

                sleep(Duration::from_millis(delay_ms,),).await;
                delay_ms = (delay_ms as f64 * config.backoff_factor) as u64;
                attempt += 1;
            }
        }
    }
}

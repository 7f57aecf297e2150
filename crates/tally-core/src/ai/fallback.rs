//! Bounded AI calls with rule-based fallback

use std::future::Future;
use std::time::Duration;

use tracing::{debug, warn};

use crate::error::{Error, Result};

/// Run an AI call with a deadline
///
/// Backend errors and timeouts both come back as `Error::AiUnavailable`.
pub async fn bounded<T, Fut>(operation: &str, timeout: Duration, call: Fut) -> Result<T>
where
    Fut: Future<Output = Result<T>>,
{
    match tokio::time::timeout(timeout, call).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(Error::AiUnavailable(msg))) => Err(Error::AiUnavailable(msg)),
        Ok(Err(e)) => Err(Error::AiUnavailable(format!("{} failed: {}", operation, e))),
        Err(_) => Err(Error::AiUnavailable(format!(
            "{} timed out after {}s",
            operation,
            timeout.as_secs_f64()
        ))),
    }
}

/// Run an AI call with a deadline, falling back to `fallback` on any failure
///
/// The failure is logged and never surfaced to the caller.
pub async fn with_fallback<T, Fut, F>(
    operation: &str,
    timeout: Duration,
    call: Fut,
    fallback: F,
) -> T
where
    Fut: Future<Output = Result<T>>,
    F: FnOnce() -> T,
{
    match bounded(operation, timeout, call).await {
        Ok(value) => {
            debug!(operation, "AI call succeeded");
            value
        }
        Err(e) => {
            warn!(operation, error = %e, "AI unavailable, using rule-based fallback");
            fallback()
        }
    }
}

//! Retry with exponential backoff for idempotent ledger reads.
//!
//! Only transport failures retry. Writes never go through here: a resent
//! commit would create a second incident.

use std::time::Duration;

/// Retries after the initial request.
const MAX_RETRIES: u32 = 3;

/// Base delay; doubles per attempt (200ms, 400ms, 800ms).
const BASE_DELAY_MS: u64 = 200;

pub(crate) async fn retry_send<F, Fut>(f: F) -> Result<reqwest::Response, reqwest::Error>
where
    F: Fn() -> Fut,
    Fut: std::future::Future<Output = Result<reqwest::Response, reqwest::Error>>,
{
    for attempt in 0..MAX_RETRIES {
        match f().await {
            Ok(resp) => return Ok(resp),
            Err(e) => {
                let delay = Duration::from_millis(BASE_DELAY_MS * 2u64.pow(attempt));
                tracing::warn!(
                    attempt = attempt + 1,
                    max_retries = MAX_RETRIES,
                    "ledger read failed, retrying in {delay:?}: {e}"
                );
                tokio::time::sleep(delay).await;
            }
        }
    }
    f().await
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    #[tokio::test]
    async fn exhausts_attempts_on_connection_refused() {
        let calls = Arc::new(AtomicU32::new(0));
        let c = calls.clone();

        let result = retry_send(|| {
            let c = c.clone();
            async move {
                c.fetch_add(1, Ordering::SeqCst);
                reqwest::Client::builder()
                    .timeout(Duration::from_millis(50))
                    .build()
                    .unwrap()
                    .get("http://127.0.0.1:1/")
                    .send()
                    .await
            }
        })
        .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), MAX_RETRIES + 1);
    }
}

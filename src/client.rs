use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::endpoint::ChatEndpoint;
use crate::prompt::{render, variant_for};
use crate::response::Verdict;

/// Pause after a failed attempt: 2^attempt backoff units, saturating
/// instead of overflowing for absurd attempt numbers.
pub fn backoff_delay(attempt: u32, unit: Duration) -> Duration {
    unit.saturating_mul(2u32.saturating_pow(attempt))
}

/// Asks one question at a time against a chat endpoint, retrying with
/// exponential backoff and a rotated prompt variant per attempt.
///
/// `ask` never fails: once the retry budget is spent the question gets
/// the failure verdict, so a batch always produces one verdict per
/// question.
pub struct AskClient {
    endpoint: Arc<dyn ChatEndpoint>,
    max_retries: u32,
    backoff_unit: Duration,
}

impl AskClient {
    pub fn new(endpoint: Arc<dyn ChatEndpoint>, max_retries: u32, backoff_unit: Duration) -> Self {
        Self {
            endpoint,
            max_retries,
            backoff_unit,
        }
    }

    pub async fn ask(&self, question: &str, cancel: &CancellationToken) -> Verdict {
        let max_retries = self.max_retries;

        for attempt in 0..max_retries {
            if cancel.is_cancelled() {
                tracing::debug!("cancelled before attempt, returning failure verdict");
                return Verdict::failure();
            }

            let attempt_no = attempt + 1;
            let prompt = render(variant_for(attempt), question);

            match self.endpoint.complete(&prompt).await {
                Ok(text) => match Verdict::from_completion(&text) {
                    Ok(verdict) => return verdict,
                    Err(e) => {
                        tracing::warn!("attempt {attempt_no}/{max_retries}: {e}");
                    }
                },
                Err(e) => {
                    let retryable = e.is_retryable();
                    tracing::warn!(
                        "attempt {attempt_no}/{max_retries} failed (retryable: {retryable}): {e}"
                    );
                }
            }

            // The pause runs after every failed attempt, the final one
            // included.
            let delay = backoff_delay(attempt, self.backoff_unit);
            tokio::select! {
                _ = tokio::time::sleep(delay) => {}
                _ = cancel.cancelled() => return Verdict::failure(),
            }
        }

        tracing::error!("no usable response after {max_retries} attempts");
        Verdict::failure()
    }
}

//! Retry, backoff, and failure classification for the HubSpot client.

use std::future::Future;
use std::time::Duration;

use chrono::{DateTime, Utc};
use reqwest::header::{HeaderMap, RETRY_AFTER};
use reqwest::{Response, StatusCode};
use tokio::time::sleep;

use crate::config::RetryConfig;
use crate::context::ExecutionContext;
use crate::errors::{ApiError, HubSpotError, HubSpotResult};

/// Jitter ceiling as a fraction of the exponential base.
///
/// Jitter is only ever added, biasing realized delays above the pure
/// exponential curve; that also lowers the collision probability of
/// concurrent retriers.
const JITTER_FACTOR: f64 = 0.25;

/// Outcome of a single HTTP attempt.
///
/// Consumed immediately by the retry loop; never persisted.
#[derive(Debug)]
pub enum AttemptOutcome {
    /// A 2xx response.
    Success(Response),
    /// No response was received.
    Transport(reqwest::Error),
    /// A non-2xx response.
    Http {
        /// Status observed on the transport.
        status: StatusCode,
        /// The response, body unconsumed.
        response: Response,
    },
}

impl AttemptOutcome {
    /// Classifies a raw transport result.
    pub fn from_result(result: Result<Response, reqwest::Error>) -> Self {
        match result {
            Ok(response) if response.status().is_success() => Self::Success(response),
            Ok(response) => Self::Http {
                status: response.status(),
                response,
            },
            Err(err) => Self::Transport(err),
        }
    }
}

/// Decides whether an attempt outcome warrants a retry.
///
/// Transport failures are assumed transient; 429 and 5xx are retried; every
/// other status is terminal. Takes the outcome by reference and leaves the
/// response body untouched.
pub fn should_retry(outcome: &AttemptOutcome) -> bool {
    match outcome {
        AttemptOutcome::Success(_) => false,
        AttemptOutcome::Transport(_) => true,
        AttemptOutcome::Http { status, .. } => {
            *status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
        }
    }
}

/// Computes the wait before retry number `attempt + 1`.
///
/// A positive server hint wins verbatim; otherwise the delay is
/// `initial_backoff * multiplier^attempt` plus jitter drawn from
/// `[0, 0.25 * base]`, clamped to `max_backoff`. `jitter_unit` is the caller's
/// uniform sample in `[0, 1]`, so the function is deterministic under test.
pub fn backoff_delay(
    attempt: u32,
    config: &RetryConfig,
    server_hint: Option<Duration>,
    jitter_unit: f64,
) -> Duration {
    if let Some(hint) = server_hint {
        if hint > Duration::ZERO {
            return hint;
        }
    }

    let base = config.initial_backoff.as_secs_f64() * config.multiplier.powi(attempt as i32);
    let jitter = jitter_unit.clamp(0.0, 1.0) * JITTER_FACTOR * base;
    let delay = (base + jitter).min(config.max_backoff.as_secs_f64());

    Duration::from_secs_f64(delay)
}

/// Extracts a `Retry-After` hint from a failed response's headers.
///
/// Supports both encodings the header allows: an integer seconds count and an
/// HTTP-date absolute timestamp. A missing, unparsable, or non-positive value
/// yields `None`, falling through to computed backoff.
pub fn retry_after(headers: &HeaderMap) -> Option<Duration> {
    let value = headers.get(RETRY_AFTER)?.to_str().ok()?.trim();

    if let Ok(seconds) = value.parse::<u64>() {
        return (seconds > 0).then_some(Duration::from_secs(seconds));
    }

    let at = DateTime::parse_from_rfc2822(value).ok()?;
    (at.with_timezone(&Utc) - Utc::now())
        .to_std()
        .ok()
        .filter(|d| *d > Duration::ZERO)
}

/// Drives the retry loop for one logical request.
///
/// Holds the immutable retry policy; shared read-only across concurrent calls.
pub struct RetryExecutor {
    config: RetryConfig,
}

impl RetryExecutor {
    /// Creates an executor over a validated policy.
    pub fn new(config: RetryConfig) -> Self {
        Self { config }
    }

    /// Runs `attempt` until it succeeds, fails terminally, exhausts the retry
    /// budget, or the context fires.
    ///
    /// The context is consulted before every attempt and raced against both
    /// the attempt itself and the backoff sleep, so cancellation latency is
    /// bounded by one in-flight attempt. A retryable response's body is
    /// dropped before sleeping; the final outcome's body is consumed by the
    /// error decoder.
    pub async fn execute<F, Fut>(
        &self,
        ctx: &ExecutionContext,
        mut attempt: F,
    ) -> HubSpotResult<Response>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = AttemptOutcome>,
    {
        let mut index: u32 = 0;

        loop {
            if let Some(reason) = ctx.cancel_reason() {
                return Err(HubSpotError::Cancelled { reason });
            }

            let outcome = tokio::select! {
                reason = ctx.cancelled() => return Err(HubSpotError::Cancelled { reason }),
                outcome = attempt() => outcome,
            };

            let retryable = should_retry(&outcome);
            let hint = match outcome {
                AttemptOutcome::Success(response) => return Ok(response),
                AttemptOutcome::Transport(err) => {
                    tracing::warn!(attempt = index + 1, error = %err, "transport failure");
                    if index >= self.config.max_attempts {
                        return Err(HubSpotError::RetryExhausted {
                            attempts: self.config.max_attempts,
                            source: Box::new(err.into()),
                        });
                    }
                    None
                }
                AttemptOutcome::Http { status, response } => {
                    if !retryable {
                        return Err(HubSpotError::Api(ApiError::from_response(response).await));
                    }
                    if index >= self.config.max_attempts {
                        let source = HubSpotError::Api(ApiError::from_response(response).await);
                        return Err(HubSpotError::RetryExhausted {
                            attempts: self.config.max_attempts,
                            source: Box::new(source),
                        });
                    }
                    let hint = retry_after(response.headers());
                    tracing::debug!(
                        attempt = index + 1,
                        status = status.as_u16(),
                        "retryable response"
                    );
                    // Release the body before waiting so the connection can
                    // be reused for the next attempt.
                    drop(response);
                    hint
                }
            };

            let delay = backoff_delay(index, &self.config, hint, rand::random::<f64>());
            tracing::debug!(
                attempt = index + 1,
                delay_ms = delay.as_millis() as u64,
                "backing off before retry"
            );

            tokio::select! {
                reason = ctx.cancelled() => return Err(HubSpotError::Cancelled { reason }),
                _ = sleep(delay) => {}
            }

            index += 1;
        }
    }
}

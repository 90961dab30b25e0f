//! Application service: fixed-count readiness polling.
//!
//! Imports only from `crate::domain` and `crate::application::ports`.

use std::future::Future;

use anyhow::Result;

use crate::application::ports::{ProgressReporter, ReadinessProbe};
use crate::domain::{DeployError, PollPolicy};

/// Poll `probe` until it reports ready or `policy.attempts()` are used up.
///
/// Returns the 1-based attempt number that succeeded.
///
/// # Errors
///
/// Returns [`DeployError::NotReady`] after the last failed attempt.
pub async fn wait_until_ready(
    probe: &impl ReadinessProbe,
    policy: PollPolicy,
    target: &str,
    reporter: &impl ProgressReporter,
) -> Result<u32> {
    poll_until(policy, target, reporter, move || probe.is_ready()).await
}

/// Same loop as [`wait_until_ready`] for checks that are not a probe type.
///
/// The interval is slept between attempts only, never after the last one.
///
/// # Errors
///
/// Returns [`DeployError::NotReady`] after the last failed attempt.
pub async fn poll_until<F, Fut>(
    policy: PollPolicy,
    target: &str,
    reporter: &impl ProgressReporter,
    mut check: F,
) -> Result<u32>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = bool>,
{
    reporter.step(&format!("waiting for {target}..."));
    for attempt in 1..=policy.attempts() {
        if check().await {
            tracing::debug!(target, attempt, "ready");
            reporter.success(&format!("{target} is ready"));
            return Ok(attempt);
        }
        tracing::debug!(target, attempt, max = policy.attempts(), "not ready yet");
        if attempt < policy.attempts() {
            tokio::time::sleep(policy.interval()).await;
        }
    }
    Err(DeployError::NotReady {
        target: target.to_string(),
        attempts: policy.attempts(),
    }
    .into())
}

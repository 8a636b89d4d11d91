//! Timeout-bound polling for external resource readiness.
//!
//! External systems are eventually consistent; every "apply succeeded so it
//! must be up" assumption in the pipeline is funneled through this loop.

use std::thread;
use std::time::{Duration, Instant};

use anyhow::Result;
use thiserror::Error;

/// Interval between readiness probes.
pub const POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Quiet period before another progress line is emitted.
pub const PROGRESS_INTERVAL: Duration = Duration::from_secs(10);

/// A polled resource never became ready before the deadline.
#[derive(Debug, Error)]
#[error(
    "timed out waiting for {name} in namespace {namespace} \
     (selector {selector}) after {timeout:?}"
)]
pub struct ReadyTimeout {
    pub name: String,
    pub namespace: String,
    pub selector: String,
    pub timeout: Duration,
}

/// Poll `probe` until it reports a ready count above zero.
///
/// Probe errors count as "not yet ready": transient API failures must not
/// abort the loop. A zero timeout fails after a single probe without
/// sleeping; a ready first probe returns without sleeping either.
pub fn wait_for_ready(
    probe: impl Fn() -> Result<u64>,
    name: &str,
    namespace: &str,
    selector: &str,
    timeout: Duration,
) -> Result<()> {
    let deadline = Instant::now() + timeout;
    let mut last_progress = Instant::now();
    loop {
        match probe() {
            Ok(ready) if ready > 0 => return Ok(()),
            Ok(_) => {}
            Err(err) => {
                tracing::debug!(name, namespace, %err, "readiness probe failed; retrying");
            }
        }
        if Instant::now() >= deadline {
            return Err(ReadyTimeout {
                name: name.to_string(),
                namespace: namespace.to_string(),
                selector: selector.to_string(),
                timeout,
            }
            .into());
        }
        if last_progress.elapsed() >= PROGRESS_INTERVAL {
            tracing::info!(name, namespace, "still waiting for readiness");
            last_progress = Instant::now();
        }
        thread::sleep(POLL_INTERVAL);
    }
}

#[cfg(test)]
#[path = "readiness_tests.rs"]
mod tests;

//! Challenge-resilient browser interaction engine.
//!
//! Everything above this module talks to the dashboard through the
//! [`DashProbe`] seam; the live implementation drives a Chromium instance
//! over CDP via `chromiumoxide`.

pub mod challenge;
pub mod frame;
pub mod input;
pub mod launcher;
pub mod probe;

use std::future::Future;
use std::time::Duration;

pub use probe::{DashProbe, LiveProbe, Rect};

/// First-class timing policy for a bounded polling loop. Every wait in the
/// engine is expressed as one of these, never a scattered sleep literal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    pub interval: Duration,
    pub max_attempts: u32,
}

impl PollPolicy {
    pub const fn new(interval: Duration, max_attempts: u32) -> Self {
        Self {
            interval,
            max_attempts,
        }
    }
}

/// Poll `check` until it reports true or the attempt budget is exhausted.
///
/// The check runs once per attempt and may carry side effects (e.g. issuing
/// a synthetic click when an interstitial is still up). Sleeps only between
/// attempts, so a check that passes immediately costs no wait at all.
pub async fn await_condition<F, Fut>(policy: PollPolicy, mut check: F) -> bool
where
    F: FnMut() -> Fut,
    Fut: Future<Output = bool>,
{
    for attempt in 0..policy.max_attempts {
        if check().await {
            return true;
        }
        if attempt + 1 < policy.max_attempts {
            tokio::time::sleep(policy.interval).await;
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[tokio::test(start_paused = true)]
    async fn await_condition_counts_attempts() {
        let calls = AtomicU32::new(0);
        let policy = PollPolicy::new(Duration::from_secs(1), 10);
        let ok = await_condition(policy, || {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            async move { n >= 3 }
        })
        .await;
        assert!(ok);
        assert_eq!(calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn await_condition_exhausts_budget() {
        let calls = AtomicU32::new(0);
        let policy = PollPolicy::new(Duration::from_secs(1), 5);
        let ok = await_condition(policy, || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { false }
        })
        .await;
        assert!(!ok);
        assert_eq!(calls.load(Ordering::SeqCst), 5);
    }

    #[tokio::test(start_paused = true)]
    async fn await_condition_immediate_pass_never_sleeps() {
        let policy = PollPolicy::new(Duration::from_secs(60), 1);
        let start = tokio::time::Instant::now();
        assert!(await_condition(policy, || async { true }).await);
        assert_eq!(start.elapsed(), Duration::ZERO);
    }
}

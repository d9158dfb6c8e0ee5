//! Unconditional post-document pacing.
//!
//! The harvest is a single sequential worker, so pacing is not a token
//! bucket: after every document, whatever its outcome, the pipeline awaits
//! [`RequestPacer::pause`] for the configured delay.
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//! use harvester_core::fetch::RequestPacer;
//!
//! # async fn example() {
//! let pacer = RequestPacer::new(Duration::from_millis(500));
//! pacer.pause().await;
//! assert_eq!(pacer.pauses(), 1);
//! # }
//! ```

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;

use tracing::{debug, info, instrument};

use super::constants::CUMULATIVE_PAUSE_NOTICE_THRESHOLD;

/// Fixed-delay pacer applied after every document.
#[derive(Debug)]
pub struct RequestPacer {
    delay: Duration,
    pauses: AtomicU64,
    cumulative_ms: AtomicU64,
    notice_logged: AtomicBool,
}

impl RequestPacer {
    /// Creates a pacer that sleeps `delay` on every pause.
    #[must_use]
    #[instrument(skip_all, fields(delay_ms = delay.as_millis()))]
    pub fn new(delay: Duration) -> Self {
        debug!("creating request pacer");
        Self {
            delay,
            pauses: AtomicU64::new(0),
            cumulative_ms: AtomicU64::new(0),
            notice_logged: AtomicBool::new(false),
        }
    }

    /// Creates a pacer that never sleeps.
    #[must_use]
    pub fn disabled() -> Self {
        Self::new(Duration::ZERO)
    }

    /// Returns whether pauses are no-ops.
    #[must_use]
    pub fn is_disabled(&self) -> bool {
        self.delay.is_zero()
    }

    /// Returns the configured delay.
    #[must_use]
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Number of pauses observed so far, including no-op ones.
    #[must_use]
    pub fn pauses(&self) -> u64 {
        self.pauses.load(Ordering::SeqCst)
    }

    /// Total time spent sleeping.
    #[must_use]
    pub fn total_paused(&self) -> Duration {
        Duration::from_millis(self.cumulative_ms.load(Ordering::SeqCst))
    }

    /// Sleeps for the configured delay.
    #[allow(clippy::cast_possible_truncation)]
    pub async fn pause(&self) {
        self.pauses.fetch_add(1, Ordering::SeqCst);
        if self.is_disabled() {
            return;
        }

        tokio::time::sleep(self.delay).await;

        let delay_ms = self.delay.as_millis() as u64;
        let previous_ms = self.cumulative_ms.fetch_add(delay_ms, Ordering::SeqCst);
        let cumulative = Duration::from_millis(previous_ms + delay_ms);
        if cumulative >= CUMULATIVE_PAUSE_NOTICE_THRESHOLD
            && !self.notice_logged.swap(true, Ordering::SeqCst)
        {
            info!(
                cumulative_secs = cumulative.as_secs(),
                delay_ms = self.delay.as_millis(),
                "request pacing has now added over a minute to this run"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::Instant;

    #[tokio::test]
    async fn test_disabled_pacer_never_sleeps() {
        tokio::time::pause();
        let pacer = RequestPacer::disabled();
        assert!(pacer.is_disabled());

        let start = Instant::now();
        pacer.pause().await;
        pacer.pause().await;
        assert!(start.elapsed() < Duration::from_millis(10));
        assert_eq!(pacer.pauses(), 2);
        assert_eq!(pacer.total_paused(), Duration::ZERO);
    }

    #[tokio::test]
    async fn test_pause_sleeps_full_delay_every_time() {
        tokio::time::pause();
        let pacer = RequestPacer::new(Duration::from_millis(500));

        let start = Instant::now();
        pacer.pause().await;
        assert!(start.elapsed() >= Duration::from_millis(500));
        pacer.pause().await;
        assert!(start.elapsed() >= Duration::from_secs(1));
        assert!(start.elapsed() < Duration::from_millis(1100));

        assert_eq!(pacer.pauses(), 2);
        assert_eq!(pacer.total_paused(), Duration::from_secs(1));
    }

    #[test]
    fn test_delay_accessor() {
        let pacer = RequestPacer::new(Duration::from_millis(250));
        assert_eq!(pacer.delay(), Duration::from_millis(250));
        assert!(!pacer.is_disabled());
    }
}

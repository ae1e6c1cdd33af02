//! Injectable delays.
//!
//! Every timer in the pipeline goes through a [`Clock`], so tests can run
//! against paused tokio time or skip waiting altogether.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

/// Source of delays for the pipeline.
#[async_trait]
pub trait Clock: Send + Sync {
    /// Suspend the caller for `duration`.
    async fn sleep(&self, duration: Duration);
}

pub type ClockPtr = Arc<dyn Clock>;

/// Clock backed by `tokio::time`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioClock;

#[async_trait]
impl Clock for TokioClock {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Clock whose sleeps only yield to the scheduler.
#[derive(Debug, Clone, Copy, Default)]
pub struct InstantClock;

#[async_trait]
impl Clock for InstantClock {
    async fn sleep(&self, _duration: Duration) {
        tokio::task::yield_now().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_tokio_clock_follows_paused_time() {
        let start = tokio::time::Instant::now();
        TokioClock.sleep(Duration::from_millis(1500)).await;
        assert!(start.elapsed() >= Duration::from_millis(1500));
    }

    #[tokio::test(start_paused = true)]
    async fn test_instant_clock_does_not_advance() {
        let start = tokio::time::Instant::now();
        InstantClock.sleep(Duration::from_secs(60)).await;
        assert_eq!(start.elapsed(), Duration::ZERO);
    }
}

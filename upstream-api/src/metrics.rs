use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use tracing::{Instrument, info_span};

/// Counts every request attempt (including retries) issued against the
/// upstream so the log stream shows how close we run to the block threshold.
#[derive(Debug)]
pub struct RequestMetrics {
    start: Instant,
    attempts: AtomicU64,
    retries: AtomicU64,
}

impl RequestMetrics {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            start: Instant::now(),
            attempts: AtomicU64::new(0),
            retries: AtomicU64::new(0),
        })
    }

    pub fn record_attempt(&self) {
        self.attempts.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_retry(&self) {
        self.retries.fetch_add(1, Ordering::Relaxed);
    }

    pub fn attempts(&self) -> u64 {
        self.attempts.load(Ordering::Relaxed)
    }

    pub fn retries(&self) -> u64 {
        self.retries.load(Ordering::Relaxed)
    }

    pub async fn log_loop(self: Arc<Self>) {
        let mut interval = tokio::time::interval(Duration::from_secs(60));
        loop {
            let span = info_span!("📊 upstream");
            async {
                interval.tick().await;
                let attempts = self.attempts();
                let retries = self.retries();
                let elapsed_min = self.start.elapsed().as_secs_f64() / 60.0;
                let avg = if elapsed_min > 0.0 {
                    attempts as f64 / elapsed_min
                } else {
                    0.0
                };
                tracing::info!(
                    "{} attempts ({} retries, avg {:.2} req/min)",
                    attempts,
                    retries,
                    avg
                );
            }
            .instrument(span)
            .await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_accumulate() {
        let metrics = RequestMetrics::new();
        metrics.record_attempt();
        metrics.record_attempt();
        metrics.record_retry();

        assert_eq!(metrics.attempts(), 2);
        assert_eq!(metrics.retries(), 1);
    }

    #[tokio::test]
    async fn log_loop_runs_once() {
        tokio::time::pause();

        let metrics = RequestMetrics::new();
        let cloned = metrics.clone();
        let handle = tokio::spawn(async move { cloned.log_loop().await });

        tokio::time::advance(Duration::from_secs(61)).await;
        handle.abort();
        let _ = handle.await;
    }
}

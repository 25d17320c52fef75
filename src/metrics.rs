//! Metrics collection for production monitoring
//!
//! Tracks request counts, failure counts, and cumulative inference latency,
//! exposed in Prometheus text format at `/metrics`. Counters are atomic and
//! shared across handler clones; recording never blocks the request path.

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Central metrics collector for the inference service
#[derive(Debug, Clone)]
pub struct MetricsCollector {
    /// Total number of prediction requests processed
    total_requests: Arc<AtomicUsize>,
    /// Successful predictions
    successful_requests: Arc<AtomicUsize>,
    /// Failed predictions (validation, alignment, or internal faults)
    failed_requests: Arc<AtomicUsize>,
    /// Cumulative pipeline time in microseconds
    total_inference_time_us: Arc<AtomicU64>,
    /// Start time for uptime and rate calculations
    start_time: Instant,
}

impl MetricsCollector {
    /// Create a new metrics collector
    #[must_use]
    pub fn new() -> Self {
        Self {
            total_requests: Arc::new(AtomicUsize::new(0)),
            successful_requests: Arc::new(AtomicUsize::new(0)),
            failed_requests: Arc::new(AtomicUsize::new(0)),
            total_inference_time_us: Arc::new(AtomicU64::new(0)),
            start_time: Instant::now(),
        }
    }

    /// Record a successful prediction
    #[allow(clippy::cast_possible_truncation)]
    pub fn record_success(&self, duration: Duration) {
        self.total_requests.fetch_add(1, Ordering::Relaxed);
        self.successful_requests.fetch_add(1, Ordering::Relaxed);
        self.total_inference_time_us
            .fetch_add(duration.as_micros() as u64, Ordering::Relaxed);
    }

    /// Record a failed prediction
    pub fn record_failure(&self) {
        self.total_requests.fetch_add(1, Ordering::Relaxed);
        self.failed_requests.fetch_add(1, Ordering::Relaxed);
    }

    /// Total requests seen
    #[must_use]
    pub fn total_requests(&self) -> usize {
        self.total_requests.load(Ordering::Relaxed)
    }

    /// Successful requests seen
    #[must_use]
    pub fn successful_requests(&self) -> usize {
        self.successful_requests.load(Ordering::Relaxed)
    }

    /// Failed requests seen
    #[must_use]
    pub fn failed_requests(&self) -> usize {
        self.failed_requests.load(Ordering::Relaxed)
    }

    /// Mean pipeline latency in microseconds, 0 when nothing succeeded yet
    #[must_use]
    pub fn mean_latency_us(&self) -> u64 {
        let successes = self.successful_requests.load(Ordering::Relaxed) as u64;
        if successes == 0 {
            return 0;
        }
        self.total_inference_time_us.load(Ordering::Relaxed) / successes
    }

    /// Render current counters in Prometheus text exposition format
    #[must_use]
    pub fn to_prometheus(&self) -> String {
        let uptime = self.start_time.elapsed().as_secs();
        format!(
            "# HELP prever_requests_total Total prediction requests\n\
             # TYPE prever_requests_total counter\n\
             prever_requests_total {}\n\
             # HELP prever_requests_success Successful predictions\n\
             # TYPE prever_requests_success counter\n\
             prever_requests_success {}\n\
             # HELP prever_requests_failed Failed predictions\n\
             # TYPE prever_requests_failed counter\n\
             prever_requests_failed {}\n\
             # HELP prever_inference_latency_us_mean Mean pipeline latency (us)\n\
             # TYPE prever_inference_latency_us_mean gauge\n\
             prever_inference_latency_us_mean {}\n\
             # HELP prever_uptime_seconds Process uptime\n\
             # TYPE prever_uptime_seconds gauge\n\
             prever_uptime_seconds {}\n",
            self.total_requests(),
            self.successful_requests(),
            self.failed_requests(),
            self.mean_latency_us(),
            uptime,
        )
    }
}

impl Default for MetricsCollector {
    fn default() -> Self {
        Self::new()
    }
}

use std::sync::Mutex;

/// Counters shared across parallel calibration jobs.
pub struct MetricsRecorder {
    inner: Mutex<Metrics>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub jobs: usize,
    pub pairs: usize,
    pub fallbacks: usize,
    pub errors: usize,
}

#[derive(Default)]
struct Metrics {
    jobs: usize,
    pairs: usize,
    fallbacks: usize,
    errors: usize,
}

impl MetricsRecorder {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Metrics::default()),
        }
    }

    /// Records one finished calibration job and the pairs it fitted.
    pub fn record_job(&self, pairs: usize, fallbacks: usize) {
        if let Ok(mut metrics) = self.inner.lock() {
            metrics.jobs += 1;
            metrics.pairs += pairs;
            metrics.fallbacks += fallbacks;
        }
    }

    pub fn record_error(&self) {
        if let Ok(mut metrics) = self.inner.lock() {
            metrics.errors += 1;
        }
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        if let Ok(metrics) = self.inner.lock() {
            MetricsSnapshot {
                jobs: metrics.jobs,
                pairs: metrics.pairs,
                fallbacks: metrics.fallbacks,
                errors: metrics.errors,
            }
        } else {
            MetricsSnapshot::default()
        }
    }
}

impl Default for MetricsRecorder {
    fn default() -> Self {
        Self::new()
    }
}

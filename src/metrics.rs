//! Per-session prediction statistics.

use crate::types::prediction::ModelKind;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tracing::info;

/// Metrics collector for one interactive session
pub struct SessionMetrics {
    /// Latencies of successful predictions (in microseconds), per model
    latencies: HashMap<ModelKind, Vec<u64>>,
    /// Last predicted yield per model
    last_yield: HashMap<ModelKind, f64>,
    /// Failed predictions per model
    failures: HashMap<ModelKind, u64>,
    /// Session start, for the uptime line
    start_time: Instant,
}

impl SessionMetrics {
    pub fn new() -> Self {
        Self {
            latencies: HashMap::new(),
            last_yield: HashMap::new(),
            failures: HashMap::new(),
            start_time: Instant::now(),
        }
    }

    /// Record a successful prediction
    pub fn record_prediction(&mut self, kind: ModelKind, latency: Duration, value: f64) {
        self.latencies
            .entry(kind)
            .or_default()
            .push(latency.as_micros() as u64);
        self.last_yield.insert(kind, value);
    }

    /// Record a failed prediction
    pub fn record_failure(&mut self, kind: ModelKind) {
        *self.failures.entry(kind).or_insert(0) += 1;
    }

    pub fn predictions(&self, kind: ModelKind) -> u64 {
        self.latencies.get(&kind).map_or(0, |l| l.len() as u64)
    }

    pub fn failures(&self, kind: ModelKind) -> u64 {
        self.failures.get(&kind).copied().unwrap_or(0)
    }

    pub fn last_yield(&self, kind: ModelKind) -> Option<f64> {
        self.last_yield.get(&kind).copied()
    }

    /// Latency statistics for one model
    pub fn latency_stats(&self, kind: ModelKind) -> LatencyStats {
        let Some(times) = self.latencies.get(&kind).filter(|t| !t.is_empty()) else {
            return LatencyStats::default();
        };

        let mut sorted = times.clone();
        sorted.sort_unstable();
        let count = sorted.len();
        let sum: u64 = sorted.iter().sum();

        LatencyStats {
            count: count as u64,
            mean_us: sum / count as u64,
            p50_us: sorted[count / 2],
            max_us: sorted[count - 1],
        }
    }

    /// Print summary statistics
    pub fn print_summary(&self) {
        let total: u64 = ModelKind::ALL.iter().map(|&k| self.predictions(k)).sum();
        let failed: u64 = ModelKind::ALL.iter().map(|&k| self.failures(k)).sum();

        info!(
            predictions = total,
            failures = failed,
            session_secs = self.start_time.elapsed().as_secs(),
            "Session summary"
        );
        for kind in ModelKind::ALL {
            let stats = self.latency_stats(kind);
            if stats.count == 0 && self.failures(kind) == 0 {
                continue;
            }
            info!(
                model = %kind,
                calls = stats.count,
                failures = self.failures(kind),
                mean_us = stats.mean_us,
                p50_us = stats.p50_us,
                max_us = stats.max_us,
                last_yield = ?self.last_yield(kind),
                "Model usage"
            );
        }
    }
}

impl Default for SessionMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Latency statistics for one model
#[derive(Debug, Default, PartialEq)]
pub struct LatencyStats {
    pub count: u64,
    pub mean_us: u64,
    pub p50_us: u64,
    pub max_us: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_recording() {
        let mut metrics = SessionMetrics::new();

        metrics.record_prediction(ModelKind::Ensemble, Duration::from_micros(100), 1.5);
        metrics.record_prediction(ModelKind::Ensemble, Duration::from_micros(300), 1.7);
        metrics.record_prediction(ModelKind::Ensemble, Duration::from_micros(200), 1.6);
        metrics.record_failure(ModelKind::Neural);

        assert_eq!(metrics.predictions(ModelKind::Ensemble), 3);
        assert_eq!(metrics.predictions(ModelKind::Neural), 0);
        assert_eq!(metrics.failures(ModelKind::Neural), 1);
        assert_eq!(metrics.last_yield(ModelKind::Ensemble), Some(1.6));
        assert_eq!(metrics.last_yield(ModelKind::Neural), None);

        assert_eq!(
            metrics.latency_stats(ModelKind::Ensemble),
            LatencyStats {
                count: 3,
                mean_us: 200,
                p50_us: 200,
                max_us: 300,
            }
        );
    }

    #[test]
    fn test_empty_stats() {
        let metrics = SessionMetrics::new();
        assert_eq!(metrics.latency_stats(ModelKind::Neural), LatencyStats::default());
    }
}

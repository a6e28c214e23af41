//! Request counters and latency statistics for the prediction service.

use crate::error::ErrorKind;
use crate::types::prediction::PredictionResult;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};
use tracing::info;

/// Metrics collector for served predictions
pub struct PredictionMetrics {
    /// Successful predictions
    pub predictions_served: AtomicU64,
    /// Predictions labelled churn
    pub churn_predictions: AtomicU64,
    /// Failed requests by error kind
    failures_by_kind: RwLock<HashMap<&'static str, u64>>,
    /// How often each explanation rule fired
    rule_hits: RwLock<HashMap<&'static str, u64>>,
    /// Request latencies (in microseconds)
    latencies: RwLock<Vec<u64>>,
    /// Churn probability distribution buckets
    probability_buckets: RwLock<[u64; 10]>,
    /// Start time for rate calculation
    start_time: Instant,
}

impl PredictionMetrics {
    /// Create a new metrics collector
    pub fn new() -> Self {
        Self {
            predictions_served: AtomicU64::new(0),
            churn_predictions: AtomicU64::new(0),
            failures_by_kind: RwLock::new(HashMap::new()),
            rule_hits: RwLock::new(HashMap::new()),
            latencies: RwLock::new(Vec::with_capacity(1000)),
            probability_buckets: RwLock::new([0; 10]),
            start_time: Instant::now(),
        }
    }

    /// Record a served prediction
    pub fn record_prediction(&self, latency: Duration, result: &PredictionResult) {
        self.predictions_served.fetch_add(1, Ordering::Relaxed);
        if result.label.is_churn() {
            self.churn_predictions.fetch_add(1, Ordering::Relaxed);
        }

        self.record_latency(latency);

        // probability is a percentage
        let bucket = ((result.probability / 10.0).max(0.0) as usize).min(9);
        if let Ok(mut buckets) = self.probability_buckets.write() {
            buckets[bucket] += 1;
        }

        if let Ok(mut hits) = self.rule_hits.write() {
            for rule in result.fired_rules() {
                *hits.entry(rule).or_insert(0) += 1;
            }
        }
    }

    /// Record a failed request
    pub fn record_failure(&self, latency: Duration, kind: ErrorKind) {
        self.record_latency(latency);
        if let Ok(mut failures) = self.failures_by_kind.write() {
            *failures.entry(kind.as_str()).or_insert(0) += 1;
        }
    }

    fn record_latency(&self, latency: Duration) {
        if let Ok(mut times) = self.latencies.write() {
            times.push(latency.as_micros() as u64);
            // Keep only last 10000 for memory efficiency
            if times.len() > 10000 {
                times.drain(0..5000);
            }
        }
    }

    /// Get latency statistics
    pub fn get_latency_stats(&self) -> LatencyStats {
        let mut sorted: Vec<u64> = match self.latencies.read() {
            Ok(times) => times.clone(),
            Err(_) => return LatencyStats::default(),
        };
        if sorted.is_empty() {
            return LatencyStats::default();
        }
        sorted.sort_unstable();

        let sum: u64 = sorted.iter().sum();
        let count = sorted.len();
        let at = |q: f64| sorted[((count as f64 * q) as usize).min(count - 1)];

        LatencyStats {
            count: count as u64,
            mean_us: sum / count as u64,
            p50_us: sorted[count / 2],
            p95_us: at(0.95),
            p99_us: at(0.99),
            max_us: sorted[count - 1],
        }
    }

    /// Get current throughput (successful predictions per second)
    pub fn get_throughput(&self) -> f64 {
        let elapsed = self.start_time.elapsed().as_secs_f64();
        if elapsed > 0.0 {
            self.predictions_served.load(Ordering::Relaxed) as f64 / elapsed
        } else {
            0.0
        }
    }

    /// Point-in-time copy of every counter
    pub fn snapshot(&self) -> MetricsSnapshot {
        let predictions = self.predictions_served.load(Ordering::Relaxed);
        let churn = self.churn_predictions.load(Ordering::Relaxed);

        MetricsSnapshot {
            predictions_served: predictions,
            churn_predictions: churn,
            churn_rate: if predictions > 0 {
                churn as f64 / predictions as f64
            } else {
                0.0
            },
            failures_by_kind: read_map(&self.failures_by_kind),
            rule_hits: read_map(&self.rule_hits),
            probability_distribution: self
                .probability_buckets
                .read()
                .map(|b| *b)
                .unwrap_or_default(),
            latency: self.get_latency_stats(),
            throughput: self.get_throughput(),
            uptime_secs: self.start_time.elapsed().as_secs(),
        }
    }

    /// Print summary statistics
    pub fn print_summary(&self) {
        let snapshot = self.snapshot();
        let failures: u64 = snapshot.failures_by_kind.values().sum();

        info!("╔══════════════════════════════════════════════════════════════╗");
        info!("║            CHURN PREDICTION SERVICE - METRICS SUMMARY        ║");
        info!("╠══════════════════════════════════════════════════════════════╣");
        info!(
            "║ Predictions Served:     {:>8}  │  Throughput: {:>6.2} req/s ║",
            snapshot.predictions_served, snapshot.throughput
        );
        info!(
            "║ Churn Predicted:        {:>8}  │  Churn Rate: {:>6.1}%      ║",
            snapshot.churn_predictions,
            snapshot.churn_rate * 100.0
        );
        info!("║ Failed Requests:        {:>8}                             ║", failures);
        for (kind, count) in &snapshot.failures_by_kind {
            info!("║   {:10}: {:>6}                                        ║", kind, count);
        }
        info!("╠══════════════════════════════════════════════════════════════╣");
        info!(
            "║ Latency (μs): mean={:>5} p50={:>5} p95={:>5} p99={:>5}        ║",
            snapshot.latency.mean_us,
            snapshot.latency.p50_us,
            snapshot.latency.p95_us,
            snapshot.latency.p99_us
        );
        info!("╠══════════════════════════════════════════════════════════════╣");
        info!("║ Explanation Rules Fired:                                     ║");
        for (rule, count) in &snapshot.rule_hits {
            info!("║   {:20}: {:>6}                              ║", rule, count);
        }
        info!("╠══════════════════════════════════════════════════════════════╣");
        info!("║ Churn Probability Distribution:                              ║");
        let total: u64 = snapshot.probability_distribution.iter().sum();
        for (i, &count) in snapshot.probability_distribution.iter().enumerate() {
            let pct = if total > 0 { (count as f64 / total as f64) * 100.0 } else { 0.0 };
            let bar: String = "█".repeat(((pct / 2.0) as usize).min(20));
            info!(
                "║   {:>3}-{:<3}%: {:>6} ({:>5.1}%) {}",
                i * 10,
                (i + 1) * 10,
                count,
                pct,
                bar
            );
        }
        info!("╚══════════════════════════════════════════════════════════════╝");
    }
}

impl Default for PredictionMetrics {
    fn default() -> Self {
        Self::new()
    }
}

fn read_map(map: &RwLock<HashMap<&'static str, u64>>) -> HashMap<String, u64> {
    map.read()
        .map(|m| m.iter().map(|(k, v)| (k.to_string(), *v)).collect())
        .unwrap_or_default()
}

/// Latency statistics
#[derive(Debug, Default, Clone, Serialize)]
pub struct LatencyStats {
    pub count: u64,
    pub mean_us: u64,
    pub p50_us: u64,
    pub p95_us: u64,
    pub p99_us: u64,
    pub max_us: u64,
}

/// Serializable view served on `/stats`
#[derive(Debug, Clone, Serialize)]
pub struct MetricsSnapshot {
    pub predictions_served: u64,
    pub churn_predictions: u64,
    pub churn_rate: f64,
    pub failures_by_kind: HashMap<String, u64>,
    pub rule_hits: HashMap<String, u64>,
    pub probability_distribution: [u64; 10],
    pub latency: LatencyStats,
    pub throughput: f64,
    pub uptime_secs: u64,
}

/// Real-time metrics reporter that prints periodic summaries
pub struct MetricsReporter {
    metrics: Arc<PredictionMetrics>,
    interval_secs: u64,
}

impl MetricsReporter {
    pub fn new(metrics: Arc<PredictionMetrics>, interval_secs: u64) -> Self {
        Self {
            metrics,
            interval_secs,
        }
    }

    /// Start the periodic reporting task
    pub async fn start(self) {
        let mut interval = tokio::time::interval(Duration::from_secs(self.interval_secs));
        // first tick completes immediately
        interval.tick().await;
        loop {
            interval.tick().await;
            self.metrics.print_summary();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::prediction::{ChurnLabel, Finding};

    fn result(label: ChurnLabel, probability: f64, rules: &[&'static str]) -> PredictionResult {
        PredictionResult {
            label,
            probability,
            findings: rules
                .iter()
                .map(|&rule| Finding {
                    rule,
                    reason: String::new(),
                    recommendation: String::new(),
                })
                .collect(),
        }
    }

    #[test]
    fn test_metrics_recording() {
        let metrics = PredictionMetrics::new();

        metrics.record_prediction(
            Duration::from_micros(100),
            &result(ChurnLabel::Churn, 85.0, &["international_plan", "service_calls"]),
        );
        metrics.record_prediction(
            Duration::from_micros(200),
            &result(ChurnLabel::NoChurn, 100.0, &["default"]),
        );
        metrics.record_failure(Duration::from_micros(50), ErrorKind::Input);

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.predictions_served, 2);
        assert_eq!(snapshot.churn_predictions, 1);
        assert_eq!(snapshot.churn_rate, 0.5);
        assert_eq!(snapshot.failures_by_kind.get("input"), Some(&1));
        assert_eq!(snapshot.rule_hits.get("service_calls"), Some(&1));
        assert_eq!(snapshot.probability_distribution[8], 1);
        // 100% lands in the top bucket
        assert_eq!(snapshot.probability_distribution[9], 1);
        assert_eq!(snapshot.latency.count, 3);
        assert_eq!(snapshot.latency.max_us, 200);
    }

    #[test]
    fn test_empty_latency_stats() {
        let metrics = PredictionMetrics::new();
        let stats = metrics.get_latency_stats();
        assert_eq!(stats.count, 0);
        assert_eq!(metrics.snapshot().churn_rate, 0.0);
    }
}

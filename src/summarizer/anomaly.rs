//! Statistical anomaly detection over a log batch
//!
//! Three independent checks run in a fixed order: hourly-volume
//! deviations, the global error rate, and per-source error
//! concentration. Their results are concatenated and capped, so under
//! truncation the earlier checks take priority.

use crate::events::{Anomaly, AnomalyKind, LogEntry, Timestamp};
use chrono::{Duration, DurationRound};
use std::collections::BTreeMap;

/// Upper bound on anomalies reported per batch
const MAX_ANOMALIES: usize = 5;

/// Global error fraction above which a high-error-rate anomaly fires
const ERROR_RATE_THRESHOLD: f64 = 0.10;

/// Per-source error fraction above which a source anomaly fires
const SOURCE_ERROR_FRACTION: f64 = 0.20;

/// A source must exceed this share of the busiest source's volume to be
/// considered for the concentration check
const SOURCE_VOLUME_SHARE: f64 = 0.5;

/// A source must exceed this absolute count to be considered
const SOURCE_MIN_COUNT: usize = 10;

/// Detects volume, error-rate, and source anomalies in log batches
pub struct AnomalyDetector {
    threshold_std_devs: f64,
}

impl AnomalyDetector {
    /// # Arguments
    ///
    /// * `threshold_std_devs` - How many standard deviations an hourly
    ///   bucket must stray from the mean before it is flagged
    pub fn new(threshold_std_devs: f64) -> Self {
        Self { threshold_std_devs }
    }

    /// Run all checks over the logs within `[start, end]`
    ///
    /// Returns at most five anomalies: temporal first, then the global
    /// error rate, then per-source concentration.
    pub fn detect(&self, logs: &[LogEntry], start: Timestamp, end: Timestamp) -> Vec<Anomaly> {
        let window: Vec<&LogEntry> = logs
            .iter()
            .filter(|log| log.timestamp >= start && log.timestamp <= end)
            .collect();

        let mut anomalies = Vec::new();
        self.detect_temporal(&window, &mut anomalies);
        self.detect_error_rate(&window, &mut anomalies);
        self.detect_source_concentration(&window, &mut anomalies);
        anomalies.truncate(MAX_ANOMALIES);
        anomalies
    }

    /// Hourly volume check
    ///
    /// Buckets are hour-aligned and iterated chronologically. With fewer
    /// than three buckets the sample standard deviation is undefined and
    /// the check is silently skipped; that is a defined no-op, not an
    /// error.
    fn detect_temporal(&self, logs: &[&LogEntry], anomalies: &mut Vec<Anomaly>) {
        let mut buckets: BTreeMap<Timestamp, usize> = BTreeMap::new();
        for log in logs {
            let hour = log
                .timestamp
                .duration_trunc(Duration::hours(1))
                .unwrap_or(log.timestamp);
            *buckets.entry(hour).or_insert(0) += 1;
        }

        if buckets.len() < 2 {
            return;
        }

        let counts: Vec<f64> = buckets.values().map(|&c| c as f64).collect();
        let mean = counts.iter().sum::<f64>() / counts.len() as f64;

        if counts.len() < 3 {
            return;
        }

        let variance = counts
            .iter()
            .map(|count| (count - mean).powi(2))
            .sum::<f64>()
            / (counts.len() - 1) as f64;
        let std_dev = variance.sqrt();

        if std_dev <= 0.0 {
            return;
        }

        for (&hour, &count) in &buckets {
            let deviation = (count as f64 - mean).abs();
            if deviation > self.threshold_std_devs * std_dev {
                let spike = count as f64 > mean;
                anomalies.push(Anomaly {
                    kind: if spike {
                        AnomalyKind::ActivitySpike
                    } else {
                        AnomalyKind::ActivityDrop
                    },
                    timestamp: Some(hour),
                    value: Some(count as f64),
                    expected: Some(round2(mean)),
                    source: None,
                    error_count: None,
                    total_count: None,
                    description: format!(
                        "Unusual {} in log activity",
                        if spike { "spike" } else { "drop" }
                    ),
                });
            }
        }
    }

    /// Global error-rate check: more than 10% ERROR/CRITICAL entries
    fn detect_error_rate(&self, logs: &[&LogEntry], anomalies: &mut Vec<Anomaly>) {
        if logs.is_empty() {
            return;
        }

        let error_count = logs.iter().filter(|log| log.level.is_error()).count();
        if error_count == 0 {
            return;
        }

        let error_rate = error_count as f64 / logs.len() as f64;
        if error_rate > ERROR_RATE_THRESHOLD {
            let percentage = round2(error_rate * 100.0);
            anomalies.push(Anomaly {
                kind: AnomalyKind::HighErrorRate,
                timestamp: None,
                value: Some(percentage),
                expected: None,
                source: None,
                error_count: None,
                total_count: None,
                description: format!("High error rate detected: {}%", percentage),
            });
        }
    }

    /// Per-source concentration check
    ///
    /// Only sources carrying a meaningful share of the traffic are
    /// considered: more than half the busiest source's volume and more
    /// than ten entries outright. Sources are visited in name order so
    /// the output is deterministic.
    fn detect_source_concentration(&self, logs: &[&LogEntry], anomalies: &mut Vec<Anomaly>) {
        let mut per_source: BTreeMap<&str, (usize, usize)> = BTreeMap::new();
        for log in logs {
            let entry = per_source.entry(log.source.as_str()).or_insert((0, 0));
            entry.0 += 1;
            if log.level.is_error() {
                entry.1 += 1;
            }
        }

        let Some(max_count) = per_source.values().map(|&(total, _)| total).max() else {
            return;
        };

        for (source, &(total, errors)) in &per_source {
            if total as f64 > max_count as f64 * SOURCE_VOLUME_SHARE
                && total > SOURCE_MIN_COUNT
                && errors as f64 / total as f64 > SOURCE_ERROR_FRACTION
            {
                anomalies.push(Anomaly {
                    kind: AnomalyKind::SourceErrors,
                    timestamp: None,
                    value: None,
                    expected: None,
                    source: Some(source.to_string()),
                    error_count: Some(errors),
                    total_count: Some(total),
                    description: format!("High error rate from source: {}", source),
                });
            }
        }
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

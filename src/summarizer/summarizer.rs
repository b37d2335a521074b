//! Summary orchestration
//!
//! Fetches the log window, runs key-event extraction and anomaly
//! detection, composes the human-readable summary text, and persists the
//! resulting record.

use crate::config::SummarizerConfig;
use crate::error::SummaryError;
use crate::events::{Anomaly, KeyEvent, LogLevel, LogSummary, SeverityTables, Timestamp};
use crate::store::{LogStore, SummaryStore};
use crate::summarizer::{AnomalyDetector, EventExtractor};
use chrono::Utc;
use log::info;
use std::collections::BTreeMap;
use std::sync::Arc;
use uuid::Uuid;

/// Number of sources listed in the summary text
const TOP_SOURCES: usize = 3;

/// Number of anomaly descriptions inlined into the summary text
const INLINE_ANOMALIES: usize = 3;

/// Orchestrates summary generation over a time window
pub struct LogSummarizer {
    logs: Arc<dyn LogStore>,
    summaries: Arc<dyn SummaryStore>,
    extractor: EventExtractor,
    detector: AnomalyDetector,
}

impl LogSummarizer {
    pub fn new(
        logs: Arc<dyn LogStore>,
        summaries: Arc<dyn SummaryStore>,
        tables: SeverityTables,
        config: &SummarizerConfig,
    ) -> Self {
        Self {
            logs,
            summaries,
            extractor: EventExtractor::new(config.max_events, tables),
            detector: AnomalyDetector::new(config.anomaly_threshold),
        }
    }

    /// Generate, persist, and return a summary for `[start, end]`
    ///
    /// # Errors
    ///
    /// `SummaryError::NoLogs` when the window is empty; distinct from a
    /// zero-activity summary. Store failures abort the call with nothing
    /// persisted.
    pub fn generate_summary(
        &self,
        start: Timestamp,
        end: Timestamp,
    ) -> Result<LogSummary, SummaryError> {
        let entries = self.logs.logs_between(start, end)?;
        if entries.is_empty() {
            return Err(SummaryError::NoLogs { start, end });
        }

        let total_logs = entries.len();
        let mut level_counts = [0usize; 4];
        let mut source_counts: BTreeMap<&str, usize> = BTreeMap::new();
        for entry in &entries {
            level_counts[entry.level as usize] += 1;
            *source_counts.entry(entry.source.as_str()).or_insert(0) += 1;
        }

        let key_events = self.extractor.extract(&entries);
        let anomalies = self.detector.detect(&entries, start, end);

        let summary_text =
            compose_summary_text(total_logs, &level_counts, &source_counts, &key_events, &anomalies);

        let summary = LogSummary {
            id: Uuid::new_v4(),
            start_time: start,
            end_time: end,
            total_logs,
            error_count: level_counts[LogLevel::Error as usize]
                + level_counts[LogLevel::Critical as usize],
            warning_count: level_counts[LogLevel::Warning as usize],
            summary_text,
            key_events,
            anomalies,
            created_at: Utc::now(),
        };

        self.summaries.insert_summary(&summary)?;
        info!(
            "Generated summary for {} logs between {} and {} ({} anomalies)",
            summary.total_logs,
            start,
            end,
            summary.anomalies.len()
        );

        Ok(summary)
    }

    /// The most recently generated summaries, newest first
    pub fn recent_summaries(&self, limit: usize) -> Result<Vec<LogSummary>, SummaryError> {
        Ok(self.summaries.recent_summaries(limit)?)
    }
}

/// Compose the summary text line by line, in a fixed order: totals, level
/// breakdown, top sources, anomalies, closing attention line.
fn compose_summary_text(
    total_logs: usize,
    level_counts: &[usize; 4],
    source_counts: &BTreeMap<&str, usize>,
    key_events: &[KeyEvent],
    anomalies: &[Anomaly],
) -> String {
    let mut lines = Vec::new();

    lines.push(format!("Total logs processed: {}", total_logs));

    let level_parts: Vec<String> = LogLevel::DESCENDING
        .iter()
        .filter_map(|&level| {
            let count = level_counts[level as usize];
            (count > 0).then(|| format!("{} {}", count, level))
        })
        .collect();
    lines.push(format!("Breakdown: {}", level_parts.join(", ")));

    let mut ranked_sources: Vec<(&str, usize)> = source_counts
        .iter()
        .map(|(&source, &count)| (source, count))
        .collect();
    // Count descending; the BTreeMap already yields name order for ties
    ranked_sources.sort_by(|a, b| b.1.cmp(&a.1));
    if !ranked_sources.is_empty() {
        let source_parts: Vec<String> = ranked_sources
            .iter()
            .take(TOP_SOURCES)
            .map(|(source, count)| format!("{} ({})", source, count))
            .collect();
        lines.push(format!("Top sources: {}", source_parts.join(", ")));
    }

    if !anomalies.is_empty() {
        lines.push(format!("{} anomalies detected", anomalies.len()));
        for anomaly in anomalies.iter().take(INLINE_ANOMALIES) {
            lines.push(format!("  - {}", anomaly.description));
        }
    }

    let critical_events = key_events
        .iter()
        .filter(|event| event.level == LogLevel::Critical)
        .count();
    let error_events = key_events
        .iter()
        .filter(|event| event.level == LogLevel::Error)
        .count();
    if critical_events > 0 {
        lines.push(format!(
            "{} critical events require immediate attention",
            critical_events
        ));
    } else if error_events > 0 {
        lines.push(format!("{} errors detected", error_events));
    }

    lines.join("\n")
}

//! Core event and alert types for the network log triage engine
//!
//! This module defines the fundamental data structures used throughout the
//! application for representing log entries, alerts, classification rules,
//! and generated summaries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use uuid::Uuid;

/// Timestamp type for consistent time handling across the application
pub type Timestamp = DateTime<Utc>;

/// Loosely-typed metadata map carried on logs and alerts
pub type Metadata = HashMap<String, serde_json::Value>;

/// Severity level of a log entry
///
/// Ordered from least to most severe so that comparisons follow urgency.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogLevel {
    /// Informational message
    Info,
    /// Warning that may require attention
    Warning,
    /// Error-level message indicating a problem
    Error,
    /// Critical message indicating a serious issue
    Critical,
}

impl LogLevel {
    /// All levels ordered from most to least severe, the order used in
    /// summary breakdowns.
    pub const DESCENDING: [LogLevel; 4] = [
        LogLevel::Critical,
        LogLevel::Error,
        LogLevel::Warning,
        LogLevel::Info,
    ];

    /// Whether this level counts as an error for rate calculations
    pub fn is_error(self) -> bool {
        matches!(self, LogLevel::Error | LogLevel::Critical)
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LogLevel::Info => "INFO",
            LogLevel::Warning => "WARNING",
            LogLevel::Error => "ERROR",
            LogLevel::Critical => "CRITICAL",
        };
        f.pad(name)
    }
}

/// Severity tier assigned to a classified alert
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
            Severity::Critical => "critical",
        };
        f.pad(name)
    }
}

/// Lifecycle status of an alert
///
/// Ordered so that the forward-only lifecycle (open, acknowledged,
/// resolved) can be validated with a plain comparison.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum AlertStatus {
    Open,
    Acknowledged,
    Resolved,
}

impl fmt::Display for AlertStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AlertStatus::Open => "open",
            AlertStatus::Acknowledged => "acknowledged",
            AlertStatus::Resolved => "resolved",
        };
        f.pad(name)
    }
}

/// Fixed numeric tables mapping severity tiers and log levels to scores
///
/// Carried as an explicit value passed into the classifier and summarizer
/// constructors rather than module-level state, so tests can substitute
/// alternate tables.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeverityTables {
    /// Base priority score per severity tier, indexed low..critical
    base_scores: [f64; 4],
    /// Ranking weight per log level, indexed INFO..CRITICAL
    level_weights: [u8; 4],
}

impl SeverityTables {
    pub fn new(base_scores: [f64; 4], level_weights: [u8; 4]) -> Self {
        Self {
            base_scores,
            level_weights,
        }
    }

    /// Base priority score for a severity tier
    pub fn base_score(&self, severity: Severity) -> f64 {
        self.base_scores[severity as usize]
    }

    /// Ranking weight for a log level
    pub fn level_weight(&self, level: LogLevel) -> u8 {
        self.level_weights[level as usize]
    }
}

impl Default for SeverityTables {
    fn default() -> Self {
        Self {
            base_scores: [0.25, 0.5, 0.75, 1.0],
            level_weights: [1, 2, 3, 4],
        }
    }
}

fn default_timestamp() -> Timestamp {
    Utc::now()
}

fn default_source() -> String {
    "unknown".to_string()
}

fn default_level() -> LogLevel {
    LogLevel::Info
}

/// A single log entry from a network or infrastructure source
///
/// Read-only input to the summarization engine. Fields absent from an
/// ingested payload fall back to ingestion time, the `unknown` source,
/// and the INFO level.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LogEntry {
    #[serde(default = "default_timestamp")]
    pub timestamp: Timestamp,
    #[serde(default = "default_source")]
    pub source: String,
    #[serde(default = "default_level")]
    pub level: LogLevel,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub metadata: Metadata,
}

/// Raw alert payload as submitted for classification
///
/// Only `title` is required; everything else defaults at ingestion.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RawAlert {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub timestamp: Option<Timestamp>,
    #[serde(default)]
    pub metadata: Metadata,
}

/// A fully classified, scored alert
///
/// Created once by the classifier and mutated only through status
/// transitions. Never deleted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Alert {
    pub id: Uuid,
    pub timestamp: Timestamp,
    pub title: String,
    pub description: String,
    pub severity: Severity,
    /// Category string; rule-defined categories may be arbitrary, the
    /// fallback classifier only produces the built-in set
    pub category: String,
    pub status: AlertStatus,
    /// Final urgency value, always within [0.0, 1.0]
    pub priority_score: f64,
    pub source: String,
    pub metadata: Metadata,
    pub acknowledged_at: Option<Timestamp>,
    pub resolved_at: Option<Timestamp>,
}

/// Parameters for creating a classification rule
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewRule {
    /// Unique rule name
    pub name: String,
    /// Regular expression, or a plain keyword if it fails to compile
    pub pattern: String,
    pub category: String,
    pub severity: Severity,
    #[serde(default)]
    pub priority_boost: f64,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_enabled() -> bool {
    true
}

/// A stored classification rule
///
/// Immutable once matched against; mutated only by explicit
/// enable/disable.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AlertRule {
    pub id: Uuid,
    /// Definition-order sequence number assigned at creation, used as the
    /// deterministic tie-break when several matched rules share the same
    /// severity score (lowest wins)
    pub seq: u64,
    pub name: String,
    pub pattern: String,
    pub category: String,
    pub severity: Severity,
    pub priority_boost: f64,
    pub enabled: bool,
    pub created_at: Timestamp,
}

/// Filter for alert queries; unset fields match everything
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AlertFilter {
    pub severity: Option<Severity>,
    pub category: Option<String>,
    pub status: Option<AlertStatus>,
    pub min_priority: Option<f64>,
}

impl AlertFilter {
    pub fn matches(&self, alert: &Alert) -> bool {
        if let Some(severity) = self.severity {
            if alert.severity != severity {
                return false;
            }
        }
        if let Some(ref category) = self.category {
            if alert.category != *category {
                return false;
            }
        }
        if let Some(status) = self.status {
            if alert.status != status {
                return false;
            }
        }
        if let Some(min_priority) = self.min_priority {
            if alert.priority_score < min_priority {
                return false;
            }
        }
        true
    }
}

/// A log entry selected as noteworthy for a summary
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct KeyEvent {
    pub timestamp: Timestamp,
    pub level: LogLevel,
    pub source: String,
    /// Message text, capped at 200 characters
    pub message: String,
}

/// Kind of deviation flagged by the anomaly detector
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum AnomalyKind {
    ActivitySpike,
    ActivityDrop,
    HighErrorRate,
    SourceErrors,
}

/// A flagged deviation in log volume, error rate, or source behavior
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Anomaly {
    pub kind: AnomalyKind,
    /// Hour bucket for temporal anomalies
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<Timestamp>,
    /// Observed value: bucket count or error percentage
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,
    /// Expected value for temporal anomalies (the bucket mean)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected: Option<f64>,
    /// Offending source for per-source anomalies
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_count: Option<usize>,
    pub description: String,
}

/// A persisted time-windowed summary of log activity
///
/// Created once per summarization call and immutable thereafter.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LogSummary {
    pub id: Uuid,
    pub start_time: Timestamp,
    pub end_time: Timestamp,
    pub total_logs: usize,
    /// ERROR plus CRITICAL entries in the window
    pub error_count: usize,
    pub warning_count: usize,
    pub summary_text: String,
    pub key_events: Vec<KeyEvent>,
    pub anomalies: Vec<Anomaly>,
    pub created_at: Timestamp,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level_serialization() {
        assert_eq!(serde_json::to_string(&LogLevel::Info).unwrap(), "\"INFO\"");
        assert_eq!(
            serde_json::to_string(&LogLevel::Warning).unwrap(),
            "\"WARNING\""
        );
        assert_eq!(
            serde_json::to_string(&LogLevel::Error).unwrap(),
            "\"ERROR\""
        );
        assert_eq!(
            serde_json::to_string(&LogLevel::Critical).unwrap(),
            "\"CRITICAL\""
        );
    }

    #[test]
    fn test_severity_serialization() {
        assert_eq!(serde_json::to_string(&Severity::Low).unwrap(), "\"low\"");
        assert_eq!(
            serde_json::to_string(&Severity::Critical).unwrap(),
            "\"critical\""
        );
    }

    #[test]
    fn test_status_serialization() {
        assert_eq!(
            serde_json::to_string(&AlertStatus::Acknowledged).unwrap(),
            "\"acknowledged\""
        );
    }

    #[test]
    fn test_level_ordering() {
        assert!(LogLevel::Info < LogLevel::Warning);
        assert!(LogLevel::Warning < LogLevel::Error);
        assert!(LogLevel::Error < LogLevel::Critical);
    }

    #[test]
    fn test_status_ordering_follows_lifecycle() {
        assert!(AlertStatus::Open < AlertStatus::Acknowledged);
        assert!(AlertStatus::Acknowledged < AlertStatus::Resolved);
    }

    #[test]
    fn test_default_tables() {
        let tables = SeverityTables::default();
        assert_eq!(tables.base_score(Severity::Low), 0.25);
        assert_eq!(tables.base_score(Severity::Medium), 0.5);
        assert_eq!(tables.base_score(Severity::High), 0.75);
        assert_eq!(tables.base_score(Severity::Critical), 1.0);
        assert_eq!(tables.level_weight(LogLevel::Info), 1);
        assert_eq!(tables.level_weight(LogLevel::Warning), 2);
        assert_eq!(tables.level_weight(LogLevel::Error), 3);
        assert_eq!(tables.level_weight(LogLevel::Critical), 4);
    }

    #[test]
    fn test_substitute_tables() {
        let tables = SeverityTables::new([0.1, 0.2, 0.3, 0.4], [10, 20, 30, 40]);
        assert_eq!(tables.base_score(Severity::Critical), 0.4);
        assert_eq!(tables.level_weight(LogLevel::Info), 10);
    }

    #[test]
    fn test_raw_alert_defaults() {
        let raw: RawAlert = serde_json::from_str(r#"{"title": "Link down"}"#).unwrap();
        assert_eq!(raw.title, "Link down");
        assert_eq!(raw.description, "");
        assert!(raw.source.is_none());
        assert!(raw.timestamp.is_none());
        assert!(raw.metadata.is_empty());
    }

    #[test]
    fn test_log_entry_ingestion_defaults() {
        let entry: LogEntry = serde_json::from_str(r#"{"message": "ping"}"#).unwrap();
        assert_eq!(entry.source, "unknown");
        assert_eq!(entry.level, LogLevel::Info);
        assert_eq!(entry.message, "ping");
    }

    #[test]
    fn test_alert_round_trip() {
        let alert = Alert {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            title: "Security breach attempt".to_string(),
            description: "Multiple failed logins".to_string(),
            severity: Severity::Critical,
            category: "security".to_string(),
            status: AlertStatus::Open,
            priority_score: 1.0,
            source: "firewall-01".to_string(),
            metadata: Metadata::new(),
            acknowledged_at: None,
            resolved_at: None,
        };

        let json = serde_json::to_string(&alert).unwrap();
        let deserialized: Alert = serde_json::from_str(&json).unwrap();
        assert_eq!(alert, deserialized);
    }

    #[test]
    fn test_alert_filter_matching() {
        let alert = Alert {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            title: "Slow query".to_string(),
            description: String::new(),
            severity: Severity::Medium,
            category: "performance".to_string(),
            status: AlertStatus::Open,
            priority_score: 0.55,
            source: "database-01".to_string(),
            metadata: Metadata::new(),
            acknowledged_at: None,
            resolved_at: None,
        };

        assert!(AlertFilter::default().matches(&alert));
        assert!(AlertFilter {
            severity: Some(Severity::Medium),
            min_priority: Some(0.5),
            ..Default::default()
        }
        .matches(&alert));
        assert!(!AlertFilter {
            status: Some(AlertStatus::Resolved),
            ..Default::default()
        }
        .matches(&alert));
        assert!(!AlertFilter {
            min_priority: Some(0.6),
            ..Default::default()
        }
        .matches(&alert));
    }

    #[test]
    fn test_anomaly_kind_serialization() {
        assert_eq!(
            serde_json::to_string(&AnomalyKind::ActivitySpike).unwrap(),
            "\"activity_spike\""
        );
        assert_eq!(
            serde_json::to_string(&AnomalyKind::HighErrorRate).unwrap(),
            "\"high_error_rate\""
        );
    }
}

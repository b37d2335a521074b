//! Storage seam for alerts, rules, logs, and summaries
//!
//! Persistence mechanics live behind these traits; the engines only see
//! the interfaces. The in-memory implementation backs the CLI and the
//! tests.

pub mod memory;

pub use memory::MemoryStore;

use crate::error::StoreError;
use crate::events::{
    Alert, AlertFilter, AlertRule, LogEntry, LogSummary, NewRule, Timestamp,
};
use uuid::Uuid;

/// Store for classification rules
pub trait RuleStore: Send + Sync {
    /// Persist a new rule, assigning its id, creation time, and
    /// definition-order sequence number. Rule names are unique.
    fn create_rule(&self, rule: NewRule) -> Result<AlertRule, StoreError>;

    /// All rules in definition order
    fn rules(&self) -> Result<Vec<AlertRule>, StoreError>;

    /// Enable or disable a rule by name
    ///
    /// Returns the updated rule, or `None` for an unknown name.
    fn set_rule_enabled(&self, name: &str, enabled: bool) -> Result<Option<AlertRule>, StoreError>;
}

/// Store for classified alerts
pub trait AlertStore: Send + Sync {
    fn insert_alert(&self, alert: &Alert) -> Result<(), StoreError>;

    fn alert(&self, id: Uuid) -> Result<Option<Alert>, StoreError>;

    /// Apply `mutate` to the stored alert under the store's lock
    ///
    /// The read-modify-write is atomic with respect to other updates of
    /// the same alert. Returns the post-update alert, or `None` for an
    /// unknown id.
    fn update_alert(
        &self,
        id: Uuid,
        mutate: &mut dyn FnMut(&mut Alert),
    ) -> Result<Option<Alert>, StoreError>;

    /// Alerts with `timestamp >= cutoff`
    fn alerts_since(&self, cutoff: Timestamp) -> Result<Vec<Alert>, StoreError>;

    /// Alerts matching the filter, in no particular order
    fn query_alerts(&self, filter: &AlertFilter) -> Result<Vec<Alert>, StoreError>;
}

/// Store for raw log entries (read dependency of the summarizer)
pub trait LogStore: Send + Sync {
    fn insert_logs(&self, entries: &[LogEntry]) -> Result<(), StoreError>;

    /// Logs with `start <= timestamp <= end`, oldest first
    fn logs_between(&self, start: Timestamp, end: Timestamp) -> Result<Vec<LogEntry>, StoreError>;
}

/// Store for generated summaries (append-only history)
pub trait SummaryStore: Send + Sync {
    fn insert_summary(&self, summary: &LogSummary) -> Result<(), StoreError>;

    /// Most recent summaries by creation time, newest first
    fn recent_summaries(&self, limit: usize) -> Result<Vec<LogSummary>, StoreError>;
}

//! Rule matching and fallback classification heuristics
//!
//! A rule pattern is tried as a case-insensitive regular expression first;
//! if it fails to compile it degrades to case-insensitive substring
//! containment. Alerts no rule matches fall through to fixed keyword
//! tables for category and severity.

use crate::events::{AlertRule, Severity, SeverityTables};
use regex::RegexBuilder;

/// Category keyword families, checked in priority order. The first family
/// with a keyword hit wins.
const CATEGORY_KEYWORDS: [(&str, &[&str]); 5] = [
    (
        "security",
        &[
            "security",
            "breach",
            "unauthorized",
            "attack",
            "intrusion",
            "malware",
            "virus",
        ],
    ),
    (
        "network",
        &[
            "network",
            "connection",
            "packet",
            "bandwidth",
            "latency",
            "timeout",
            "dns",
        ],
    ),
    (
        "performance",
        &[
            "performance",
            "slow",
            "high cpu",
            "memory",
            "disk",
            "load",
            "throughput",
        ],
    ),
    (
        "system",
        &[
            "system", "service", "daemon", "process", "kernel", "boot", "shutdown",
        ],
    ),
    (
        "application",
        &["application", "app", "database", "query", "api", "request"],
    ),
];

const DEFAULT_CATEGORY: &str = "system";

const CRITICAL_KEYWORDS: [&str; 5] = ["critical", "emergency", "down", "failed", "breach"];
const HIGH_KEYWORDS: [&str; 4] = ["error", "failure", "high", "warning"];
const MEDIUM_KEYWORDS: [&str; 3] = ["warning", "degraded", "slow"];

/// Check whether `text` matches a rule pattern
///
/// `text` is expected to be lowercased already. Patterns that fail to
/// compile as regular expressions never surface an error; they fall back
/// to substring containment.
pub fn matches_pattern(text: &str, pattern: &str) -> bool {
    match RegexBuilder::new(pattern).case_insensitive(true).build() {
        Ok(re) => re.is_match(text),
        Err(_) => text.contains(&pattern.to_lowercase()),
    }
}

/// Fallback category from the fixed keyword families
pub fn fallback_category(text: &str) -> &'static str {
    for (category, keywords) in CATEGORY_KEYWORDS {
        if keywords.iter().any(|keyword| text.contains(keyword)) {
            return category;
        }
    }
    DEFAULT_CATEGORY
}

/// Fallback severity from the fixed keyword ladder
pub fn fallback_severity(text: &str) -> Severity {
    if CRITICAL_KEYWORDS.iter().any(|word| text.contains(word)) {
        Severity::Critical
    } else if HIGH_KEYWORDS.iter().any(|word| text.contains(word)) {
        Severity::High
    } else if MEDIUM_KEYWORDS.iter().any(|word| text.contains(word)) {
        Severity::Medium
    } else {
        Severity::Low
    }
}

/// Snapshot of classification rules taken at the start of a classify call
///
/// Rule reads are snapshot-at-call-time: rules created mid-classification
/// are not visible to the in-flight call.
#[derive(Debug, Clone)]
pub struct RuleSet {
    rules: Vec<AlertRule>,
}

impl RuleSet {
    pub fn new(rules: Vec<AlertRule>) -> Self {
        Self { rules }
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// The matching enabled rule with the highest severity base score
    ///
    /// Ties are broken by definition order: the rule with the lowest
    /// sequence number wins. The sequence is compared directly rather
    /// than relying on iteration order.
    pub fn best_match(&self, text: &str, tables: &SeverityTables) -> Option<&AlertRule> {
        let mut best: Option<&AlertRule> = None;
        for rule in self.rules.iter().filter(|r| r.enabled) {
            if !matches_pattern(text, &rule.pattern) {
                continue;
            }
            best = match best {
                None => Some(rule),
                Some(current) => {
                    let candidate_score = tables.base_score(rule.severity);
                    let current_score = tables.base_score(current.severity);
                    if candidate_score > current_score
                        || (candidate_score == current_score && rule.seq < current.seq)
                    {
                        Some(rule)
                    } else {
                        Some(current)
                    }
                }
            };
        }
        best
    }
}


// Property-based tests
#[cfg(test)]
mod property_tests {
    use super::*;
    use quickcheck::{Arbitrary, Gen};
    use quickcheck_macros::quickcheck;

    /// Pattern built only from characters with no meaning to the regex
    /// engine, so regex search and substring containment must agree
    #[derive(Debug, Clone)]
    struct PlainPattern(String);

    impl Arbitrary for PlainPattern {
        fn arbitrary(g: &mut Gen) -> Self {
            let alphabet: Vec<char> = "abcdefghijklmnopqrstuvwxyz0123456789 ".chars().collect();
            let len = usize::arbitrary(g) % 8 + 1;
            let pattern: String = (0..len)
                .map(|_| *g.choose(&alphabet).unwrap_or(&'a'))
                .collect();
            PlainPattern(pattern)
        }
    }

    #[quickcheck]
    fn prop_plain_patterns_agree_with_substring(pattern: PlainPattern, text: String) -> bool {
        let text = text.to_lowercase();
        matches_pattern(&text, &pattern.0) == text.contains(&pattern.0)
    }

    #[quickcheck]
    fn prop_matching_never_panics(pattern: String, text: String) -> bool {
        // Arbitrary byte soup as a pattern must classify as either a
        // regex hit/miss or a substring hit/miss, never an error
        let _ = matches_pattern(&text.to_lowercase(), &pattern);
        true
    }
}

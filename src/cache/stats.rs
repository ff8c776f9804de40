//! Cache Statistics Module
//!
//! Tracks per-namespace hit/miss counters and exposes a serializable
//! snapshot for observability endpoints.

use std::collections::BTreeMap;

use serde::Serialize;

// == Namespace Stats ==
/// Hit/miss counters for a single namespace.
///
/// Counters are monotonic for the process lifetime; `key_count` is derived
/// from the entry table at snapshot time.
#[derive(Debug, Clone, Default, Serialize)]
pub struct NamespaceStats {
    /// Number of successful cache retrievals
    pub hits: u64,
    /// Number of failed cache retrievals (key not found or expired)
    pub misses: u64,
    /// Current number of entries in the namespace
    pub key_count: usize,
}

impl NamespaceStats {
    // == Constructor ==
    /// Creates stats with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    // == Hit Rate ==
    /// Returns hits / (hits + misses), or 0.0 if no lookups have been made.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    // == Record Hit ==
    /// Increments the hit counter.
    pub fn record_hit(&mut self) {
        self.hits += 1;
    }

    // == Record Miss ==
    /// Increments the miss counter.
    pub fn record_miss(&mut self) {
        self.misses += 1;
    }

    // == Update Key Count ==
    /// Updates the derived key count.
    pub fn set_key_count(&mut self, count: usize) {
        self.key_count = count;
    }
}

// == Stats Report ==
/// Point-in-time snapshot of every namespace's counters.
#[derive(Debug, Clone, Serialize)]
pub struct StatsReport {
    /// Snapshot timestamp in ISO 8601 format
    pub generated_at: String,
    /// Per-namespace counters, keyed by namespace name
    pub namespaces: BTreeMap<String, NamespaceStats>,
}

impl StatsReport {
    /// Creates a report over the given namespace snapshots.
    pub fn new(namespaces: BTreeMap<String, NamespaceStats>) -> Self {
        Self {
            generated_at: chrono::Utc::now().to_rfc3339(),
            namespaces,
        }
    }

    /// Counters for one namespace, if it exists.
    pub fn namespace(&self, name: &str) -> Option<&NamespaceStats> {
        self.namespaces.get(name)
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_new() {
        let stats = NamespaceStats::new();
        assert_eq!(stats.hits, 0);
        assert_eq!(stats.misses, 0);
        assert_eq!(stats.key_count, 0);
    }

    #[test]
    fn test_hit_rate_no_lookups() {
        let stats = NamespaceStats::new();
        assert_eq!(stats.hit_rate(), 0.0);
    }

    #[test]
    fn test_hit_rate_mixed() {
        let mut stats = NamespaceStats::new();
        stats.record_hit();
        stats.record_miss();
        assert_eq!(stats.hit_rate(), 0.5);
    }

    #[test]
    fn test_counters_are_monotonic() {
        let mut stats = NamespaceStats::new();
        stats.record_hit();
        stats.record_hit();
        stats.record_miss();
        assert_eq!(stats.hits, 2);
        assert_eq!(stats.misses, 1);
    }

    #[test]
    fn test_set_key_count() {
        let mut stats = NamespaceStats::new();
        stats.set_key_count(42);
        assert_eq!(stats.key_count, 42);
    }

    #[test]
    fn test_report_serialize() {
        let mut namespaces = BTreeMap::new();
        namespaces.insert(
            "public".to_string(),
            NamespaceStats {
                hits: 3,
                misses: 1,
                key_count: 2,
            },
        );
        let report = StatsReport::new(namespaces);

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["namespaces"]["public"]["hits"], 3);
        assert_eq!(json["namespaces"]["public"]["misses"], 1);
        assert_eq!(json["namespaces"]["public"]["key_count"], 2);
        assert!(json["generated_at"].as_str().is_some());
    }

    #[test]
    fn test_report_namespace_lookup() {
        let report = StatsReport::new(BTreeMap::new());
        assert!(report.namespace("missing").is_none());
    }
}

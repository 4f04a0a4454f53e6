//! Per-state fairness metrics: records, wire format, and the
//! process-wide cache.

mod client;

pub use client::{HttpMetrics, MetricsFetch, StaticMetrics};

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use serde::de::Deserializer;
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, warn};

/// Note text of the fallback record used when metrics are unavailable.
pub const NO_METRICS_NOTE: &str = "No metrics";

/// Fairness label assigned to a state's current districting plan.
/// Unrecognized wire values decode to `Unknown`; decoding never fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Classification {
    FavorsPartyA,
    FavorsPartyB,
    Fair,
    #[default]
    Unknown,
}

impl Classification {
    pub fn as_str(self) -> &'static str {
        match self {
            Classification::FavorsPartyA => "favors_party_a",
            Classification::FavorsPartyB => "favors_party_b",
            Classification::Fair => "fair",
            Classification::Unknown => "unknown",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s {
            "favors_party_a" => Classification::FavorsPartyA,
            "favors_party_b" => Classification::FavorsPartyB,
            "fair" => Classification::Fair,
            _ => Classification::Unknown,
        }
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Classification {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Classification {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(Classification::parse(&s))
    }
}

/// Summary block of a metrics record: an ordered notes list plus
/// whatever other fields the backend chooses to send, carried opaquely.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MetricsSummary {
    #[serde(default)]
    pub notes: Vec<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One per state code. Created on the first (successful or failed)
/// fetch, cached for the process lifetime, mutated in place by plan
/// generation, never removed.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MetricsRecord {
    #[serde(default)]
    pub classification: Classification,
    #[serde(default)]
    pub summary: MetricsSummary,
}

impl MetricsRecord {
    /// The record installed when a fetch fails: metrics unavailability
    /// must never block rendering.
    pub fn fallback() -> Self {
        Self {
            classification: Classification::Unknown,
            summary: MetricsSummary { notes: vec![NO_METRICS_NOTE.to_string()], extra: Map::new() },
        }
    }
}

/// Shared handle to a cached record. Locked briefly for reads and for
/// the in-place mutation plan generation performs.
pub type SharedRecord = Arc<Mutex<MetricsRecord>>;

/// Process-wide per-state metrics store. Keys populate once and are
/// never evicted during a session. Two truly concurrent first fetches
/// for one key may both hit the network; the first insert wins. That
/// race is accepted rather than locked away: values are idempotent per
/// key.
pub struct MetricsCache {
    fetch: Arc<dyn MetricsFetch>,
    records: Mutex<HashMap<String, SharedRecord>>,
}

impl MetricsCache {
    pub fn new(fetch: Arc<dyn MetricsFetch>) -> Self {
        Self { fetch, records: Mutex::new(HashMap::new()) }
    }

    pub fn has(&self, code: &str) -> bool {
        self.records.lock().contains_key(&normalize(code))
    }

    /// Cached record for `code`, without fetching.
    pub fn peek(&self, code: &str) -> Option<SharedRecord> {
        self.records.lock().get(&normalize(code)).cloned()
    }

    /// Record for `code`, fetching on the first call. Fetch failures
    /// populate the fallback record; this never errors outward.
    pub fn get(&self, code: &str) -> SharedRecord {
        let code = normalize(code);
        if let Some(record) = self.records.lock().get(&code) {
            return record.clone();
        }

        let record = match self.fetch.fetch(&code) {
            Ok(record) => record,
            Err(err) => {
                warn!(state = %code, %err, "metrics unavailable, using fallback");
                MetricsRecord::fallback()
            }
        };
        self.records
            .lock()
            .entry(code)
            .or_insert_with(|| Arc::new(Mutex::new(record)))
            .clone()
    }

    /// Best-effort prefetch for a set of codes. Per-state failures land
    /// on the fallback path inside `get`; the call itself never fails.
    pub fn warm(&self, codes: &[String]) {
        std::thread::scope(|scope| {
            for code in codes {
                if !self.has(code) {
                    scope.spawn(move || {
                        self.get(code);
                    });
                }
            }
        });
    }

    /// In-place update used by plan generation: prepend `note_prefix`
    /// to the notes and overwrite the classification. The caller is
    /// trusted on the classification value; nothing here persists
    /// across processes.
    pub fn mutate(&self, code: &str, classification: Classification, note_prefix: &str) {
        let code = normalize(code);
        debug!(state = %code, %classification, "rewriting cached metrics");
        let record = self
            .records
            .lock()
            .entry(code)
            .or_insert_with(|| Arc::new(Mutex::new(MetricsRecord::fallback())))
            .clone();
        let mut record = record.lock();
        record.summary.notes.insert(0, note_prefix.to_string());
        record.classification = classification;
    }

    /// Classification for the nationwide choropleth: the cached value,
    /// or `Unknown` when the state has not been fetched yet.
    pub fn classification(&self, code: &str) -> Classification {
        self.peek(code).map(|record| record.lock().classification).unwrap_or_default()
    }
}

fn normalize(code: &str) -> String {
    code.to_ascii_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(classification: Classification, notes: &[&str]) -> MetricsRecord {
        MetricsRecord {
            classification,
            summary: MetricsSummary {
                notes: notes.iter().map(|s| s.to_string()).collect(),
                extra: Map::new(),
            },
        }
    }

    fn cache_with(records: Vec<(&str, MetricsRecord)>) -> (Arc<StaticMetrics>, MetricsCache) {
        let mut fetcher = StaticMetrics::default();
        for (code, rec) in records {
            fetcher.insert(code, rec);
        }
        let fetcher = Arc::new(fetcher);
        (fetcher.clone(), MetricsCache::new(fetcher))
    }

    #[test]
    fn repeated_get_fetches_once_and_returns_the_same_record() {
        let (fetcher, cache) = cache_with(vec![("CA", record(Classification::Fair, &["ok"]))]);
        let first = cache.get("CA");
        let second = cache.get("CA");
        assert_eq!(fetcher.calls(), 1);
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(first.lock().classification, Classification::Fair);
    }

    #[test]
    fn fetch_failure_installs_the_fallback_record() {
        let (fetcher, cache) = cache_with(vec![]);
        let rec = cache.get("WY");
        {
            let rec = rec.lock();
            assert_eq!(rec.classification, Classification::Unknown);
            assert_eq!(rec.summary.notes, vec![NO_METRICS_NOTE.to_string()]);
        }
        // The failure is cached too: no refetch on the next get.
        cache.get("WY");
        assert_eq!(fetcher.calls(), 1);
    }

    #[test]
    fn get_normalizes_code_case() {
        let (fetcher, cache) = cache_with(vec![("CA", record(Classification::Fair, &[]))]);
        let a = cache.get("ca");
        let b = cache.get("CA");
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(fetcher.calls(), 1);
    }

    #[test]
    fn warm_populates_every_code_and_swallows_failures() {
        let (fetcher, cache) = cache_with(vec![("CA", record(Classification::Fair, &[]))]);
        cache.warm(&["CA".to_string(), "WY".to_string(), "TX".to_string()]);
        assert!(cache.has("CA"));
        assert!(cache.has("WY"));
        assert!(cache.has("TX"));
        assert_eq!(fetcher.calls(), 3);
        assert_eq!(cache.classification("WY"), Classification::Unknown);

        // Already-cached codes are skipped entirely.
        cache.warm(&["CA".to_string()]);
        assert_eq!(fetcher.calls(), 3);
    }

    #[test]
    fn mutate_prepends_notes_and_overwrites_classification() {
        let (_, cache) = cache_with(vec![("CA", record(Classification::FavorsPartyB, &["old"]))]);
        cache.get("CA");

        cache.mutate("CA", Classification::Fair, "new plan");
        let rec = cache.get("CA");
        {
            let rec = rec.lock();
            assert_eq!(rec.classification, Classification::Fair);
            assert_eq!(rec.summary.notes, vec!["new plan".to_string(), "old".to_string()]);
        }

        // No deduplication: a second identical mutation grows the list.
        cache.mutate("CA", Classification::Fair, "new plan");
        assert_eq!(rec.lock().summary.notes.len(), 3);
    }

    #[test]
    fn classification_peek_defaults_to_unknown() {
        let (fetcher, cache) = cache_with(vec![("CA", record(Classification::Fair, &[]))]);
        assert_eq!(cache.classification("CA"), Classification::Unknown);
        assert_eq!(fetcher.calls(), 0);
        cache.get("CA");
        assert_eq!(cache.classification("CA"), Classification::Fair);
    }

    #[test]
    fn wire_format_round_trips_and_tolerates_unknown_labels() {
        let rec: MetricsRecord = serde_json::from_value(json!({
            "classification": "favors_party_b",
            "summary": {
                "notes": ["Packed districts"],
                "expected_seats": {"dem": 12, "rep": 40}
            }
        }))
        .unwrap();
        assert_eq!(rec.classification, Classification::FavorsPartyB);
        assert_eq!(rec.summary.notes.len(), 1);
        assert!(rec.summary.extra.contains_key("expected_seats"));

        let rec: MetricsRecord =
            serde_json::from_value(json!({"classification": "gerrymandered", "summary": {}})).unwrap();
        assert_eq!(rec.classification, Classification::Unknown);

        assert_eq!(serde_json::to_value(Classification::Fair).unwrap(), json!("fair"));
    }
}

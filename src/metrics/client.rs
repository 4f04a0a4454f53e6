//! Fetch seam for the per-state metrics endpoint.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use reqwest::blocking::Client;

use crate::error::{Error, Result};
use super::MetricsRecord;

/// Per-state metrics lookup against a remote endpoint.
pub trait MetricsFetch: Send + Sync {
    fn fetch(&self, code: &str) -> Result<MetricsRecord>;
}

/// `GET {base}/api/metrics/{code}` over a blocking HTTP client.
pub struct HttpMetrics {
    client: Client,
    base_url: String,
}

impl HttpMetrics {
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|err| Error::Fetch { url: String::new(), message: err.to_string() })?;
        Ok(Self { client, base_url: base_url.into() })
    }
}

impl MetricsFetch for HttpMetrics {
    fn fetch(&self, code: &str) -> Result<MetricsRecord> {
        let url = format!("{}/api/metrics/{}", self.base_url.trim_end_matches('/'), code);
        let resp = self
            .client
            .get(&url)
            .send()
            .map_err(|err| Error::Fetch { url: url.clone(), message: err.to_string() })?;
        if !resp.status().is_success() {
            return Err(Error::Fetch { url, message: format!("status {}", resp.status()) });
        }
        resp.json()
            .map_err(|err| Error::format(format!("{url}: body is not a metrics record: {err}")))
    }
}

/// Fixed in-memory records, for tests and offline demos. Codes absent
/// from the map fail the fetch, which exercises the cache's fallback
/// path. Counts fetch calls so callers can assert de-duplication.
#[derive(Default)]
pub struct StaticMetrics {
    records: HashMap<String, MetricsRecord>,
    calls: AtomicUsize,
}

impl StaticMetrics {
    pub fn new(records: HashMap<String, MetricsRecord>) -> Self {
        Self { records, calls: AtomicUsize::new(0) }
    }

    pub fn insert(&mut self, code: impl Into<String>, record: MetricsRecord) {
        self.records.insert(code.into(), record);
    }

    /// Number of `fetch` calls made so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::Relaxed)
    }
}

impl MetricsFetch for StaticMetrics {
    fn fetch(&self, code: &str) -> Result<MetricsRecord> {
        self.calls.fetch_add(1, Ordering::Relaxed);
        self.records
            .get(code)
            .cloned()
            .ok_or_else(|| Error::Fetch { url: format!("static://{code}"), message: "no record".into() })
    }
}

//! Transport seam for remote JSON documents.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use reqwest::{blocking::Client, redirect::Policy};
use serde_json::Value;

use crate::error::{Error, Result};

const USER_AGENT: &str = "fairmap/0.1 (+https://github.com/fairmap/fairmap)";

/// Read-only access to remote JSON documents by URL.
pub trait Transport: Send + Sync {
    fn get_json(&self, url: &str) -> Result<Value>;
}

/// Network transport over a blocking HTTP client.
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .redirect(Policy::limited(10))
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|err| Error::Fetch { url: String::new(), message: err.to_string() })?;
        Ok(Self { client })
    }
}

impl Transport for HttpTransport {
    fn get_json(&self, url: &str) -> Result<Value> {
        let resp = self
            .client
            .get(url)
            .send()
            .map_err(|err| Error::Fetch { url: url.to_string(), message: err.to_string() })?;
        if !resp.status().is_success() {
            return Err(Error::Fetch {
                url: url.to_string(),
                message: format!("status {}", resp.status()),
            });
        }
        resp.json()
            .map_err(|err| Error::format(format!("{url}: body is not valid JSON: {err}")))
    }
}

/// In-memory transport keyed by URL, for tests and offline fixtures.
/// Counts every lookup so callers can assert fetch-once behavior.
#[derive(Default)]
pub struct MemTransport {
    docs: HashMap<String, Value>,
    calls: AtomicUsize,
}

impl MemTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, url: impl Into<String>, doc: Value) {
        self.docs.insert(url.into(), doc);
    }

    /// Number of `get_json` calls made so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::Relaxed)
    }
}

impl Transport for MemTransport {
    fn get_json(&self, url: &str) -> Result<Value> {
        self.calls.fetch_add(1, Ordering::Relaxed);
        self.docs
            .get(url)
            .cloned()
            .ok_or_else(|| Error::Fetch { url: url.to_string(), message: "no such document".into() })
    }
}

//! Geometry source adapter: topology fetch, caching, and per-state
//! district filtering.

mod transport;

pub use transport::{HttpTransport, MemTransport, Transport};

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::debug;

use crate::common::geog::state_abbr_to_fips;
use crate::error::{Error, Result};
use crate::topo::{expand_object, FeatureCollection, Topology};

/// Default payload locations; override through [`SourceUrls`].
pub const DEFAULT_STATES_URL: &str = "https://cdn.jsdelivr.net/npm/us-atlas@3/states-10m.json";
pub const DEFAULT_DISTRICTS_URL: &str =
    "https://cdn.jsdelivr.net/npm/us-congress-113@0/us/congress-ungrouped.json";

/// The two topology payloads the viewer consumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TopologyKind {
    States,
    Districts,
}

impl TopologyKind {
    /// Known geometry object names, tried in order before the
    /// first-key fallback.
    fn object_keys(self) -> (&'static str, &'static str) {
        match self {
            TopologyKind::States => ("states", "state"),
            TopologyKind::Districts => ("districts", "cd"),
        }
    }
}

/// Where to fetch each payload from.
#[derive(Debug, Clone)]
pub struct SourceUrls {
    pub states: String,
    pub districts: String,
}

impl Default for SourceUrls {
    fn default() -> Self {
        Self {
            states: DEFAULT_STATES_URL.to_string(),
            districts: DEFAULT_DISTRICTS_URL.to_string(),
        }
    }
}

/// Fetches and caches the two topology payloads and expands them into
/// feature collections. Both caches populate once per key and are never
/// evicted for the life of the process; racing first fetches are
/// resolved first-insert-wins.
pub struct GeometrySource {
    transport: Arc<dyn Transport>,
    urls: SourceUrls,
    payloads: Mutex<HashMap<TopologyKind, Arc<Topology>>>,
    features: Mutex<HashMap<TopologyKind, Arc<FeatureCollection>>>,
}

impl GeometrySource {
    pub fn new(transport: Arc<dyn Transport>, urls: SourceUrls) -> Self {
        Self {
            transport,
            urls,
            payloads: Mutex::new(HashMap::new()),
            features: Mutex::new(HashMap::new()),
        }
    }

    fn url_for(&self, kind: TopologyKind) -> &str {
        match kind {
            TopologyKind::States => &self.urls.states,
            TopologyKind::Districts => &self.urls.districts,
        }
    }

    /// Fetch the payload for `kind`, at most once per process; later
    /// calls return the cached document.
    pub fn load_topology(&self, kind: TopologyKind) -> Result<Arc<Topology>> {
        if let Some(topo) = self.payloads.lock().get(&kind) {
            return Ok(topo.clone());
        }

        let url = self.url_for(kind);
        debug!(?kind, url, "fetching topology payload");
        let doc = self.transport.get_json(url)?;
        let topo = Arc::new(Topology::from_value(doc)?);

        Ok(self.payloads.lock().entry(kind).or_insert(topo).clone())
    }

    /// The expanded feature collection for `kind`, cached after the
    /// first expansion.
    fn collection(&self, kind: TopologyKind) -> Result<Arc<FeatureCollection>> {
        if let Some(features) = self.features.lock().get(&kind) {
            return Ok(features.clone());
        }

        let topo = self.load_topology(kind)?;
        let (primary, secondary) = kind.object_keys();
        let (name, object) = topo.select_object(primary, secondary)?;
        debug!(?kind, object = name, "expanding topology object");
        let features = Arc::new(FeatureCollection(expand_object(&topo, object)?));

        Ok(self.features.lock().entry(kind).or_insert(features).clone())
    }

    /// The whole-nation state boundary collection.
    pub fn states_collection(&self) -> Result<FeatureCollection> {
        Ok((*self.collection(TopologyKind::States)?).clone())
    }

    /// District features for one state, selected by the two-digit FIPS
    /// code the postal code maps to. An empty collection is a valid
    /// result: the upstream dataset may carry no districts for a
    /// territory.
    pub fn districts_for_state(&self, code: &str) -> Result<FeatureCollection> {
        let code = code.to_ascii_uppercase();
        let fips = state_abbr_to_fips(&code)
            .ok_or_else(|| Error::UnknownState { code: code.clone() })?;

        let all = self.collection(TopologyKind::Districts)?;
        let matching: Vec<_> = all
            .iter()
            .filter(|f| f.state_fips().as_deref() == Some(fips))
            .cloned()
            .collect();
        debug!(state = %code, fips, count = matching.len(), "filtered district features");
        Ok(FeatureCollection(matching))
    }
}

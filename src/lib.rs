#![doc = "Fairmap public API"]
mod common;
mod controller;
mod error;
mod metrics;
mod render;
mod source;
mod topo;
mod view;

pub mod cli;
pub mod commands;

#[doc(inline)]
pub use controller::{
    Drilldown, GenerateOutcome, HoverInfo, Phase, PlanMode, SelectOutcome, SelectTicket,
};

#[doc(inline)]
pub use error::{Error, Result};

#[doc(inline)]
pub use metrics::{
    Classification, HttpMetrics, MetricsCache, MetricsFetch, MetricsRecord, MetricsSummary,
    SharedRecord, StaticMetrics, NO_METRICS_NOTE,
};

#[doc(inline)]
pub use render::{
    classification_color, DrawnLayer, LayerHandle, LayerStyle, MapSurface, RecordingSurface,
    SvgSurface, COLOR_FAIR, COLOR_FAVORS_A, COLOR_FAVORS_B, COLOR_UNKNOWN, FIT_PADDING,
};

#[doc(inline)]
pub use source::{
    GeometrySource, HttpTransport, MemTransport, SourceUrls, TopologyKind, Transport,
    DEFAULT_DISTRICTS_URL, DEFAULT_STATES_URL,
};

#[doc(inline)]
pub use topo::{Feature, FeatureCollection, Topology};

#[doc(inline)]
pub use view::ViewState;

pub use common::geog::{all_state_codes, state_abbr_to_fips, state_fips_to_abbr, state_name};

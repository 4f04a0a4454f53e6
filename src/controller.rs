//! Nationwide-to-state drilldown state machine.

use std::sync::Arc;

use tracing::{debug, info};

use crate::common::geog::state_abbr_to_fips;
use crate::error::{Error, Result};
use crate::metrics::{Classification, MetricsCache};
use crate::render::{render_districts, render_states, LayerStyle, MapSurface};
use crate::source::GeometrySource;
use crate::topo::FeatureCollection;
use crate::view::ViewState;

/// Where the viewer currently is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Phase {
    /// Nothing selected; only the nationwide overlay is shown.
    Idle,
    /// Districts and metrics are being fetched for a target state.
    Loading { target: String },
    /// Districts drawn and metrics shown for the selected state.
    Ready,
}

/// Token for an in-flight selection. Committing a ticket whose epoch
/// has been superseded by a newer `begin_select` is a no-op, which is
/// what keeps a slow fetch from clobbering a newer selection.
#[derive(Debug)]
pub struct SelectTicket {
    code: String,
    epoch: u64,
}

impl SelectTicket {
    pub fn code(&self) -> &str {
        &self.code
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectOutcome {
    /// The view now shows this selection.
    Committed,
    /// A newer selection won; nothing was drawn.
    Superseded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerateOutcome {
    /// Districts were re-styled and the metrics record rewritten.
    Applied,
    /// Preconditions not met; nothing changed.
    Skipped,
}

/// Placeholder plan-generation mode. Each mode carries a fixed style
/// and a fixed note string; geometry is never touched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanMode {
    Fair,
    FavorA,
    FavorB,
}

impl PlanMode {
    pub fn classification(self) -> Classification {
        match self {
            PlanMode::Fair => Classification::Fair,
            PlanMode::FavorA => Classification::FavorsPartyA,
            PlanMode::FavorB => Classification::FavorsPartyB,
        }
    }

    /// The note prepended to the state's metrics record.
    pub fn note(self) -> &'static str {
        match self {
            PlanMode::Fair => "Generated demo plan: balanced",
            PlanMode::FavorA => "Generated demo plan: packed toward party A",
            PlanMode::FavorB => "Generated demo plan: packed toward party B",
        }
    }

    /// Fixed re-style applied to the existing district geometry.
    pub fn style(self) -> LayerStyle {
        match self {
            PlanMode::Fair => LayerStyle {
                color: "#2e7d32".to_string(),
                weight: 2.0,
                dash: None,
                fill_color: "#a5d6a7".to_string(),
                fill_opacity: 0.35,
            },
            PlanMode::FavorA => LayerStyle {
                color: "#1565c0".to_string(),
                weight: 2.0,
                dash: Some("6 3".to_string()),
                fill_color: "#90caf9".to_string(),
                fill_opacity: 0.35,
            },
            PlanMode::FavorB => LayerStyle {
                color: "#c62828".to_string(),
                weight: 2.0,
                dash: Some("2 4".to_string()),
                fill_color: "#ef9a9a".to_string(),
                fill_opacity: 0.35,
            },
        }
    }
}

/// Classification surfaced for the transient hover indicator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HoverInfo {
    pub code: String,
    pub classification: Classification,
}

/// Orchestrates selection, refresh sequencing, and the placeholder
/// plan-generation mutation over a map surface.
pub struct Drilldown<S: MapSurface> {
    source: Arc<GeometrySource>,
    metrics: Arc<MetricsCache>,
    surface: S,
    view: ViewState,
    phase: Phase,
    states: Option<FeatureCollection>,
    epoch: u64,
}

impl<S: MapSurface> Drilldown<S> {
    pub fn new(source: Arc<GeometrySource>, metrics: Arc<MetricsCache>, surface: S) -> Self {
        Self {
            source,
            metrics,
            surface,
            view: ViewState::new(),
            phase: Phase::Idle,
            states: None,
            epoch: 0,
        }
    }

    /// Fetch the national boundaries and draw the nationwide overlay.
    pub fn init(&mut self) -> Result<()> {
        let states = self.source.states_collection()?;
        render_states(&mut self.surface, &mut self.view, &states, &self.metrics, None);
        self.states = Some(states);
        Ok(())
    }

    /// Start a selection: validate the code, supersede any in-flight
    /// selection, and enter `Loading`.
    pub fn begin_select(&mut self, code: &str) -> Result<SelectTicket> {
        let code = code.to_ascii_uppercase();
        if state_abbr_to_fips(&code).is_none() {
            return Err(Error::UnknownState { code });
        }

        self.epoch += 1;
        self.phase = Phase::Loading { target: code.clone() };
        debug!(state = %code, epoch = self.epoch, "selection started");
        Ok(SelectTicket { code, epoch: self.epoch })
    }

    /// Finish a selection with fetched districts. Stale tickets are
    /// discarded so a newer selection's view always wins, regardless of
    /// fetch completion order.
    pub fn commit_select(
        &mut self,
        ticket: SelectTicket,
        districts: FeatureCollection,
    ) -> SelectOutcome {
        if ticket.epoch != self.epoch {
            debug!(state = %ticket.code, "stale selection discarded");
            return SelectOutcome::Superseded;
        }

        info!(state = %ticket.code, districts = districts.len(), "selection ready");
        self.view.selected = Some(ticket.code.clone());
        render_districts(&mut self.surface, &mut self.view, districts, &LayerStyle::district());
        if let Some(states) = self.states.take() {
            render_states(
                &mut self.surface,
                &mut self.view,
                &states,
                &self.metrics,
                Some(&ticket.code),
            );
            self.states = Some(states);
        }
        self.phase = Phase::Ready;
        SelectOutcome::Committed
    }

    /// Select a state end to end: fetch its districts and warm its
    /// metrics, then commit. A geometry failure surfaces the error and
    /// returns the controller to `Idle`; metrics never fail outward.
    pub fn select_state(&mut self, code: &str) -> Result<SelectOutcome> {
        let ticket = self.begin_select(code)?;
        let districts = match self.source.districts_for_state(ticket.code()) {
            Ok(districts) => districts,
            Err(err) => {
                self.phase = Phase::Idle;
                return Err(err);
            }
        };
        self.metrics.get(ticket.code());
        Ok(self.commit_select(ticket, districts))
    }

    /// Warm the metrics cache for a hovered state and report its
    /// classification for the transient indicator. No phase change.
    pub fn hover_state(&mut self, code: &str) -> Result<HoverInfo> {
        let code = code.to_ascii_uppercase();
        if state_abbr_to_fips(&code).is_none() {
            return Err(Error::UnknownState { code });
        }
        let record = self.metrics.get(&code);
        let classification = record.lock().classification;
        Ok(HoverInfo { code, classification })
    }

    /// Re-style the current districts and rewrite the cached metrics
    /// record. Valid only from `Ready` with `code` selected and a
    /// non-empty district collection; otherwise nothing changes.
    pub fn generate_plan(&mut self, code: &str, mode: PlanMode) -> GenerateOutcome {
        let code = code.to_ascii_uppercase();
        if self.phase != Phase::Ready || self.view.selected.as_deref() != Some(code.as_str()) {
            return GenerateOutcome::Skipped;
        }
        let Some(districts) = self.view.districts.clone() else {
            return GenerateOutcome::Skipped;
        };
        if districts.is_empty() {
            return GenerateOutcome::Skipped;
        }

        info!(state = %code, mode = ?mode, "applying generated plan styling");
        render_districts(&mut self.surface, &mut self.view, districts, &mode.style());
        self.metrics.mutate(&code, mode.classification(), mode.note());
        GenerateOutcome::Applied
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    pub fn view(&self) -> &ViewState {
        &self.view
    }

    pub fn metrics(&self) -> &MetricsCache {
        &self.metrics
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn into_surface(self) -> S {
        self.surface
    }
}

//! What is currently drawn.

use crate::render::LayerHandle;
use crate::topo::FeatureCollection;

/// Mutable drawing state for the viewer. At most one district overlay
/// and one nationwide overlay are live at a time; replacing either
/// releases the previous handle first.
#[derive(Debug, Default)]
pub struct ViewState {
    /// Currently selected postal code, if any.
    pub selected: Option<String>,
    /// District features drawn for the selected state.
    pub districts: Option<FeatureCollection>,
    /// Live district overlay handle.
    pub district_layer: Option<LayerHandle>,
    /// Live nationwide overlay handle.
    pub states_layer: Option<LayerHandle>,
}

impl ViewState {
    pub fn new() -> Self {
        Self::default()
    }
}

//! In-memory surface that records drawing operations, for tests and
//! embedders that only need the resulting layer bookkeeping.

use geo::Rect;

use crate::topo::FeatureCollection;
use super::{LayerHandle, LayerStyle, MapSurface};

/// One live overlay as the surface last drew it.
#[derive(Debug, Clone)]
pub struct DrawnLayer {
    pub handle: LayerHandle,
    pub feature_count: usize,
    pub styles: Vec<LayerStyle>,
    pub popups: Vec<String>,
}

#[derive(Debug, Default)]
pub struct RecordingSurface {
    next_id: u64,
    /// Live overlays in draw order.
    pub layers: Vec<DrawnLayer>,
    /// Every handle released so far, in release order.
    pub removed: Vec<LayerHandle>,
    /// Last fitted viewport, if any.
    pub viewport: Option<(Rect<f64>, f64)>,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// The live layer drawn under `handle`, if it is still attached.
    pub fn layer(&self, handle: LayerHandle) -> Option<&DrawnLayer> {
        self.layers.iter().find(|layer| layer.handle == handle)
    }
}

impl MapSurface for RecordingSurface {
    fn add_layer(
        &mut self,
        features: &FeatureCollection,
        styles: &[LayerStyle],
        popups: &[String],
    ) -> LayerHandle {
        self.next_id += 1;
        let handle = LayerHandle(self.next_id);
        self.layers.push(DrawnLayer {
            handle,
            feature_count: features.len(),
            styles: styles.to_vec(),
            popups: popups.to_vec(),
        });
        handle
    }

    fn remove_layer(&mut self, handle: LayerHandle) {
        self.layers.retain(|layer| layer.handle != handle);
        self.removed.push(handle);
    }

    fn fit_bounds(&mut self, bounds: Rect<f64>, padding: f64) {
        self.viewport = Some((bounds, padding));
    }
}

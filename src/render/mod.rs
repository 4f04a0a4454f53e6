//! Render layer: overlay replacement, popups, and viewport fitting on
//! top of an abstract map surface.

mod recording;
mod style;
mod svg;

pub use recording::{DrawnLayer, RecordingSurface};
pub use style::{
    classification_color, LayerStyle, COLOR_FAIR, COLOR_FAVORS_A, COLOR_FAVORS_B, COLOR_UNKNOWN,
};
pub use svg::SvgSurface;

use geo::Rect;

use crate::common::geog::{state_fips_to_abbr, state_name};
use crate::metrics::MetricsCache;
use crate::topo::{Feature, FeatureCollection};
use crate::view::ViewState;

/// Padding applied when fitting the viewport to drawn bounds, as a
/// fraction of the bounds' span.
pub const FIT_PADDING: f64 = 0.05;

/// Opaque handle to one drawn overlay, issued by the surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LayerHandle(pub u64);

/// The seam between the viewer core and a concrete map widget. The
/// bundled implementations are [`SvgSurface`] (headless documents) and
/// [`RecordingSurface`] (test double); an interactive widget lives
/// outside this crate.
pub trait MapSurface {
    /// Draw one overlay. `styles` and `popups` are per-feature,
    /// index-aligned with the collection.
    fn add_layer(
        &mut self,
        features: &FeatureCollection,
        styles: &[LayerStyle],
        popups: &[String],
    ) -> LayerHandle;

    /// Release a previously drawn overlay.
    fn remove_layer(&mut self, handle: LayerHandle);

    /// Move the visible viewport to cover `bounds` plus padding.
    fn fit_bounds(&mut self, bounds: Rect<f64>, padding: f64);
}

/// Replace the district overlay with `features` drawn in `style`, and
/// fit the viewport to them. An empty collection yields no bounds and
/// leaves the viewport untouched; that is not an error.
pub(crate) fn render_districts<S: MapSurface>(
    surface: &mut S,
    view: &mut ViewState,
    features: FeatureCollection,
    style: &LayerStyle,
) {
    if let Some(previous) = view.district_layer.take() {
        surface.remove_layer(previous);
    }

    let styles = vec![style.clone(); features.len()];
    let popups: Vec<String> = features.iter().map(district_popup).collect();
    let handle = surface.add_layer(&features, &styles, &popups);
    view.district_layer = Some(handle);

    if let Some(bounds) = features.bounds() {
        surface.fit_bounds(bounds, FIT_PADDING);
    }
    view.districts = Some(features);
}

/// Replace the nationwide overlay. Fill color comes from each state's
/// cached classification; states never fetched style as unknown. The
/// selected state's border is highlighted.
pub(crate) fn render_states<S: MapSurface>(
    surface: &mut S,
    view: &mut ViewState,
    features: &FeatureCollection,
    metrics: &MetricsCache,
    selected: Option<&str>,
) {
    if let Some(previous) = view.states_layer.take() {
        surface.remove_layer(previous);
    }

    let styles: Vec<LayerStyle> = features
        .iter()
        .map(|feature| {
            let abbr = feature.state_fips().and_then(|fips| state_fips_to_abbr(&fips));
            let classification =
                abbr.map(|code| metrics.classification(code)).unwrap_or_default();
            let is_selected = matches!((abbr, selected), (Some(a), Some(s)) if a == s);
            LayerStyle::state(classification, is_selected)
        })
        .collect();
    let popups: Vec<String> = features.iter().map(state_popup).collect();

    let handle = surface.add_layer(features, &styles, &popups);
    view.states_layer = Some(handle);
}

/// Identification text for a district feature, with `?` placeholders
/// where an identifier cannot be derived.
fn district_popup(feature: &Feature) -> String {
    let district = feature.district().unwrap_or_else(|| "?".to_string());
    let state = feature
        .state_fips()
        .and_then(|fips| state_fips_to_abbr(&fips))
        .unwrap_or("?");
    format!("District {district} ({state})")
}

fn state_popup(feature: &Feature) -> String {
    feature
        .state_fips()
        .and_then(|fips| state_fips_to_abbr(&fips))
        .map(|abbr| state_name(abbr).unwrap_or(abbr).to_string())
        .unwrap_or_else(|| "?".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use geo::{polygon, Geometry};
    use serde_json::json;

    use crate::metrics::{Classification, MetricsCache, StaticMetrics};

    fn district_feature(state: &str, district: &str) -> Feature {
        let square: geo::Polygon<f64> = polygon![
            (x: 0.0, y: 0.0), (x: 1.0, y: 0.0), (x: 1.0, y: 1.0), (x: 0.0, y: 1.0),
        ];
        Feature {
            id: None,
            geometry: Geometry::Polygon(square),
            properties: json!({"STATEFP": state, "CD116FP": district})
                .as_object()
                .cloned()
                .unwrap(),
        }
    }

    #[test]
    fn district_redraw_replaces_the_previous_overlay() {
        let mut surface = RecordingSurface::new();
        let mut view = ViewState::new();
        let features = FeatureCollection(vec![district_feature("06", "01")]);

        render_districts(&mut surface, &mut view, features.clone(), &LayerStyle::district());
        let first = view.district_layer.unwrap();
        render_districts(&mut surface, &mut view, features, &LayerStyle::district());

        assert_eq!(surface.layers.len(), 1);
        assert_eq!(surface.removed, vec![first]);
        assert_ne!(view.district_layer.unwrap(), first);
    }

    #[test]
    fn empty_collection_leaves_the_viewport_unchanged() {
        let mut surface = RecordingSurface::new();
        let mut view = ViewState::new();

        render_districts(
            &mut surface,
            &mut view,
            FeatureCollection(vec![district_feature("06", "01")]),
            &LayerStyle::district(),
        );
        let fitted = surface.viewport;
        assert!(fitted.is_some());

        render_districts(&mut surface, &mut view, FeatureCollection::default(), &LayerStyle::district());
        assert_eq!(surface.viewport, fitted);
        assert!(view.districts.as_ref().unwrap().is_empty());
    }

    #[test]
    fn popups_fall_back_to_question_marks() {
        let feature = Feature {
            id: None,
            geometry: Geometry::Polygon(polygon![
                (x: 0.0, y: 0.0), (x: 1.0, y: 0.0), (x: 1.0, y: 1.0),
            ]),
            properties: serde_json::Map::new(),
        };
        assert_eq!(district_popup(&feature), "District ? (?)");
        assert_eq!(district_popup(&district_feature("06", "01")), "District 01 (CA)");
    }

    #[test]
    fn state_fills_follow_cached_classifications() {
        let mut fetcher = StaticMetrics::default();
        fetcher.insert(
            "CA",
            crate::metrics::MetricsRecord {
                classification: Classification::Fair,
                ..Default::default()
            },
        );
        let metrics = MetricsCache::new(Arc::new(fetcher));
        metrics.get("CA");

        let mut surface = RecordingSurface::new();
        let mut view = ViewState::new();
        let states = FeatureCollection(vec![
            district_feature("06", "01"),
            district_feature("56", "00"),
        ]);
        render_states(&mut surface, &mut view, &states, &metrics, Some("CA"));

        let layer = &surface.layers[0];
        assert_eq!(layer.styles[0].fill_color, COLOR_FAIR);
        // CA is selected: heavier border than WY.
        assert!(layer.styles[0].weight > layer.styles[1].weight);
        // WY was never fetched: unknown fill.
        assert_eq!(layer.styles[1].fill_color, COLOR_UNKNOWN);
    }
}

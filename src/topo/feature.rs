//! Geographic features and feature collections.

use geo::{BoundingRect, Coord, Rect};
use serde_json::{Map, Value};

/// Property keys tried, in priority order, when deriving a feature's
/// state FIPS code. Upstream schemas disagree on the key name, so the
/// first key present wins; the feature `id` is the final fallback.
const STATE_KEYS: &[&str] = &["STATE", "STATEFP", "STATEFP20", "state"];

/// Property keys tried, in priority order, when deriving a feature's
/// district identifier.
const DISTRICT_KEYS: &[&str] = &["CD", "CD116FP", "CD118FP", "DISTRICT", "district"];

/// A single geographic shape with its property map.
#[derive(Debug, Clone)]
pub struct Feature {
    /// Top-level feature id, when the source document carries one.
    pub id: Option<String>,
    pub geometry: geo::Geometry<f64>,
    pub properties: Map<String, Value>,
}

impl Feature {
    /// Derive the two-digit state FIPS code, trying the known property
    /// keys in priority order and falling back to the feature id.
    /// Single-digit numeric values are left-padded to two digits.
    pub fn state_fips(&self) -> Option<String> {
        self.lookup(STATE_KEYS)
            .or_else(|| self.id.as_deref().map(pad2))
    }

    /// Derive the district identifier, trying the known property keys
    /// in priority order.
    pub fn district(&self) -> Option<String> {
        self.lookup(DISTRICT_KEYS)
    }

    fn lookup(&self, keys: &[&str]) -> Option<String> {
        keys.iter().find_map(|key| self.properties.get(*key).and_then(normalize_code))
    }
}

/// Accept either a string or a numeric property value, normalized to a
/// zero-padded string.
fn normalize_code(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(pad2(s)),
        Value::Number(n) => n.as_u64().map(|v| format!("{v:02}")),
        _ => None,
    }
}

fn pad2(s: &str) -> String {
    if s.len() == 1 && s.as_bytes()[0].is_ascii_digit() {
        format!("0{s}")
    } else {
        s.to_string()
    }
}

/// An ordered sequence of features. Order carries no meaning but is kept
/// stable for deterministic rendering.
#[derive(Debug, Clone, Default)]
pub struct FeatureCollection(pub Vec<Feature>);

impl FeatureCollection {
    pub fn len(&self) -> usize { self.0.len() }

    pub fn is_empty(&self) -> bool { self.0.is_empty() }

    pub fn iter(&self) -> impl Iterator<Item = &Feature> {
        self.0.iter()
    }

    /// Combined bounding rectangle of every feature, or `None` when the
    /// collection is empty or holds no boundable geometry.
    pub fn bounds(&self) -> Option<Rect<f64>> {
        self.0
            .iter()
            .filter_map(|f| f.geometry.bounding_rect())
            .reduce(|acc, r| {
                Rect::new(
                    Coord { x: acc.min().x.min(r.min().x), y: acc.min().y.min(r.min().y) },
                    Coord { x: acc.max().x.max(r.max().x), y: acc.max().y.max(r.max().y) },
                )
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{polygon, Geometry};
    use serde_json::json;

    fn feature_with(props: Value, id: Option<&str>) -> Feature {
        let square: geo::Polygon<f64> = polygon![
            (x: 0.0, y: 0.0), (x: 1.0, y: 0.0), (x: 1.0, y: 1.0), (x: 0.0, y: 1.0),
        ];
        Feature {
            id: id.map(str::to_string),
            geometry: Geometry::Polygon(square),
            properties: props.as_object().cloned().unwrap_or_default(),
        }
    }

    #[test]
    fn state_key_priority_order() {
        // STATE outranks STATEFP when both are present.
        let f = feature_with(json!({"STATE": "56", "STATEFP": "06"}), None);
        assert_eq!(f.state_fips(), Some("56".to_string()));

        let f = feature_with(json!({"STATEFP20": "06"}), None);
        assert_eq!(f.state_fips(), Some("06".to_string()));
    }

    #[test]
    fn numeric_state_property_is_zero_padded() {
        let f = feature_with(json!({"STATE": 6}), None);
        assert_eq!(f.state_fips(), Some("06".to_string()));

        let f = feature_with(json!({"state": "6"}), None);
        assert_eq!(f.state_fips(), Some("06".to_string()));
    }

    #[test]
    fn feature_id_is_the_state_fallback() {
        let f = feature_with(json!({"name": "Wyoming"}), Some("56"));
        assert_eq!(f.state_fips(), Some("56".to_string()));

        let f = feature_with(json!({}), None);
        assert_eq!(f.state_fips(), None);
    }

    #[test]
    fn district_keys_in_priority_order() {
        let f = feature_with(json!({"CD116FP": "01", "DISTRICT": "9"}), None);
        assert_eq!(f.district(), Some("01".to_string()));

        let f = feature_with(json!({"DISTRICT": 9}), None);
        assert_eq!(f.district(), Some("09".to_string()));
    }

    #[test]
    fn bounds_cover_all_features_and_empty_is_none() {
        let a = feature_with(json!({}), None);
        let mut b = feature_with(json!({}), None);
        b.geometry = Geometry::Polygon(polygon![
            (x: 2.0, y: 2.0), (x: 3.0, y: 2.0), (x: 3.0, y: 4.0), (x: 2.0, y: 4.0),
        ]);

        let coll = FeatureCollection(vec![a, b]);
        let bounds = coll.bounds().unwrap();
        assert_eq!(bounds.min(), Coord { x: 0.0, y: 0.0 });
        assert_eq!(bounds.max(), Coord { x: 3.0, y: 4.0 });

        assert!(FeatureCollection::default().bounds().is_none());
    }
}

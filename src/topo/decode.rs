//! Expansion of encoded topology objects into polygon features.
//!
//! Arcs are shared between shapes and, in quantized documents,
//! delta-encoded: the first position of an arc is absolute and every
//! following position is an offset, all scaled through the document
//! transform. A negative arc index `i` refers to arc `!i` traversed in
//! reverse.

use geo::{Coord, Geometry, LineString, MultiPolygon, Polygon};
use serde_json::Value;
use tracing::debug;

use crate::error::{Error, Result};
use super::feature::Feature;
use super::topology::Topology;

/// Expand one named geometry object of `topo` into features.
pub(crate) fn expand_object(topo: &Topology, object: &Value) -> Result<Vec<Feature>> {
    let arcs = decode_arcs(topo.doc())?;
    let mut out = Vec::new();
    collect(object, &arcs, &mut out)?;
    Ok(out)
}

fn collect(geom: &Value, arcs: &[Vec<Coord<f64>>], out: &mut Vec<Feature>) -> Result<()> {
    match geom.get("type").and_then(Value::as_str) {
        Some("GeometryCollection") => {
            let members = geom
                .get("geometries")
                .and_then(Value::as_array)
                .ok_or_else(|| Error::format("GeometryCollection has no geometries array"))?;
            for member in members {
                collect(member, arcs, out)?;
            }
        }
        Some("Polygon") => {
            let polygon = polygon_from(arc_lists(geom)?, arcs)?;
            out.push(feature_from(geom, Geometry::Polygon(polygon)));
        }
        Some("MultiPolygon") => {
            let lists = arc_lists(geom)?;
            let mut polygons = Vec::with_capacity(lists.len());
            for polygon_arcs in lists {
                let rings = polygon_arcs
                    .as_array()
                    .ok_or_else(|| Error::format("MultiPolygon member is not an array"))?;
                polygons.push(polygon_from(rings, arcs)?);
            }
            out.push(feature_from(geom, Geometry::MultiPolygon(MultiPolygon(polygons))));
        }
        Some(other) => {
            debug!(kind = other, "skipping unsupported geometry type");
        }
        // Null geometries are legal and carry nothing to draw.
        None => {}
    }
    Ok(())
}

fn arc_lists(geom: &Value) -> Result<&Vec<Value>> {
    geom.get("arcs")
        .and_then(Value::as_array)
        .ok_or_else(|| Error::format("geometry has no arcs array"))
}

fn feature_from(geom: &Value, geometry: Geometry<f64>) -> Feature {
    let id = match geom.get("id") {
        Some(Value::String(s)) => Some(s.clone()),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    };
    let properties = geom
        .get("properties")
        .and_then(Value::as_object)
        .cloned()
        .unwrap_or_default();
    Feature { id, geometry, properties }
}

fn polygon_from(rings: &[Value], arcs: &[Vec<Coord<f64>>]) -> Result<Polygon<f64>> {
    let mut decoded = rings.iter().map(|ring| {
        let indices = ring
            .as_array()
            .ok_or_else(|| Error::format("polygon ring is not an arc index array"))?;
        ring_from(indices, arcs)
    });

    let exterior = decoded
        .next()
        .ok_or_else(|| Error::format("polygon has no exterior ring"))??;
    let interiors = decoded.collect::<Result<Vec<_>>>()?;
    Ok(Polygon::new(exterior, interiors))
}

/// Stitch a ring together from arc indices, dropping the duplicated
/// junction point where consecutive arcs meet.
fn ring_from(indices: &[Value], arcs: &[Vec<Coord<f64>>]) -> Result<LineString<f64>> {
    let mut points: Vec<Coord<f64>> = Vec::new();
    for index in indices {
        let raw = index
            .as_i64()
            .ok_or_else(|| Error::format("arc index is not an integer"))?;
        let (idx, reversed) = if raw < 0 { (!raw as usize, true) } else { (raw as usize, false) };
        let arc = arcs
            .get(idx)
            .ok_or_else(|| Error::format(format!("arc index {raw} out of range")))?;

        let append = |points: &mut Vec<Coord<f64>>, c: Coord<f64>| {
            if points.last() != Some(&c) {
                points.push(c);
            }
        };
        if reversed {
            for &c in arc.iter().rev() {
                append(&mut points, c);
            }
        } else {
            for &c in arc {
                append(&mut points, c);
            }
        }
    }
    Ok(LineString::from(points))
}

/// Decode every arc in the document. Quantized documents (those with a
/// transform) hold delta-encoded integer positions.
fn decode_arcs(doc: &Value) -> Result<Vec<Vec<Coord<f64>>>> {
    let transform = match doc.get("transform") {
        Some(t) => Some(parse_transform(t)?),
        None => None,
    };
    let arcs = doc
        .get("arcs")
        .and_then(Value::as_array)
        .ok_or_else(|| Error::format("document has no arcs array"))?;

    arcs.iter()
        .map(|arc| {
            let positions = arc
                .as_array()
                .ok_or_else(|| Error::format("arc is not a position array"))?;
            let mut out = Vec::with_capacity(positions.len());
            let (mut x, mut y) = (0.0_f64, 0.0_f64);
            for position in positions {
                let (px, py) = parse_position(position)?;
                match transform {
                    Some((sx, sy, tx, ty)) => {
                        x += px;
                        y += py;
                        out.push(Coord { x: x * sx + tx, y: y * sy + ty });
                    }
                    None => out.push(Coord { x: px, y: py }),
                }
            }
            Ok(out)
        })
        .collect()
}

fn parse_position(position: &Value) -> Result<(f64, f64)> {
    let pair = position
        .as_array()
        .ok_or_else(|| Error::format("arc position is not an array"))?;
    let x = pair.first().and_then(Value::as_f64);
    let y = pair.get(1).and_then(Value::as_f64);
    match (x, y) {
        (Some(x), Some(y)) => Ok((x, y)),
        _ => Err(Error::format("arc position is not a numeric pair")),
    }
}

fn parse_transform(t: &Value) -> Result<(f64, f64, f64, f64)> {
    let pair = |key: &str| -> Option<(f64, f64)> {
        let list = t.get(key)?.as_array()?;
        Some((list.first()?.as_f64()?, list.get(1)?.as_f64()?))
    };
    match (pair("scale"), pair("translate")) {
        (Some((sx, sy)), Some((tx, ty))) => Ok((sx, sy, tx, ty)),
        _ => Err(Error::format("malformed transform")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn topology(doc: Value) -> Topology {
        Topology::from_value(doc).unwrap()
    }

    // One quantized square: absolute first position, deltas after.
    fn square_doc() -> Value {
        json!({
            "type": "Topology",
            "transform": {"scale": [0.5, 0.5], "translate": [100.0, 10.0]},
            "arcs": [
                [[0, 0], [10, 0], [0, 10], [-10, 0], [0, -10]]
            ],
            "objects": {
                "states": {
                    "type": "GeometryCollection",
                    "geometries": [
                        {"type": "Polygon", "arcs": [[0]], "id": "56", "properties": {"name": "Wyoming"}}
                    ]
                }
            }
        })
    }

    #[test]
    fn quantized_arcs_decode_through_the_transform() {
        let topo = topology(square_doc());
        let (_, object) = topo.select_object("states", "state").unwrap();
        let features = expand_object(&topo, object).unwrap();
        assert_eq!(features.len(), 1);
        assert_eq!(features[0].id.as_deref(), Some("56"));

        let Geometry::Polygon(polygon) = &features[0].geometry else {
            panic!("expected a polygon");
        };
        let coords: Vec<(f64, f64)> = polygon.exterior().coords().map(|c| (c.x, c.y)).collect();
        // (0,0) -> scale 0.5 + translate (100,10)
        assert_eq!(coords[0], (100.0, 10.0));
        assert_eq!(coords[1], (105.0, 10.0));
        assert_eq!(coords[2], (105.0, 15.0));
        assert_eq!(coords[3], (100.0, 15.0));
        assert_eq!(*coords.last().unwrap(), (100.0, 10.0));
    }

    #[test]
    fn negative_arc_index_reverses_and_junctions_dedupe() {
        // Two arcs forming a triangle: forward arc 0, then arc 1 reversed.
        let doc = json!({
            "type": "Topology",
            "arcs": [
                [[0.0, 0.0], [4.0, 0.0], [4.0, 4.0]],
                [[0.0, 0.0], [4.0, 4.0]]
            ],
            "objects": {
                "shape": {"type": "Polygon", "arcs": [[0, -2]]}
            }
        });
        let topo = topology(doc);
        let (_, object) = topo.select_object("shape", "none").unwrap();
        let features = expand_object(&topo, object).unwrap();

        let Geometry::Polygon(polygon) = &features[0].geometry else {
            panic!("expected a polygon");
        };
        let coords: Vec<(f64, f64)> = polygon.exterior().coords().map(|c| (c.x, c.y)).collect();
        // Junction (4,4) appears once; geo closes the ring back to (0,0).
        assert_eq!(coords, vec![(0.0, 0.0), (4.0, 0.0), (4.0, 4.0), (0.0, 0.0)]);
    }

    #[test]
    fn unsupported_geometry_types_are_skipped() {
        let doc = json!({
            "type": "Topology",
            "arcs": [[[0.0, 0.0], [1.0, 1.0]]],
            "objects": {
                "mixed": {
                    "type": "GeometryCollection",
                    "geometries": [
                        {"type": "Point", "coordinates": [0.0, 0.0]},
                        {"type": "LineString", "arcs": [0]}
                    ]
                }
            }
        });
        let topo = topology(doc);
        let (_, object) = topo.select_object("mixed", "none").unwrap();
        assert!(expand_object(&topo, object).unwrap().is_empty());
    }

    #[test]
    fn out_of_range_arc_index_is_a_format_error() {
        let doc = json!({
            "type": "Topology",
            "arcs": [[[0.0, 0.0], [1.0, 1.0]]],
            "objects": {"shape": {"type": "Polygon", "arcs": [[7]]}}
        });
        let topo = topology(doc);
        let (_, object) = topo.select_object("shape", "none").unwrap();
        assert!(matches!(expand_object(&topo, object), Err(Error::Format { .. })));
    }
}

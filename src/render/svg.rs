//! Headless SVG map surface.
//!
//! Renders the current overlays into a standalone SVG document with a
//! plain equirectangular projection. Useful for the CLI and for
//! snapshotting what the viewer would draw without a browser widget.

use geo::{Coord, Geometry, Polygon, Rect};

use crate::topo::FeatureCollection;
use super::{LayerHandle, LayerStyle, MapSurface};

#[derive(Debug, Clone)]
struct Shape {
    rings: Vec<Vec<Coord<f64>>>,
    style: LayerStyle,
    title: String,
}

#[derive(Debug)]
struct SvgLayer {
    handle: LayerHandle,
    shapes: Vec<Shape>,
}

/// A map surface that accumulates overlays and serializes them to an
/// SVG document on demand.
#[derive(Debug)]
pub struct SvgSurface {
    width: f64,
    height: f64,
    next_id: u64,
    layers: Vec<SvgLayer>,
    viewport: Option<(Rect<f64>, f64)>,
}

impl SvgSurface {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height, next_id: 0, layers: Vec::new(), viewport: None }
    }

    /// Serialize the live overlays to an SVG document string.
    pub fn to_svg(&self) -> String {
        let bounds = self.view_bounds();
        let span_x = (bounds.max().x - bounds.min().x).max(f64::EPSILON);
        let span_y = (bounds.max().y - bounds.min().y).max(f64::EPSILON);
        let scale = (self.width / span_x).min(self.height / span_y);
        // Center the projected extent inside the canvas.
        let offset_x = (self.width - span_x * scale) / 2.0;
        let offset_y = (self.height - span_y * scale) / 2.0;

        let project = |c: &Coord<f64>| -> (f64, f64) {
            let x = (c.x - bounds.min().x) * scale + offset_x;
            let y = self.height - ((c.y - bounds.min().y) * scale + offset_y);
            (x, y)
        };

        let mut out = String::new();
        out.push_str(r##"<?xml version="1.0" encoding="UTF-8" standalone="no"?>"##);
        out.push('\n');
        out.push_str(&format!(
            r##"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}" data-lon-min="{lon_min}" data-lon-max="{lon_max}" data-lat-min="{lat_min}" data-lat-max="{lat_max}">"##,
            w = self.width,
            h = self.height,
            lon_min = bounds.min().x,
            lon_max = bounds.max().x,
            lat_min = bounds.min().y,
            lat_max = bounds.max().y,
        ));
        out.push('\n');
        out.push_str(r##"<rect width="100%" height="100%" fill="#ffffff"/>"##);
        out.push('\n');

        for layer in &self.layers {
            out.push_str(&format!(r##"<g data-layer="{}">"##, layer.handle.0));
            out.push('\n');
            for shape in &layer.shapes {
                let mut d = String::new();
                for ring in &shape.rings {
                    for (i, coord) in ring.iter().enumerate() {
                        let (x, y) = project(coord);
                        let op = if i == 0 { 'M' } else { 'L' };
                        d.push_str(&format!("{op}{x:.2},{y:.2} "));
                    }
                    d.push_str("Z ");
                }

                let dash = shape
                    .style
                    .dash
                    .as_deref()
                    .map(|dash| format!(r##" stroke-dasharray="{dash}""##))
                    .unwrap_or_default();
                out.push_str(&format!(
                    r##"<path d="{d}" fill="{fill}" fill-opacity="{opacity}" stroke="{stroke}" stroke-width="{weight}"{dash} vector-effect="non-scaling-stroke"><title>{title}</title></path>"##,
                    d = d.trim_end(),
                    fill = shape.style.fill_color,
                    opacity = shape.style.fill_opacity,
                    stroke = shape.style.color,
                    weight = shape.style.weight,
                    title = escape(&shape.title),
                ));
                out.push('\n');
            }
            out.push_str("</g>\n");
        }

        out.push_str("</svg>\n");
        out
    }

    /// The extent the document should show: the fitted viewport plus
    /// its padding, else everything drawn, else the whole world.
    fn view_bounds(&self) -> Rect<f64> {
        if let Some((bounds, padding)) = self.viewport {
            let pad_x = (bounds.max().x - bounds.min().x) * padding;
            let pad_y = (bounds.max().y - bounds.min().y) * padding;
            return Rect::new(
                Coord { x: bounds.min().x - pad_x, y: bounds.min().y - pad_y },
                Coord { x: bounds.max().x + pad_x, y: bounds.max().y + pad_y },
            );
        }

        self.layers
            .iter()
            .flat_map(|layer| layer.shapes.iter())
            .flat_map(|shape| shape.rings.iter())
            .flat_map(|ring| ring.iter())
            .fold(None::<Rect<f64>>, |acc, c| {
                Some(match acc {
                    None => Rect::new(*c, *c),
                    Some(r) => Rect::new(
                        Coord { x: r.min().x.min(c.x), y: r.min().y.min(c.y) },
                        Coord { x: r.max().x.max(c.x), y: r.max().y.max(c.y) },
                    ),
                })
            })
            .unwrap_or_else(|| {
                Rect::new(Coord { x: -180.0, y: -90.0 }, Coord { x: 180.0, y: 90.0 })
            })
    }
}

fn rings_of(geometry: &Geometry<f64>) -> Vec<Vec<Coord<f64>>> {
    fn polygon_rings(polygon: &Polygon<f64>, out: &mut Vec<Vec<Coord<f64>>>) {
        out.push(polygon.exterior().coords().copied().collect());
        for interior in polygon.interiors() {
            out.push(interior.coords().copied().collect());
        }
    }

    let mut out = Vec::new();
    match geometry {
        Geometry::Polygon(polygon) => polygon_rings(polygon, &mut out),
        Geometry::MultiPolygon(mp) => {
            for polygon in &mp.0 {
                polygon_rings(polygon, &mut out);
            }
        }
        // The topology decoder only produces polygons.
        _ => {}
    }
    out
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}

impl MapSurface for SvgSurface {
    fn add_layer(
        &mut self,
        features: &FeatureCollection,
        styles: &[LayerStyle],
        popups: &[String],
    ) -> LayerHandle {
        self.next_id += 1;
        let handle = LayerHandle(self.next_id);

        let shapes = features
            .iter()
            .enumerate()
            .map(|(i, feature)| Shape {
                rings: rings_of(&feature.geometry),
                style: styles.get(i).cloned().unwrap_or_else(LayerStyle::district),
                title: popups.get(i).cloned().unwrap_or_default(),
            })
            .collect();
        self.layers.push(SvgLayer { handle, shapes });
        handle
    }

    fn remove_layer(&mut self, handle: LayerHandle) {
        self.layers.retain(|layer| layer.handle != handle);
    }

    fn fit_bounds(&mut self, bounds: Rect<f64>, padding: f64) {
        self.viewport = Some((bounds, padding));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::polygon;
    use serde_json::json;

    use crate::topo::Feature;

    fn square_feature() -> Feature {
        Feature {
            id: None,
            geometry: Geometry::Polygon(polygon![
                (x: 10.0, y: 10.0), (x: 20.0, y: 10.0), (x: 20.0, y: 20.0), (x: 10.0, y: 20.0),
            ]),
            properties: json!({"STATEFP": "06", "CD116FP": "01"}).as_object().cloned().unwrap(),
        }
    }

    #[test]
    fn empty_surface_still_renders_a_document() {
        let surface = SvgSurface::new(400.0, 300.0);
        let svg = surface.to_svg();
        assert!(svg.starts_with("<?xml"));
        assert!(svg.contains("<svg"));
        assert!(svg.ends_with("</svg>\n"));
    }

    #[test]
    fn shapes_carry_style_and_popup_title() {
        let mut surface = SvgSurface::new(400.0, 300.0);
        let features = FeatureCollection(vec![square_feature()]);
        let style = LayerStyle {
            color: "#1565c0".to_string(),
            weight: 2.0,
            dash: Some("6 3".to_string()),
            fill_color: "#90caf9".to_string(),
            fill_opacity: 0.4,
        };
        surface.add_layer(&features, &[style], &["District 01 (CA)".to_string()]);

        let svg = surface.to_svg();
        assert!(svg.contains(r##"stroke-dasharray="6 3""##));
        assert!(svg.contains(r##"fill="#90caf9""##));
        assert!(svg.contains("<title>District 01 (CA)</title>"));
    }

    #[test]
    fn removed_layers_disappear_from_the_document() {
        let mut surface = SvgSurface::new(400.0, 300.0);
        let features = FeatureCollection(vec![square_feature()]);
        let handle = surface.add_layer(&features, &[LayerStyle::district()], &[String::new()]);
        surface.remove_layer(handle);
        assert!(!surface.to_svg().contains("<path"));
    }

    #[test]
    fn fitted_viewport_drives_the_document_extent() {
        let mut surface = SvgSurface::new(400.0, 300.0);
        let features = FeatureCollection(vec![square_feature()]);
        surface.add_layer(&features, &[LayerStyle::district()], &[String::new()]);
        surface.fit_bounds(
            Rect::new(Coord { x: 10.0, y: 10.0 }, Coord { x: 20.0, y: 20.0 }),
            0.1,
        );

        let svg = surface.to_svg();
        assert!(svg.contains(r##"data-lon-min="9""##));
        assert!(svg.contains(r##"data-lon-max="21""##));
    }
}

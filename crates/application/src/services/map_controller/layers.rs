//! Sources and layers drawn by the map controller

use domain::{CongestionSegment, Coordinate, IsochronePolygon};
use serde_json::{Value, json};

use crate::ports::{LayerKind, LayerSpec};

/// Route data source
pub const ROUTE_SOURCE: &str = "route";
/// Colored route line, drawn on top
pub const ROUTE_LINE_LAYER: &str = "route-line";
/// Dark contrast outline under the route line
pub const ROUTE_OUTLINE_LAYER: &str = "route-outline";

/// Isochrone data source
pub const ISOCHRONE_SOURCE: &str = "isochrone";
/// Translucent reachable-area fill
pub const ISOCHRONE_FILL_LAYER: &str = "isochrone-fill";
/// Reachable-area border
pub const ISOCHRONE_OUTLINE_LAYER: &str = "isochrone-outline";

/// Layers of the route source, topmost first (removal order)
pub const ROUTE_LAYERS: [&str; 2] = [ROUTE_LINE_LAYER, ROUTE_OUTLINE_LAYER];
/// Layers of the isochrone source, topmost first (removal order)
pub const ISOCHRONE_LAYERS: [&str; 2] = [ISOCHRONE_OUTLINE_LAYER, ISOCHRONE_FILL_LAYER];

const OUTLINE_COLOR: &str = "#0f172a";
const ISOCHRONE_COLOR: &str = "#3b82f6";

/// Dash patterns cycled by the route drawing animation
pub const DASH_SEQUENCE: [&[f64]; 14] = [
    &[0.0, 4.0, 3.0],
    &[0.5, 4.0, 2.5],
    &[1.0, 4.0, 2.0],
    &[1.5, 4.0, 1.5],
    &[2.0, 4.0, 1.0],
    &[2.5, 4.0, 0.5],
    &[3.0, 4.0, 0.0],
    &[0.0, 0.5, 3.0, 3.5],
    &[0.0, 1.0, 3.0, 3.0],
    &[0.0, 1.5, 3.0, 2.5],
    &[0.0, 2.0, 3.0, 2.0],
    &[0.0, 2.5, 3.0, 1.5],
    &[0.0, 3.0, 3.0, 1.0],
    &[0.0, 3.5, 3.0, 0.5],
];

fn position(c: &Coordinate) -> Value {
    json!([c.longitude(), c.latitude()])
}

/// One LineString feature per segment, carrying its level and color
pub fn route_feature_collection(segments: &[CongestionSegment]) -> Value {
    let features: Vec<Value> = segments
        .iter()
        .map(|s| {
            json!({
                "type": "Feature",
                "properties": {
                    "level": s.level.to_string(),
                    "color": s.level.color(),
                },
                "geometry": {
                    "type": "LineString",
                    "coordinates": [position(&s.coordinate_pair[0]), position(&s.coordinate_pair[1])],
                },
            })
        })
        .collect();

    json!({ "type": "FeatureCollection", "features": features })
}

/// Single Polygon feature for the isochrone ring
pub fn isochrone_feature(polygon: &IsochronePolygon) -> Value {
    let ring: Vec<Value> = polygon.ring().iter().map(position).collect();
    json!({
        "type": "Feature",
        "properties": { "contour": polygon.minutes },
        "geometry": { "type": "Polygon", "coordinates": [ring] },
    })
}

fn round_line_layout() -> Value {
    json!({ "line-join": "round", "line-cap": "round" })
}

/// Low-opacity dark outline
pub fn route_outline_layer() -> LayerSpec {
    LayerSpec {
        id: ROUTE_OUTLINE_LAYER.to_string(),
        source: ROUTE_SOURCE.to_string(),
        kind: LayerKind::Line,
        paint: json!({
            "line-color": OUTLINE_COLOR,
            "line-width": 9,
            "line-opacity": 0.25,
        }),
        layout: round_line_layout(),
    }
}

/// Line colored by each feature's `color` property
pub fn route_line_layer() -> LayerSpec {
    LayerSpec {
        id: ROUTE_LINE_LAYER.to_string(),
        source: ROUTE_SOURCE.to_string(),
        kind: LayerKind::Line,
        paint: json!({
            "line-color": ["get", "color"],
            "line-width": 5,
            "line-dasharray": DASH_SEQUENCE[0],
        }),
        layout: round_line_layout(),
    }
}

pub fn isochrone_fill_layer() -> LayerSpec {
    LayerSpec {
        id: ISOCHRONE_FILL_LAYER.to_string(),
        source: ISOCHRONE_SOURCE.to_string(),
        kind: LayerKind::Fill,
        paint: json!({ "fill-color": ISOCHRONE_COLOR, "fill-opacity": 0.15 }),
        layout: json!({}),
    }
}

pub fn isochrone_outline_layer() -> LayerSpec {
    LayerSpec {
        id: ISOCHRONE_OUTLINE_LAYER.to_string(),
        source: ISOCHRONE_SOURCE.to_string(),
        kind: LayerKind::Line,
        paint: json!({ "line-color": ISOCHRONE_COLOR, "line-width": 2 }),
        layout: round_line_layout(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::{CongestionLevel, segment};

    #[test]
    fn route_features_carry_level_colors() {
        let coords = [
            Coordinate::new(11.50, 3.85).unwrap(),
            Coordinate::new(11.51, 3.86).unwrap(),
            Coordinate::new(11.52, 3.87).unwrap(),
        ];
        let data = route_feature_collection(&segment(
            &coords,
            &[CongestionLevel::Severe, CongestionLevel::Moderate],
        ));

        let features = data["features"].as_array().unwrap();
        assert_eq!(features.len(), 2);
        assert_eq!(features[0]["properties"]["color"], "#ef4444");
        assert_eq!(features[0]["properties"]["level"], "severe");
        assert_eq!(features[1]["properties"]["color"], "#3b82f6");
        assert_eq!(features[1]["geometry"]["coordinates"][1][0], 11.52);
    }

    #[test]
    fn line_color_reads_feature_property() {
        let layer = route_line_layer();
        assert_eq!(layer.paint["line-color"], json!(["get", "color"]));
        assert_eq!(route_outline_layer().source, layer.source);
    }

    #[test]
    fn isochrone_ring_is_nested_once() {
        let ring = vec![
            Coordinate::new(11.48, 3.83).unwrap(),
            Coordinate::new(11.53, 3.83).unwrap(),
            Coordinate::new(11.53, 3.87).unwrap(),
            Coordinate::new(11.48, 3.83).unwrap(),
        ];
        let polygon = IsochronePolygon::new(Coordinate::yaounde(), 15, ring).unwrap();
        let feature = isochrone_feature(&polygon);

        assert_eq!(feature["geometry"]["coordinates"][0].as_array().unwrap().len(), 4);
        assert_eq!(feature["properties"]["contour"], 15);
    }
}

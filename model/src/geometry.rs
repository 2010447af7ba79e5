use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One drawable point, in the order the map canvas wants it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

/// Geometry exactly as it appears in a layer record: a type tag and a nested
/// `[lng, lat]` coordinate array. The nesting depth depends on the type, and
/// upstream data is messy enough that we only interpret it when drawing.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct RawGeometry {
    #[serde(default)]
    pub geometry_type: Option<String>,
    #[serde(default)]
    pub coordinates: Option<Value>,
}

impl RawGeometry {
    pub fn new(geometry_type: &str, coordinates: Value) -> Self {
        Self {
            geometry_type: Some(geometry_type.to_string()),
            coordinates: Some(coordinates),
        }
    }

    pub fn is_polygonal(&self) -> bool {
        matches!(
            self.geometry_type.as_deref(),
            Some("Polygon") | Some("MultiPolygon")
        )
    }
}

/// Flattens a record's geometry into the list of paths to draw.
///
/// Polygons contribute their outer ring only; holes are not rendered.
/// Anything unsupported or malformed is skipped without failing the rest of
/// the layer.
pub fn normalize(geometry: &RawGeometry) -> Vec<Vec<LatLng>> {
    let coordinates = match geometry.coordinates {
        Some(ref value) => value,
        None => return Vec::new(),
    };
    match geometry.geometry_type.as_deref() {
        Some("LineString") => parse_path(coordinates).into_iter().collect(),
        Some("MultiLineString") => parse_paths(coordinates),
        Some("Polygon") => outer_ring(coordinates).into_iter().collect(),
        Some("MultiPolygon") => match coordinates.as_array() {
            Some(polygons) => polygons.iter().filter_map(outer_ring).collect(),
            None => Vec::new(),
        },
        _ => Vec::new(),
    }
}

pub(crate) fn parse_position(value: &Value) -> Option<LatLng> {
    let pair = value.as_array()?;
    if pair.len() < 2 {
        return None;
    }
    // Stored [lng, lat], drawn {lat, lng}
    let lng = pair[0].as_f64()?;
    let lat = pair[1].as_f64()?;
    Some(LatLng { lat, lng })
}

fn parse_path(value: &Value) -> Option<Vec<LatLng>> {
    let positions = value.as_array()?;
    if positions.is_empty() {
        return None;
    }
    let mut path = Vec::with_capacity(positions.len());
    for position in positions {
        path.push(parse_position(position)?);
    }
    Some(path)
}

fn parse_paths(value: &Value) -> Vec<Vec<LatLng>> {
    match value.as_array() {
        Some(segments) => segments.iter().filter_map(parse_path).collect(),
        None => Vec::new(),
    }
}

fn outer_ring(value: &Value) -> Option<Vec<LatLng>> {
    parse_path(value.as_array()?.first()?)
}

use geojson::{FeatureCollection, GeoJson};
use serde_json::Value;

use crate::{Feature, RawGeometry};

/// Exports a visible subset as a GeoJSON FeatureCollection: geometry passed
/// through as stored, properties flattened from the layer record.
pub fn to_geojson(features: &[&Feature]) -> GeoJson {
    let mut out = Vec::new();
    for feature in features {
        out.push(geojson::Feature {
            bbox: None,
            geometry: geometry(&feature.geometry),
            id: None,
            properties: properties(feature),
            foreign_members: None,
        });
    }
    GeoJson::FeatureCollection(FeatureCollection {
        features: out,
        bbox: None,
        foreign_members: None,
    })
}

fn geometry(raw: &RawGeometry) -> Option<geojson::Geometry> {
    let geometry_type = raw.geometry_type.clone()?;
    let coordinates = raw.coordinates.clone()?;
    serde_json::from_value(serde_json::json!({
        "type": geometry_type,
        "coordinates": coordinates,
    }))
    .ok()
}

fn properties(feature: &Feature) -> Option<geojson::JsonObject> {
    match serde_json::to_value(&feature.props) {
        Ok(Value::Object(obj)) => Some(obj),
        _ => None,
    }
}

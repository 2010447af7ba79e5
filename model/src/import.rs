//! Converts raw GeoJSON FeatureCollections into the flat per-layer records
//! the dashboard serves, optionally restricted to California.

use anyhow::Result;
use geojson::JsonObject;
use serde_json::Value;

use crate::geometry::parse_position;
use crate::layers::{BottleneckProps, RouteProps, StationProps, TractProps};
use crate::{normalize, Feature, LatLng, LayerName, Props, RawGeometry};

#[derive(Clone, Copy, Debug)]
pub struct Bounds {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lng: f64,
    pub max_lng: f64,
}

pub const CA_BOUNDS: Bounds = Bounds {
    min_lat: 32.5,
    max_lat: 42.0,
    min_lng: -124.5,
    max_lng: -114.0,
};

impl Bounds {
    pub fn contains(&self, pt: LatLng) -> bool {
        self.min_lng <= pt.lng
            && pt.lng <= self.max_lng
            && self.min_lat <= pt.lat
            && pt.lat <= self.max_lat
    }
}

/// True only for line geometry with every coordinate inside the bounds.
pub fn strictly_within(bounds: &Bounds, geometry: &RawGeometry) -> bool {
    match geometry.geometry_type.as_deref() {
        Some("LineString") | Some("MultiLineString") => {
            let paths = normalize(geometry);
            !paths.is_empty() && paths.iter().flatten().all(|pt| bounds.contains(*pt))
        }
        _ => false,
    }
}

/// Parses a raw GeoJSON document and converts its FeatureCollection.
pub fn convert_geojson(name: LayerName, raw: &str, ca_only: bool) -> Result<Vec<Feature>> {
    let collection = match raw.parse::<geojson::GeoJson>()? {
        geojson::GeoJson::FeatureCollection(x) => x,
        _ => bail!("expected a FeatureCollection"),
    };
    let features = convert(name, &collection, ca_only)?;
    info!(
        "Converted {} of {} upstream features for {name}",
        features.len(),
        collection.features.len()
    );
    Ok(features)
}

pub fn convert(
    name: LayerName,
    collection: &geojson::FeatureCollection,
    ca_only: bool,
) -> Result<Vec<Feature>> {
    let mut features = Vec::new();
    for feature in &collection.features {
        let geometry = raw_geometry(feature.geometry.as_ref());
        let props = feature.properties.as_ref();
        let converted = match name {
            LayerName::Routes => {
                if ca_only && !strictly_within(&CA_BOUNDS, &geometry) {
                    continue;
                }
                route(&geometry, props)
            }
            LayerName::Stations => {
                if ca_only && prop_string(props, "STATE").as_deref() != Some("CA") {
                    continue;
                }
                match station(&geometry, props) {
                    Some(x) => x,
                    // The original prep drops stations without a position
                    None => continue,
                }
            }
            LayerName::Bottlenecks => bottleneck(&geometry, props),
            LayerName::LowIncome => tract(&geometry, props),
            LayerName::AiSuggested => bail!("ai_suggested is never imported"),
        };
        features.push(converted);
    }
    Ok(features)
}

fn route(geometry: &RawGeometry, props: Option<&JsonObject>) -> Feature {
    Feature {
        geometry: geometry.clone(),
        props: Props::Route(RouteProps {
            route_id: prop_string(props, "route_id"),
            route_short_name: prop_string(props, "route_short_name"),
            route_long_name: prop_string(props, "route_long_name"),
            route_type: prop_string(props, "route_type"),
        }),
    }
}

fn station(geometry: &RawGeometry, props: Option<&JsonObject>) -> Option<Feature> {
    let position = geometry
        .coordinates
        .as_ref()
        .and_then(parse_position)?;
    Some(Feature {
        geometry: RawGeometry::default(),
        props: Props::Station(StationProps {
            station_id: prop_string(props, "FAC_ID"),
            fac_name: prop_string(props, "FAC_NAME"),
            address: prop_string(props, "ADDRESS"),
            city: prop_string(props, "CITY"),
            state: prop_string(props, "STATE"),
            zipcode: prop_string(props, "ZIPCODE"),
            longitude: Some(position.lng),
            latitude: Some(position.lat),
            mode_type: prop_string(props, "FAC_TYPE"),
            mode_bus: prop_flag(props, "MODE_BUS"),
            mode_air: prop_flag(props, "MODE_AIR"),
            mode_rail: prop_flag(props, "MODE_RAIL"),
            mode_ferry: prop_flag(props, "MODE_FERRY"),
            mode_bike: prop_flag(props, "MODE_BIKE"),
            website: prop_string(props, "WEBSITE"),
            notes: prop_string(props, "NOTES"),
        }),
    })
}

fn bottleneck(geometry: &RawGeometry, props: Option<&JsonObject>) -> Feature {
    Feature {
        geometry: geometry.clone(),
        props: Props::Bottleneck(BottleneckProps {
            name: prop_string(props, "Name"),
            rank: prop_f64(props, "Rank"),
            county: prop_string(props, "County"),
            direction: prop_string(props, "Direction"),
            delay_hours: prop_f64(props, "Total_Delay__veh_hrs_"),
            extent_miles: prop_f64(props, "Avg_Extent__Miles_"),
            shape_length: prop_f64(props, "Shape_Length"),
        }),
    }
}

fn tract(geometry: &RawGeometry, props: Option<&JsonObject>) -> Feature {
    Feature {
        geometry: geometry.clone(),
        props: Props::Tract(TractProps {
            geoid: prop_string(props, "GEOID"),
            tract: prop_string(props, "NAMELSAD"),
            county: prop_string(props, "County"),
            zip: prop_string(props, "ZIP"),
            population: prop_f64(props, "Population"),
            poverty_pct: prop_f64(props, "Poverty"),
            ci_score: prop_f64(props, "CIscore"),
            dac_status: prop_string(props, "DAC_and_or_LIC"),
            income_group: prop_string(props, "Income_Group"),
        }),
    }
}

/// Keeps the type tag and coordinate array exactly as they appear upstream.
fn raw_geometry(geometry: Option<&geojson::Geometry>) -> RawGeometry {
    let geometry = match geometry {
        Some(x) => x,
        None => return RawGeometry::default(),
    };
    match serde_json::to_value(geometry) {
        Ok(Value::Object(mut obj)) => RawGeometry {
            geometry_type: obj
                .get("type")
                .and_then(|t| t.as_str())
                .map(|t| t.to_string()),
            coordinates: obj.remove("coordinates"),
        },
        _ => RawGeometry::default(),
    }
}

fn prop_string(props: Option<&JsonObject>, key: &str) -> Option<String> {
    match props?.get(key)? {
        Value::String(x) => Some(x.clone()),
        Value::Number(x) => Some(x.to_string()),
        _ => None,
    }
}

fn prop_f64(props: Option<&JsonObject>, key: &str) -> Option<f64> {
    props?.get(key)?.as_f64()
}

fn prop_flag(props: Option<&JsonObject>, key: &str) -> i64 {
    match props.and_then(|p| p.get(key)) {
        Some(Value::Number(x)) => x.as_i64().unwrap_or(0),
        Some(Value::String(x)) => x.parse().unwrap_or(0),
        _ => 0,
    }
}

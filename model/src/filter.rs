use std::collections::BTreeSet;
use std::str::FromStr;

use anyhow::Result;

use crate::{Feature, Layer, Props, StationProps};

pub const ROUTE_TYPE_CODES: [&str; 6] = ["0", "1", "2", "3", "4", "5"];

/// The current filter selection. Filtering is a pure function of
/// (layer, filter state); the same inputs always yield the same subset, in
/// the layer's insertion order.
#[derive(Clone, Debug, PartialEq)]
pub struct FilterState {
    /// Enabled route-type codes. An empty set hides every route.
    pub route_types: BTreeSet<String>,
    /// Case-insensitive substring match against names.
    pub name_search: String,
    pub mode: Option<Mode>,
    pub state: Option<String>,
}

impl FilterState {
    pub fn new() -> Self {
        Self {
            route_types: ROUTE_TYPE_CODES.iter().map(|x| x.to_string()).collect(),
            name_search: String::new(),
            mode: None,
            state: None,
        }
    }

    /// The enabled codes joined for the AI endpoints' map context.
    pub fn active_route_types(&self) -> String {
        self.route_types
            .iter()
            .map(|x| x.as_str())
            .collect::<Vec<_>>()
            .join(",")
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
    Bus,
    Air,
    Rail,
    Ferry,
    Bike,
}

impl Mode {
    fn flag(self, station: &StationProps) -> i64 {
        match self {
            Mode::Bus => station.mode_bus,
            Mode::Air => station.mode_air,
            Mode::Rail => station.mode_rail,
            Mode::Ferry => station.mode_ferry,
            Mode::Bike => station.mode_bike,
        }
    }
}

impl FromStr for Mode {
    type Err = anyhow::Error;

    fn from_str(x: &str) -> Result<Self> {
        match x.to_lowercase().as_str() {
            "bus" => Ok(Mode::Bus),
            "air" => Ok(Mode::Air),
            "rail" => Ok(Mode::Rail),
            "ferry" => Ok(Mode::Ferry),
            "bike" => Ok(Mode::Bike),
            _ => bail!("unknown mode {x}"),
        }
    }
}

/// The visible subset of a layer, in the layer's own order.
pub fn compute_visible<'a>(layer: &'a Layer, filter: &FilterState) -> Vec<&'a Feature> {
    layer
        .features
        .iter()
        .filter(|f| feature_visible(f, filter))
        .collect()
}

pub fn feature_visible(feature: &Feature, filter: &FilterState) -> bool {
    match feature.props {
        Props::Route(ref route) => {
            let code = match route.route_type {
                Some(ref x) => x.as_str(),
                None => return false,
            };
            if !filter.route_types.contains(code) {
                return false;
            }
            name_matches(
                &filter.name_search,
                [&route.route_short_name, &route.route_long_name],
            )
        }
        Props::Station(ref station) => {
            if let Some(ref state) = filter.state {
                if station.state.as_deref() != Some(state.to_uppercase().as_str()) {
                    return false;
                }
            }
            if let Some(mode) = filter.mode {
                if mode.flag(station) != 1 {
                    return false;
                }
            }
            name_matches(&filter.name_search, [&station.fac_name, &None])
        }
        // Bottlenecks, tracts and suggestions show in full whenever their
        // layer is on
        _ => true,
    }
}

fn name_matches(search: &str, names: [&Option<String>; 2]) -> bool {
    if search.is_empty() {
        return true;
    }
    let needle = search.to_lowercase();
    names
        .iter()
        .any(|name| match name {
            Some(x) => x.to_lowercase().contains(&needle),
            None => false,
        })
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use serde_json::json;

    use super::{compute_visible, FilterState, Mode};
    use crate::layers::{RouteProps, StationProps};
    use crate::{Feature, Layer, LayerName, Props, RawGeometry};

    fn route(name: &str, route_type: &str) -> Feature {
        Feature {
            geometry: RawGeometry::new("LineString", json!([[0, 0], [1, 1]])),
            props: Props::Route(RouteProps {
                route_id: Some(name.to_string()),
                route_short_name: Some(name.to_string()),
                route_long_name: None,
                route_type: Some(route_type.to_string()),
            }),
        }
    }

    fn routes_layer(features: Vec<Feature>) -> Layer {
        Layer {
            name: LayerName::Routes,
            features,
        }
    }

    fn only(codes: &[&str]) -> FilterState {
        FilterState {
            route_types: codes.iter().map(|x| x.to_string()).collect(),
            ..FilterState::new()
        }
    }

    #[test]
    fn empty_enabled_set_means_empty_result() {
        let layer = routes_layer(vec![route("A", "1"), route("B", "2")]);
        let filter = FilterState {
            route_types: BTreeSet::new(),
            ..FilterState::new()
        };
        assert!(compute_visible(&layer, &filter).is_empty());
    }

    #[test]
    fn route_type_is_compared_in_string_form() {
        let layer = routes_layer(vec![route("A", "1")]);
        assert!(compute_visible(&layer, &only(&["2"])).is_empty());
        assert_eq!(compute_visible(&layer, &only(&["1"])).len(), 1);
    }

    #[test]
    fn name_search_is_and_combined_and_case_insensitive() {
        let layer = routes_layer(vec![route("Fresno Express", "1"), route("Coastal", "1")]);
        let filter = FilterState {
            name_search: "fresno".to_string(),
            ..only(&["1"])
        };
        let visible = compute_visible(&layer, &filter);
        assert_eq!(visible.len(), 1);

        // Matching name, but the type is disabled
        let filter = FilterState {
            name_search: "fresno".to_string(),
            ..only(&["2"])
        };
        assert!(compute_visible(&layer, &filter).is_empty());
    }

    #[test]
    fn preserves_layer_order() {
        let layer = routes_layer(vec![route("C", "1"), route("A", "1"), route("B", "1")]);
        let visible = compute_visible(&layer, &FilterState::new());
        let names: Vec<_> = visible
            .iter()
            .map(|f| match f.props {
                Props::Route(ref r) => r.route_short_name.clone().unwrap(),
                _ => unreachable!(),
            })
            .collect();
        assert_eq!(names, vec!["C", "A", "B"]);
    }

    fn station(name: &str, state: &str, bus: i64) -> Feature {
        Feature {
            geometry: RawGeometry::default(),
            props: Props::Station(StationProps {
                station_id: None,
                fac_name: Some(name.to_string()),
                address: None,
                city: None,
                state: Some(state.to_string()),
                zipcode: None,
                longitude: Some(-119.0),
                latitude: Some(36.0),
                mode_type: None,
                mode_bus: bus,
                mode_air: 0,
                mode_rail: 0,
                mode_ferry: 0,
                mode_bike: 0,
                website: None,
                notes: None,
            }),
        }
    }

    #[test]
    fn stations_filter_by_state_and_mode() {
        let layer = Layer {
            name: LayerName::Stations,
            features: vec![
                station("Fresno", "CA", 1),
                station("Reno", "NV", 1),
                station("Oakland Ferry", "CA", 0),
            ],
        };

        let filter = FilterState {
            state: Some("ca".to_string()),
            ..FilterState::new()
        };
        assert_eq!(compute_visible(&layer, &filter).len(), 2);

        let filter = FilterState {
            state: Some("CA".to_string()),
            mode: Some(Mode::Bus),
            ..FilterState::new()
        };
        assert_eq!(compute_visible(&layer, &filter).len(), 1);
    }
}

use std::io::Read;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::deserialize_code;
use crate::{Feature, Props, RawGeometry};

#[derive(Clone, Debug, Serialize)]
pub struct RouteProps {
    pub route_id: Option<String>,
    pub route_short_name: Option<String>,
    pub route_long_name: Option<String>,
    /// GTFS route type code ("0" tram through "5" cable car), kept in string
    /// form because that's how the filter compares it.
    pub route_type: Option<String>,
}

impl RouteProps {
    pub fn describe(&self) -> String {
        for x in [&self.route_short_name, &self.route_long_name, &self.route_id] {
            if let Some(x) = x {
                return x.to_string();
            }
        }
        "unnamed route".to_string()
    }
}

#[derive(Deserialize)]
struct Record {
    #[serde(default)]
    route_id: Option<String>,
    #[serde(default)]
    route_short_name: Option<String>,
    #[serde(default)]
    route_long_name: Option<String>,
    #[serde(default, deserialize_with = "deserialize_code")]
    route_type: Option<String>,
    #[serde(default)]
    geometry_type: Option<String>,
    #[serde(default)]
    coordinates: Option<Value>,
}

pub fn load<R: Read>(reader: R) -> Result<Vec<Feature>> {
    let records: Vec<Record> = serde_json::from_reader(reader)?;
    Ok(records
        .into_iter()
        .map(|rec| Feature {
            geometry: RawGeometry {
                geometry_type: rec.geometry_type,
                coordinates: rec.coordinates,
            },
            props: Props::Route(RouteProps {
                route_id: rec.route_id,
                route_short_name: rec.route_short_name,
                route_long_name: rec.route_long_name,
                route_type: rec.route_type,
            }),
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::load;
    use crate::Props;

    #[test]
    fn route_type_keeps_string_form() {
        let raw = r#"[
            {"route_id": "A", "route_type": 3, "geometry_type": "LineString", "coordinates": [[0, 0], [1, 1]]},
            {"route_id": "B", "route_type": "2"}
        ]"#;
        let features = load(raw.as_bytes()).unwrap();
        assert_eq!(features.len(), 2);
        match features[0].props {
            Props::Route(ref r) => assert_eq!(r.route_type.as_deref(), Some("3")),
            _ => unreachable!(),
        }
        match features[1].props {
            Props::Route(ref r) => assert_eq!(r.route_type.as_deref(), Some("2")),
            _ => unreachable!(),
        }
    }
}

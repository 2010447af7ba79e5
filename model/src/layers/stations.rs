use std::io::Read;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use super::deserialize_code;
use crate::{Feature, LatLng, Props, RawGeometry};

/// One intermodal passenger station, drawn as a marker.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StationProps {
    #[serde(default, deserialize_with = "deserialize_code")]
    pub station_id: Option<String>,
    #[serde(default)]
    pub fac_name: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default, deserialize_with = "deserialize_code")]
    pub zipcode: Option<String>,
    #[serde(default)]
    pub longitude: Option<f64>,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub mode_type: Option<String>,
    #[serde(default)]
    pub mode_bus: i64,
    #[serde(default)]
    pub mode_air: i64,
    #[serde(default)]
    pub mode_rail: i64,
    #[serde(default)]
    pub mode_ferry: i64,
    #[serde(default)]
    pub mode_bike: i64,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl StationProps {
    pub fn position(&self) -> Option<LatLng> {
        Some(LatLng::new(self.latitude?, self.longitude?))
    }
}

pub fn load<R: Read>(reader: R) -> Result<Vec<Feature>> {
    let records: Vec<StationProps> = serde_json::from_reader(reader)?;
    Ok(records
        .into_iter()
        .map(|props| Feature {
            geometry: RawGeometry::default(),
            props: Props::Station(props),
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::load;
    use crate::Props;

    #[test]
    fn loads_flat_station_records() {
        let raw = r#"[{
            "station_id": 4521,
            "fac_name": "Fresno Amtrak",
            "state": "CA",
            "zipcode": "93721",
            "longitude": -119.78,
            "latitude": 36.73,
            "mode_bus": 1,
            "mode_rail": 1
        }]"#;
        let features = load(raw.as_bytes()).unwrap();
        assert_eq!(features.len(), 1);
        match features[0].props {
            Props::Station(ref s) => {
                assert_eq!(s.station_id.as_deref(), Some("4521"));
                assert_eq!(s.mode_rail, 1);
                assert_eq!(s.mode_air, 0);
                let pos = s.position().unwrap();
                assert_eq!(pos.lat, 36.73);
            }
            _ => unreachable!(),
        }
    }
}

use std::io::Read;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{Feature, Props, RawGeometry};

/// One congestion bottleneck segment from the state ranking.
#[derive(Clone, Debug, Serialize)]
pub struct BottleneckProps {
    pub name: Option<String>,
    pub rank: Option<f64>,
    pub county: Option<String>,
    pub direction: Option<String>,
    pub delay_hours: Option<f64>,
    pub extent_miles: Option<f64>,
    pub shape_length: Option<f64>,
}

#[derive(Deserialize)]
struct Record {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    rank: Option<f64>,
    #[serde(default)]
    county: Option<String>,
    #[serde(default)]
    direction: Option<String>,
    #[serde(default)]
    delay_hours: Option<f64>,
    #[serde(default)]
    extent_miles: Option<f64>,
    #[serde(default)]
    shape_length: Option<f64>,
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
            props: Props::Bottleneck(BottleneckProps {
                name: rec.name,
                rank: rec.rank,
                county: rec.county,
                direction: rec.direction,
                delay_hours: rec.delay_hours,
                extent_miles: rec.extent_miles,
                shape_length: rec.shape_length,
            }),
        })
        .collect())
}

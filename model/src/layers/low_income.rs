use std::io::Read;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::deserialize_code;
use crate::{Feature, Props, RawGeometry};

/// One low-income census tract, drawn as a filled polygon.
#[derive(Clone, Debug, Serialize)]
pub struct TractProps {
    pub geoid: Option<String>,
    pub tract: Option<String>,
    pub county: Option<String>,
    pub zip: Option<String>,
    pub population: Option<f64>,
    pub poverty_pct: Option<f64>,
    /// CalEnviroScreen score, 0-100.
    pub ci_score: Option<f64>,
    pub dac_status: Option<String>,
    pub income_group: Option<String>,
}

#[derive(Deserialize)]
struct Record {
    #[serde(default, deserialize_with = "deserialize_code")]
    geoid: Option<String>,
    #[serde(default)]
    tract: Option<String>,
    #[serde(default)]
    county: Option<String>,
    #[serde(default, deserialize_with = "deserialize_code")]
    zip: Option<String>,
    #[serde(default)]
    population: Option<f64>,
    #[serde(default)]
    poverty_pct: Option<f64>,
    #[serde(default)]
    ci_score: Option<f64>,
    #[serde(default)]
    dac_status: Option<String>,
    #[serde(default)]
    income_group: Option<String>,
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
            props: Props::Tract(TractProps {
                geoid: rec.geoid,
                tract: rec.tract,
                county: rec.county,
                zip: rec.zip,
                population: rec.population,
                poverty_pct: rec.poverty_pct,
                ci_score: rec.ci_score,
                dac_status: rec.dac_status,
                income_group: rec.income_group,
            }),
        })
        .collect())
}

mod bottlenecks;
mod low_income;
mod routes;
mod stations;
mod suggested;

use std::fmt;
use std::io::Read;
use std::str::FromStr;

use anyhow::Result;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::Feature;

pub use bottlenecks::BottleneckProps;
pub use low_income::TractProps;
pub use routes::RouteProps;
pub use stations::StationProps;
pub use suggested::{suggested_route, SuggestedProps};

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum LayerName {
    Routes,
    Stations,
    Bottlenecks,
    LowIncome,
    AiSuggested,
}

impl LayerName {
    pub const ALL: [LayerName; 5] = [
        LayerName::Routes,
        LayerName::Stations,
        LayerName::Bottlenecks,
        LayerName::LowIncome,
        LayerName::AiSuggested,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            LayerName::Routes => "routes",
            LayerName::Stations => "stations",
            LayerName::Bottlenecks => "bottlenecks",
            LayerName::LowIncome => "low_income",
            LayerName::AiSuggested => "ai_suggested",
        }
    }

    /// The static resource backing this layer, or None for layers that are
    /// only ever populated in-session.
    pub fn resource(self) -> Option<&'static str> {
        match self {
            LayerName::Routes => Some("routes.json"),
            LayerName::Stations => Some("stations.json"),
            LayerName::Bottlenecks => Some("bottlenecks.json"),
            LayerName::LowIncome => Some("low_income.json"),
            LayerName::AiSuggested => None,
        }
    }
}

impl fmt::Display for LayerName {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for LayerName {
    type Err = anyhow::Error;

    fn from_str(x: &str) -> Result<Self> {
        match x {
            "routes" => Ok(LayerName::Routes),
            "stations" => Ok(LayerName::Stations),
            "bottlenecks" => Ok(LayerName::Bottlenecks),
            "low_income" => Ok(LayerName::LowIncome),
            "ai_suggested" => Ok(LayerName::AiSuggested),
            _ => bail!("unknown layer {x}"),
        }
    }
}

/// A named collection of features. The fetched set is the source of truth;
/// filtering derives new subsets and never mutates it.
pub struct Layer {
    pub name: LayerName,
    pub features: Vec<Feature>,
}

pub fn load_layer<R: Read>(name: LayerName, reader: R) -> Result<Vec<Feature>> {
    match name {
        LayerName::Routes => routes::load(reader),
        LayerName::Stations => stations::load(reader),
        LayerName::Bottlenecks => bottlenecks::load(reader),
        LayerName::LowIncome => low_income::load(reader),
        LayerName::AiSuggested => bail!("ai_suggested has no backing resource"),
    }
}

/// Accepts a code that upstream data stores as either a JSON string or a
/// number ("3" vs 3) and keeps its string form.
pub(crate) fn deserialize_code<'de, D>(d: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(d)?;
    Ok(value.and_then(|v| match v {
        Value::String(x) => Some(x),
        Value::Number(x) => Some(x.to_string()),
        _ => None,
    }))
}

use serde::Serialize;
use serde_json::json;

use crate::{Feature, LatLng, Props, RawGeometry};

/// One AI-proposed transit corridor.
#[derive(Clone, Debug, Serialize)]
pub struct SuggestedProps {
    pub name: String,
    pub summary: String,
}

/// Builds the drawable feature for one suggestion: a straight line from
/// start to end, stored in the same `[lng, lat]` record order as every other
/// layer.
pub fn suggested_route(name: String, summary: String, start: LatLng, end: LatLng) -> Feature {
    Feature {
        geometry: RawGeometry::new(
            "LineString",
            json!([[start.lng, start.lat], [end.lng, end.lat]]),
        ),
        props: Props::Suggested(SuggestedProps { name, summary }),
    }
}

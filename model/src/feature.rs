use serde::Serialize;

use crate::layers::{BottleneckProps, RouteProps, StationProps, SuggestedProps, TractProps};
use crate::RawGeometry;

/// One geographic record: geometry plus the layer-specific attributes bound
/// to primitives for click-to-inspect. Immutable once fetched.
///
/// Serializes to the same flat shape the layer resources use, so converted
/// GeoJSON can be written straight back out as a `<layer>.json` resource.
#[derive(Clone, Debug, Serialize)]
pub struct Feature {
    #[serde(flatten)]
    pub geometry: RawGeometry,
    #[serde(flatten)]
    pub props: Props,
}

#[derive(Clone, Debug, Serialize)]
#[serde(untagged)]
pub enum Props {
    Route(RouteProps),
    Station(StationProps),
    Bottleneck(BottleneckProps),
    Tract(TractProps),
    Suggested(SuggestedProps),
}

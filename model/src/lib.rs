#[macro_use]
extern crate anyhow;
#[macro_use]
extern crate log;

pub mod export;
mod feature;
mod filter;
mod geometry;
pub mod import;
pub mod layers;
mod store;

pub use self::feature::{Feature, Props};
pub use self::filter::{compute_visible, feature_visible, FilterState, Mode, ROUTE_TYPE_CODES};
pub use self::geometry::{normalize, LatLng, RawGeometry};
pub use self::layers::{load_layer, suggested_route, Layer, LayerName, StationProps};
pub use self::store::{LayerSource, LayerStore};

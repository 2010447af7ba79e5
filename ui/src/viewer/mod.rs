mod style;

use std::collections::BTreeMap;

use anyhow::Result;

use model::{
    compute_visible, feature_visible, normalize, Feature, FilterState, LatLng, LayerName,
    LayerStore, Props,
};

use crate::ai::{MapContext, SuggestedRoute};
use crate::canvas::{Canvas, PrimitiveId};
use crate::components::describe;

/// A fetch the shell must perform and feed back through
/// [`Viewer::on_fetch_complete`]. The viewer itself never blocks.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FetchRequest {
    pub layer: LayerName,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LayerState {
    Hidden,
    Loading,
    Visible,
}

/// One graphical object on the canvas, bound to the feature it came from by
/// index. A MultiLineString or MultiPolygon feature yields several of these.
struct DrawnPrimitive {
    id: PrimitiveId,
    feature: usize,
}

struct LayerView {
    state: LayerState,
    drawn: Vec<DrawnPrimitive>,
}

/// Owns the per-layer show/hide state machine and reconciles what's drawn on
/// the canvas against the visible subset of each layer.
pub struct Viewer {
    store: LayerStore,
    filters: FilterState,
    views: BTreeMap<LayerName, LayerView>,
}

impl Viewer {
    pub fn new() -> Self {
        let mut store = LayerStore::new();
        // Suggestions are injected by the AI panel, never fetched
        store.insert(LayerName::AiSuggested, Vec::new());

        let views = LayerName::ALL
            .iter()
            .map(|name| {
                (
                    *name,
                    LayerView {
                        state: LayerState::Hidden,
                        drawn: Vec::new(),
                    },
                )
            })
            .collect();
        Self {
            store,
            filters: FilterState::new(),
            views,
        }
    }

    pub fn layer_state(&self, layer: LayerName) -> LayerState {
        self.views[&layer].state
    }

    pub fn drawn_count(&self, layer: LayerName) -> usize {
        self.views[&layer].drawn.len()
    }

    pub fn primitive_id(&self, layer: LayerName, primitive: usize) -> Option<PrimitiveId> {
        Some(self.views[&layer].drawn.get(primitive)?.id)
    }

    pub fn filters(&self) -> &FilterState {
        &self.filters
    }

    /// Single entry point for a layer toggle. Returns the fetch the shell
    /// must run for a first-time show; a toggle-on while that fetch is still
    /// outstanding joins it rather than starting a duplicate.
    pub fn set_visible(
        &mut self,
        canvas: &mut dyn Canvas,
        layer: LayerName,
        visible: bool,
    ) -> Option<FetchRequest> {
        match (visible, self.views[&layer].state) {
            (true, LayerState::Hidden) => {
                if !self.store.is_loaded(layer) {
                    self.view_mut(layer).state = LayerState::Loading;
                    return Some(FetchRequest { layer });
                }
                self.view_mut(layer).state = LayerState::Visible;
                if self.views[&layer].drawn.is_empty() {
                    self.draw_layer(canvas, layer);
                } else {
                    // Already drawn once; just re-show
                    for primitive in &self.views[&layer].drawn {
                        canvas.set_attached(primitive.id, true);
                    }
                }
                None
            }
            (false, LayerState::Visible) => {
                // Detach but keep the primitives for a cheap re-show
                for primitive in &self.views[&layer].drawn {
                    canvas.set_attached(primitive.id, false);
                }
                self.view_mut(layer).state = LayerState::Hidden;
                None
            }
            (false, LayerState::Loading) => {
                // The fetch result will be cached but not drawn
                self.view_mut(layer).state = LayerState::Hidden;
                None
            }
            _ => None,
        }
    }

    /// Fetch results come back through here. The visible subset is computed
    /// from the filter state *now*, not whatever it was when the fetch
    /// started, and nothing is drawn if the layer was hidden in the
    /// meantime.
    pub fn on_fetch_complete(
        &mut self,
        canvas: &mut dyn Canvas,
        layer: LayerName,
        result: Result<Vec<Feature>>,
    ) {
        match result {
            Ok(features) => {
                info!("Loaded {} features for {layer}", features.len());
                self.store.insert(layer, features);
                if self.views[&layer].state == LayerState::Loading {
                    self.view_mut(layer).state = LayerState::Visible;
                    self.draw_layer(canvas, layer);
                }
            }
            Err(err) => {
                // The layer stays unloaded, so re-toggling retries
                error!("Loading {layer} failed: {err}");
                if self.views[&layer].state == LayerState::Loading {
                    self.view_mut(layer).state = LayerState::Hidden;
                }
            }
        }
    }

    /// Full clear-and-redraw of the filtered layers. Fine for a few hundred
    /// static features; revisit with keyed diffing if the datasets grow.
    pub fn on_filter_change(&mut self, canvas: &mut dyn Canvas, filters: FilterState) {
        self.filters = filters;
        for layer in [LayerName::Routes, LayerName::Stations] {
            if self.views[&layer].state == LayerState::Visible {
                self.draw_layer(canvas, layer);
            } else {
                // A detached cache drawn under the old filters would come
                // back stale on the next show; drop it so the show redraws
                for primitive in self.view_mut(layer).drawn.drain(..) {
                    canvas.remove(primitive.id);
                }
            }
        }
    }

    /// Replaces the suggestion layer and shows it.
    pub fn apply_suggestions(&mut self, canvas: &mut dyn Canvas, suggestions: &[SuggestedRoute]) {
        let features = suggestions
            .iter()
            .map(|s| {
                model::suggested_route(
                    s.name.clone(),
                    s.summary.clone(),
                    LatLng::new(s.start[0], s.start[1]),
                    LatLng::new(s.end[0], s.end[1]),
                )
            })
            .collect();
        self.store.insert(LayerName::AiSuggested, features);
        self.view_mut(LayerName::AiSuggested).state = LayerState::Visible;
        self.draw_layer(canvas, LayerName::AiSuggested);
    }

    /// Opens an info popup for a drawn primitive, anchored wherever the
    /// click landed. Popups stack; nothing auto-closes the previous one.
    pub fn on_click(
        &self,
        canvas: &mut dyn Canvas,
        layer: LayerName,
        primitive: usize,
        anchor: LatLng,
    ) -> bool {
        let primitive = match self.views[&layer].drawn.get(primitive) {
            Some(x) => x,
            None => return false,
        };
        let feature = match self
            .store
            .get(layer)
            .and_then(|l| l.features.get(primitive.feature))
        {
            Some(x) => x,
            None => return false,
        };
        canvas.open_popup(anchor, describe::feature(feature));
        true
    }

    /// Everything currently on the canvas, for export.
    pub fn visible_features(&self) -> Vec<&Feature> {
        let mut features = Vec::new();
        for layer in LayerName::ALL {
            if self.views[&layer].state != LayerState::Visible {
                continue;
            }
            if let Some(data) = self.store.get(layer) {
                features.extend(compute_visible(data, &self.filters));
            }
        }
        features
    }

    pub fn map_context(&self) -> MapContext {
        MapContext {
            show_routes: self.toggled_on(LayerName::Routes),
            show_bottlenecks: self.toggled_on(LayerName::Bottlenecks),
            show_low_income: self.toggled_on(LayerName::LowIncome),
            active_route_types: self.filters.active_route_types(),
        }
    }

    fn toggled_on(&self, layer: LayerName) -> bool {
        self.views[&layer].state != LayerState::Hidden
    }

    fn view_mut(&mut self, layer: LayerName) -> &mut LayerView {
        self.views.get_mut(&layer).unwrap()
    }

    fn draw_layer(&mut self, canvas: &mut dyn Canvas, layer: LayerName) {
        // Clear-before-draw, always
        for primitive in self.view_mut(layer).drawn.drain(..) {
            canvas.remove(primitive.id);
        }

        let data = match self.store.get(layer) {
            Some(x) => x,
            None => return,
        };
        let mut drawn = Vec::new();
        for (idx, feature) in data.features.iter().enumerate() {
            if !feature_visible(feature, &self.filters) {
                continue;
            }
            if let Props::Station(ref station) = feature.props {
                if let Some(position) = station.position() {
                    let id = canvas.add_marker(position, style::marker_color(station));
                    drawn.push(DrawnPrimitive { id, feature: idx });
                }
                continue;
            }
            let path_style = style::path_style(feature);
            for path in normalize(&feature.geometry) {
                let id = if feature.geometry.is_polygonal() {
                    canvas.add_polygon(&path, &path_style)
                } else {
                    canvas.add_polyline(&path, &path_style)
                };
                drawn.push(DrawnPrimitive { id, feature: idx });
            }
        }
        self.view_mut(layer).drawn = drawn;
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use serde_json::json;

    use model::layers::RouteProps;
    use model::{Feature, FilterState, LatLng, LayerName, Props, RawGeometry};

    use super::{FetchRequest, LayerState, Viewer};
    use crate::canvas::TraceCanvas;

    fn route(route_type: &str, coordinates: serde_json::Value) -> Feature {
        Feature {
            geometry: RawGeometry::new("LineString", coordinates),
            props: Props::Route(RouteProps {
                route_id: Some("r".to_string()),
                route_short_name: Some("Express".to_string()),
                route_long_name: None,
                route_type: Some(route_type.to_string()),
            }),
        }
    }

    fn only(codes: &[&str]) -> FilterState {
        FilterState {
            route_types: codes.iter().map(|x| x.to_string()).collect(),
            ..FilterState::new()
        }
    }

    fn show_routes(viewer: &mut Viewer, canvas: &mut TraceCanvas, features: Vec<Feature>) {
        let request = viewer.set_visible(canvas, LayerName::Routes, true);
        assert_eq!(request, Some(FetchRequest { layer: LayerName::Routes }));
        viewer.on_fetch_complete(canvas, LayerName::Routes, Ok(features));
    }

    #[test]
    fn toggle_on_fetches_once_and_draws() {
        let mut viewer = Viewer::new();
        let mut canvas = TraceCanvas::new();

        let request = viewer.set_visible(&mut canvas, LayerName::Routes, true);
        assert!(request.is_some());
        assert_eq!(viewer.layer_state(LayerName::Routes), LayerState::Loading);

        // A second toggle-on joins the in-flight fetch
        assert_eq!(viewer.set_visible(&mut canvas, LayerName::Routes, true), None);

        viewer.on_fetch_complete(
            &mut canvas,
            LayerName::Routes,
            Ok(vec![route("1", json!([[-119.4, 36.7], [-119.5, 36.8]]))]),
        );
        assert_eq!(viewer.layer_state(LayerName::Routes), LayerState::Visible);
        assert_eq!(canvas.attached_count(), 1);

        let drawn = canvas.get(crate::canvas::PrimitiveId(0)).unwrap();
        assert_eq!(
            drawn.points,
            vec![LatLng::new(36.7, -119.4), LatLng::new(36.8, -119.5)]
        );
    }

    #[test]
    fn draw_uses_filter_state_at_draw_time() {
        let mut viewer = Viewer::new();
        let mut canvas = TraceCanvas::new();

        assert!(viewer.set_visible(&mut canvas, LayerName::Routes, true).is_some());
        // The filter changes while the fetch is still outstanding
        viewer.on_filter_change(&mut canvas, only(&["2"]));
        viewer.on_fetch_complete(
            &mut canvas,
            LayerName::Routes,
            Ok(vec![route("1", json!([[-119.4, 36.7], [-119.5, 36.8]]))]),
        );
        assert_eq!(canvas.attached_count(), 0);

        // Re-enabling the type redraws the one route
        viewer.on_filter_change(&mut canvas, only(&["1"]));
        assert_eq!(canvas.attached_count(), 1);
    }

    #[test]
    fn hide_then_show_reattaches_without_refetch_or_redraw() {
        let mut viewer = Viewer::new();
        let mut canvas = TraceCanvas::new();
        show_routes(
            &mut viewer,
            &mut canvas,
            vec![
                route("1", json!([[0, 0], [1, 1]])),
                route("2", json!([[2, 2], [3, 3]])),
            ],
        );
        assert_eq!(canvas.attached_count(), 2);

        assert_eq!(viewer.set_visible(&mut canvas, LayerName::Routes, false), None);
        assert_eq!(canvas.attached_count(), 0);
        // Detached, not destroyed
        assert_eq!(canvas.total_count(), 2);

        // No FetchRequest the second time, and the same primitives come back
        assert_eq!(viewer.set_visible(&mut canvas, LayerName::Routes, true), None);
        assert_eq!(canvas.attached_count(), 2);
        assert_eq!(canvas.total_count(), 2);
    }

    #[test]
    fn filter_change_clears_and_redraws() {
        let mut viewer = Viewer::new();
        let mut canvas = TraceCanvas::new();
        show_routes(
            &mut viewer,
            &mut canvas,
            vec![
                route("1", json!([[0, 0], [1, 1]])),
                route("2", json!([[2, 2], [3, 3]])),
            ],
        );
        assert_eq!(canvas.attached_count(), 2);

        viewer.on_filter_change(&mut canvas, only(&["2"]));
        // The stale primitives are gone, not merely hidden
        assert_eq!(canvas.total_count(), 1);
        assert_eq!(viewer.drawn_count(LayerName::Routes), 1);

        viewer.on_filter_change(
            &mut canvas,
            FilterState {
                route_types: BTreeSet::new(),
                ..FilterState::new()
            },
        );
        assert_eq!(canvas.total_count(), 0);
    }

    #[test]
    fn filter_change_while_hidden_redraws_on_next_show() {
        let mut viewer = Viewer::new();
        let mut canvas = TraceCanvas::new();
        show_routes(
            &mut viewer,
            &mut canvas,
            vec![
                route("1", json!([[0, 0], [1, 1]])),
                route("2", json!([[2, 2], [3, 3]])),
            ],
        );
        viewer.set_visible(&mut canvas, LayerName::Routes, false);
        viewer.on_filter_change(&mut canvas, only(&["2"]));

        assert_eq!(viewer.set_visible(&mut canvas, LayerName::Routes, true), None);
        assert_eq!(canvas.attached_count(), 1);
    }

    #[test]
    fn fetch_resolving_after_hide_caches_but_does_not_draw() {
        let mut viewer = Viewer::new();
        let mut canvas = TraceCanvas::new();

        assert!(viewer.set_visible(&mut canvas, LayerName::Routes, true).is_some());
        assert_eq!(viewer.set_visible(&mut canvas, LayerName::Routes, false), None);

        viewer.on_fetch_complete(
            &mut canvas,
            LayerName::Routes,
            Ok(vec![route("1", json!([[0, 0], [1, 1]]))]),
        );
        assert_eq!(canvas.total_count(), 0);
        assert_eq!(viewer.layer_state(LayerName::Routes), LayerState::Hidden);

        // Showing again uses the cache: no new fetch
        assert_eq!(viewer.set_visible(&mut canvas, LayerName::Routes, true), None);
        assert_eq!(canvas.attached_count(), 1);
    }

    #[test]
    fn failed_fetch_returns_to_hidden_and_retries_on_next_toggle() {
        let mut viewer = Viewer::new();
        let mut canvas = TraceCanvas::new();

        assert!(viewer.set_visible(&mut canvas, LayerName::Routes, true).is_some());
        viewer.on_fetch_complete(&mut canvas, LayerName::Routes, Err(anyhow!("503")));
        assert_eq!(viewer.layer_state(LayerName::Routes), LayerState::Hidden);

        // The failure wasn't cached as an empty layer
        assert!(viewer.set_visible(&mut canvas, LayerName::Routes, true).is_some());
    }

    #[test]
    fn multi_part_features_yield_one_primitive_per_path() {
        let mut viewer = Viewer::new();
        let mut canvas = TraceCanvas::new();
        let mut feature = route("1", json!(null));
        feature.geometry = RawGeometry::new(
            "MultiLineString",
            json!([[[0, 0], [1, 1]], [[2, 2], [3, 3]]]),
        );
        show_routes(&mut viewer, &mut canvas, vec![feature]);
        assert_eq!(viewer.drawn_count(LayerName::Routes), 2);
    }

    #[test]
    fn each_click_opens_another_popup() {
        let mut viewer = Viewer::new();
        let mut canvas = TraceCanvas::new();
        show_routes(&mut viewer, &mut canvas, vec![route("1", json!([[0, 0], [1, 1]]))]);

        let anchor = LatLng::new(0.0, 0.0);
        assert!(viewer.on_click(&mut canvas, LayerName::Routes, 0, anchor));
        assert!(viewer.on_click(&mut canvas, LayerName::Routes, 0, anchor));
        assert_eq!(canvas.popups().len(), 2);
        assert!(!viewer.on_click(&mut canvas, LayerName::Routes, 5, anchor));
    }
}

use std::collections::BTreeMap;

use model::LatLng;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PrimitiveId(pub usize);

#[derive(Clone, Debug, PartialEq)]
pub struct PathStyle {
    /// CSS hex color
    pub color: String,
    pub weight: f64,
    pub opacity: f64,
    /// Only meaningful for polygons
    pub fill_opacity: f64,
    pub dashed: bool,
}

impl PathStyle {
    pub fn line(color: String, weight: f64) -> Self {
        Self {
            color,
            weight,
            opacity: 1.0,
            fill_opacity: 0.0,
            dashed: false,
        }
    }

    pub fn fill(color: String, fill_opacity: f64) -> Self {
        Self {
            color,
            weight: 1.0,
            opacity: 0.8,
            fill_opacity,
            dashed: false,
        }
    }
}

/// The one handle to the external map surface. Every draw and clear goes
/// through a handle passed explicitly into the call, so write ordering is
/// whatever the caller does, with no hidden global to race through.
///
/// Detaching hides a primitive but keeps it alive for a cheap re-show;
/// removing destroys it.
pub trait Canvas {
    fn add_polyline(&mut self, path: &[LatLng], style: &PathStyle) -> PrimitiveId;
    fn add_polygon(&mut self, ring: &[LatLng], style: &PathStyle) -> PrimitiveId;
    fn add_marker(&mut self, position: LatLng, color: &str) -> PrimitiveId;
    fn set_attached(&mut self, id: PrimitiveId, attached: bool);
    fn remove(&mut self, id: PrimitiveId);
    fn open_popup(&mut self, anchor: LatLng, lines: Vec<String>);
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PrimitiveKind {
    Polyline,
    Polygon,
    Marker,
}

#[derive(Clone, Debug)]
pub struct TracePrimitive {
    pub kind: PrimitiveKind,
    pub points: Vec<LatLng>,
    pub color: String,
    pub attached: bool,
}

#[derive(Clone, Debug)]
pub struct TracePopup {
    pub anchor: LatLng,
    pub lines: Vec<String>,
}

/// In-memory canvas: the rendering target for the console shell, and the
/// observable double the reconciler tests assert against.
pub struct TraceCanvas {
    next_id: usize,
    primitives: BTreeMap<PrimitiveId, TracePrimitive>,
    popups: Vec<TracePopup>,
}

impl TraceCanvas {
    pub fn new() -> Self {
        Self {
            next_id: 0,
            primitives: BTreeMap::new(),
            popups: Vec::new(),
        }
    }

    pub fn get(&self, id: PrimitiveId) -> Option<&TracePrimitive> {
        self.primitives.get(&id)
    }

    pub fn attached_count(&self) -> usize {
        self.primitives.values().filter(|p| p.attached).count()
    }

    pub fn total_count(&self) -> usize {
        self.primitives.len()
    }

    pub fn popups(&self) -> &[TracePopup] {
        &self.popups
    }

    fn add(&mut self, primitive: TracePrimitive) -> PrimitiveId {
        let id = PrimitiveId(self.next_id);
        self.next_id += 1;
        self.primitives.insert(id, primitive);
        id
    }
}

impl Canvas for TraceCanvas {
    fn add_polyline(&mut self, path: &[LatLng], style: &PathStyle) -> PrimitiveId {
        self.add(TracePrimitive {
            kind: PrimitiveKind::Polyline,
            points: path.to_vec(),
            color: style.color.clone(),
            attached: true,
        })
    }

    fn add_polygon(&mut self, ring: &[LatLng], style: &PathStyle) -> PrimitiveId {
        self.add(TracePrimitive {
            kind: PrimitiveKind::Polygon,
            points: ring.to_vec(),
            color: style.color.clone(),
            attached: true,
        })
    }

    fn add_marker(&mut self, position: LatLng, color: &str) -> PrimitiveId {
        self.add(TracePrimitive {
            kind: PrimitiveKind::Marker,
            points: vec![position],
            color: color.to_string(),
            attached: true,
        })
    }

    fn set_attached(&mut self, id: PrimitiveId, attached: bool) {
        if let Some(primitive) = self.primitives.get_mut(&id) {
            primitive.attached = attached;
        }
    }

    fn remove(&mut self, id: PrimitiveId) {
        self.primitives.remove(&id);
    }

    fn open_popup(&mut self, anchor: LatLng, lines: Vec<String>) {
        self.popups.push(TracePopup { anchor, lines });
    }
}

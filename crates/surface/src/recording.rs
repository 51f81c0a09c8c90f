use std::collections::BTreeMap;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::backend::{
    FillLayerSpec, LineLayerSpec, MapBackend, MapInit, MarkerHandle, MarkerSpec, SurfaceError,
};
use crate::camera::CameraMove;

/// In-memory map backend for tests and headless runs.
///
/// Records every operation so callers can assert on the resulting map state.
/// State lives behind a shared handle (`state`) so it stays inspectable
/// after the backend has been boxed into a [`crate::MapSurface`].
#[derive(Debug, Default)]
pub struct RecordingState {
    pub maps_created: u32,
    pub maps_destroyed: u32,
    pub nav_controls: u32,
    pub init: Option<MapInit>,
    pub sources: BTreeMap<String, serde_json::Value>,
    pub fill_layers: BTreeMap<String, FillLayerSpec>,
    pub line_layers: BTreeMap<String, LineLayerSpec>,
    pub markers: BTreeMap<u64, MarkerSpec>,
    pub fly_tos: Vec<CameraMove>,
    next_marker: u64,
}

impl RecordingState {
    /// Ids of fill layers currently visible, in id order.
    pub fn visible_fill_layers(&self) -> Vec<String> {
        self.fill_layers
            .values()
            .filter(|l| l.visible)
            .map(|l| l.id.clone())
            .collect()
    }

    /// Ids of line layers currently visible, in id order.
    pub fn visible_line_layers(&self) -> Vec<String> {
        self.line_layers
            .values()
            .filter(|l| l.visible)
            .map(|l| l.id.clone())
            .collect()
    }

    /// Live marker handles in ascending order.
    pub fn marker_handles(&self) -> Vec<u64> {
        self.markers.keys().copied().collect()
    }
}

#[derive(Debug, Default)]
pub struct RecordingBackend {
    state: Arc<Mutex<RecordingState>>,
}

impl RecordingBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shared handle to the recorded state.
    pub fn state(&self) -> Arc<Mutex<RecordingState>> {
        Arc::clone(&self.state)
    }
}

impl MapBackend for RecordingBackend {
    fn create_map(&mut self, init: MapInit) -> Result<(), SurfaceError> {
        let mut s = self.state.lock();
        s.maps_created += 1;
        s.init = Some(init);
        Ok(())
    }

    fn destroy_map(&mut self) {
        let mut s = self.state.lock();
        if s.init.is_some() {
            s.maps_destroyed += 1;
        }
        s.init = None;
        s.sources.clear();
        s.fill_layers.clear();
        s.line_layers.clear();
        s.markers.clear();
    }

    fn add_navigation_control(&mut self) {
        self.state.lock().nav_controls += 1;
    }

    fn fly_to(&mut self, camera: CameraMove) {
        self.state.lock().fly_tos.push(camera);
    }

    fn add_marker(&mut self, spec: MarkerSpec) -> MarkerHandle {
        let mut s = self.state.lock();
        s.next_marker += 1;
        let id = s.next_marker;
        s.markers.insert(id, spec);
        MarkerHandle(id)
    }

    fn remove_marker(&mut self, handle: MarkerHandle) {
        self.state.lock().markers.remove(&handle.0);
    }

    fn has_source(&self, id: &str) -> bool {
        self.state.lock().sources.contains_key(id)
    }

    fn add_geojson_source(&mut self, id: &str, data: serde_json::Value) {
        self.state.lock().sources.insert(id.to_string(), data);
    }

    fn has_layer(&self, id: &str) -> bool {
        let s = self.state.lock();
        s.fill_layers.contains_key(id) || s.line_layers.contains_key(id)
    }

    fn add_fill_layer(&mut self, spec: FillLayerSpec) {
        self.state.lock().fill_layers.insert(spec.id.clone(), spec);
    }

    fn add_line_layer(&mut self, spec: LineLayerSpec) {
        self.state.lock().line_layers.insert(spec.id.clone(), spec);
    }

    fn set_layer_visibility(&mut self, id: &str, visible: bool) {
        let mut s = self.state.lock();
        if let Some(layer) = s.fill_layers.get_mut(id) {
            layer.visible = visible;
        }
        if let Some(layer) = s.line_layers.get_mut(id) {
            layer.visible = visible;
        }
    }
}

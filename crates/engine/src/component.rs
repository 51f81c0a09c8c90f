//! The map component: one surface, one marker set, one layer controller,
//! and the selection machine the host drives through integer codes.
//!
//! Update contract: the host calls in whenever an input changes —
//! `set_properties` for the listing, `apply_code`/`toggle_markers` for
//! selection, `handle_marker_click` when the backend reports a marker hit.
//! Nothing here depends on a UI runtime.

use std::sync::Arc;

use foundation::ids::PropertyId;
use layers::{LayerController, LayerRuntimeState, MarkerSet, PropertyPoint, PropertyRecord};
use streaming::GeometrySource;
use surface::{CameraMove, MapBackend, MapInit, MapSurface};

use crate::codes::Interaction;
use crate::config::EngineConfig;
use crate::selection::{ActiveSelection, SelectionInput};

/// Receives upward events as interaction codes (clicked property ids).
pub type EventSink = Box<dyn Fn(u32) + Send>;

pub struct MapEngine {
    surface: MapSurface,
    markers: MarkerSet,
    controller: LayerController,
    selection: ActiveSelection,
    points: Vec<PropertyPoint>,
    /// A reconcile requested before style-loaded; runs exactly once when the
    /// signal fires, with whatever inputs are current at that moment.
    pending_reconcile: bool,
    config: EngineConfig,
    on_event: Option<EventSink>,
}

impl MapEngine {
    pub fn new(
        backend: Box<dyn MapBackend>,
        source: Arc<dyn GeometrySource>,
        config: EngineConfig,
    ) -> Self {
        Self {
            surface: MapSurface::new(backend),
            markers: MarkerSet::new(),
            controller: LayerController::new(source),
            selection: ActiveSelection::MarkersShown,
            points: Vec::new(),
            pending_reconcile: false,
            config,
            on_event: None,
        }
    }

    pub fn with_event_sink(mut self, sink: EventSink) -> Self {
        self.on_event = Some(sink);
        self
    }

    /// Create the map if the container is mounted. Safe to call every pass.
    pub fn mount(&mut self, container_mounted: bool, style: Option<serde_json::Value>) -> bool {
        self.surface.ensure_initialized(
            container_mounted,
            MapInit {
                center: self.config.center,
                zoom: self.config.zoom,
                style,
            },
        )
    }

    /// Tear down the map instance. Safe from any state.
    pub fn unmount(&mut self) {
        self.markers.clear(&mut self.surface);
        self.surface.teardown();
        self.pending_reconcile = false;
    }

    /// Forward the backend's style-loaded event; flushes a queued reconcile.
    pub fn notify_style_loaded(&mut self) {
        self.surface.notify_style_loaded();
        if self.pending_reconcile && self.surface.style_loaded() {
            self.pending_reconcile = false;
            self.reconcile_markers();
        }
    }

    /// Replace the property listing and rebuild markers.
    pub fn set_properties(&mut self, records: &[PropertyRecord]) {
        self.points = records.iter().map(PropertyPoint::from_record).collect();
        self.request_reconcile();
    }

    /// Host-driven selection via the integer channel.
    ///
    /// Property codes are upward-only and ignored here; the host interprets
    /// them itself.
    pub async fn apply_code(&mut self, code: u32) {
        match Interaction::decode(code) {
            Interaction::Clear => self.apply(SelectionInput::Clear).await,
            Interaction::Layer(id) => self.apply(SelectionInput::SelectLayer(id)).await,
            Interaction::Property(_) => {}
        }
    }

    /// Flip the marker visibility control.
    pub async fn toggle_markers(&mut self) {
        self.apply(SelectionInput::ToggleMarkers).await;
    }

    /// React to a marker click reported by the backend: fly the camera to
    /// the property, then notify the host after the configured delay. The
    /// notification does not wait for the animation to finish.
    pub async fn handle_marker_click(&mut self, id: PropertyId) {
        let Some(point) = self.points.iter().find(|p| p.id == id).copied() else {
            // Markers are rebuilt from the current list before they are
            // clickable, so an unknown id means a stale event; drop it.
            tracing::debug!(property = %id, "click on unknown property ignored");
            return;
        };
        self.surface.fly_to(CameraMove::new(
            point.position,
            self.config.fly_to_zoom,
            self.config.fly_to_duration_ms,
        ));
        tokio::time::sleep(self.config.click_notify_delay).await;
        self.emit(Interaction::Property(id).encode());
    }

    pub fn selection(&self) -> ActiveSelection {
        self.selection
    }

    pub fn layer_state(&self, id: catalog::ClimateLayerId) -> LayerRuntimeState {
        self.controller.state(id)
    }

    pub fn marker_count(&self) -> usize {
        self.markers.len()
    }

    pub fn surface(&self) -> &MapSurface {
        &self.surface
    }

    async fn apply(&mut self, input: SelectionInput) {
        let next = self.selection.apply(input);
        let prev = std::mem::replace(&mut self.selection, next);

        let target = next.active_layer();
        if target.is_some() {
            // Fetch every missing overlay up front; visibility switching
            // below never races a fetch.
            self.controller.ensure_all_loaded(&mut self.surface).await;
        }
        self.controller.set_active(&mut self.surface, target);

        if prev.markers_visible() != next.markers_visible() {
            self.request_reconcile();
        }
    }

    fn request_reconcile(&mut self) {
        if !self.surface.style_loaded() {
            self.pending_reconcile = true;
            return;
        }
        self.reconcile_markers();
    }

    fn reconcile_markers(&mut self) {
        let visible = self.selection.markers_visible();
        self.markers
            .reconcile(&mut self.surface, &self.points, visible);
    }

    fn emit(&self, code: u32) {
        if let Some(sink) = &self.on_event {
            sink(code);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{EngineConfig, MapEngine};
    use crate::selection::ActiveSelection;
    use catalog::ClimateLayerId;
    use foundation::geo::LngLat;
    use foundation::ids::PropertyId;
    use layers::{ClimateScores, PropertyRecord};
    use parking_lot::Mutex;
    use pretty_assertions::assert_eq;
    use std::sync::Arc;
    use streaming::{Feature, FeatureCollection, FeatureProperties, MemoryGeometrySource};
    use surface::{RecordingBackend, RecordingState};

    fn record(id: u32, overall: Option<i32>) -> PropertyRecord {
        PropertyRecord {
            id: PropertyId(id),
            position: LngLat::new(106.8 + id as f64 * 0.005, -6.2),
            climate_scores: overall.map(|score| ClimateScores {
                overall: Some(score),
                ..ClimateScores::default()
            }),
            climate_risk_score: None,
        }
    }

    fn fixture() -> FeatureCollection {
        FeatureCollection::new(vec![Feature {
            kind: "Feature".to_string(),
            properties: FeatureProperties {
                gridcode: 2,
                object_id: Some(1),
                id: Some(0),
                extra: serde_json::Map::new(),
            },
            geometry: serde_json::json!({"type": "Polygon", "coordinates": []}),
        }])
    }

    struct Harness {
        engine: MapEngine,
        state: Arc<Mutex<RecordingState>>,
        source: Arc<MemoryGeometrySource>,
        events: Arc<Mutex<Vec<u32>>>,
    }

    fn harness() -> Harness {
        let backend = RecordingBackend::new();
        let state = backend.state();
        let source = Arc::new(MemoryGeometrySource::new());
        for layer in ClimateLayerId::ALL {
            source.insert(layer, fixture());
        }
        let events: Arc<Mutex<Vec<u32>>> = Arc::new(Mutex::new(Vec::new()));
        let sink_events = Arc::clone(&events);
        let geometry: Arc<dyn streaming::GeometrySource> = source.clone();
        let engine = MapEngine::new(Box::new(backend), geometry, EngineConfig::default())
            .with_event_sink(Box::new(move |code| sink_events.lock().push(code)));
        Harness {
            engine,
            state,
            source,
            events,
        }
    }

    fn mounted() -> Harness {
        let mut h = harness();
        assert!(h.engine.mount(true, None));
        h.engine.notify_style_loaded();
        h
    }

    #[test]
    fn starts_with_markers_shown() {
        let h = harness();
        assert_eq!(h.engine.selection(), ActiveSelection::MarkersShown);
    }

    #[test]
    fn early_reconcile_is_queued_and_flushed_once() {
        let mut h = harness();
        assert!(h.engine.mount(true, None));

        // Style not loaded yet: both updates queue, neither touches the map.
        h.engine.set_properties(&[record(10, Some(80))]);
        h.engine
            .set_properties(&[record(10, Some(80)), record(11, Some(40))]);
        assert_eq!(h.engine.marker_count(), 0);

        h.engine.notify_style_loaded();
        assert_eq!(h.engine.marker_count(), 2);
        assert_eq!(h.state.lock().markers.len(), 2);
    }

    #[tokio::test]
    async fn layer_selection_hides_markers_and_shows_one_pair() {
        let mut h = mounted();
        h.engine.set_properties(&[record(10, Some(80))]);
        assert_eq!(h.engine.marker_count(), 1);

        h.engine.apply_code(1).await;
        assert_eq!(
            h.engine.selection(),
            ActiveSelection::LayerActive(ClimateLayerId::Lst)
        );
        assert_eq!(h.engine.marker_count(), 0);
        {
            let s = h.state.lock();
            assert_eq!(s.visible_fill_layers(), vec!["lst-fill"]);
            assert_eq!(s.visible_line_layers(), vec!["lst-outline"]);
        }

        h.engine.apply_code(3).await;
        {
            let s = h.state.lock();
            assert_eq!(s.visible_fill_layers(), vec!["uhi-fill"]);
        }
        // Switching layers refetches nothing.
        assert_eq!(h.source.fetch_count(ClimateLayerId::Lst), 1);
        assert_eq!(h.source.fetch_count(ClimateLayerId::Uhi), 1);
    }

    #[tokio::test]
    async fn reselecting_the_active_layer_clears_it() {
        let mut h = mounted();
        h.engine.apply_code(2).await;
        h.engine.apply_code(2).await;
        assert_eq!(h.engine.selection(), ActiveSelection::Idle);
        assert!(h.state.lock().visible_fill_layers().is_empty());
        assert_eq!(h.source.fetch_count(ClimateLayerId::Ndvi), 1);
    }

    #[tokio::test]
    async fn code_zero_resets_from_any_state() {
        let mut h = mounted();
        h.engine.set_properties(&[record(10, Some(80))]);

        for setup in [0u32, 1, 4] {
            if setup != 0 {
                h.engine.apply_code(setup).await;
            }
            h.engine.apply_code(0).await;
            assert_eq!(h.engine.selection(), ActiveSelection::Idle);
            assert_eq!(h.engine.marker_count(), 0);
            assert!(h.state.lock().visible_fill_layers().is_empty());
        }
    }

    #[tokio::test]
    async fn markers_toggle_clears_active_layer() {
        let mut h = mounted();
        h.engine.set_properties(&[record(10, Some(80))]);

        h.engine.apply_code(4).await;
        assert_eq!(h.engine.marker_count(), 0);

        h.engine.toggle_markers().await;
        assert_eq!(h.engine.selection(), ActiveSelection::MarkersShown);
        assert_eq!(h.engine.marker_count(), 1);
        assert!(h.state.lock().visible_fill_layers().is_empty());

        h.engine.toggle_markers().await;
        assert_eq!(h.engine.selection(), ActiveSelection::Idle);
        assert_eq!(h.engine.marker_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn marker_click_flies_first_and_notifies_after_delay() {
        let mut h = mounted();
        h.engine.set_properties(&[record(10, Some(80))]);

        let started = tokio::time::Instant::now();
        h.engine.handle_marker_click(PropertyId(10)).await;

        assert!(started.elapsed() >= std::time::Duration::from_millis(300));
        assert_eq!(h.events.lock().as_slice(), &[10]);
        let s = h.state.lock();
        assert_eq!(s.fly_tos.len(), 1);
        assert_eq!(s.fly_tos[0].zoom, 16.0);
    }

    #[tokio::test]
    async fn click_on_unknown_property_is_dropped() {
        let mut h = mounted();
        h.engine.set_properties(&[record(10, Some(80))]);

        h.engine.handle_marker_click(PropertyId(99)).await;
        assert!(h.events.lock().is_empty());
        assert!(h.state.lock().fly_tos.is_empty());
    }

    #[tokio::test]
    async fn fetch_failure_keeps_ui_alive_and_retries_on_next_selection() {
        let mut h = mounted();
        h.source.remove(ClimateLayerId::Utfvi);

        h.engine.apply_code(4).await;
        assert_eq!(
            h.engine.selection(),
            ActiveSelection::LayerActive(ClimateLayerId::Utfvi)
        );
        // No overlay for the failed layer, no crash.
        assert!(h.state.lock().visible_fill_layers().is_empty());
        assert!(!h.engine.layer_state(ClimateLayerId::Utfvi).geometry_loaded);

        // Dataset becomes available; selecting again loads it.
        h.source.insert(ClimateLayerId::Utfvi, fixture());
        h.engine.apply_code(4).await; // re-select clears (was active)
        h.engine.apply_code(4).await; // select again
        assert_eq!(h.state.lock().visible_fill_layers(), vec!["utfvi-fill"]);
        assert_eq!(h.source.fetch_count(ClimateLayerId::Utfvi), 2);
    }

    #[test]
    fn unmount_is_safe_before_mount() {
        let mut h = harness();
        h.engine.unmount();
        assert_eq!(h.state.lock().maps_destroyed, 0);
    }
}

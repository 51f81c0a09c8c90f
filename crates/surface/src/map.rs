use tokio::sync::watch;

use crate::backend::{
    FillLayerSpec, LineLayerSpec, MapBackend, MapInit, MarkerHandle, MarkerSpec,
};
use crate::camera::CameraMove;

/// Owns the map instance lifecycle, camera control, and the style-loaded
/// signal.
///
/// Lifecycle contract:
/// - `ensure_initialized` creates the map at most once; when the host
///   container is not yet mounted the call is skipped silently and retried
///   on the next reactive pass.
/// - `teardown` releases everything and is safe from any state, including
///   before a successful initialize. It bumps the instance epoch so async
///   work started against the old instance can detect staleness.
/// - Sources and layers may only be registered after the style-loaded
///   signal has fired; consumers subscribe via `style_signal`.
pub struct MapSurface {
    backend: Box<dyn MapBackend>,
    initialized: bool,
    epoch: u64,
    style_tx: watch::Sender<bool>,
}

impl MapSurface {
    pub fn new(backend: Box<dyn MapBackend>) -> Self {
        let (style_tx, _) = watch::channel(false);
        Self {
            backend,
            initialized: false,
            epoch: 1,
            style_tx,
        }
    }

    /// Create the map instance if possible.
    ///
    /// Returns `true` only when the map was created by this call. A missing
    /// container or a backend failure leaves the surface uninitialized; the
    /// failure is logged, never surfaced, and the next pass retries.
    pub fn ensure_initialized(&mut self, container_mounted: bool, init: MapInit) -> bool {
        if self.initialized || !container_mounted {
            return false;
        }
        match self.backend.create_map(init) {
            Ok(()) => {
                self.backend.add_navigation_control();
                self.initialized = true;
                true
            }
            Err(err) => {
                tracing::warn!(error = %err, "map initialization failed, will retry");
                false
            }
        }
    }

    /// Release all resources and end the current instance.
    pub fn teardown(&mut self) {
        self.backend.destroy_map();
        self.initialized = false;
        self.epoch += 1;
        self.style_tx.send_replace(false);
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Monotonic instance counter. Async work captures this before a
    /// suspension point and compares afterwards before touching the map.
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Mark the style as loaded for the current instance.
    pub fn notify_style_loaded(&mut self) {
        if self.initialized {
            self.style_tx.send_replace(true);
        }
    }

    pub fn style_loaded(&self) -> bool {
        *self.style_tx.borrow()
    }

    /// Subscribe to the style-loaded signal.
    pub fn style_signal(&self) -> watch::Receiver<bool> {
        self.style_tx.subscribe()
    }

    pub fn fly_to(&mut self, camera: CameraMove) {
        if self.initialized {
            self.backend.fly_to(camera);
        }
    }

    /// Place a marker. Returns `None` when the surface has no live map, in
    /// which case nothing was created.
    pub fn add_marker(&mut self, spec: MarkerSpec) -> Option<MarkerHandle> {
        if !self.initialized {
            tracing::debug!("marker add skipped, surface not initialized");
            return None;
        }
        Some(self.backend.add_marker(spec))
    }

    pub fn remove_marker(&mut self, handle: MarkerHandle) {
        if self.initialized {
            self.backend.remove_marker(handle);
        }
    }

    pub fn has_source(&self, id: &str) -> bool {
        self.initialized && self.backend.has_source(id)
    }

    pub fn add_geojson_source(&mut self, id: &str, data: serde_json::Value) {
        if self.initialized {
            self.backend.add_geojson_source(id, data);
        }
    }

    pub fn has_layer(&self, id: &str) -> bool {
        self.initialized && self.backend.has_layer(id)
    }

    pub fn add_fill_layer(&mut self, spec: FillLayerSpec) {
        if self.initialized {
            self.backend.add_fill_layer(spec);
        }
    }

    pub fn add_line_layer(&mut self, spec: LineLayerSpec) {
        if self.initialized {
            self.backend.add_line_layer(spec);
        }
    }

    pub fn set_layer_visibility(&mut self, id: &str, visible: bool) {
        if self.initialized {
            self.backend.set_layer_visibility(id, visible);
        }
    }
}

//! Seam between the engine and the external mapping SDK.
//!
//! Everything the engine needs from a map runtime is expressed through
//! [`MapBackend`]: instance lifecycle, camera moves, markers, and
//! source/layer registration. Production hosts wrap their SDK of choice;
//! [`crate::RecordingBackend`] serves tests and headless runs.

use foundation::color::Color;
use foundation::geo::LngLat;

use crate::camera::CameraMove;

/// Opaque handle for a live marker object owned by the backend.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MarkerHandle(pub u64);

/// Everything needed to place one property marker.
#[derive(Debug, Clone, PartialEq)]
pub struct MarkerSpec {
    pub position: LngLat,
    pub color: Color,
    /// Text shown inside the marker, the display score or `"?"`.
    pub label: String,
}

/// Categorical `gridcode -> color` paint for a polygon fill layer.
///
/// `stops` pairs each gridcode with its ramp color; codes outside the stop
/// set paint with `default_color`.
#[derive(Debug, Clone, PartialEq)]
pub struct StepPaint {
    pub stops: Vec<(i64, Color)>,
    pub default_color: Color,
    pub opacity: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FillLayerSpec {
    pub id: String,
    pub source: String,
    pub paint: StepPaint,
    pub visible: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LineLayerSpec {
    pub id: String,
    pub source: String,
    pub color: Color,
    pub width: f32,
    pub visible: bool,
}

/// Parameters for creating the map instance.
#[derive(Debug, Clone)]
pub struct MapInit {
    pub center: LngLat,
    pub zoom: f64,
    /// Style document from the basemap service. `None` renders a blank
    /// basemap (silent degradation when the styling service is unreachable).
    pub style: Option<serde_json::Value>,
}

/// Error from backend operations.
#[derive(Debug)]
pub struct SurfaceError {
    pub message: String,
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl std::fmt::Display for SurfaceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for SurfaceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source.as_ref().map(|e| e.as_ref() as _)
    }
}

impl SurfaceError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    pub fn with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }
}

/// Trait for map runtimes.
///
/// Implementations must be `Send` so the engine can live inside async tasks.
/// All mutation happens through `&mut self`; the engine owns the backend
/// exclusively and serializes access within one reactive turn.
pub trait MapBackend: Send {
    /// Create the underlying map instance. Called at most once between
    /// `destroy_map` calls.
    fn create_map(&mut self, init: MapInit) -> Result<(), SurfaceError>;

    /// Release all map resources. Must be safe to call even if `create_map`
    /// never ran or failed.
    fn destroy_map(&mut self);

    fn add_navigation_control(&mut self);

    /// Start a camera animation. Supersedes any in-flight animation.
    fn fly_to(&mut self, camera: CameraMove);

    fn add_marker(&mut self, spec: MarkerSpec) -> MarkerHandle;

    fn remove_marker(&mut self, handle: MarkerHandle);

    fn has_source(&self, id: &str) -> bool;

    /// Register a GeoJSON source. The document is passed through opaque;
    /// only paint expressions inspect feature properties.
    fn add_geojson_source(&mut self, id: &str, data: serde_json::Value);

    fn has_layer(&self, id: &str) -> bool;

    fn add_fill_layer(&mut self, spec: FillLayerSpec);

    fn add_line_layer(&mut self, spec: LineLayerSpec);

    /// Toggle a layer's visibility. Unknown ids are ignored.
    fn set_layer_visibility(&mut self, id: &str, visible: bool);
}

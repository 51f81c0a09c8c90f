use foundation::geo::LngLat;

/// Asynchronous camera animation request.
///
/// Ordering contract:
/// - Last call wins; an earlier in-flight animation is superseded.
/// - No completion callback is exposed; callers must not depend on the
///   animation having finished.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct CameraMove {
    pub center: LngLat,
    pub zoom: f64,
    pub duration_ms: u32,
}

impl CameraMove {
    pub fn new(center: LngLat, zoom: f64, duration_ms: u32) -> Self {
        Self {
            center,
            zoom,
            duration_ms,
        }
    }
}

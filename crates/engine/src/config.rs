use std::time::Duration;

use foundation::geo::LngLat;

/// Tunables for one engine instance.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Initial camera center.
    pub center: LngLat,
    /// Initial camera zoom.
    pub zoom: f64,
    /// Zoom used when flying to a clicked marker.
    pub fly_to_zoom: f64,
    /// Duration of the fly-to animation.
    pub fly_to_duration_ms: u32,
    /// How long after starting the fly-to the click notification fires.
    /// Cosmetic sequencing, not a load-bearing contract.
    pub click_notify_delay: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            // Jakarta.
            center: LngLat::new(106.82, -6.21),
            zoom: 12.0,
            fly_to_zoom: 16.0,
            fly_to_duration_ms: 1500,
            click_notify_delay: Duration::from_millis(300),
        }
    }
}

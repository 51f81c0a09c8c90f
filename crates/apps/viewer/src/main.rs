//! Headless demo session against the recording backend.
//!
//! Drives the engine the way a host application would: mount, load
//! properties, cycle through every overlay, toggle markers, click a marker.
//! Point `API_BASE` at a live data server to fetch real geometry; without it
//! a bundled synthetic dataset is used.

use std::env;
use std::sync::Arc;
use std::time::Duration;

use engine::{EngineConfig, MapEngine};
use foundation::geo::LngLat;
use foundation::ids::PropertyId;
use layers::{ClimateScores, PropertyRecord};
use streaming::{
    Feature, FeatureCollection, FeatureProperties, GeometrySource, HttpGeometrySource,
    MemoryGeometrySource, StyleFetcher,
};
use surface::RecordingBackend;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let config = EngineConfig {
        click_notify_delay: Duration::from_millis(env_var_u64("CLICK_NOTIFY_DELAY_MS", 300)),
        ..EngineConfig::default()
    };

    let source: Arc<dyn GeometrySource> = match env::var("API_BASE") {
        Ok(base) => {
            info!(%base, "using live geometry endpoint");
            Arc::new(HttpGeometrySource::new(base))
        }
        Err(_) => {
            info!("API_BASE not set, using bundled demo geometry");
            Arc::new(demo_source())
        }
    };

    let style = match (env::var("TILE_HOST"), env::var("MAPID_API_KEY")) {
        (Ok(host), Ok(key)) => {
            let style_name = env::var("MAP_STYLE").unwrap_or_else(|_| "basic".to_string());
            StyleFetcher::new(host, key).fetch_or_blank(&style_name).await
        }
        _ => {
            info!("style service not configured, starting with a blank basemap");
            None
        }
    };

    let backend = RecordingBackend::new();
    let state = backend.state();
    let mut engine = MapEngine::new(Box::new(backend), source, config)
        .with_event_sink(Box::new(|code| info!(code, "event from map")));

    engine.mount(true, style);
    engine.notify_style_loaded();

    engine.set_properties(&demo_properties());
    info!(markers = engine.marker_count(), "markers placed");

    for code in [1u32, 2, 3, 4, 0] {
        engine.apply_code(code).await;
        let visible = state.lock().visible_fill_layers();
        info!(code, selection = ?engine.selection(), ?visible, "applied interaction code");
    }

    engine.toggle_markers().await;
    engine.handle_marker_click(PropertyId(101)).await;

    let snapshot = state.lock();
    info!(
        sources = snapshot.sources.len(),
        markers = snapshot.markers.len(),
        fly_tos = snapshot.fly_tos.len(),
        "session complete"
    );
}

fn env_var_u64(name: &str, default: u64) -> u64 {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn demo_properties() -> Vec<PropertyRecord> {
    let composite = |overall: i32| {
        Some(ClimateScores {
            overall: Some(overall),
            ..ClimateScores::default()
        })
    };
    vec![
        PropertyRecord {
            id: PropertyId(101),
            position: LngLat::new(106.80, -6.19),
            climate_scores: composite(88),
            climate_risk_score: None,
        },
        PropertyRecord {
            id: PropertyId(102),
            position: LngLat::new(106.83, -6.21),
            climate_scores: composite(72),
            climate_risk_score: None,
        },
        PropertyRecord {
            id: PropertyId(103),
            position: LngLat::new(106.85, -6.23),
            climate_scores: None,
            climate_risk_score: Some(48),
        },
        PropertyRecord {
            id: PropertyId(104),
            position: LngLat::new(106.87, -6.20),
            climate_scores: None,
            climate_risk_score: None,
        },
    ]
}

/// Synthetic overlay geometry: a small strip of square cells per layer,
/// gridcodes cycling through the layer's category range.
fn demo_source() -> MemoryGeometrySource {
    let source = MemoryGeometrySource::new();
    for (layer, def) in catalog::all() {
        let features = (0..12i64)
            .map(|i| {
                let lon = 106.78 + 0.01 * i as f64;
                let lat = -6.24;
                let cell = serde_json::json!([[
                    [lon, lat],
                    [lon + 0.01, lat],
                    [lon + 0.01, lat + 0.01],
                    [lon, lat + 0.01],
                    [lon, lat],
                ]]);
                Feature {
                    kind: "Feature".to_string(),
                    properties: FeatureProperties {
                        gridcode: (i % def.category_count as i64) + 1,
                        object_id: Some(i + 1),
                        id: Some(i),
                        extra: serde_json::Map::new(),
                    },
                    geometry: serde_json::json!({
                        "type": "Polygon",
                        "coordinates": cell,
                    }),
                }
            })
            .collect();
        source.insert(layer, FeatureCollection::new(features));
    }
    source
}

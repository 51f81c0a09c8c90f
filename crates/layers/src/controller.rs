//! Climate overlay lifecycle: lazy fetch-and-register, exclusive visibility.
//!
//! Each overlay's geometry is fetched at most once per map instance;
//! idempotence is checked against the map itself ("does the source already
//! exist") rather than a side table, so a torn-down map naturally forgets.
//! Visibility switching always hides every known layer before showing the
//! requested one, with no diffing against the previous selection.

use std::collections::BTreeMap;
use std::sync::Arc;

use catalog::{ClimateLayerId, LayerDefinition};
use foundation::color::Color;
use futures_util::future::join_all;
use streaming::{FeatureCollection, GeometryError, GeometrySource};
use surface::{FillLayerSpec, LineLayerSpec, MapSurface, StepPaint};

const FILL_OPACITY: f32 = 0.7;
const OUTLINE_COLOR: Color = Color::rgb(0x00, 0x00, 0x00);
const OUTLINE_WIDTH: f32 = 1.0;

pub fn source_id(layer: ClimateLayerId) -> String {
    format!("{layer}-source")
}

pub fn fill_id(layer: ClimateLayerId) -> String {
    format!("{layer}-fill")
}

pub fn outline_id(layer: ClimateLayerId) -> String {
    format!("{layer}-outline")
}

/// Runtime state of one overlay on the current map instance.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct LayerRuntimeState {
    /// Set once the source and layers are registered; never reverts while
    /// the instance lives. A failed fetch leaves this false so the next
    /// selection retries.
    pub geometry_loaded: bool,
    pub visible: bool,
}

/// Gridcode step paint for an overlay: code `n` maps to `color_ramp[n-1]`,
/// out-of-range codes fall back to the first ramp entry.
pub fn fill_paint(def: &LayerDefinition) -> StepPaint {
    StepPaint {
        stops: def
            .color_ramp
            .iter()
            .enumerate()
            .map(|(i, color)| (i as i64 + 1, *color))
            .collect(),
        default_color: def.color_ramp[0],
        opacity: FILL_OPACITY,
    }
}

pub struct LayerController {
    source: Arc<dyn GeometrySource>,
    states: BTreeMap<ClimateLayerId, LayerRuntimeState>,
}

impl LayerController {
    pub fn new(source: Arc<dyn GeometrySource>) -> Self {
        Self {
            source,
            states: BTreeMap::new(),
        }
    }

    pub fn state(&self, layer: ClimateLayerId) -> LayerRuntimeState {
        self.states.get(&layer).copied().unwrap_or_default()
    }

    /// Fetch and register one overlay if the map doesn't have it yet.
    ///
    /// Waits for the style-loaded signal before touching the map. A second
    /// call for the same `(map instance, layer)` is a no-op and performs no
    /// network fetch.
    pub async fn ensure_loaded(
        &mut self,
        surface: &mut MapSurface,
        layer: ClimateLayerId,
    ) -> Result<(), GeometryError> {
        if surface.has_source(&source_id(layer)) {
            self.states.entry(layer).or_default().geometry_loaded = true;
            return Ok(());
        }

        let mut style = surface.style_signal();
        if style.wait_for(|ready| *ready).await.is_err() {
            return Ok(());
        }

        let epoch = surface.epoch();
        let data = self.source.fetch_layer(layer).await?;
        if surface.epoch() != epoch {
            // The instance this fetch was started for is gone.
            return Ok(());
        }

        self.register(surface, layer, &data);
        Ok(())
    }

    /// Fetch every missing overlay concurrently, then register the results.
    ///
    /// The registration and any visibility pass after this call never race a
    /// fetch: all fetches settle before the first source is added. Failures
    /// are logged per layer and leave that layer unloaded for a later retry.
    pub async fn ensure_all_loaded(&mut self, surface: &mut MapSurface) {
        let mut missing: Vec<ClimateLayerId> = Vec::new();
        for layer in ClimateLayerId::ALL {
            if surface.has_source(&source_id(layer)) {
                self.states.entry(layer).or_default().geometry_loaded = true;
            } else {
                missing.push(layer);
            }
        }
        if missing.is_empty() {
            return;
        }

        let mut style = surface.style_signal();
        if style.wait_for(|ready| *ready).await.is_err() {
            return;
        }

        let epoch = surface.epoch();
        let source = Arc::clone(&self.source);
        let settled = join_all(missing.into_iter().map(|layer| {
            let source = Arc::clone(&source);
            async move { (layer, source.fetch_layer(layer).await) }
        }))
        .await;

        if surface.epoch() != epoch {
            return;
        }

        for (layer, result) in settled {
            match result {
                Ok(data) => self.register(surface, layer, &data),
                Err(err) => {
                    tracing::warn!(layer = %layer, error = %err, "overlay geometry fetch failed");
                }
            }
        }
    }

    /// Hide every known overlay, then show `active` if given.
    pub fn set_active(&mut self, surface: &mut MapSurface, active: Option<ClimateLayerId>) {
        for layer in ClimateLayerId::ALL {
            Self::apply_visibility(surface, layer, false);
            self.states.entry(layer).or_default().visible = false;
        }
        if let Some(layer) = active {
            let shown = Self::apply_visibility(surface, layer, true);
            // An unloaded layer (failed fetch) has nothing to show.
            self.states.entry(layer).or_default().visible = shown;
        }
    }

    fn apply_visibility(surface: &mut MapSurface, layer: ClimateLayerId, visible: bool) -> bool {
        let mut any = false;
        for id in [fill_id(layer), outline_id(layer)] {
            if surface.has_layer(&id) {
                surface.set_layer_visibility(&id, visible);
                any = true;
            }
        }
        any
    }

    fn register(&mut self, surface: &mut MapSurface, layer: ClimateLayerId, data: &FeatureCollection) {
        let def = catalog::get(layer);
        let source = source_id(layer);
        surface.add_geojson_source(&source, data.to_value());
        surface.add_fill_layer(FillLayerSpec {
            id: fill_id(layer),
            source: source.clone(),
            paint: fill_paint(def),
            visible: false,
        });
        surface.add_line_layer(LineLayerSpec {
            id: outline_id(layer),
            source,
            color: OUTLINE_COLOR,
            width: OUTLINE_WIDTH,
            visible: false,
        });
        let state = self.states.entry(layer).or_default();
        state.geometry_loaded = true;
        state.visible = false;
    }
}

//! Static registry of the climate overlay layers.
//!
//! The catalog is an immutable lookup table defined once at startup: four
//! polygon overlays, each with a display name, an ordered color ramp (one
//! entry per gridcode category), and a legend. Iteration order of [`all`] is
//! the fixed declaration order, used for deterministic UI listing.

use foundation::color::Color;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

/// Identifier of one climate overlay.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClimateLayerId {
    /// Land-surface temperature.
    Lst,
    /// Normalized difference vegetation index.
    Ndvi,
    /// Urban heat island intensity.
    Uhi,
    /// Urban thermal field variance index.
    Utfvi,
}

impl ClimateLayerId {
    /// Declaration order; also the listing order of [`all`].
    pub const ALL: [ClimateLayerId; 4] = [
        ClimateLayerId::Lst,
        ClimateLayerId::Ndvi,
        ClimateLayerId::Uhi,
        ClimateLayerId::Utfvi,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ClimateLayerId::Lst => "lst",
            ClimateLayerId::Ndvi => "ndvi",
            ClimateLayerId::Uhi => "uhi",
            ClimateLayerId::Utfvi => "utfvi",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "lst" => Some(ClimateLayerId::Lst),
            "ndvi" => Some(ClimateLayerId::Ndvi),
            "uhi" => Some(ClimateLayerId::Uhi),
            "utfvi" => Some(ClimateLayerId::Utfvi),
            _ => None,
        }
    }
}

impl std::fmt::Display for ClimateLayerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One swatch of a layer legend.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct LegendEntry {
    pub color: Color,
    pub label: &'static str,
}

/// Immutable description of one overlay: how to paint it and how to label it.
///
/// Invariant: `color_ramp.len() == legend.len() == category_count as usize`.
/// Gridcode `n` (1-based) paints with `color_ramp[n - 1]`.
#[derive(Debug, Clone, PartialEq)]
pub struct LayerDefinition {
    pub id: ClimateLayerId,
    pub display_name: &'static str,
    pub color_ramp: Vec<Color>,
    pub legend: Vec<LegendEntry>,
    pub category_count: u8,
}

impl LayerDefinition {
    fn new(
        id: ClimateLayerId,
        display_name: &'static str,
        entries: &[(&'static str, Color)],
    ) -> Self {
        let color_ramp = entries.iter().map(|(_, c)| *c).collect::<Vec<_>>();
        let legend = entries
            .iter()
            .copied()
            .map(|(label, color)| LegendEntry { color, label })
            .collect::<Vec<_>>();
        Self {
            id,
            display_name,
            category_count: color_ramp.len() as u8,
            color_ramp,
            legend,
        }
    }
}

static CATALOG: Lazy<Vec<LayerDefinition>> = Lazy::new(|| {
    vec![
        LayerDefinition::new(
            ClimateLayerId::Lst,
            "Land Surface Temperature",
            &[
                ("< 20 °C", Color::rgb(0x31, 0x36, 0x95)),
                ("20–23 °C", Color::rgb(0x45, 0x75, 0xb4)),
                ("23–26 °C", Color::rgb(0x74, 0xad, 0xd1)),
                ("26–29 °C", Color::rgb(0xab, 0xd9, 0xe9)),
                ("29–32 °C", Color::rgb(0xfe, 0xe0, 0x90)),
                ("32–35 °C", Color::rgb(0xfd, 0xae, 0x61)),
                ("35–38 °C", Color::rgb(0xf4, 0x6d, 0x43)),
                ("> 38 °C", Color::rgb(0xd7, 0x30, 0x27)),
            ],
        ),
        LayerDefinition::new(
            ClimateLayerId::Ndvi,
            "Vegetation Index",
            &[
                ("Bare / built-up", Color::rgb(0xf7, 0xf7, 0xf7)),
                ("Sparse vegetation", Color::rgb(0xe6, 0xf5, 0xd0)),
                ("Moderate vegetation", Color::rgb(0xb8, 0xe1, 0x86)),
                ("Dense vegetation", Color::rgb(0x7f, 0xbc, 0x41)),
                ("Very dense vegetation", Color::rgb(0x27, 0x64, 0x19)),
            ],
        ),
        LayerDefinition::new(
            ClimateLayerId::Uhi,
            "Urban Heat Island",
            &[
                ("No island effect", Color::rgb(0xff, 0xff, 0xb2)),
                ("Weak", Color::rgb(0xfe, 0xcc, 0x5c)),
                ("Moderate", Color::rgb(0xfd, 0x8d, 0x3c)),
                ("Strong", Color::rgb(0xf0, 0x3b, 0x20)),
                ("Severe", Color::rgb(0xbd, 0x00, 0x26)),
            ],
        ),
        LayerDefinition::new(
            ClimateLayerId::Utfvi,
            "Urban Thermal Field",
            &[
                ("Excellent", Color::rgb(0x1a, 0x96, 0x41)),
                ("Good", Color::rgb(0xa6, 0xd9, 0x6a)),
                ("Normal", Color::rgb(0xff, 0xff, 0xbf)),
                ("Bad", Color::rgb(0xfd, 0xae, 0x61)),
                ("Worst", Color::rgb(0xd7, 0x19, 0x1c)),
            ],
        ),
    ]
});

/// Look up one layer definition.
pub fn get(id: ClimateLayerId) -> &'static LayerDefinition {
    // ALL and CATALOG share declaration order, so position lookup is safe.
    let pos = ClimateLayerId::ALL
        .iter()
        .position(|x| *x == id)
        .expect("every ClimateLayerId has a catalog entry");
    &CATALOG[pos]
}

/// Iterate all layer definitions in declaration order.
pub fn all() -> impl Iterator<Item = (ClimateLayerId, &'static LayerDefinition)> {
    CATALOG.iter().map(|def| (def.id, def))
}

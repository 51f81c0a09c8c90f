//! Wire types for the layer geometry endpoint.
//!
//! The API wraps a GeoJSON FeatureCollection in a small status envelope.
//! Feature geometry bodies are carried opaque; the engine only reads
//! `gridcode` for paint matching. `OBJECTID`/`Id` exist for traceability
//! and are not used by rendering.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoJsonEnvelope {
    pub status: String,
    pub data: FeatureCollection,
}

impl GeoJsonEnvelope {
    pub fn is_success(&self) -> bool {
        self.status == "success"
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureCollection {
    #[serde(rename = "type")]
    pub kind: String,
    pub features: Vec<Feature>,
}

impl FeatureCollection {
    pub fn new(features: Vec<Feature>) -> Self {
        Self {
            kind: "FeatureCollection".to_string(),
            features,
        }
    }

    /// Serialize back to a raw JSON document for source registration.
    pub fn to_value(&self) -> serde_json::Value {
        serde_json::to_value(self).expect("feature collection serializes")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    #[serde(rename = "type")]
    pub kind: String,
    pub properties: FeatureProperties,
    pub geometry: serde_json::Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureProperties {
    /// Category code, `1..=category_count` for the owning layer.
    pub gridcode: i64,
    #[serde(rename = "OBJECTID", default, skip_serializing_if = "Option::is_none")]
    pub object_id: Option<i64>,
    #[serde(rename = "Id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

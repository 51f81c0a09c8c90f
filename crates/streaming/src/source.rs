//! Geometry source abstraction.
//!
//! The engine fetches each overlay's geometry lazily through
//! [`GeometrySource`]:
//! - [`HttpGeometrySource`] talks to the data API.
//! - [`MemoryGeometrySource`] serves fixtures for tests and headless runs
//!   and counts fetches so idempotence is assertable.
//!
//! New sources can be added by implementing the `GeometrySource` trait.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;

use catalog::ClimateLayerId;
use parking_lot::Mutex;

use crate::envelope::{FeatureCollection, GeoJsonEnvelope};

/// Error type for geometry acquisition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GeometryError {
    /// Transport-level failure (DNS, connect, timeout).
    Request(String),
    /// Non-2xx response from the endpoint.
    Status(u16),
    /// Body was not a valid envelope.
    Decode(String),
    /// Envelope arrived but did not report success.
    Envelope(String),
}

impl std::fmt::Display for GeometryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GeometryError::Request(msg) => write!(f, "geometry request failed: {msg}"),
            GeometryError::Status(code) => write!(f, "geometry endpoint returned HTTP {code}"),
            GeometryError::Decode(msg) => write!(f, "geometry payload invalid: {msg}"),
            GeometryError::Envelope(status) => {
                write!(f, "geometry envelope status was {status:?}")
            }
        }
    }
}

impl std::error::Error for GeometryError {}

/// Type alias for a boxed future that can be sent between threads.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Trait for layer geometry providers.
///
/// Implementations must be `Send + Sync` for use across async tasks.
/// Methods return boxed futures for dyn-compatibility.
pub trait GeometrySource: Send + Sync {
    /// Fetch the full FeatureCollection for one overlay.
    fn fetch_layer(
        &self,
        layer: ClimateLayerId,
    ) -> BoxFuture<'_, Result<FeatureCollection, GeometryError>>;
}

/// HTTP geometry source against `{base}/api/data/geojson/{layer}`.
pub struct HttpGeometrySource {
    base_url: String,
    client: reqwest::Client,
}

impl HttpGeometrySource {
    pub fn new(base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self {
            base_url,
            client: reqwest::Client::new(),
        }
    }

    fn layer_url(&self, layer: ClimateLayerId) -> String {
        format!("{}/api/data/geojson/{}", self.base_url, layer.as_str())
    }
}

impl GeometrySource for HttpGeometrySource {
    fn fetch_layer(
        &self,
        layer: ClimateLayerId,
    ) -> BoxFuture<'_, Result<FeatureCollection, GeometryError>> {
        let url = self.layer_url(layer);
        Box::pin(async move {
            let resp = self
                .client
                .get(&url)
                .send()
                .await
                .map_err(|e| GeometryError::Request(e.to_string()))?;

            if !resp.status().is_success() {
                return Err(GeometryError::Status(resp.status().as_u16()));
            }

            let envelope: GeoJsonEnvelope = resp
                .json()
                .await
                .map_err(|e| GeometryError::Decode(e.to_string()))?;

            if !envelope.is_success() {
                return Err(GeometryError::Envelope(envelope.status));
            }

            Ok(envelope.data)
        })
    }
}

/// In-memory geometry source for tests and headless runs.
///
/// Layers without a fixture behave like a missing dataset (HTTP 404).
/// Every fetch attempt is counted, including failed ones.
#[derive(Debug, Default)]
pub struct MemoryGeometrySource {
    inner: Mutex<MemoryInner>,
}

#[derive(Debug, Default)]
struct MemoryInner {
    layers: HashMap<ClimateLayerId, FeatureCollection>,
    fetch_counts: HashMap<ClimateLayerId, u32>,
}

impl MemoryGeometrySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, layer: ClimateLayerId, data: FeatureCollection) {
        self.inner.lock().layers.insert(layer, data);
    }

    pub fn remove(&self, layer: ClimateLayerId) -> Option<FeatureCollection> {
        self.inner.lock().layers.remove(&layer)
    }

    /// Number of fetch attempts made for `layer`.
    pub fn fetch_count(&self, layer: ClimateLayerId) -> u32 {
        self.inner
            .lock()
            .fetch_counts
            .get(&layer)
            .copied()
            .unwrap_or(0)
    }
}

impl GeometrySource for MemoryGeometrySource {
    fn fetch_layer(
        &self,
        layer: ClimateLayerId,
    ) -> BoxFuture<'_, Result<FeatureCollection, GeometryError>> {
        Box::pin(async move {
            let mut inner = self.inner.lock();
            *inner.fetch_counts.entry(layer).or_insert(0) += 1;
            inner
                .layers
                .get(&layer)
                .cloned()
                .ok_or(GeometryError::Status(404))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{GeometryError, GeometrySource, HttpGeometrySource, MemoryGeometrySource};
    use crate::envelope::FeatureCollection;
    use catalog::ClimateLayerId;

    #[test]
    fn layer_urls_do_not_double_slash() {
        let source = HttpGeometrySource::new("http://localhost:9300/");
        assert_eq!(
            source.layer_url(ClimateLayerId::Lst),
            "http://localhost:9300/api/data/geojson/lst"
        );
    }

    #[tokio::test]
    async fn memory_source_counts_every_attempt() {
        let source = MemoryGeometrySource::new();
        source.insert(ClimateLayerId::Ndvi, FeatureCollection::new(vec![]));

        assert!(source.fetch_layer(ClimateLayerId::Ndvi).await.is_ok());
        assert!(source.fetch_layer(ClimateLayerId::Ndvi).await.is_ok());
        assert_eq!(source.fetch_count(ClimateLayerId::Ndvi), 2);

        let missing = source.fetch_layer(ClimateLayerId::Uhi).await;
        assert_eq!(missing, Err(GeometryError::Status(404)));
        assert_eq!(source.fetch_count(ClimateLayerId::Uhi), 1);
    }
}

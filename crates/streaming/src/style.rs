//! Basemap style acquisition.
//!
//! The styling service is external and opaque; the engine only forwards the
//! document to the map backend. An unreachable service degrades to a blank
//! basemap rather than failing initialization.

use serde_json::Value;

use crate::source::GeometryError;

/// Fetches style documents from the basemap tile host.
pub struct StyleFetcher {
    tile_host: String,
    api_key: String,
    client: reqwest::Client,
}

impl StyleFetcher {
    pub fn new(tile_host: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            tile_host: tile_host.into(),
            api_key: api_key.into(),
            client: reqwest::Client::new(),
        }
    }

    fn style_url(&self, style: &str) -> String {
        format!(
            "https://{}/styles/{}/style.json?key={}",
            self.tile_host, style, self.api_key
        )
    }

    pub async fn fetch(&self, style: &str) -> Result<Value, GeometryError> {
        let resp = self
            .client
            .get(self.style_url(style))
            .send()
            .await
            .map_err(|e| GeometryError::Request(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(GeometryError::Status(resp.status().as_u16()));
        }

        resp.json()
            .await
            .map_err(|e| GeometryError::Decode(e.to_string()))
    }

    /// Fetch the style, degrading to `None` (blank basemap) on any failure.
    pub async fn fetch_or_blank(&self, style: &str) -> Option<Value> {
        match self.fetch(style).await {
            Ok(doc) => Some(doc),
            Err(err) => {
                tracing::warn!(style, error = %err, "style fetch failed, using blank basemap");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::StyleFetcher;

    #[test]
    fn style_url_carries_key() {
        let fetcher = StyleFetcher::new("basemap.example.io", "k123");
        assert_eq!(
            fetcher.style_url("basic"),
            "https://basemap.example.io/styles/basic/style.json?key=k123"
        );
    }
}

//! Development data server.
//!
//! Serves overlay GeoJSON from disk in the status envelope the engine
//! expects, with optional feature pagination, and proxies the basemap
//! styling service so the tile-host API key stays server-side.

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use axum::extract::{Path as AxumPath, Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use catalog::ClimateLayerId;
use serde::Deserialize;
use serde_json::{json, Value};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Clone)]
struct AppState {
    data_root: Arc<PathBuf>,
    tile_host: String,
    api_key: String,
    http: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct PageParams {
    page: Option<usize>,
    per_page: Option<usize>,
}

#[derive(Debug, Deserialize)]
struct StyleParams {
    style: Option<String>,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let addr: SocketAddr = env::var("DATA_ADDR")
        .unwrap_or_else(|_| "127.0.0.1:9300".to_string())
        .parse()
        .expect("invalid DATA_ADDR");
    let data_root = env::var("DATA_ROOT")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("./data/geojson"));
    let tile_host = env::var("TILE_HOST").unwrap_or_else(|_| "basemap.mapid.io".to_string());
    let api_key = env::var("MAPID_API_KEY").unwrap_or_default();

    if api_key.is_empty() {
        warn!("MAPID_API_KEY not set, style proxy requests will be rejected upstream");
    }

    let state = AppState {
        data_root: Arc::new(data_root),
        tile_host,
        api_key,
        http: reqwest::Client::new(),
    };

    let app = Router::new()
        .route("/api/data/geojson/:layer", get(get_layer_geojson))
        .route("/api/map/style", get(get_map_style))
        .route("/api/map/resources/*path", get(get_map_resource))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state);

    info!(%addr, "data server listening");
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("bind DATA_ADDR");
    axum::serve(listener, app).await.expect("server run");
}

fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (
        status,
        Json(json!({ "status": "error", "message": message.into() })),
    )
        .into_response()
}

async fn get_layer_geojson(
    State(state): State<AppState>,
    AxumPath(layer): AxumPath<String>,
    Query(params): Query<PageParams>,
) -> Response {
    let Some(layer) = ClimateLayerId::parse(&layer) else {
        return error_response(StatusCode::BAD_REQUEST, "invalid layer");
    };

    let path = state.data_root.join(format!("{layer}.geojson"));
    let raw = match tokio::fs::read_to_string(&path).await {
        Ok(raw) => raw,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            return error_response(StatusCode::NOT_FOUND, "data not found");
        }
        Err(err) => {
            warn!(%layer, error = %err, "failed to read layer file");
            return error_response(StatusCode::INTERNAL_SERVER_ERROR, err.to_string());
        }
    };

    let mut document: Value = match serde_json::from_str(&raw) {
        Ok(doc) => doc,
        Err(err) => {
            warn!(%layer, error = %err, "layer file is not valid JSON");
            return error_response(StatusCode::INTERNAL_SERVER_ERROR, "corrupt layer data");
        }
    };

    let features = document
        .get_mut("features")
        .and_then(Value::as_array_mut)
        .map(std::mem::take)
        .unwrap_or_default();

    let page = Pagination::new(params.page, params.per_page);
    let (page_features, total_features, total_pages) = page.slice(features);

    Json(json!({
        "status": "success",
        "page": page.page,
        "per_page": page.per_page,
        "total_features": total_features,
        "total_pages": total_pages,
        "data": {
            "type": "FeatureCollection",
            "features": page_features,
        },
    }))
    .into_response()
}

#[derive(Debug, Copy, Clone)]
struct Pagination {
    page: usize,
    per_page: usize,
}

impl Pagination {
    fn new(page: Option<usize>, per_page: Option<usize>) -> Self {
        Self {
            page: page.unwrap_or(1).max(1),
            per_page: per_page.unwrap_or(100).max(1),
        }
    }

    /// Returns the requested page plus `(total_features, total_pages)`.
    /// Pages past the end come back empty rather than erroring.
    fn slice(&self, features: Vec<Value>) -> (Vec<Value>, usize, usize) {
        let total_features = features.len();
        let total_pages = total_features.div_ceil(self.per_page);
        let start = (self.page - 1)
            .saturating_mul(self.per_page)
            .min(total_features);
        let end = start.saturating_add(self.per_page).min(total_features);
        (features[start..end].to_vec(), total_features, total_pages)
    }
}

async fn get_map_style(State(state): State<AppState>, Query(params): Query<StyleParams>) -> Response {
    let style = params.style.unwrap_or_else(|| "basic".to_string());
    let url = format!(
        "https://{}/styles/{}/style.json?key={}",
        state.tile_host, style, state.api_key
    );
    proxy(&state, &url).await
}

async fn get_map_resource(
    State(state): State<AppState>,
    AxumPath(path): AxumPath<String>,
) -> Response {
    let url = format!("https://{}/{}?key={}", state.tile_host, path, state.api_key);
    proxy(&state, &url).await
}

/// Forward one upstream response verbatim, keeping its content type.
async fn proxy(state: &AppState, url: &str) -> Response {
    let resp = match state.http.get(url).send().await {
        Ok(resp) => resp,
        Err(err) => {
            warn!(error = %err, "upstream request failed");
            return error_response(StatusCode::BAD_GATEWAY, err.to_string());
        }
    };

    let status =
        StatusCode::from_u16(resp.status().as_u16()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    if !status.is_success() {
        return error_response(status, format!("upstream returned {status}"));
    }

    let content_type = resp
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("application/octet-stream")
        .to_string();

    match resp.bytes().await {
        Ok(body) => ([(header::CONTENT_TYPE, content_type)], body).into_response(),
        Err(err) => error_response(StatusCode::BAD_GATEWAY, err.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::Pagination;
    use serde_json::{json, Value};

    fn features(n: usize) -> Vec<Value> {
        (1..=n).map(|i| json!({ "properties": { "gridcode": i } })).collect()
    }

    #[test]
    fn defaults_to_first_hundred() {
        let page = Pagination::new(None, None);
        let (slice, total, pages) = page.slice(features(250));
        assert_eq!(slice.len(), 100);
        assert_eq!(total, 250);
        assert_eq!(pages, 3);
    }

    #[test]
    fn last_page_is_partial_and_overrun_is_empty() {
        let page = Pagination::new(Some(3), Some(100));
        let (slice, _, _) = page.slice(features(250));
        assert_eq!(slice.len(), 50);

        let past = Pagination::new(Some(9), Some(100));
        let (slice, total, pages) = past.slice(features(250));
        assert!(slice.is_empty());
        assert_eq!(total, 250);
        assert_eq!(pages, 3);
    }

    #[test]
    fn zero_params_are_clamped() {
        let page = Pagination::new(Some(0), Some(0));
        assert_eq!(page.page, 1);
        assert_eq!(page.per_page, 1);
    }
}

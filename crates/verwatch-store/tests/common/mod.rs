//! Local HTTP stub of the catalog service

#![allow(dead_code)]

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

pub const ETAG: &str = "\"catalog-v1\"";

#[derive(Default)]
pub struct StubState {
    pub catalog: Mutex<String>,
    pub etag: Mutex<Option<String>>,
    pub descriptors: Mutex<HashMap<String, String>>,
    pub catalog_hits: AtomicUsize,
    pub not_modified: AtomicUsize,
    pub descriptor_hits: AtomicUsize,
    pub missing_cache_buster: AtomicUsize,
}

pub struct StubServer {
    pub base_url: String,
    pub state: Arc<StubState>,
}

impl StubServer {
    pub async fn start() -> Self {
        let state = Arc::new(StubState::default());
        *state.etag.lock().unwrap() = Some(ETAG.to_string());

        let app = Router::new()
            .route("/mc/game/version_manifest.json", get(catalog))
            .route("/v1/packages/:hash/:file", get(descriptor))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url: format!("http://{}", addr),
            state,
        }
    }

    pub fn catalog_url(&self) -> String {
        format!("{}/mc/game/version_manifest.json", self.base_url)
    }

    pub fn entry_url(&self, hash: &str, id: &str) -> String {
        format!("{}/v1/packages/{}/{}.json", self.base_url, hash, id)
    }

    /// Publish a catalog of `(id, hash)` pairs, newest first, without sha1 fields
    pub fn publish(&self, versions: &[(&str, &str)]) {
        let entries: Vec<serde_json::Value> = versions
            .iter()
            .map(|(id, hash)| {
                serde_json::json!({
                    "id": id,
                    "type": "release",
                    "url": self.entry_url(hash, id),
                    "time": "2021-06-08T11:00:40+00:00",
                    "releaseTime": "2021-06-08T11:00:40+00:00",
                })
            })
            .collect();
        let latest = versions.first().map(|(id, _)| *id).unwrap_or_default();
        let body = serde_json::json!({
            "latest": {"release": latest},
            "versions": entries,
        });
        *self.state.catalog.lock().unwrap() = body.to_string();
    }

    pub fn set_etag(&self, etag: Option<&str>) {
        *self.state.etag.lock().unwrap() = etag.map(str::to_string);
    }

    pub fn put_descriptor(&self, hash: &str, body: &str) {
        self.state
            .descriptors
            .lock()
            .unwrap()
            .insert(hash.to_string(), body.to_string());
    }

    pub fn catalog_hits(&self) -> usize {
        self.state.catalog_hits.load(Ordering::SeqCst)
    }

    pub fn not_modified(&self) -> usize {
        self.state.not_modified.load(Ordering::SeqCst)
    }

    pub fn descriptor_hits(&self) -> usize {
        self.state.descriptor_hits.load(Ordering::SeqCst)
    }

    pub fn missing_cache_buster(&self) -> usize {
        self.state.missing_cache_buster.load(Ordering::SeqCst)
    }
}

async fn catalog(
    State(state): State<Arc<StubState>>,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> Response {
    state.catalog_hits.fetch_add(1, Ordering::SeqCst);
    if !query.get("t").is_some_and(|t| t.parse::<i64>().is_ok()) {
        state.missing_cache_buster.fetch_add(1, Ordering::SeqCst);
    }

    let etag = state.etag.lock().unwrap().clone();
    let presented = headers
        .get("if-none-match")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    if let (Some(etag), Some(presented)) = (&etag, &presented) {
        if etag == presented {
            state.not_modified.fetch_add(1, Ordering::SeqCst);
            return StatusCode::NOT_MODIFIED.into_response();
        }
    }

    let body = state.catalog.lock().unwrap().clone();
    let mut response = (StatusCode::OK, body).into_response();
    if let Some(etag) = etag {
        response
            .headers_mut()
            .insert("etag", etag.parse().unwrap());
    }
    response
}

async fn descriptor(
    State(state): State<Arc<StubState>>,
    Path((hash, _file)): Path<(String, String)>,
) -> Response {
    state.descriptor_hits.fetch_add(1, Ordering::SeqCst);
    match state.descriptors.lock().unwrap().get(&hash) {
        Some(body) => (StatusCode::OK, body.clone()).into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

pub fn descriptor_json(assets: &str, client_sha1: &str) -> String {
    serde_json::json!({
        "assets": assets,
        "downloads": {
            "client": {"sha1": client_sha1, "size": 1, "url": "https://example.invalid/client.jar"}
        },
        "javaVersion": {"component": "java-runtime-alpha", "majorVersion": 16},
        "libraries": [{"name": "com.mojang:brigadier:1.0.18"}]
    })
    .to_string()
}

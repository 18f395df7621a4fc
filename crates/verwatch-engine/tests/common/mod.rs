//! Local HTTP stub standing in for the catalog service and webhook endpoints

#![allow(dead_code)]

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Default)]
pub struct StubState {
    catalog: Mutex<(String, String)>,
    descriptors: Mutex<HashMap<String, String>>,
    /// Scripted statuses per hook, 204 once exhausted
    responses: Mutex<HashMap<String, VecDeque<StatusCode>>>,
    received: Mutex<Vec<(String, serde_json::Value)>>,
}

pub struct Stub {
    pub base_url: String,
    state: Arc<StubState>,
}

impl Stub {
    pub async fn start() -> Self {
        let state = Arc::new(StubState::default());
        let app = Router::new()
            .route("/manifest.json", get(catalog))
            .route("/v1/packages/:hash/:file", get(descriptor))
            .route("/hooks/:name", post(hook))
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
        format!("{}/manifest.json", self.base_url)
    }

    pub fn hook_url(&self, name: &str) -> String {
        format!("{}/hooks/{}", self.base_url, name)
    }

    /// Publish `(id, hash)` pairs, newest first; the hash doubles as etag seed
    pub fn publish(&self, versions: &[(&str, &str)]) {
        let entries: Vec<serde_json::Value> = versions
            .iter()
            .map(|(id, hash)| {
                serde_json::json!({
                    "id": id,
                    "type": "release",
                    "url": format!("{}/v1/packages/{}/{}.json", self.base_url, hash, id),
                    "time": "2021-06-08T11:00:40+00:00",
                    "releaseTime": "2021-06-08T11:00:40+00:00",
                    "sha1": hash,
                })
            })
            .collect();
        let body = serde_json::json!({"latest": {}, "versions": entries}).to_string();
        let etag = format!(
            "\"{}\"",
            versions.iter().map(|(_, h)| *h).collect::<Vec<_>>().join("-")
        );
        *self.state.catalog.lock().unwrap() = (etag, body);
    }

    pub fn put_descriptor(&self, hash: &str, assets: &str, client_sha1: &str, java: u32) {
        let body = serde_json::json!({
            "assets": assets,
            "downloads": {
                "client": {"sha1": client_sha1, "size": 1, "url": format!("https://example.invalid/{}.jar", client_sha1)}
            },
            "javaVersion": {"component": "java-runtime", "majorVersion": java},
            "libraries": [{"name": "com.mojang:brigadier:1.0.18"}]
        });
        self.state
            .descriptors
            .lock()
            .unwrap()
            .insert(hash.to_string(), body.to_string());
    }

    pub fn script(&self, hook: &str, statuses: &[StatusCode]) {
        self.state
            .responses
            .lock()
            .unwrap()
            .insert(hook.to_string(), statuses.iter().copied().collect());
    }

    pub fn received(&self) -> Vec<(String, serde_json::Value)> {
        self.state.received.lock().unwrap().clone()
    }

    pub fn received_by(&self, hook: &str) -> Vec<serde_json::Value> {
        self.received()
            .into_iter()
            .filter(|(name, _)| name == hook)
            .map(|(_, body)| body)
            .collect()
    }

    /// Wait until `count` payloads arrived, or give up after a second
    pub async fn wait_for(&self, count: usize) -> Vec<(String, serde_json::Value)> {
        for _ in 0..100 {
            let received = self.received();
            if received.len() >= count {
                return received;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        self.received()
    }
}

async fn catalog(State(state): State<Arc<StubState>>, headers: HeaderMap) -> Response {
    let (etag, body) = state.catalog.lock().unwrap().clone();
    let presented = headers.get("if-none-match").and_then(|v| v.to_str().ok());
    if presented == Some(etag.as_str()) {
        return StatusCode::NOT_MODIFIED.into_response();
    }
    let mut response = (StatusCode::OK, body).into_response();
    response.headers_mut().insert("etag", etag.parse().unwrap());
    response
}

async fn descriptor(
    State(state): State<Arc<StubState>>,
    Path((hash, _file)): Path<(String, String)>,
) -> Response {
    match state.descriptors.lock().unwrap().get(&hash) {
        Some(body) => (StatusCode::OK, body.clone()).into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn hook(
    State(state): State<Arc<StubState>>,
    Path(name): Path<String>,
    Json(body): Json<serde_json::Value>,
) -> Response {
    let status = state
        .responses
        .lock()
        .unwrap()
        .get_mut(&name)
        .and_then(VecDeque::pop_front)
        .unwrap_or(StatusCode::NO_CONTENT);

    if status == StatusCode::TOO_MANY_REQUESTS {
        return (
            status,
            Json(serde_json::json!({"message": "You are being rate limited.", "retry_after": 0.05, "global": false})),
        )
            .into_response();
    }
    if status.is_success() {
        state.received.lock().unwrap().push((name, body));
    }
    (status, "{}").into_response()
}

/// Write a config file pointing at the stub
pub fn write_config(dir: &std::path::Path, stub: &Stub, extra: &str) -> std::path::PathBuf {
    let path = dir.join("verwatch.toml");
    let cache_dir = dir.join("cache");
    let contents = format!(
        r#"
cache_dir = "{cache}"
catalog_url = "{catalog}"
poll_interval_secs = 1
request_timeout_secs = 5
{extra}

[endpoints.main]
webhook_url = "{main}"
role_mentions = ["111"]

[endpoints.ops]
webhook_url = "{ops}"
tags = ["admin"]
"#,
        cache = cache_dir.display(),
        catalog = stub.catalog_url(),
        main = stub.hook_url("main"),
        ops = stub.hook_url("ops"),
        extra = extra,
    );
    std::fs::write(&path, contents).unwrap();
    path
}

// Copyright 2025 Fernando Borretti
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::Mutex;

use assetgate_core::GateLatch;
use assetgate_core::GateManifest;
use assetgate_core::GateView;
use assetgate_core::TrackerState;
use axum::Json;
use axum::Router;
use axum::extract::Path;
use axum::extract::State;
use axum::http::HeaderName;
use axum::http::StatusCode;
use axum::http::header::CACHE_CONTROL;
use axum::http::header::CONTENT_TYPE;
use axum::response::Html;
use axum::routing::get;
use tokio::net::TcpListener;
use tokio::signal;
use tokio::sync::watch;

use crate::cmd::serve::template::render_gate;
use crate::error::Fallible;
use crate::gate::DEFAULT_MANIFEST;
use crate::gate::Gate;
use crate::media::fetch::AssetFetcher;
use crate::media::load::MediaLoader;
use crate::media::sniff::content_type_for;
use crate::tracker::session::start_tracking;
use crate::utils::CACHE_CONTROL_IMMUTABLE;

pub struct ServerConfig {
    pub manifest: Option<String>,
    pub host: String,
    pub port: u16,
}

#[derive(Clone)]
struct ServerState {
    /// Absolute path to the directory assets are served from.
    root: PathBuf,
    manifest: Arc<GateManifest>,
    /// Rendered Markdown content, shown once the gate opens.
    content: Arc<Option<String>>,
    current: watch::Receiver<TrackerState>,
    latch: Arc<Mutex<GateLatch>>,
}

pub async fn start_server(config: ServerConfig) -> Fallible<()> {
    let manifest_path: PathBuf =
        PathBuf::from(config.manifest.unwrap_or_else(|| DEFAULT_MANIFEST.to_string()));
    let gate = Gate::open(&manifest_path)?;
    let content: Option<String> = gate.render_content()?;
    let Gate { root, manifest } = gate;

    let loader = Arc::new(AssetFetcher::new(root.clone()));
    let mut tracking = start_tracking(manifest.images.clone(), loader);
    log::info!(
        "Preloading {} images in session {}",
        manifest.images.len(),
        tracking.id()
    );

    let state = ServerState {
        root,
        latch: Arc::new(Mutex::new(GateLatch::new(manifest.show_progress))),
        manifest: Arc::new(manifest),
        content: Arc::new(content),
        current: tracking.subscribe(),
    };
    let app = Router::new();
    let app = app.route("/", get(get_handler));
    let app = app.route("/state", get(state_handler));
    let app = app.route("/style.css", get(style_handler));
    let app = app.route("/file/{*path}", get(file_handler));
    let app = app.fallback(not_found_handler);
    let app = app.with_state(state);
    let bind = format!("{}:{}", config.host, config.port);

    log::debug!("Starting server on {bind}");
    let listener = TcpListener::bind(bind).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    log::debug!("Shutting down with assets at {}", tracking.state());
    tracking.stop();
    Ok(())
}

async fn get_handler(State(state): State<ServerState>) -> (StatusCode, Html<String>) {
    let snapshot: TrackerState = state.current.borrow().clone();
    let view: GateView = match state.latch.lock() {
        Ok(mut latch) => latch.observe(&snapshot),
        Err(_) => {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Html("Internal Server Error".to_string()),
            );
        }
    };
    let content: Option<&str> = state.content.as_deref();
    let page = render_gate(&state.manifest, content, view);
    (StatusCode::OK, Html(page.into_string()))
}

async fn state_handler(State(state): State<ServerState>) -> Json<TrackerState> {
    let snapshot: TrackerState = state.current.borrow().clone();
    Json(snapshot)
}

async fn style_handler() -> (StatusCode, [(HeaderName, &'static str); 2], &'static [u8]) {
    let bytes = include_bytes!("style.css");
    (
        StatusCode::OK,
        [
            (CONTENT_TYPE, "text/css"),
            (CACHE_CONTROL, CACHE_CONTROL_IMMUTABLE),
        ],
        bytes,
    )
}

async fn not_found_handler() -> (StatusCode, Html<String>) {
    (StatusCode::NOT_FOUND, Html("Not Found".to_string()))
}

async fn file_handler(
    State(state): State<ServerState>,
    Path(path): Path<String>,
) -> (StatusCode, [(HeaderName, &'static str); 1], Vec<u8>) {
    let loader = MediaLoader::new(state.root.clone());
    let validated_path: PathBuf = match loader.validate(&path) {
        Ok(p) => p,
        Err(_) => {
            return (
                StatusCode::NOT_FOUND,
                [(CONTENT_TYPE, "text/plain")],
                b"Not Found".to_vec(),
            );
        }
    };
    let content_type: &str = content_type_for(&validated_path);
    let content = tokio::fs::read(validated_path).await;
    match content {
        Ok(bytes) => (StatusCode::OK, [(CONTENT_TYPE, content_type)], bytes),
        Err(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            [(CONTENT_TYPE, "text/plain")],
            b"Internal Server Error".to_vec(),
        ),
    }
}

async fn shutdown_signal() {
    match signal::ctrl_c().await {
        Ok(()) => log::debug!("Received Ctrl+C, shutting down gracefully"),
        Err(e) => {
            log::error!("Failed to install Ctrl+C handler: {e}");
            std::future::pending::<()>().await;
        }
    }
}

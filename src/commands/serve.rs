//! Demo metrics endpoint: `GET /api/metrics/{code}` over a JSON file of
//! per-state records, answering unknown states with the fallback
//! record, plus `GET /health`.

use std::collections::HashMap;
use std::env;
use std::net::SocketAddr;
use std::path::{Path as FsPath, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::extract::{Path, State};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::cli::{Cli, ServeArgs};
use crate::metrics::MetricsRecord;

#[derive(Clone)]
struct AppState {
    records: Arc<HashMap<String, MetricsRecord>>,
}

pub fn run(cli: &Cli, args: &ServeArgs) -> Result<()> {
    let addr: SocketAddr = args
        .addr
        .clone()
        .or_else(|| env::var("FAIRMAP_ADDR").ok())
        .unwrap_or_else(|| "127.0.0.1:8000".to_string())
        .parse()
        .context("invalid bind address")?;

    let metrics_file = args
        .metrics_file
        .clone()
        .or_else(|| env::var("FAIRMAP_METRICS_FILE").ok().map(PathBuf::from));
    let records = match &metrics_file {
        Some(path) => load_records(path),
        None => HashMap::new(),
    };
    if cli.verbose > 0 {
        eprintln!("[serve] {} metrics records loaded", records.len());
    }

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("build async runtime")?;
    runtime.block_on(serve(addr, records))
}

async fn serve(addr: SocketAddr, records: HashMap<String, MetricsRecord>) -> Result<()> {
    let state = AppState { records: Arc::new(records) };

    let app = Router::new()
        .route("/health", get(health))
        .route("/api/metrics/:code", get(get_metrics))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state);

    info!("metrics server listening on http://{addr}");
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("bind {addr}"))?;
    axum::serve(listener, app).await.context("serve")?;
    Ok(())
}

async fn health() -> Json<Value> {
    Json(json!({"ok": true}))
}

async fn get_metrics(State(state): State<AppState>, Path(code): Path<String>) -> Json<MetricsRecord> {
    Json(lookup(&state.records, &code))
}

/// Demo metrics are best effort: an unreadable or malformed file logs a
/// warning and serves as if empty, so every state answers with the
/// fallback record.
fn load_records(path: &FsPath) -> HashMap<String, MetricsRecord> {
    let text = match std::fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) => {
            warn!(path = %path.display(), %err, "metrics file unreadable, serving fallbacks");
            return HashMap::new();
        }
    };
    match serde_json::from_str(&text) {
        Ok(records) => records,
        Err(err) => {
            warn!(path = %path.display(), %err, "metrics file malformed, serving fallbacks");
            HashMap::new()
        }
    }
}

fn lookup(records: &HashMap<String, MetricsRecord>, code: &str) -> MetricsRecord {
    records
        .get(&code.to_ascii_uppercase())
        .cloned()
        .unwrap_or_else(MetricsRecord::fallback)
}

//! Directory HTTP surface
//!
//! `POST /registerNode` is an idempotent first-wins upsert and responds "ok"
//! regardless; `GET /getNodeRegistry` returns the full list.

use std::sync::Arc;

use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use tracing::info;

use veilnet_core::{NetworkConfig, NodeRecord, NodeRegistryBody};

use crate::{DirectoryError, Registry};

/// Build the directory router around a shared registry
pub fn router(registry: Arc<Registry>) -> Router {
    Router::new()
        .route("/status", get(status))
        .route("/registerNode", post(register_node))
        .route("/getNodeRegistry", get(get_node_registry))
        .with_state(registry)
}

/// Bind the directory on its configured port and serve until shutdown
pub async fn serve(registry: Arc<Registry>, config: &NetworkConfig) -> Result<(), DirectoryError> {
    let addr = format!("{}:{}", config.host, config.registry_port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Directory listening on {addr}");
    axum::serve(listener, router(registry)).await?;
    Ok(())
}

async fn status() -> &'static str {
    "live"
}

async fn register_node(
    State(registry): State<Arc<Registry>>,
    Json(record): Json<NodeRecord>,
) -> &'static str {
    let node_id = record.node_id;
    if registry.register(record) {
        info!("Registered node {node_id}");
    } else {
        info!("Ignored duplicate registration for node {node_id}");
    }
    "ok"
}

async fn get_node_registry(State(registry): State<Arc<Registry>>) -> Json<NodeRegistryBody> {
    Json(NodeRegistryBody {
        nodes: registry.list(),
    })
}

//! Relay HTTP surface
//!
//! `POST /message` accepts one envelope and answers 200 whether the layer
//! was forwarded or terminal, 500 with a textual reason otherwise. The GET
//! endpoints expose per-instance introspection state for the test harness,
//! including the raw private key, which makes them unsuitable for anything
//! but local testing.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use tracing::{error, info};

use veilnet_core::{MessageBody, NetworkConfig};
use veilnet_directory::DirectoryClient;

use crate::relay::{ReceiveOutcome, Relay, RelayError};

#[derive(Serialize)]
struct ResultBody<T> {
    result: T,
}

/// Build the relay router around one relay instance
pub fn router(relay: Arc<Relay>) -> Router {
    Router::new()
        .route("/status", get(status))
        .route("/message", post(message))
        .route(
            "/getLastReceivedEncryptedMessage",
            get(last_received_encrypted),
        )
        .route(
            "/getLastReceivedDecryptedMessage",
            get(last_received_decrypted),
        )
        .route("/getLastMessageDestination", get(last_destination))
        .route("/getPrivateKey", get(private_key))
        .with_state(relay)
}

/// Start a relay: generate keys, register with the directory, serve HTTP.
pub async fn serve(node_id: u32, config: NetworkConfig) -> Result<(), RelayError> {
    let relay = Arc::new(Relay::new(node_id, config.clone())?);
    relay.register(&DirectoryClient::new(&config)).await?;

    let addr = format!("{}:{}", config.host, relay.port());
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Onion relay {node_id} listening on {addr}");
    axum::serve(listener, router(relay)).await?;
    Ok(())
}

async fn status() -> &'static str {
    "live"
}

async fn message(
    State(relay): State<Arc<Relay>>,
    Json(body): Json<MessageBody>,
) -> Result<&'static str, (StatusCode, String)> {
    match relay.receive(&body.message).await {
        Ok(ReceiveOutcome::Forwarded { .. }) => Ok("Message forwarded"),
        Ok(ReceiveOutcome::Terminal) => Ok("Message received without destination, kept locally"),
        Err(err) => {
            error!("Relay {} rejected an envelope: {err}", relay.node_id());
            Err((StatusCode::INTERNAL_SERVER_ERROR, err.to_string()))
        }
    }
}

async fn last_received_encrypted(
    State(relay): State<Arc<Relay>>,
) -> Json<ResultBody<Option<String>>> {
    Json(ResultBody {
        result: relay.last_seen().encrypted,
    })
}

async fn last_received_decrypted(
    State(relay): State<Arc<Relay>>,
) -> Json<ResultBody<Option<String>>> {
    Json(ResultBody {
        result: relay.last_seen().decrypted,
    })
}

async fn last_destination(State(relay): State<Arc<Relay>>) -> Json<ResultBody<Option<u32>>> {
    Json(ResultBody {
        result: relay.last_seen().destination,
    })
}

async fn private_key(State(relay): State<Arc<Relay>>) -> Json<ResultBody<String>> {
    Json(ResultBody {
        result: relay.private_key().to_string(),
    })
}

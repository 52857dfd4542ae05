//! User HTTP surface
//!
//! `POST /sendMessage` responds once the entry hop has been contacted, not
//! once delivery is confirmed; there is no acknowledgment path through the
//! circuit. `POST /message` is the terminal delivery endpoint.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use tracing::{error, info};

use veilnet_core::{MessageBody, NetworkConfig, SendMessageBody};

use crate::user::User;
use crate::ClientError;

#[derive(Serialize)]
struct ResultBody<T> {
    result: T,
}

/// Build the user router around one user instance
pub fn router(user: Arc<User>) -> Router {
    Router::new()
        .route("/status", get(status))
        .route("/message", post(message))
        .route("/sendMessage", post(send_message))
        .route("/getLastReceivedMessage", get(last_received))
        .route("/getLastSentMessage", get(last_sent))
        .route("/getLastCircuit", get(last_circuit))
        .with_state(user)
}

/// Start a user service on its configured port
pub async fn serve(user_id: u32, config: NetworkConfig) -> Result<(), ClientError> {
    let user = Arc::new(User::new(user_id, config.clone())?);
    let addr = format!("{}:{}", config.host, user.port());
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("User {user_id} listening on {addr}");
    axum::serve(listener, router(user)).await?;
    Ok(())
}

async fn status() -> &'static str {
    "live"
}

async fn message(State(user): State<Arc<User>>, Json(body): Json<MessageBody>) -> &'static str {
    user.deliver(body.message);
    "success"
}

async fn send_message(
    State(user): State<Arc<User>>,
    Json(body): Json<SendMessageBody>,
) -> Result<&'static str, (StatusCode, String)> {
    match user
        .send_message(&body.message, body.destination_user_id)
        .await
    {
        Ok(_) => Ok("Message sent"),
        Err(err) => {
            error!("User {} failed to send: {err}", user.user_id());
            Err((StatusCode::INTERNAL_SERVER_ERROR, err.to_string()))
        }
    }
}

async fn last_received(State(user): State<Arc<User>>) -> Json<ResultBody<Option<String>>> {
    Json(ResultBody {
        result: user.state().last_received,
    })
}

async fn last_sent(State(user): State<Arc<User>>) -> Json<ResultBody<Option<String>>> {
    Json(ResultBody {
        result: user.state().last_sent,
    })
}

async fn last_circuit(State(user): State<Arc<User>>) -> Json<ResultBody<Option<Vec<u32>>>> {
    Json(ResultBody {
        result: user.state().last_circuit,
    })
}

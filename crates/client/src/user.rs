//! User instance: envelope construction and terminal delivery
//!
//! Each user owns its own state object; request handlers share the instance
//! by reference instead of capturing process globals.

use std::sync::Mutex;

use reqwest::Client;
use tracing::{debug, info};

use veilnet_core::{MessageBody, NetworkConfig};
use veilnet_crypto::{build_circuit_message, import_public_key, OnionHop};
use veilnet_directory::DirectoryClient;

use crate::circuit::{select_circuit, CIRCUIT_LEN};
use crate::{ClientError, Result};

/// Introspection snapshot, exposed on the debug endpoints only
#[derive(Debug, Clone, Default)]
pub struct UserState {
    /// Last terminal content delivered to this user
    pub last_received: Option<String>,
    /// Last plaintext this user sent into the network
    pub last_sent: Option<String>,
    /// Node ids of the last circuit, entry first
    pub last_circuit: Option<Vec<u32>>,
}

/// One user instance
pub struct User {
    user_id: u32,
    port: u16,
    config: NetworkConfig,
    directory: DirectoryClient,
    http: Client,
    state: Mutex<UserState>,
}

impl User {
    pub fn new(user_id: u32, config: NetworkConfig) -> Result<Self> {
        let port = config.user_port(user_id)?;
        let directory = DirectoryClient::new(&config);
        Ok(Self {
            user_id,
            port,
            config,
            directory,
            http: Client::new(),
            state: Mutex::new(UserState::default()),
        })
    }

    pub fn user_id(&self) -> u32 {
        self.user_id
    }

    /// Port this user's HTTP surface listens on
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Snapshot of the introspection state
    pub fn state(&self) -> UserState {
        self.state.lock().expect("user state lock poisoned").clone()
    }

    /// Accept terminal content addressed to this user
    pub fn deliver(&self, message: String) {
        debug!("User {} received terminal content", self.user_id);
        let mut state = self.state.lock().expect("user state lock poisoned");
        state.last_received = Some(message);
    }

    /// Wrap `message` for a fresh random circuit and hand it to the entry
    /// relay. Returns the circuit that was used, entry first.
    ///
    /// With no registered relays the circuit is empty and the plaintext goes
    /// directly, unencrypted, to the destination user. Documented edge case,
    /// not an error.
    pub async fn send_message(&self, message: &str, destination_user_id: u32) -> Result<Vec<u32>> {
        {
            let mut state = self.state.lock().expect("user state lock poisoned");
            state.last_sent = Some(message.to_string());
        }

        let nodes = self.directory.get_node_registry().await?;
        let circuit = select_circuit(&nodes, CIRCUIT_LEN)?;

        {
            let mut state = self.state.lock().expect("user state lock poisoned");
            state.last_circuit = Some(circuit.clone());
        }

        let mut hops = Vec::with_capacity(circuit.len());
        for node_id in &circuit {
            let record = nodes
                .iter()
                .find(|n| n.node_id == *node_id)
                .ok_or(ClientError::UnknownNode(*node_id))?;
            hops.push(OnionHop {
                port: self.config.relay_port(*node_id)? as u32,
                public_key: import_public_key(&record.pub_key)?,
            });
        }

        let final_destination = self.config.user_port(destination_user_id)? as u32;
        let onion = build_circuit_message(&hops, final_destination, message)?;

        info!(
            "User {} sending through circuit {:?} to user {destination_user_id}",
            self.user_id, circuit
        );

        self.http
            .post(self.config.message_url(onion.destination))
            .json(&MessageBody {
                message: onion.payload,
            })
            .send()
            .await
            .map_err(|e| ClientError::EntryHopUnreachable {
                destination: onion.destination,
                reason: e.to_string(),
            })?;

        Ok(circuit)
    }
}

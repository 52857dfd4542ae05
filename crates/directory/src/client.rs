//! Directory client
//!
//! The two directory operations the rest of the system consumes: register a
//! node's public key, and list the registry.

use reqwest::Client;

use veilnet_core::{NetworkConfig, NodeRecord, NodeRegistryBody};

use crate::DirectoryError;

/// HTTP client for the node directory
#[derive(Clone)]
pub struct DirectoryClient {
    http: Client,
    base_url: String,
}

impl DirectoryClient {
    pub fn new(config: &NetworkConfig) -> Self {
        Self {
            http: Client::new(),
            base_url: config.registry_url(),
        }
    }

    /// Register a relay's public key under its node id
    pub async fn register_node(&self, node_id: u32, pub_key: &str) -> Result<(), DirectoryError> {
        let record = NodeRecord {
            node_id,
            pub_key: pub_key.to_string(),
        };
        self.http
            .post(format!("{}/registerNode", self.base_url))
            .json(&record)
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }

    /// Fetch the full list of registered nodes
    pub async fn get_node_registry(&self) -> Result<Vec<NodeRecord>, DirectoryError> {
        let body: NodeRegistryBody = self
            .http
            .get(format!("{}/getNodeRegistry", self.base_url))
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(body.nodes)
    }
}

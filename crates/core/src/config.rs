//! Network configuration
//!
//! Port scheme for a local VeilNet deployment: the directory listens on a
//! fixed port, relays and users each get a base port plus their numeric id.

use serde::{Deserialize, Serialize};

use crate::{Result, VeilNetError};

/// Network settings shared by every service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkConfig {
    /// Host all services bind to and dial
    #[serde(default = "default_host")]
    pub host: String,

    /// Port of the node directory
    #[serde(default = "default_registry_port")]
    pub registry_port: u16,

    /// A relay with nodeId `n` listens on `base_relay_port + n`
    #[serde(default = "default_base_relay_port")]
    pub base_relay_port: u16,

    /// A user with userId `n` listens on `base_user_port + n`
    #[serde(default = "default_base_user_port")]
    pub base_user_port: u16,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_registry_port() -> u16 {
    8080
}

fn default_base_relay_port() -> u16 {
    4000
}

fn default_base_user_port() -> u16 {
    8000
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            registry_port: default_registry_port(),
            base_relay_port: default_base_relay_port(),
            base_user_port: default_base_user_port(),
        }
    }
}

fn offset_port(base: u16, id: u32) -> Option<u16> {
    u16::try_from(id).ok().and_then(|id| base.checked_add(id))
}

impl NetworkConfig {
    /// Port a relay with the given node id listens on.
    ///
    /// Ids arrive over the wire as arbitrary `u32`s; one that does not fit
    /// the port space is rejected rather than wrapped into another service's
    /// range.
    pub fn relay_port(&self, node_id: u32) -> Result<u16> {
        offset_port(self.base_relay_port, node_id).ok_or_else(|| {
            VeilNetError::Validation(format!("node id {node_id} maps outside the port range"))
        })
    }

    /// Port a user with the given user id listens on
    pub fn user_port(&self, user_id: u32) -> Result<u16> {
        offset_port(self.base_user_port, user_id).ok_or_else(|| {
            VeilNetError::Validation(format!("user id {user_id} maps outside the port range"))
        })
    }

    /// Base URL of the directory service
    pub fn registry_url(&self) -> String {
        format!("http://{}:{}", self.host, self.registry_port)
    }

    /// `/message` endpoint of whatever service listens on `port`
    pub fn message_url(&self, port: u32) -> String {
        format!("http://{}:{}/message", self.host, port)
    }
}

//! Peel-and-forward relay logic
//!
//! [`Relay::receive`] returns a typed outcome so callers and tests can assert
//! on what happened instead of scraping logs. A decryption failure is
//! terminal for that message: no forwarding, no retry, and the circuit's
//! origin never learns of it.

use std::sync::Mutex;

use reqwest::Client;
use thiserror::Error;
use tracing::{debug, warn};

use veilnet_core::{
    parse_routing_header, MessageBody, NetworkConfig, RoutingDecision, VeilNetError,
    ROUTING_HEADER_LEN,
};
use veilnet_crypto::{peel_layer, CryptoError, RsaKeypair};
use veilnet_directory::{DirectoryClient, DirectoryError};

#[derive(Error, Debug)]
pub enum RelayError {
    #[error(transparent)]
    Crypto(#[from] CryptoError),

    #[error(transparent)]
    Invalid(#[from] VeilNetError),

    #[error("Forwarding to port {destination} failed: {reason}")]
    Forwarding { destination: u32, reason: String },

    #[error("Directory registration failed: {0}")]
    Registration(#[from] DirectoryError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// What a relay did with one envelope
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReceiveOutcome {
    /// One layer peeled, remainder forwarded to the next hop
    Forwarded { destination: u32 },
    /// The plaintext was terminal content for this relay
    Terminal,
}

/// Introspection snapshot, exposed on the debug endpoints only
#[derive(Debug, Clone, Default)]
pub struct LastSeen {
    /// Last raw envelope received, as it arrived (base64)
    pub encrypted: Option<String>,
    /// Last decrypted layer plaintext
    pub decrypted: Option<String>,
    /// Last next-hop port forwarded to
    pub destination: Option<u32>,
}

/// One onion relay instance.
///
/// All mutable state lives here, per instance; request handlers share the
/// instance by reference instead of capturing process globals.
pub struct Relay {
    node_id: u32,
    port: u16,
    config: NetworkConfig,
    keypair: RsaKeypair,
    public_key: String,
    private_key: String,
    last: Mutex<LastSeen>,
    http: Client,
}

impl Relay {
    /// Generate this relay's keypair and export both halves.
    ///
    /// A failed private-key export is fatal: the process cannot serve its
    /// debug surface or prove key ownership, so it must not start.
    pub fn new(node_id: u32, config: NetworkConfig) -> Result<Self, RelayError> {
        let port = config.relay_port(node_id)?;
        let keypair = RsaKeypair::generate()?;
        let public_key = keypair.export_public_key()?;
        let private_key = keypair.export_private_key()?;
        Ok(Self {
            node_id,
            port,
            config,
            keypair,
            public_key,
            private_key,
            last: Mutex::new(LastSeen::default()),
            http: Client::new(),
        })
    }

    pub fn node_id(&self) -> u32 {
        self.node_id
    }

    /// Port this relay's HTTP surface listens on
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Exported public key (base64 SPKI DER)
    pub fn public_key(&self) -> &str {
        &self.public_key
    }

    /// Exported private key. Debug surface only; see the crate docs.
    pub fn private_key(&self) -> &str {
        &self.private_key
    }

    /// Snapshot of the introspection state
    pub fn last_seen(&self) -> LastSeen {
        self.last.lock().expect("relay state lock poisoned").clone()
    }

    /// Register this relay's public key with the directory
    pub async fn register(&self, directory: &DirectoryClient) -> Result<(), RelayError> {
        directory.register_node(self.node_id, &self.public_key).await?;
        debug!("Relay {} registered with directory", self.node_id);
        Ok(())
    }

    /// Accept one envelope: peel one layer, then forward the remainder to
    /// the next hop or keep the plaintext as terminal content.
    pub async fn receive(&self, message: &str) -> Result<ReceiveOutcome, RelayError> {
        {
            let mut last = self.last.lock().expect("relay state lock poisoned");
            last.encrypted = Some(message.to_string());
        }

        let plaintext = peel_layer(&self.keypair.private, message)?;

        {
            let mut last = self.last.lock().expect("relay state lock poisoned");
            last.decrypted = Some(plaintext.clone());
        }

        match parse_routing_header(&plaintext) {
            RoutingDecision::Forward { port } => {
                {
                    let mut last = self.last.lock().expect("relay state lock poisoned");
                    last.destination = Some(port);
                }
                let remainder = &plaintext[ROUTING_HEADER_LEN..];
                self.forward(port, remainder).await?;
                debug!("Relay {} forwarded one layer to port {port}", self.node_id);
                Ok(ReceiveOutcome::Forwarded { destination: port })
            }
            RoutingDecision::Terminal => {
                warn!(
                    "Relay {} received terminal content with no destination",
                    self.node_id
                );
                Ok(ReceiveOutcome::Terminal)
            }
        }
    }

    /// Single POST to the next hop. Fire-and-forget beyond transport errors:
    /// the next hop's response status is not inspected and nothing is
    /// relayed back toward the circuit's origin.
    async fn forward(&self, destination: u32, message: &str) -> Result<(), RelayError> {
        self.http
            .post(self.config.message_url(destination))
            .json(&MessageBody {
                message: message.to_string(),
            })
            .send()
            .await
            .map_err(|e| RelayError::Forwarding {
                destination,
                reason: e.to_string(),
            })?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::engine::general_purpose::STANDARD as BASE64;
    use base64::Engine as _;
    use veilnet_crypto::{rsa_encrypt, import_public_key, SymmetricKey};

    fn make_relay(node_id: u32) -> Relay {
        Relay::new(node_id, NetworkConfig::default()).unwrap()
    }

    /// Encrypt a raw plaintext (no routing header added) for the relay
    fn envelope_for(relay: &Relay, plaintext: &str) -> String {
        let public = import_public_key(relay.public_key()).unwrap();
        let session_key = SymmetricKey::generate();
        let encrypted_payload = session_key.encrypt(plaintext.as_bytes());
        let encrypted_key = rsa_encrypt(&public, session_key.as_bytes()).unwrap();

        let mut bytes = encrypted_key;
        bytes.extend_from_slice(&encrypted_payload);
        BASE64.encode(bytes)
    }

    #[tokio::test]
    async fn test_terminal_content_is_stored_not_forwarded() {
        let relay = make_relay(1);
        let envelope = envelope_for(&relay, "just some terminal text");

        let outcome = relay.receive(&envelope).await.unwrap();
        assert_eq!(outcome, ReceiveOutcome::Terminal);

        let last = relay.last_seen();
        assert_eq!(last.encrypted.as_deref(), Some(envelope.as_str()));
        assert_eq!(last.decrypted.as_deref(), Some("just some terminal text"));
        assert_eq!(last.destination, None);
    }

    #[tokio::test]
    async fn test_wrong_key_envelope_fails_and_leaves_state_intact() {
        let relay = make_relay(1);
        let other = make_relay(2);
        let envelope = envelope_for(&other, "0000004002payload");

        let result = relay.receive(&envelope).await;
        assert!(matches!(result, Err(RelayError::Crypto(_))));

        // The raw envelope is recorded, nothing was decrypted or forwarded,
        // and the key material is untouched.
        let last = relay.last_seen();
        assert_eq!(last.encrypted.as_deref(), Some(envelope.as_str()));
        assert_eq!(last.decrypted, None);
        assert_eq!(last.destination, None);
        assert!(!relay.private_key().is_empty());
    }

    #[tokio::test]
    async fn test_unreachable_next_hop_is_forwarding_error() {
        let relay = make_relay(1);

        // Find a port with nothing listening on it
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let dead_port = listener.local_addr().unwrap().port() as u32;
        drop(listener);

        let plaintext = format!("{dead_port:010}next envelope would go here");
        let envelope = envelope_for(&relay, &plaintext);

        let result = relay.receive(&envelope).await;
        match result {
            Err(RelayError::Forwarding { destination, .. }) => {
                assert_eq!(destination, dead_port)
            }
            other => panic!("expected forwarding error, got {other:?}"),
        }

        // The destination was still recorded before the attempt
        assert_eq!(relay.last_seen().destination, Some(dead_port));
    }

    #[test]
    fn test_out_of_range_node_id_cannot_start() {
        // 4000 + 70_000 does not fit a port; the relay must refuse to start
        let result = Relay::new(70_000, NetworkConfig::default());
        assert!(matches!(result, Err(RelayError::Invalid(_))));
    }

    #[tokio::test]
    async fn test_garbage_base64_is_decryption_error() {
        let relay = make_relay(1);
        let result = relay.receive("@@@ not base64 @@@").await;
        assert!(matches!(result, Err(RelayError::Crypto(_))));
    }
}

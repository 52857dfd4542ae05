//! Relay HTTP surface tests
//!
//! Covers the decryption-failure contract: a well-formed envelope sealed for
//! the wrong key yields a 500 with a textual reason and leaves the relay's
//! own state untouched.

use std::sync::Arc;
use std::time::Duration;

use veilnet_core::NetworkConfig;
use veilnet_crypto::{import_public_key, wrap_layer, RsaKeypair};
use veilnet_directory::{DirectoryClient, Registry};

fn config(registry_port: u16, base_relay_port: u16) -> NetworkConfig {
    NetworkConfig {
        host: "127.0.0.1".to_string(),
        registry_port,
        base_relay_port,
        ..NetworkConfig::default()
    }
}

async fn wait_for_status(url: &str) {
    for _ in 0..600 {
        if reqwest::get(url)
            .await
            .map(|r| r.status().is_success())
            .unwrap_or(false)
        {
            return;
        }
        tokio::time::sleep(Duration::from_millis(100)).await;
    }
    panic!("service at {url} never came up");
}

async fn start_registry_and_relay(config: &NetworkConfig) {
    let registry_config = config.clone();
    tokio::spawn(async move {
        veilnet_directory::serve(Arc::new(Registry::new()), &registry_config)
            .await
            .unwrap();
    });
    wait_for_status(&format!("{}/status", config.registry_url())).await;

    let relay_config = config.clone();
    tokio::spawn(async move {
        veilnet_relay::serve(0, relay_config).await.unwrap();
    });
    wait_for_status(&format!("http://{}:{}/status", config.host, config.relay_port(0).unwrap())).await;
}

async fn debug_result(url: &str) -> serde_json::Value {
    reqwest::get(url)
        .await
        .unwrap()
        .json::<serde_json::Value>()
        .await
        .unwrap()["result"]
        .clone()
}

#[tokio::test(flavor = "multi_thread")]
async fn test_wrong_key_envelope_is_isolated_500() {
    let config = config(18780, 14300);
    start_registry_and_relay(&config).await;

    let relay_base = format!("http://{}:{}", config.host, config.relay_port(0).unwrap());
    let key_before = debug_result(&format!("{relay_base}/getPrivateKey")).await;
    assert!(key_before.as_str().map(|k| !k.is_empty()).unwrap_or(false));

    // Well-formed envelope, sealed for a key the relay does not own
    let wrong = RsaKeypair::generate().unwrap();
    let envelope = wrap_layer(&wrong.public, 14301, "never readable").unwrap();

    let response = reqwest::Client::new()
        .post(format!("{relay_base}/message"))
        .json(&serde_json::json!({"message": envelope}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 500);
    assert!(!response.text().await.unwrap().is_empty());

    // Key material and pending routing are unaffected
    let key_after = debug_result(&format!("{relay_base}/getPrivateKey")).await;
    assert_eq!(key_before, key_after);
    assert!(debug_result(&format!("{relay_base}/getLastMessageDestination"))
        .await
        .is_null());

    // And the relay still serves valid envelopes afterwards
    let registry = DirectoryClient::new(&config);
    let nodes = registry.get_node_registry().await.unwrap();
    let relay_key = import_public_key(&nodes[0].pub_key).unwrap();
    let envelope = wrap_layer(&relay_key, 14301, "terminal text").unwrap();

    // Destination port 14301 has no listener, so the relay reports a
    // forwarding failure; decryption itself succeeded and was recorded.
    let response = reqwest::Client::new()
        .post(format!("{relay_base}/message"))
        .json(&serde_json::json!({"message": envelope}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 500);
    let decrypted = debug_result(&format!("{relay_base}/getLastReceivedDecryptedMessage")).await;
    assert_eq!(decrypted.as_str(), Some("0000014301terminal text"));
    let destination = debug_result(&format!("{relay_base}/getLastMessageDestination")).await;
    assert_eq!(destination.as_u64(), Some(14301));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_terminal_content_at_relay_returns_200() {
    let config = config(18880, 14400);
    start_registry_and_relay(&config).await;

    let registry = DirectoryClient::new(&config);
    let nodes = registry.get_node_registry().await.unwrap();
    let relay_key = import_public_key(&nodes[0].pub_key).unwrap();

    // Destination 0 encodes as all zeros, which never parses as a port, so
    // the relay treats the whole plaintext as terminal content.
    let envelope = wrap_layer(&relay_key, 0, "kept locally").unwrap();

    let relay_base = format!("http://{}:{}", config.host, config.relay_port(0).unwrap());
    let response = reqwest::Client::new()
        .post(format!("{relay_base}/message"))
        .json(&serde_json::json!({"message": envelope}))
        .send()
        .await
        .unwrap();
    assert!(response.status().is_success());

    let decrypted = debug_result(&format!("{relay_base}/getLastReceivedDecryptedMessage")).await;
    assert_eq!(decrypted.as_str(), Some("0000000000kept locally"));
    assert!(debug_result(&format!("{relay_base}/getLastMessageDestination"))
        .await
        .is_null());
}

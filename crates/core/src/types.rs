//! Wire types shared by the directory, relay, and user services
//!
//! Field names follow the JSON wire format (`nodeId`, `pubKey`,
//! `destinationUserId`), so every service serializes identically.

use serde::{Deserialize, Serialize};

/// One registered relay as held by the directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeRecord {
    /// Relay identifier; also determines its listen port
    pub node_id: u32,
    /// Base64-encoded SPKI DER public key
    pub pub_key: String,
}

/// Body of `GET /getNodeRegistry`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeRegistryBody {
    pub nodes: Vec<NodeRecord>,
}

/// Body of `POST /message` on relays and users
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageBody {
    pub message: String,
}

/// Body of `POST /sendMessage` on users
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendMessageBody {
    pub message: String,
    pub destination_user_id: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_record_wire_field_names() {
        let record = NodeRecord {
            node_id: 7,
            pub_key: "abc".to_string(),
        };
        let json = serde_json::to_string(&record).unwrap();
        assert_eq!(json, r#"{"nodeId":7,"pubKey":"abc"}"#);
    }

    #[test]
    fn test_send_message_body_wire_field_names() {
        let body: SendMessageBody =
            serde_json::from_str(r#"{"message":"hi","destinationUserId":3}"#).unwrap();
        assert_eq!(body.message, "hi");
        assert_eq!(body.destination_user_id, 3);
    }

    #[test]
    fn test_node_registry_roundtrip() {
        let body = NodeRegistryBody {
            nodes: vec![NodeRecord {
                node_id: 1,
                pub_key: "k".to_string(),
            }],
        };
        let json = serde_json::to_string(&body).unwrap();
        let parsed: NodeRegistryBody = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.nodes, body.nodes);
    }
}

//! In-memory node registry
//!
//! A singly-owned list of node records behind one lock. Check-and-insert
//! happens atomically under that lock, so two near-simultaneous first
//! registrations of the same id cannot both land.

use std::sync::Mutex;

use veilnet_core::NodeRecord;

/// Registered relays, in registration order
pub struct Registry {
    nodes: Mutex<Vec<NodeRecord>>,
}

impl Registry {
    pub fn new() -> Self {
        Self {
            nodes: Mutex::new(Vec::new()),
        }
    }

    /// Register a node. The first registration for a given id wins; later
    /// registrations for the same id are ignored and the original public key
    /// is retained. Returns whether the record was inserted.
    pub fn register(&self, record: NodeRecord) -> bool {
        let mut nodes = self.nodes.lock().expect("registry lock poisoned");
        if nodes.iter().any(|n| n.node_id == record.node_id) {
            return false;
        }
        nodes.push(record);
        true
    }

    /// Snapshot of all registered nodes
    pub fn list(&self) -> Vec<NodeRecord> {
        self.nodes.lock().expect("registry lock poisoned").clone()
    }

    pub fn len(&self) -> usize {
        self.nodes.lock().expect("registry lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

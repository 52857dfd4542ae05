//! Circuit selection
//!
//! Rejection sampling without replacement over the directory's node list.
//! Selection order is the traversal order: first pick is the entry relay,
//! last pick is the exit. Sampling is iteration-bounded so a registry that
//! cannot yield enough distinct ids fails fast instead of spinning.

use rand::Rng;

use veilnet_core::NodeRecord;

use crate::{ClientError, Result};

/// Target circuit length; shorter circuits are used when fewer relays exist
pub const CIRCUIT_LEN: usize = 3;

/// Sampling attempts allowed per circuit slot before giving up
const ATTEMPTS_PER_SLOT: usize = 64;

/// Select `min(wanted, nodes.len())` distinct node ids by repeated uniform
/// draws. An empty registry yields an empty circuit.
pub fn select_circuit(nodes: &[NodeRecord], wanted: usize) -> Result<Vec<u32>> {
    let target = wanted.min(nodes.len());
    if target == 0 {
        return Ok(Vec::new());
    }

    let mut rng = rand::thread_rng();
    let mut circuit: Vec<u32> = Vec::with_capacity(target);
    let mut attempts = 0;

    while circuit.len() < target {
        if attempts >= ATTEMPTS_PER_SLOT * target {
            // The list holds fewer distinct ids than its length suggests
            return Err(ClientError::InsufficientRelays {
                needed: target,
                available: circuit.len(),
            });
        }
        attempts += 1;

        let pick = &nodes[rng.gen_range(0..nodes.len())];
        if !circuit.contains(&pick.node_id) {
            circuit.push(pick.node_id);
        }
    }

    Ok(circuit)
}

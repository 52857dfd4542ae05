//! VeilNet Relay
//!
//! An onion relay owns one RSA keypair, registers it with the directory, and
//! peels exactly one encryption layer off every envelope it receives. The
//! peeled layer names either the next hop's port or terminal content; the
//! relay never learns the full circuit.

mod relay;
mod server;

pub use relay::{LastSeen, ReceiveOutcome, Relay, RelayError};
pub use server::{router, serve};

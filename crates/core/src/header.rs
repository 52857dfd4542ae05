//! Next-hop routing header
//!
//! The first 10 bytes of each decrypted layer are a left-zero-padded decimal
//! ASCII string. After stripping whitespace and the zero padding, a value of
//! 4 or 5 digits is the next hop's TCP port; anything else means the whole
//! plaintext is terminal content for this relay.
//!
//! The scheme is heuristic: terminal content whose first 10 bytes happen to
//! trim to a 4-5 digit number is misread as a forward instruction. Callers
//! must treat that as a property of the wire format, not corruption.

/// Routing header width in bytes, regardless of the port value's magnitude
pub const ROUTING_HEADER_LEN: usize = 10;

/// What a relay should do with a decrypted layer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoutingDecision {
    /// Forward the remainder of the plaintext to this port
    Forward { port: u32 },
    /// The whole plaintext is terminal content for this relay
    Terminal,
}

/// Encode a destination port as a fixed-width routing header.
///
/// Always exactly 10 ASCII digits for any value up to 5 digits.
pub fn encode_routing_header(destination: u32) -> String {
    format!("{:010}", destination)
}

/// Inspect the first [`ROUTING_HEADER_LEN`] bytes of a decrypted plaintext.
pub fn parse_routing_header(plaintext: &str) -> RoutingDecision {
    let bytes = plaintext.as_bytes();
    if bytes.len() < ROUTING_HEADER_LEN {
        return RoutingDecision::Terminal;
    }
    let header = match std::str::from_utf8(&bytes[..ROUTING_HEADER_LEN]) {
        Ok(h) => h,
        Err(_) => return RoutingDecision::Terminal,
    };
    let candidate = header.trim().trim_start_matches('0');
    if (4..=5).contains(&candidate.len()) && candidate.bytes().all(|b| b.is_ascii_digit()) {
        // 4-5 digits always fit a u32
        let port = candidate.parse::<u32>().unwrap_or(0);
        return RoutingDecision::Forward { port };
    }
    RoutingDecision::Terminal
}

//! Client address resolution
//!
//! Derives the client address from the proxy-forwarded header when one is
//! present, else from the connection peer address. Handles proxy chains,
//! `host:port` and `[ipv6]:port` forms, and falls back to the raw string
//! when nothing parses. Address resolution never fails a request.

use std::net::IpAddr;

/// Resolve the client address from the forwarded-for header value and the
/// peer address, both optional raw strings.
///
/// The forwarded value wins when present and non-empty. The first entry of
/// a comma-separated chain is used. Two readings of that entry are tried in
/// order: the bracket-stripped form (`[addr]:port` becomes `addr`) and the
/// text before the first colon. The first reading that parses as an IP
/// address is returned in canonical form; candidates are trimmed, so
/// whitespace around a port separator is tolerated. If neither parses, the
/// raw entry is returned unchanged.
pub fn resolve_remote_addr(forwarded_for: Option<&str>, peer_addr: Option<&str>) -> String {
    let source = match forwarded_for {
        Some(value) if !value.is_empty() => value,
        _ => peer_addr.unwrap_or(""),
    };

    let first = source.split(',').next().unwrap_or("");

    // Bracket-stripped form first: for a bare IPv6 address the before-colon
    // reading would truncate it.
    let unbracketed = first.trim_start_matches('[').split(']').next().unwrap_or("");
    let before_colon = first.split(':').next().unwrap_or("");

    for candidate in [unbracketed, before_colon] {
        if let Ok(addr) = candidate.trim().parse::<IpAddr>() {
            return addr.to_string();
        }
    }

    first.to_string()
}

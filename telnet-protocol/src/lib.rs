//! # Telnet Protocol Library
//!
//! A small Rust library implementing the slice of the Telnet protocol that an
//! interactive line-oriented server actually needs:
//! - RFC 854: Telnet Protocol Specification (https://tools.ietf.org/html/rfc854)
//! - RFC 857: Telnet Echo Option
//! - RFC 858: Telnet Suppress Go Ahead Option
//!
//! This library is designed to be:
//! - **Transport-agnostic**: No I/O here, only bytes in and replies out
//! - **Incremental**: The state machine accepts one byte at a time, so it works
//!   with polling loops that see at most one byte per cycle
//! - **Permissive**: Malformed sequences are recovered from, never errors
//!
//! ## Architecture Overview
//!
//! The library is organized into two modules:
//! - `protocol`: Basic Telnet protocol constants and types (RFC 854)
//! - `machine`: The per-byte IAC negotiation state machine
//!
//! Full option negotiation (RFC 1143 Q-method, sub-negotiation) is out of
//! scope; the server this crate was written for only speaks the
//! DO/DONT/WILL/WONT framing with a couple of hard-coded option codes.

pub mod machine;
pub mod protocol;

// Re-export main types for convenience
pub use machine::{NegotiationMachine, Step};
pub use protocol::{IAC, NegotiationCommand, negotiation, option};

/// Library version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

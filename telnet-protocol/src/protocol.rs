//! # Telnet Protocol Constants and Types
//!
//! This module implements the core Telnet framing as defined in:
//! - **RFC 854**: Telnet Protocol Specification
//!
//! ## Key Concepts from RFC 854:
//!
//! ### IAC (Interpret As Command) - Byte 255
//! The IAC byte (255/0xFF) signals that the following bytes should be
//! interpreted as a Telnet command rather than data. Any data byte with value
//! 255 must be escaped as IAC IAC (255 255).
//!
//! ### Negotiation Structure
//! Option negotiation follows the pattern: `IAC <command> <option>`
//! where the command is one of WILL/WONT/DO/DONT and the option is a single
//! byte identifying the capability being negotiated.

/// IAC - Interpret As Command (RFC 854, Section 4)
///
/// The IAC byte (255/0xFF) indicates that the next byte(s) should be
/// interpreted as a Telnet command sequence rather than regular data.
///
/// **Important**: Any data byte with value 255 must be escaped as two
/// consecutive IAC bytes (255 255) to distinguish it from command sequences.
pub const IAC: u8 = 255;

/// Telnet option negotiation commands (RFC 854, Section 4)
///
/// These four directives follow the IAC byte and are themselves followed by a
/// single option-code byte. Only the negotiation directives are modeled here;
/// the action commands (NOP, AYT, SB, ...) are outside what this library
/// speaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum NegotiationCommand {
    /// WILL - sender wants to enable an option on its own side
    /// Format: IAC WILL <option>
    Will = 251,

    /// WON'T - sender refuses to enable an option on its own side
    /// Format: IAC WONT <option>
    Wont = 252,

    /// DO - sender asks the receiver to enable an option
    /// Format: IAC DO <option>
    Do = 253,

    /// DON'T - sender asks the receiver to disable an option
    /// Format: IAC DONT <option>
    Dont = 254,
}

impl NegotiationCommand {
    /// Convert a byte to a `NegotiationCommand` if it is one of the four
    /// negotiation directives
    ///
    /// # Example
    /// ```
    /// use telnet_protocol::protocol::NegotiationCommand;
    ///
    /// assert_eq!(NegotiationCommand::from_byte(251), Some(NegotiationCommand::Will));
    /// assert_eq!(NegotiationCommand::from_byte(241), None);
    /// ```
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            251 => Some(NegotiationCommand::Will),
            252 => Some(NegotiationCommand::Wont),
            253 => Some(NegotiationCommand::Do),
            254 => Some(NegotiationCommand::Dont),
            _ => None,
        }
    }

    /// Convert the command to its byte representation
    pub fn to_byte(self) -> u8 {
        self as u8
    }
}

/// Telnet option codes this library knows by name
///
/// Option codes stay raw `u8` values throughout the crate because a server
/// must be able to refuse *arbitrary* codes it has never heard of by echoing
/// the code back in a WONT/DONT reply. The named constants below are the
/// options the negotiation machine treats specially.
pub mod option {
    /// Echo (RFC 857) - controls which side echoes typed characters
    pub const ECHO: u8 = 1;

    /// Suppress Go Ahead (RFC 858) - full-duplex operation, negotiated by
    /// virtually every modern client
    pub const SUPPRESS_GO_AHEAD: u8 = 3;

    /// Linemode (RFC 1184) - line-at-a-time editing on the client side; this
    /// server always refuses it because it wants character-at-a-time input
    pub const LINEMODE: u8 = 34;
}

/// Serialize a negotiation exchange to its three-byte wire form
///
/// # Example
/// ```
/// use telnet_protocol::protocol::{NegotiationCommand, negotiation, option};
///
/// assert_eq!(negotiation(NegotiationCommand::Will, option::ECHO), [255, 251, 1]);
/// ```
pub fn negotiation(command: NegotiationCommand, option: u8) -> [u8; 3] {
    [IAC, command.to_byte(), option]
}

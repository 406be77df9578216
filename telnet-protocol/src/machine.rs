//! # IAC Negotiation State Machine
//!
//! This module implements a per-byte state machine for the IAC (Interpret As
//! Command) framing of **RFC 854**. It separates negotiation sequences from
//! the data stream and decides the reply each completed exchange deserves.
//!
//! ## Key Concepts:
//!
//! ### One byte at a time
//! The machine is fed exactly one byte per call. A polling server is only
//! guaranteed to see one byte per connection per cycle, so a negotiation
//! sequence may arrive split across many calls; the pending command byte is
//! carried in the machine state between calls.
//!
//! ### Classification, not interpretation
//! The machine never performs I/O. It tells the caller what the byte *was*:
//! plain data, a swallowed negotiation byte, or a completed exchange along
//! with the three-byte reply to transmit (if any).
//!
//! ### Escaped data (IAC IAC)
//! An IAC byte received while a sequence is pending is treated as the
//! doubled-escape form and surfaces as a literal data byte 255. This applies
//! at any point of a pending sequence, so a half-read command is dropped
//! rather than producing a bogus exchange.

use crate::protocol::{IAC, NegotiationCommand, negotiation, option};

/// Negotiation machine state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    /// Expecting normal data or IAC
    Idle,
    /// Found IAC (255), expecting the command byte
    AwaitCommand,
    /// Found IAC and a command byte, expecting the option code
    AwaitOption(u8),
}

/// Result of feeding one byte to the machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// The byte is application data and should be handled by the caller.
    /// A doubled IAC surfaces here as `Data(255)`.
    Data(u8),

    /// The byte was absorbed into a pending negotiation sequence
    Consumed,

    /// A three-byte negotiation exchange completed. `reply`, when present,
    /// holds the wire bytes to transmit in response.
    Negotiated {
        /// The raw command byte the client sent (usually WILL or DO)
        command: u8,
        /// The option code being negotiated
        option: u8,
        /// Response to send back, if the command calls for one
        reply: Option<[u8; 3]>,
    },
}

/// Incremental IAC negotiation state machine
///
/// Each connection owns one machine. Feed it every inbound byte that is not
/// a line-editing control byte; it reports data bytes back and swallows
/// negotiation traffic.
///
/// # Example
/// ```
/// use telnet_protocol::machine::{NegotiationMachine, Step};
///
/// let mut machine = NegotiationMachine::new();
///
/// // IAC DO ECHO, split across calls like a slow client would send it
/// assert_eq!(machine.feed(255), Step::Consumed);
/// assert_eq!(machine.feed(253), Step::Consumed);
/// assert_eq!(
///     machine.feed(1),
///     Step::Negotiated { command: 253, option: 1, reply: Some([255, 251, 1]) }
/// );
/// ```
#[derive(Debug, Clone)]
pub struct NegotiationMachine {
    state: State,
}

impl Default for NegotiationMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl NegotiationMachine {
    /// Create a new machine in the idle state
    pub fn new() -> Self {
        Self { state: State::Idle }
    }

    /// True if the machine is mid-sequence and expecting more bytes
    pub fn is_pending(&self) -> bool {
        self.state != State::Idle
    }

    /// Reset to the idle state, discarding any pending sequence
    pub fn reset(&mut self) {
        self.state = State::Idle;
    }

    /// Process one inbound byte and classify it
    pub fn feed(&mut self, byte: u8) -> Step {
        match self.state {
            State::Idle => {
                if byte == IAC {
                    self.state = State::AwaitCommand;
                    Step::Consumed
                } else {
                    Step::Data(byte)
                }
            }
            State::AwaitCommand => {
                if byte == IAC {
                    // IAC IAC = escaped data byte 255
                    self.state = State::Idle;
                    Step::Data(IAC)
                } else {
                    self.state = State::AwaitOption(byte);
                    Step::Consumed
                }
            }
            State::AwaitOption(command) => {
                self.state = State::Idle;
                if byte == IAC {
                    // An IAC anywhere in a pending sequence is taken as the
                    // doubled-escape form; the half-read command is dropped.
                    Step::Data(IAC)
                } else {
                    Step::Negotiated {
                        command,
                        option: byte,
                        reply: reply_for(command, byte),
                    }
                }
            }
        }
    }
}

/// Decide the reply for a completed negotiation exchange
///
/// The policy is fixed:
/// - `DO <opt>`: we agree to perform Echo and Suppress Go Ahead ourselves
///   (`WILL <opt>`) and refuse everything else (`WONT <opt>`)
/// - `WILL <opt>`: we never want the client to enable options on its side
///   (`DONT <opt>`)
/// - Any other command draws no reply.
fn reply_for(command: u8, opt: u8) -> Option<[u8; 3]> {
    match NegotiationCommand::from_byte(command) {
        Some(NegotiationCommand::Do) => match opt {
            option::ECHO | option::SUPPRESS_GO_AHEAD => {
                Some(negotiation(NegotiationCommand::Will, opt))
            }
            _ => Some(negotiation(NegotiationCommand::Wont, opt)),
        },
        Some(NegotiationCommand::Will) => Some(negotiation(NegotiationCommand::Dont, opt)),
        _ => None,
    }
}

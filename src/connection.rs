//! # Connection Record
//!
//! One `Connection` exists per live transport handle. It owns everything the
//! server remembers about a client between poll cycles: the in-progress line
//! buffer, the IAC negotiation machine, the echo flag, the prompt, and the
//! optional override handlers that replace normal line assembly.

use crate::server::Session;
use crate::transport::Transport;

use jiff::Timestamp;
use telnet_protocol::NegotiationMachine;

/// Handler invoked once per new connection, after the initial negotiation
/// and before the first prompt is shown
pub type ConnectHandler<T> = Box<dyn FnMut(&mut Session<'_, T>)>;

/// Raw byte override: while installed, every inbound byte is forwarded here
/// verbatim and the normal state machine is bypassed entirely
pub type KeypressHandler<T> = Box<dyn FnMut(&mut Session<'_, T>, u8)>;

/// Raw line override: invoked with the whole completed line instead of the
/// command table lookup
pub type LineHandler<T> = Box<dyn FnMut(&mut Session<'_, T>, &[u8])>;

/// Per-client connection state
pub struct Connection<T: Transport> {
    handle: T::Handle,
    capacity: usize,
    connected_at: Timestamp,
    pub(crate) line_buffer: Vec<u8>,
    pub(crate) negotiation: NegotiationMachine,
    pub(crate) echo_enabled: bool,
    pub(crate) prompt: String,
    pub(crate) keypress_handler: Option<KeypressHandler<T>>,
    pub(crate) line_handler: Option<LineHandler<T>>,
}

impl<T: Transport> Connection<T> {
    /// Create a record for a freshly accepted transport handle
    ///
    /// `capacity` bounds the line buffer; the longest accepted line is
    /// `capacity - 1` bytes, keeping one slot for the logical terminator.
    /// Values below 2 are clamped up to 2.
    pub(crate) fn new(handle: T::Handle, capacity: usize, prompt: String, echo: bool) -> Self {
        // Below 2 there is no room for both a data byte and the reserved
        // terminator slot; the config parser enforces the same floor, but
        // `ShellConfig` can also be built directly
        let capacity = capacity.max(2);
        Self {
            handle,
            capacity,
            connected_at: Timestamp::now(),
            line_buffer: Vec::with_capacity(capacity),
            negotiation: NegotiationMachine::new(),
            echo_enabled: echo,
            prompt,
            keypress_handler: None,
            line_handler: None,
        }
    }

    /// Transport identity of this connection; immutable for the record's
    /// lifetime and used as the registry key
    pub fn handle(&self) -> T::Handle {
        self.handle
    }

    /// When the connection was registered
    pub fn connected_at(&self) -> Timestamp {
        self.connected_at
    }

    /// The buffer bound this connection was created with
    pub fn buffer_capacity(&self) -> usize {
        self.capacity
    }

    /// The line assembled so far, without any terminator
    pub fn pending_line(&self) -> &[u8] {
        &self.line_buffer
    }

    /// Current prompt text
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    /// Whether accepted data bytes are echoed back to the client
    pub fn echo_enabled(&self) -> bool {
        self.echo_enabled
    }

    /// True if room remains for another data byte
    pub(crate) fn has_room(&self) -> bool {
        self.line_buffer.len() < self.capacity - 1
    }
}

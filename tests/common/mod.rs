//! Shared test support: a scripted in-memory transport.
//!
//! Tests enqueue accepts and input bytes, run the server's poll loop, and
//! inspect what the server wrote back, all without sockets.

use airlock::transport::Transport;

use std::collections::{HashMap, VecDeque};
use std::io::{self, ErrorKind};

#[derive(Default)]
struct MockClient {
    connected: bool,
    input: VecDeque<u8>,
    output: Vec<u8>,
}

/// In-memory implementation of the transport capability
#[derive(Default)]
pub struct MockTransport {
    pending_accepts: VecDeque<u64>,
    clients: HashMap<u64, MockClient>,
    closed: Vec<u64>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Script a client connecting; the server sees it on its next poll
    pub fn connect(&mut self, handle: u64) {
        self.clients.insert(
            handle,
            MockClient { connected: true, ..MockClient::default() },
        );
        self.pending_accepts.push_back(handle);
    }

    /// Re-announce an existing client as pending, without resetting it;
    /// exercises the server's duplicate-registration guard
    pub fn reannounce(&mut self, handle: u64) {
        self.pending_accepts.push_back(handle);
    }

    /// Queue bytes the client "typed"
    pub fn push_input(&mut self, handle: u64, bytes: &[u8]) {
        if let Some(client) = self.clients.get_mut(&handle) {
            client.input.extend(bytes);
        }
    }

    /// Everything the server has written to this client so far
    pub fn output(&self, handle: u64) -> &[u8] {
        self.clients.get(&handle).map_or(&[], |c| &c.output)
    }

    /// Take and clear the client's output
    pub fn take_output(&mut self, handle: u64) -> Vec<u8> {
        self.clients
            .get_mut(&handle)
            .map_or_else(Vec::new, |c| std::mem::take(&mut c.output))
    }

    /// Script the peer dropping the connection
    pub fn hang_up(&mut self, handle: u64) {
        if let Some(client) = self.clients.get_mut(&handle) {
            client.connected = false;
        }
    }

    /// Whether the server closed this handle
    pub fn was_closed(&self, handle: u64) -> bool {
        self.closed.contains(&handle)
    }

    /// Unconsumed input bytes across all clients
    pub fn total_pending_input(&self) -> usize {
        self.clients.values().map(|c| c.input.len()).sum()
    }
}

impl Transport for MockTransport {
    type Handle = u64;

    fn accept_pending(&mut self) -> Option<u64> {
        self.pending_accepts.pop_front()
    }

    fn is_connected(&self, handle: u64) -> bool {
        self.clients.get(&handle).is_some_and(|c| c.connected)
    }

    fn byte_available(&self, handle: u64) -> bool {
        self.clients.get(&handle).is_some_and(|c| !c.input.is_empty())
    }

    fn read_byte(&mut self, handle: u64) -> io::Result<u8> {
        self.clients
            .get_mut(&handle)
            .and_then(|c| c.input.pop_front())
            .ok_or_else(|| io::Error::from(ErrorKind::UnexpectedEof))
    }

    fn write_bytes(&mut self, handle: u64, bytes: &[u8]) -> io::Result<()> {
        match self.clients.get_mut(&handle) {
            Some(client) if client.connected => {
                client.output.extend_from_slice(bytes);
                Ok(())
            }
            _ => Err(io::Error::from(ErrorKind::NotConnected)),
        }
    }

    fn close(&mut self, handle: u64) {
        if let Some(client) = self.clients.get_mut(&handle) {
            client.connected = false;
        }
        self.closed.push(handle);
    }
}

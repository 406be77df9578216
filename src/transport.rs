//! # Transport Capability
//!
//! The server core never touches sockets directly; it talks to a `Transport`,
//! a minimal capability interface over some byte-stream fabric. Every query is
//! non-blocking, because the poll loop must never stall on a quiet
//! connection.
//!
//! `TcpTransport` is the production implementation over non-blocking
//! `std::net` sockets. Tests provide their own scripted implementations of
//! the same trait.

use crate::errors::{ShellError, ShellResult};

use std::collections::HashMap;
use std::fmt;
use std::io::{self, ErrorKind, Read};
use std::net::{Shutdown, TcpListener, TcpStream, ToSocketAddrs};

/// Byte-stream transport the server core runs on top of
///
/// A connection is identified by a small opaque handle, comparable for
/// equality and cheap to copy. None of these operations may block: where the
/// underlying fabric has nothing to report, they answer `None`/`false`
/// instead of waiting.
pub trait Transport {
    /// Opaque identity of one connection
    type Handle: Copy + Eq + fmt::Debug;

    /// Accept at most one pending connection, if the fabric has one queued
    fn accept_pending(&mut self) -> Option<Self::Handle>;

    /// Whether the connection behind `handle` is still alive
    fn is_connected(&self, handle: Self::Handle) -> bool;

    /// Whether at least one byte can be read from `handle` right now
    fn byte_available(&self, handle: Self::Handle) -> bool;

    /// Read exactly one byte; only call when `byte_available` reported true
    fn read_byte(&mut self, handle: Self::Handle) -> io::Result<u8>;

    /// Write a full buffer to the connection
    fn write_bytes(&mut self, handle: Self::Handle, bytes: &[u8]) -> io::Result<()>;

    /// Tear the connection down; subsequent queries report it disconnected
    fn close(&mut self, handle: Self::Handle);
}

/// Consecutive `WouldBlock` results tolerated before a write is abandoned
const WRITE_STALL_LIMIT: u32 = 4096;

/// Production transport over non-blocking TCP sockets
///
/// Handles are monotonically increasing sequence numbers, never reused, so a
/// stale handle held by the application can never alias a newer connection.
pub struct TcpTransport {
    listener: TcpListener,
    streams: HashMap<u64, TcpStream>,
    next_handle: u64,
}

impl TcpTransport {
    /// Bind a listener and switch it to non-blocking accept mode
    pub fn bind<A: ToSocketAddrs>(addr: A) -> ShellResult<Self> {
        let listener = TcpListener::bind(addr).map_err(ShellError::Io)?;
        listener.set_nonblocking(true).map_err(ShellError::Io)?;
        Ok(Self {
            listener,
            streams: HashMap::new(),
            next_handle: 0,
        })
    }

    /// The local address the listener is bound to
    pub fn local_addr(&self) -> io::Result<std::net::SocketAddr> {
        self.listener.local_addr()
    }
}

impl Transport for TcpTransport {
    type Handle = u64;

    fn accept_pending(&mut self) -> Option<u64> {
        match self.listener.accept() {
            Ok((stream, _peer)) => {
                if stream.set_nonblocking(true).is_err() {
                    return None;
                }
                let handle = self.next_handle;
                self.next_handle += 1;
                self.streams.insert(handle, stream);
                Some(handle)
            }
            Err(ref e) if e.kind() == ErrorKind::WouldBlock => None,
            Err(e) => {
                eprintln!("Error accepting connection: {}", e);
                None
            }
        }
    }

    fn is_connected(&self, handle: u64) -> bool {
        let Some(stream) = self.streams.get(&handle) else {
            return false;
        };
        let mut probe = [0u8; 1];
        match stream.peek(&mut probe) {
            Ok(0) => false, // orderly shutdown by the peer
            Ok(_) => true,
            Err(ref e) if e.kind() == ErrorKind::WouldBlock => true,
            Err(_) => false,
        }
    }

    fn byte_available(&self, handle: u64) -> bool {
        let Some(stream) = self.streams.get(&handle) else {
            return false;
        };
        let mut probe = [0u8; 1];
        matches!(stream.peek(&mut probe), Ok(n) if n > 0)
    }

    fn read_byte(&mut self, handle: u64) -> io::Result<u8> {
        let stream = self
            .streams
            .get_mut(&handle)
            .ok_or_else(|| io::Error::from(ErrorKind::NotConnected))?;
        let mut byte = [0u8; 1];
        match stream.read(&mut byte) {
            Ok(1) => Ok(byte[0]),
            Ok(_) => Err(io::Error::from(ErrorKind::UnexpectedEof)),
            Err(e) => Err(e),
        }
    }

    fn write_bytes(&mut self, handle: u64, bytes: &[u8]) -> io::Result<()> {
        use std::io::Write;

        let stream = self
            .streams
            .get_mut(&handle)
            .ok_or_else(|| io::Error::from(ErrorKind::NotConnected))?;

        // The socket is in non-blocking mode; writes are small (prompts and
        // negotiation replies), so retry through transient WouldBlock rather
        // than surfacing a partial write. The retries are bounded: a peer
        // that stops draining its receive window must not stall the whole
        // poll thread, so a persistent WouldBlock becomes a write failure,
        // which the server already treats as a disconnect.
        let mut written = 0;
        let mut stalls = 0u32;
        while written < bytes.len() {
            match stream.write(&bytes[written..]) {
                Ok(0) => return Err(io::Error::from(ErrorKind::WriteZero)),
                Ok(n) => {
                    written += n;
                    stalls = 0;
                }
                Err(ref e) if e.kind() == ErrorKind::WouldBlock => {
                    stalls += 1;
                    if stalls > WRITE_STALL_LIMIT {
                        return Err(io::Error::from(ErrorKind::TimedOut));
                    }
                }
                Err(ref e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }
        Ok(())
    }

    fn close(&mut self, handle: u64) {
        if let Some(stream) = self.streams.remove(&handle) {
            let _ = stream.shutdown(Shutdown::Both);
        }
    }
}

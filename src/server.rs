//! # Shell Server
//!
//! The polling heart of the crate. One `ShellServer` owns the transport, the
//! connection registry, and the command table; a single external driver calls
//! [`ShellServer::poll`] repeatedly and everything else happens inside that
//! call. There is exactly one logical thread of control, so no locks: the
//! registry is only ever mutated between servicing steps of the same poll
//! pass.
//!
//! Each pass consumes **at most one byte per connection**. A chatty client is
//! drained across many passes, which is what keeps one connection from
//! starving the rest.

use crate::config::ShellConfig;
use crate::connection::{ConnectHandler, Connection, KeypressHandler, LineHandler};
use crate::dispatch::CommandTable;
use crate::registry::ConnectionRegistry;
use crate::transport::Transport;

use std::io;

use jiff::Timestamp;
use telnet_protocol::{IAC, NegotiationCommand, Step, negotiation, option};

/// Erase codes accepted from clients: backspace and delete
const BACKSPACE: u8 = 8;
const DELETE: u8 = 127;

/// Destructive erase sequence sent back for each accepted erase:
/// cursor left, blank the cell, cursor left again
const ERASE_SEQUENCE: [u8; 3] = [8, b' ', 8];

/// A borrowed view of one connection plus the transport it talks through.
///
/// Sessions are how application code (connect handlers, command callbacks,
/// override handlers) reaches a connection: writing output, changing the
/// prompt or echo flag, installing override handlers, or disconnecting.
pub struct Session<'a, T: Transport> {
    conn: &'a mut Connection<T>,
    transport: &'a mut T,
    disconnect_requested: bool,
    keypress_cleared: bool,
    line_cleared: bool,
}

impl<'a, T: Transport> Session<'a, T> {
    fn new(conn: &'a mut Connection<T>, transport: &'a mut T) -> Self {
        Self {
            conn,
            transport,
            disconnect_requested: false,
            keypress_cleared: false,
            line_cleared: false,
        }
    }

    /// Transport handle of this session's connection
    pub fn handle(&self) -> T::Handle {
        self.conn.handle()
    }

    /// When this connection was registered
    pub fn connected_at(&self) -> Timestamp {
        self.conn.connected_at()
    }

    /// Write raw bytes to the client
    pub fn write(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.transport.write_bytes(self.conn.handle(), bytes)
    }

    /// Write text to the client
    pub fn print(&mut self, text: &str) -> io::Result<()> {
        self.write(text.as_bytes())
    }

    /// Write text followed by a telnet line break
    pub fn println(&mut self, text: &str) -> io::Result<()> {
        self.print(text)?;
        self.write(b"\r\n")
    }

    /// Show the connection's prompt
    pub fn write_prompt(&mut self) -> io::Result<()> {
        self.transport
            .write_bytes(self.conn.handle(), self.conn.prompt.as_bytes())
    }

    /// Current prompt text
    pub fn prompt(&self) -> &str {
        self.conn.prompt()
    }

    /// Replace the prompt; shown after each subsequent processed line
    pub fn set_prompt(&mut self, prompt: &str) {
        self.conn.prompt.clear();
        self.conn.prompt.push_str(prompt);
    }

    /// Whether accepted input bytes are echoed back
    pub fn echo_enabled(&self) -> bool {
        self.conn.echo_enabled()
    }

    pub fn set_echo(&mut self, echo: bool) {
        self.conn.echo_enabled = echo;
    }

    /// Install a raw byte handler; bypasses line assembly entirely and takes
    /// priority over a line handler if both are somehow set
    pub fn set_keypress_handler(&mut self, handler: impl FnMut(&mut Session<'_, T>, u8) + 'static) {
        self.conn.keypress_handler = Some(Box::new(handler));
        self.keypress_cleared = false;
    }

    pub fn clear_keypress_handler(&mut self) {
        self.conn.keypress_handler = None;
        self.keypress_cleared = true;
    }

    /// Install a raw line handler; completed lines go here instead of the
    /// command table
    pub fn set_line_handler(&mut self, handler: impl FnMut(&mut Session<'_, T>, &[u8]) + 'static) {
        self.conn.line_handler = Some(Box::new(handler));
        self.line_cleared = false;
    }

    pub fn clear_line_handler(&mut self) {
        self.conn.line_handler = None;
        self.line_cleared = true;
    }

    /// Close the transport side of this connection. The registry record is
    /// reaped by the poll pass (immediately when called from inside one).
    pub fn disconnect(&mut self) {
        self.transport.close(self.conn.handle());
        self.disconnect_requested = true;
    }

    /// Hand a taken keypress handler back unless the handler cleared or
    /// replaced itself while it ran
    fn restore_keypress_handler(&mut self, handler: KeypressHandler<T>) {
        if !self.keypress_cleared && self.conn.keypress_handler.is_none() {
            self.conn.keypress_handler = Some(handler);
        }
    }

    fn restore_line_handler(&mut self, handler: LineHandler<T>) {
        if !self.line_cleared && self.conn.line_handler.is_none() {
            self.conn.line_handler = Some(handler);
        }
    }
}

/// A minimal interactive line-protocol server over a byte-stream transport
///
/// The server negotiates character-at-a-time, server-side-echo telnet
/// interaction with each client, assembles input into lines with single
/// backspace editing, and dispatches completed lines to the command table.
pub struct ShellServer<T: Transport> {
    transport: T,
    connections: ConnectionRegistry<T>,
    commands: CommandTable<T>,
    connect_handler: Option<ConnectHandler<T>>,
    shell: ShellConfig,
}

impl<T: Transport> ShellServer<T> {
    /// Build a server over `transport`. `shell` supplies the buffer bound and
    /// the prompt/echo defaults for every new connection.
    pub fn new(transport: T, shell: ShellConfig) -> Self {
        Self {
            transport,
            connections: ConnectionRegistry::new(),
            commands: CommandTable::new(),
            connect_handler: None,
            shell,
        }
    }

    /// Register a command; may be called before or after the first poll
    pub fn register_command(
        &mut self,
        name: &str,
        callback: impl FnMut(&mut Session<'_, T>, &[&str]) -> bool + 'static,
    ) {
        self.commands.register(name, callback);
    }

    /// Install the handler invoked once per new connection, between the
    /// initial negotiation and the first prompt
    pub fn set_connect_handler(&mut self, handler: impl FnMut(&mut Session<'_, T>) + 'static) {
        self.connect_handler = Some(Box::new(handler));
    }

    pub fn clear_connect_handler(&mut self) {
        self.connect_handler = None;
    }

    /// Number of currently registered connections
    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    /// Registered connections in arrival order
    pub fn connections(&self) -> impl Iterator<Item = &Connection<T>> {
        self.connections.iter()
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Borrow a session for `handle`, for application use outside callbacks
    pub fn session(&mut self, handle: T::Handle) -> Option<Session<'_, T>> {
        let Self { transport, connections, .. } = self;
        let conn = connections.find_mut(handle)?;
        Some(Session::new(conn, transport))
    }

    /// Close `handle`'s transport and drop its record immediately
    pub fn disconnect(&mut self, handle: T::Handle) {
        self.transport.close(handle);
        self.connections.remove(handle);
    }

    /// One poll cycle: accept at most one pending connection, then advance
    /// every registered connection by at most one available byte.
    ///
    /// Nothing in here blocks, and a cycle with no pending connection and no
    /// available bytes changes no state and produces no output.
    pub fn poll(&mut self) {
        if let Some(handle) = self.transport.accept_pending() {
            if self.connections.find(handle).is_none() {
                self.register_connection(handle);
            }
        }

        let mut index = 0;
        while index < self.connections.len() {
            let Some(handle) = self.connections.handle_at(index) else {
                break;
            };
            if self.service_connection(handle) {
                index += 1;
            }
            // On removal the next record has shifted into `index`
        }
    }

    /// Create and announce a record for a newly accepted handle: refuse
    /// client-side linemode and echo, claim echo ourselves, run the connect
    /// handler, then show the prompt.
    fn register_connection(&mut self, handle: T::Handle) {
        let connection = Connection::new(
            handle,
            self.shell.buffer_capacity,
            self.shell.prompt.clone(),
            self.shell.echo,
        );
        self.connections.insert(connection);

        let Self { transport, connections, connect_handler, .. } = self;
        let Some(conn) = connections.find_mut(handle) else {
            return;
        };

        let mut session = Session::new(conn, transport);
        let _ = session.write(&negotiation(NegotiationCommand::Dont, option::LINEMODE));
        let _ = session.write(&negotiation(NegotiationCommand::Dont, option::ECHO));
        let _ = session.write(&negotiation(NegotiationCommand::Will, option::ECHO));

        if let Some(handler) = connect_handler.as_mut() {
            handler(&mut session);
        }

        let _ = session.write_prompt();
        let requested = session.disconnect_requested;

        if requested {
            self.connections.remove(handle);
        }
    }

    /// Advance one connection by at most one byte. Returns false when the
    /// record was removed, so the caller keeps its iteration cursor in place.
    fn service_connection(&mut self, handle: T::Handle) -> bool {
        if !self.transport.is_connected(handle) {
            self.drop_connection(handle);
            return false;
        }

        if !self.transport.byte_available(handle) {
            return true;
        }

        let byte = match self.transport.read_byte(handle) {
            Ok(byte) => byte,
            Err(_) => {
                self.drop_connection(handle);
                return false;
            }
        };

        let Self { transport, connections, commands, .. } = self;
        let Some(conn) = connections.find_mut(handle) else {
            return true;
        };

        let mut session = Session::new(conn, transport);
        let result = service_byte(&mut session, commands, byte);
        let requested = session.disconnect_requested;

        if requested || result.is_err() {
            self.drop_connection(handle);
            return false;
        }
        true
    }

    fn drop_connection(&mut self, handle: T::Handle) {
        self.transport.close(handle);
        self.connections.remove(handle);
    }
}

/// Apply one inbound byte to a connection's state machine.
///
/// Priority order, highest first: keypress override, carriage return, line
/// feed, erase codes, then the IAC negotiation machine, then plain data.
/// The erase codes are matched on byte value before the negotiation phase is
/// consulted, so an erase code arriving mid-IAC-sequence edits the line
/// instead of completing the negotiation.
fn service_byte<T: Transport>(
    session: &mut Session<'_, T>,
    commands: &mut CommandTable<T>,
    byte: u8,
) -> io::Result<()> {
    // Override byte mode replaces the whole state machine
    if let Some(mut handler) = session.conn.keypress_handler.take() {
        handler(session, byte);
        session.restore_keypress_handler(handler);
        return Ok(());
    }

    match byte {
        b'\r' => {
            session.write(b"\r\n")?;
            let executed = commit_line(session, commands);
            if session.disconnect_requested {
                return Ok(());
            }
            if !executed {
                session.write(b"Unknown Command\r\n")?;
            }
            session.write_prompt()?;
        }
        // The quiet half of a CR/LF pair
        b'\n' => {}
        BACKSPACE | DELETE => {
            if session.conn.line_buffer.pop().is_some() {
                session.write(&ERASE_SEQUENCE)?;
            }
        }
        _ => match session.conn.negotiation.feed(byte) {
            Step::Consumed => {}
            Step::Negotiated { reply, .. } => {
                if let Some(reply) = reply {
                    session.write(&reply)?;
                }
            }
            Step::Data(data) => {
                if session.conn.has_room() {
                    session.conn.line_buffer.push(data);
                    // An escaped literal 255 is buffered without echo; a
                    // bare IAC on the wire would open a command sequence on
                    // the client side
                    if session.conn.echo_enabled && data != IAC {
                        session.write(&[data])?;
                    }
                }
                // Full buffer: the byte is dropped silently
            }
        },
    }

    Ok(())
}

/// Run the line-commit transition: hand the completed line to the override
/// line handler if one is installed, otherwise to the command table.
/// The line buffer is empty again when this returns.
fn commit_line<T: Transport>(
    session: &mut Session<'_, T>,
    commands: &mut CommandTable<T>,
) -> bool {
    let line = std::mem::take(&mut session.conn.line_buffer);

    let executed = if let Some(mut handler) = session.conn.line_handler.take() {
        handler(session, &line);
        session.restore_line_handler(handler);
        true
    } else {
        let text = String::from_utf8_lossy(&line);
        commands.dispatch(session, &text)
    };

    // Hand the allocation back so the buffer keeps its reserved capacity
    let mut buffer = line;
    buffer.clear();
    session.conn.line_buffer = buffer;

    executed
}

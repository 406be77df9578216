//! # Airlock
//!
//! A minimal interactive line-protocol (telnet-subset) server for small
//! devices: one cooperative polling loop, per-connection line buffers with
//! single-backspace editing, DO/DONT/WILL/WONT negotiation for a couple of
//! hard-coded options, and an ordered command table dispatching completed
//! lines to application callbacks.
//!
//! The core is transport-agnostic: it drives any [`transport::Transport`]
//! implementation through non-blocking queries only. [`transport::TcpTransport`]
//! is the production implementation over `std::net`.
//!
//! ```rust,no_run
//! use airlock::config::ShellConfig;
//! use airlock::server::ShellServer;
//! use airlock::transport::TcpTransport;
//!
//! fn main() -> airlock::errors::ShellResult<()> {
//!     let transport = TcpTransport::bind("127.0.0.1:2323")?;
//!     let mut server = ShellServer::new(transport, ShellConfig {
//!         buffer_capacity: 128,
//!         prompt: "> ".to_string(),
//!         echo: true,
//!     });
//!
//!     server.register_command("ping", |session, _args| {
//!         let _ = session.println("pong");
//!         true
//!     });
//!
//!     loop {
//!         server.poll();
//!         std::thread::sleep(std::time::Duration::from_millis(10));
//!     }
//! }
//! ```

pub mod config;
pub mod connection;
pub mod dispatch;
pub mod errors;
pub mod registry;
pub mod server;
pub mod transport;

pub use config::{AirlockConfig, ShellConfig};
pub use connection::Connection;
pub use dispatch::CommandTable;
pub use errors::{ShellError, ShellResult};
pub use registry::ConnectionRegistry;
pub use server::{Session, ShellServer};
pub use transport::{TcpTransport, Transport};

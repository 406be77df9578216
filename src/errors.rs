use std::fmt;

/// Custom error types for the shell server
#[derive(Debug)]
pub enum ShellError {
    /// I/O related errors (socket creation, bind, raw stream operations)
    Io(std::io::Error),

    /// Client disconnected unexpectedly
    ClientDisconnected,

    /// Configuration error
    Configuration(String),
}

impl fmt::Display for ShellError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShellError::Io(err) => write!(f, "I/O error: {}", err),
            ShellError::ClientDisconnected => write!(f, "Client disconnected"),
            ShellError::Configuration(msg) => write!(f, "Configuration error: {}", msg),
        }
    }
}

impl std::error::Error for ShellError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ShellError::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for ShellError {
    fn from(err: std::io::Error) -> Self {
        use std::io::ErrorKind;

        match err.kind() {
            ErrorKind::UnexpectedEof | ErrorKind::ConnectionReset | ErrorKind::ConnectionAborted => {
                ShellError::ClientDisconnected
            }
            _ => ShellError::Io(err),
        }
    }
}

impl From<crate::config::ConfigError> for ShellError {
    fn from(err: crate::config::ConfigError) -> Self {
        ShellError::Configuration(err.to_string())
    }
}

/// Result type alias for shell server operations
pub type ShellResult<T> = Result<T, ShellError>;

use std::fmt;
use std::fs;
use std::time::Duration;

/// Errors produced while parsing the configuration file
#[derive(Debug)]
pub enum ConfigError {
    UnknownSection(String),
    UnknownKey(String),
    InvalidValue(String, String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::UnknownSection(section) => write!(f, "Unknown section: [{}]", section),
            ConfigError::UnknownKey(key) => write!(f, "Unknown key: {}", key),
            ConfigError::InvalidValue(key, value) => {
                write!(f, "Invalid value for {}: '{}'", key, value)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

#[derive(Debug, Clone)]
pub struct AirlockConfig {
    pub server: ServerConfig,
    pub shell: ShellConfig,
    pub timeouts: TimeoutConfig,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub bind_address: String,
}

#[derive(Debug, Clone)]
pub struct ShellConfig {
    /// Upper bound on the in-progress line buffer, shared by every
    /// connection. One slot is reserved for the logical line terminator, so
    /// the longest accepted line is `buffer_capacity - 1` bytes.
    pub buffer_capacity: usize,
    /// Prompt shown to newly registered connections
    pub prompt: String,
    /// Whether accepted input bytes are echoed back by default
    pub echo: bool,
}

#[derive(Debug, Clone)]
pub struct TimeoutConfig {
    /// Sleep between poll cycles in the daemon loop
    pub poll_interval: Duration,
}

impl Default for AirlockConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                port: 2323,
                bind_address: "127.0.0.1".to_string(),
            },
            shell: ShellConfig {
                buffer_capacity: 128,
                prompt: "> ".to_string(),
                echo: true,
            },
            timeouts: TimeoutConfig {
                poll_interval: Duration::from_millis(10),
            },
        }
    }
}

impl AirlockConfig {
    pub fn load_from_file(path: &str) -> Result<Self, ConfigError> {
        match fs::read_to_string(path) {
            Ok(content) => Self::parse_config(&content),
            Err(_) => {
                // Create default config file if it doesn't exist
                let default_config = Self::default();
                let config_content = default_config.to_config_file_format();
                if let Err(e) = fs::write(path, config_content) {
                    eprintln!("Warning: Could not create default config file: {}", e);
                }
                Ok(default_config)
            }
        }
    }

    fn parse_config(content: &str) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let mut current_section = String::new();

        for line in content.lines() {
            let line = line.trim();

            // Skip comments and empty lines
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            // Handle sections
            if line.starts_with('[') && line.ends_with(']') {
                current_section = line[1..line.len() - 1].to_string();
                continue;
            }

            // Handle key-value pairs
            if let Some(eq_pos) = line.find('=') {
                let key = line[..eq_pos].trim();
                let value = line[eq_pos + 1..].trim().trim_matches('"');

                match current_section.as_str() {
                    "server" => config.parse_server_config(key, value)?,
                    "shell" => config.parse_shell_config(key, value)?,
                    "timeouts" => config.parse_timeout_config(key, value)?,
                    _ => return Err(ConfigError::UnknownSection(current_section.clone())),
                }
            }
        }

        Ok(config)
    }

    fn parse_server_config(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        match key {
            "port" => {
                self.server.port = value
                    .parse()
                    .map_err(|_| ConfigError::InvalidValue(key.to_string(), value.to_string()))?;
            }
            "bind_address" => {
                self.server.bind_address = value.to_string();
            }
            _ => return Err(ConfigError::UnknownKey(key.to_string())),
        }
        Ok(())
    }

    fn parse_shell_config(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        match key {
            "buffer_capacity" => {
                let capacity: usize = value
                    .parse()
                    .map_err(|_| ConfigError::InvalidValue(key.to_string(), value.to_string()))?;
                // One byte of input plus the reserved terminator slot
                if capacity < 2 {
                    return Err(ConfigError::InvalidValue(key.to_string(), value.to_string()));
                }
                self.shell.buffer_capacity = capacity;
            }
            "prompt" => {
                self.shell.prompt = value.to_string();
            }
            "echo" => {
                self.shell.echo = value
                    .parse()
                    .map_err(|_| ConfigError::InvalidValue(key.to_string(), value.to_string()))?;
            }
            _ => return Err(ConfigError::UnknownKey(key.to_string())),
        }
        Ok(())
    }

    fn parse_timeout_config(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        match key {
            "poll_interval_ms" => {
                let millis: u64 = value
                    .parse()
                    .map_err(|_| ConfigError::InvalidValue(key.to_string(), value.to_string()))?;
                self.timeouts.poll_interval = Duration::from_millis(millis);
            }
            _ => return Err(ConfigError::UnknownKey(key.to_string())),
        }
        Ok(())
    }

    fn to_config_file_format(&self) -> String {
        format!(
            r#"# Airlock Configuration File
# Lines starting with # are comments

[server]
# Network configuration
port = {}
bind_address = "{}"

[shell]
# Per-connection line buffer bound (bytes); longest accepted line is one less
buffer_capacity = {}
# Default prompt shown to new connections
prompt = "{}"
# Echo accepted input bytes back to the client
echo = {}

[timeouts]
# Sleep between poll cycles in milliseconds
poll_interval_ms = {}
"#,
            self.server.port,
            self.server.bind_address,
            self.shell.buffer_capacity,
            self.shell.prompt,
            self.shell.echo,
            self.timeouts.poll_interval.as_millis(),
        )
    }
}

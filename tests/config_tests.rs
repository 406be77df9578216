//! Configuration loading against real files.

use airlock::config::AirlockConfig;

use std::fs;
use std::time::Duration;

use tempfile::TempDir;

#[test]
fn test_missing_file_writes_defaults_to_disk() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("airlock.conf");
    let path_str = path.to_str().unwrap();

    let config = AirlockConfig::load_from_file(path_str).unwrap();
    assert_eq!(config.server.port, 2323);
    assert_eq!(config.shell.prompt, "> ");

    // The defaults should now exist as a parseable file
    let written = fs::read_to_string(&path).unwrap();
    assert!(written.contains("[server]"));
    assert!(written.contains("port = 2323"));

    let reloaded = AirlockConfig::load_from_file(path_str).unwrap();
    assert_eq!(reloaded.server.port, config.server.port);
    assert_eq!(reloaded.shell.buffer_capacity, config.shell.buffer_capacity);
}

#[test]
fn test_existing_file_is_loaded() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("airlock.conf");
    fs::write(
        &path,
        r#"
[server]
port = 2400
bind_address = "0.0.0.0"

[shell]
buffer_capacity = 32
prompt = "airlock> "
echo = false

[timeouts]
poll_interval_ms = 50
"#,
    )
    .unwrap();

    let config = AirlockConfig::load_from_file(path.to_str().unwrap()).unwrap();
    assert_eq!(config.server.port, 2400);
    assert_eq!(config.server.bind_address, "0.0.0.0");
    assert_eq!(config.shell.buffer_capacity, 32);
    assert_eq!(config.shell.prompt, "airlock> ");
    assert!(!config.shell.echo);
    assert_eq!(config.timeouts.poll_interval, Duration::from_millis(50));
}

#[test]
fn test_malformed_file_is_an_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("airlock.conf");
    fs::write(&path, "[warp]\nfactor = 9\n").unwrap();

    assert!(AirlockConfig::load_from_file(path.to_str().unwrap()).is_err());
}

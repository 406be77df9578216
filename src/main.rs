use airlock::config::AirlockConfig;
use airlock::errors::ShellResult;
use airlock::server::ShellServer;
use airlock::transport::TcpTransport;

use crossterm::{
    QueueableCommand,
    style::{Color, Print, ResetColor, SetForegroundColor},
};
use jiff::Timestamp;

use std::io::Write;
use std::thread;

fn main() -> ShellResult<()> {
    // Load configuration
    let config = match AirlockConfig::load_from_file("airlock.conf") {
        Ok(config) => {
            println!("✓ Configuration loaded from airlock.conf");
            config
        }
        Err(e) => {
            eprintln!("Config error: {}. Using defaults.", e);
            AirlockConfig::default()
        }
    };

    print_startup_banner(&config)?;

    // Start the server
    let bind_addr = format!("{}:{}", config.server.bind_address, config.server.port);
    let transport = TcpTransport::bind(&bind_addr)?;
    let mut server = ShellServer::new(transport, config.shell.clone());

    println!("🚀 Airlock listening on {}", bind_addr);
    println!(
        "📞 Connect with: telnet {} {}",
        config.server.bind_address, config.server.port
    );

    let started = Timestamp::now();

    server.set_connect_handler(|session| {
        let _ = session.println("Welcome to Airlock.");
        let _ = session.println("Type 'help' for available commands.");
    });

    server.register_command("help", |session, _args| {
        let _ = session.println("Available commands:");
        let _ = session.println("  help          show this list");
        let _ = session.println("  echo <text>   repeat <text> back");
        let _ = session.println("  uptime        time since server start");
        let _ = session.println("  quit          close this connection");
        true
    });

    server.register_command("echo", |session, args| {
        let _ = session.println(&args[1..].join(" "));
        true
    });

    server.register_command("uptime", move |session, _args| {
        let elapsed = Timestamp::now().duration_since(started);
        let _ = session.println(&format!("up {:#}", elapsed));
        true
    });

    server.register_command("quit", |session, _args| {
        let _ = session.println("Goodbye.");
        session.disconnect();
        true
    });

    println!("\nPress Ctrl+C to stop the server\n");

    loop {
        server.poll();
        thread::sleep(config.timeouts.poll_interval);
    }
}

fn print_startup_banner(config: &AirlockConfig) -> std::io::Result<()> {
    let mut stdout = std::io::stdout();

    stdout.queue(SetForegroundColor(Color::Cyan))?;
    stdout.queue(Print("\n=== AIRLOCK TELNET SHELL ===\n"))?;
    stdout.queue(ResetColor)?;
    stdout.queue(Print(format!(
        "  Port:            {}\n",
        config.server.port
    )))?;
    stdout.queue(Print(format!(
        "  Bind address:    {}\n",
        config.server.bind_address
    )))?;
    stdout.queue(Print(format!(
        "  Line buffer:     {} bytes\n",
        config.shell.buffer_capacity
    )))?;
    stdout.queue(Print(format!(
        "  Prompt:          \"{}\"\n",
        config.shell.prompt
    )))?;
    stdout.queue(Print(format!(
        "  Echo:            {}\n",
        if config.shell.echo { "Enabled" } else { "Disabled" }
    )))?;
    stdout.queue(Print(format!(
        "  Poll interval:   {}ms\n\n",
        config.timeouts.poll_interval.as_millis()
    )))?;
    stdout.flush()
}

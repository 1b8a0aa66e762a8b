//! cfsemu - AT Command File Storage Emulator
//!
//! This is the main entry point for the emulator.
//! It parses the command line, opens the serial port (or a TCP listener),
//! and serves AT sessions until interrupted.

use anyhow::Context;
use cfsemu::commands::CommandHandler;
use cfsemu::connection::{handle_connection, ConnectionStats};
use cfsemu::storage::{Directory, LocalFiles};
use cfsemu::{EmulatorConfig, DEFAULT_BAUD_RATE, DEFAULT_DIST_DIR};
use clap::{ArgGroup, Parser};
use std::path::{Path, PathBuf};
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tokio_serial::SerialPortBuilderExt;
use tracing::{error, info, warn, Level};
use tracing_subscriber::FmtSubscriber;

/// Command-line options
#[derive(Debug, Parser)]
#[command(
    name = "cfsemu",
    version,
    about = "Emulates modem file storage AT commands over a serial port"
)]
#[command(group(ArgGroup::new("transport").required(true).args(["serial", "listen"])))]
struct Cli {
    /// Serial port on which the emulator runs
    #[arg(short = 's', long = "serial", value_name = "PORT")]
    serial: Option<String>,

    /// Serial baud rate
    #[arg(short = 'b', long = "baud", value_name = "RATE", default_value_t = DEFAULT_BAUD_RATE)]
    baud: u32,

    /// Directory where distribution files are located
    #[arg(short = 'd', long = "dir", value_name = "PATH", default_value = DEFAULT_DIST_DIR)]
    dir: PathBuf,

    /// Do not require CFSINIT before other commands
    #[arg(long = "no-cfsinit")]
    no_cfsinit: bool,

    /// Serve over TCP on this address instead of a serial port
    #[arg(short = 'l', long = "listen", value_name = "ADDR")]
    listen: Option<String>,

    /// Enable debug output (echo of every line in and out)
    #[arg(short = 'v', long = "verbose")]
    verbose: bool,
}

impl Cli {
    /// Builds the emulator configuration, resolving the directory to an absolute path
    fn emulator_config(&self) -> anyhow::Result<EmulatorConfig> {
        let dist_root = std::path::absolute(&self.dir)
            .with_context(|| format!("cannot resolve directory '{}'", self.dir.display()))?;
        Ok(EmulatorConfig::new(dist_root).with_require_init(!self.no_cfsinit))
    }
}

fn print_banner(config: &EmulatorConfig, endpoint: &str) {
    println!(
        r#"
cfsemu v{} - AT Command File Storage Emulator
──────────────────────────────────────────────────────────────
Serving files from {}
Listening on {}
CFSINIT required: {}

Use Ctrl+C to shutdown gracefully.
"#,
        cfsemu::VERSION,
        config.dist_root.display(),
        endpoint,
        if config.require_init { "yes" } else { "no" },
    );
}

/// Warns about storage areas missing under the distribution root
fn check_layout(root: &Path) {
    if !root.is_dir() {
        warn!(path = %root.display(), "Distribution directory does not exist");
        return;
    }
    for dir in Directory::ALL {
        let path = root.join(dir.name());
        if !path.is_dir() {
            warn!(path = %path.display(), "Storage area directory is missing");
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse command-line arguments
    let cli = Cli::parse();

    // Set up logging
    let level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .init();

    let config = cli.emulator_config()?;
    let stats = Arc::new(ConnectionStats::new());
    check_layout(&config.dist_root);

    // Set up graceful shutdown
    let shutdown = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
        info!("Shutdown signal received, stopping emulator...");
    };

    if let Some(addr) = &cli.listen {
        let listener = TcpListener::bind(addr)
            .await
            .with_context(|| format!("failed to bind {}", addr))?;
        print_banner(&config, addr);
        info!("Listening on {}", addr);

        tokio::select! {
            _ = accept_loop(listener, &config, Arc::clone(&stats)) => {}
            _ = shutdown => {}
        }
    } else if let Some(port_name) = &cli.serial {
        info!("Opening {} at {} bauds...", port_name, cli.baud);
        let port = tokio_serial::new(port_name, cli.baud)
            .open_native_async()
            .with_context(|| format!("failed to open serial port {}", port_name))?;
        print_banner(&config, port_name);
        info!("Sharing files from {}", config.dist_root.display());

        let handler = CommandHandler::new(&config, LocalFiles);
        tokio::select! {
            _ = handle_connection(port, port_name.as_str(), handler, Arc::clone(&stats)) => {}
            _ = shutdown => {}
        }
    }

    info!(
        commands = stats.commands_processed.load(Ordering::Relaxed),
        failed = stats.commands_failed.load(Ordering::Relaxed),
        "Emulator shutdown complete"
    );
    Ok(())
}

/// Serves TCP clients one at a time, each with a fresh session
async fn accept_loop(listener: TcpListener, config: &EmulatorConfig, stats: Arc<ConnectionStats>) {
    loop {
        match listener.accept().await {
            Ok((stream, addr)) => {
                let handler = CommandHandler::new(config, LocalFiles);
                handle_connection(stream, addr.to_string(), handler, Arc::clone(&stats)).await;
            }
            Err(e) => {
                error!("Failed to accept connection: {}", e);
            }
        }
    }
}

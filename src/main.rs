//! simple-http demo server.
//!
//! Serves the demo handlers:
//! - `GET /action/foo?name=..&age=..&gender=..`
//! - `GET /action/foostream?times=..&delay=..` (chunked)
//!
//! Settings come from an optional TOML file, then command-line flags.

use std::path::PathBuf;

use clap::Parser;

use simple_http::config::loader::{load_settings, ConfigError};
use simple_http::config::validation::validate_settings;
use simple_http::config::Settings;
use simple_http::lifecycle::signals::shutdown_signal;
use simple_http::observability::init_logging;
use simple_http::{demo, Server};

#[derive(Parser)]
#[command(name = "simple-http")]
#[command(about = "Minimal HTTP server with the foo demo handlers", long_about = None)]
struct Cli {
    /// TOML settings file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Host name or address to bind.
    #[arg(long)]
    host: Option<String>,

    /// Port to bind.
    #[arg(short, long)]
    port: Option<u16>,

    /// Pending-connection queue size (0 = system default).
    #[arg(long)]
    backlog: Option<u32>,

    /// Connections served concurrently.
    #[arg(short, long)]
    workers: Option<usize>,
}

impl Cli {
    fn settings(&self) -> Result<Settings, ConfigError> {
        let mut settings = match &self.config {
            Some(path) => load_settings(path)?,
            None => Settings::default(),
        };

        let server = &mut settings.server;
        if let Some(host) = &self.host {
            server.hostname = host.clone();
        }
        if let Some(port) = self.port {
            server.port = port;
        }
        if let Some(backlog) = self.backlog {
            server.backlog = backlog;
        }
        if let Some(workers) = self.workers {
            server.workers = Some(workers);
        }

        validate_settings(&settings).map_err(ConfigError::Validation)?;
        Ok(settings)
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let cli = Cli::parse();
    let settings = cli.settings()?;
    init_logging(&settings.logging)?;

    tracing::info!("simple-http v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        hostname = %settings.server.hostname,
        port = settings.server.port,
        backlog = settings.server.backlog,
        workers = ?settings.server.workers,
        "Configuration loaded"
    );

    let config = demo::register_all(settings.to_server_builder()).build()?;
    let server = Server::new(config);
    server.run_until(shutdown_signal()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}

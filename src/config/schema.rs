//! Settings file schema.
//!
//! All types derive Serde traits for deserialization from TOML and default
//! every field, so an empty file is a valid configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::config::server::{Executor, ServerConfigBuilder};

/// Root of the settings file.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct Settings {
    /// Listener and scheduling settings.
    pub server: ServerSection,

    /// Log output settings.
    pub logging: LoggingConfig,
}

/// Listener and scheduling settings.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ServerSection {
    /// Host name or address to bind.
    pub hostname: String,

    /// Port to bind.
    pub port: u16,

    /// Pending-connection queue size (0 = system default).
    pub backlog: u32,

    /// Concurrent connections; absent serves one connection at a time.
    pub workers: Option<usize>,

    /// Seconds `stop` waits for open connections.
    pub shutdown_timeout_secs: u64,

    /// Optional upper bound on a single handler invocation, in seconds.
    pub request_timeout_secs: Option<u64>,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            hostname: "localhost".to_string(),
            port: 8000,
            backlog: 4,
            workers: Some(3),
            shutdown_timeout_secs: 30,
            request_timeout_secs: None,
        }
    }
}

/// Log output settings.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive used when `RUST_LOG` is unset (e.g. "info").
    pub level: String,

    /// Output format.
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "simple_http=info,tower_http=info".to_string(),
            format: LogFormat::Pretty,
        }
    }
}

/// Log line format.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable lines for development.
    #[default]
    Pretty,
    /// One JSON object per line for log aggregation.
    Json,
}

impl Settings {
    /// Start a [`ServerConfigBuilder`] from these settings. Routes still need
    /// to be registered.
    pub fn to_server_builder(&self) -> ServerConfigBuilder {
        let server = &self.server;
        let mut builder = ServerConfigBuilder::default()
            .hostname(server.hostname.clone())
            .port(server.port)
            .backlog(server.backlog)
            .shutdown_timeout(Duration::from_secs(server.shutdown_timeout_secs));

        if let Some(workers) = server.workers {
            builder = builder.executor(Executor::WorkerPool { workers });
        }
        if let Some(secs) = server.request_timeout_secs {
            builder = builder.request_timeout(Duration::from_secs(secs));
        }
        builder
    }
}

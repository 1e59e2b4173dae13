//! Validated server configuration.
//!
//! # Design Decisions
//! - Built once through [`ServerConfigBuilder`]; immutable afterwards
//! - hostname, port and backlog are required; everything else has a default
//! - Route problems surface from `build()`, before the server can start

use std::sync::Arc;
use std::time::Duration;

use crate::error::ConfigurationError;
use crate::http::Handler;
use crate::routing::RouteTable;

/// Backlog used when the configured backlog is 0.
pub const DEFAULT_BACKLOG: u32 = 1024;

/// Default time `stop()` waits for open connections to finish.
pub const DEFAULT_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(30);

/// How accepted connections are scheduled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Executor {
    /// Serve each connection to completion on the accept loop, one at a time.
    #[default]
    Inline,
    /// Serve up to `workers` connections concurrently.
    WorkerPool { workers: usize },
}

/// Configuration for a [`Server`](crate::http::Server).
#[derive(Debug, Clone)]
pub struct ServerConfig {
    hostname: String,
    port: u16,
    backlog: u32,
    executor: Executor,
    routes: RouteTable,
    shutdown_timeout: Duration,
    request_timeout: Option<Duration>,
}

impl ServerConfig {
    pub fn builder() -> ServerConfigBuilder {
        ServerConfigBuilder::default()
    }

    pub fn hostname(&self) -> &str {
        &self.hostname
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// The configured backlog; 0 means [`DEFAULT_BACKLOG`].
    pub fn backlog(&self) -> u32 {
        self.backlog
    }

    /// The backlog handed to `listen(2)`.
    pub fn effective_backlog(&self) -> u32 {
        if self.backlog == 0 {
            DEFAULT_BACKLOG
        } else {
            self.backlog
        }
    }

    pub fn executor(&self) -> Executor {
        self.executor
    }

    pub fn routes(&self) -> &RouteTable {
        &self.routes
    }

    pub fn shutdown_timeout(&self) -> Duration {
        self.shutdown_timeout
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout
    }
}

/// Builder for [`ServerConfig`].
#[derive(Default)]
pub struct ServerConfigBuilder {
    hostname: Option<String>,
    port: Option<u16>,
    backlog: Option<u32>,
    executor: Option<Executor>,
    routes: Vec<(String, Arc<dyn Handler>)>,
    shutdown_timeout: Option<Duration>,
    request_timeout: Option<Duration>,
}

impl ServerConfigBuilder {
    pub fn hostname(mut self, hostname: impl Into<String>) -> Self {
        self.hostname = Some(hostname.into());
        self
    }

    pub fn port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    /// Pending-connection queue size. 0 uses the default.
    pub fn backlog(mut self, backlog: u32) -> Self {
        self.backlog = Some(backlog);
        self
    }

    /// Without an executor connections are served one at a time.
    pub fn executor(mut self, executor: Executor) -> Self {
        self.executor = Some(executor);
        self
    }

    pub fn worker_pool(self, workers: usize) -> Self {
        self.executor(Executor::WorkerPool { workers })
    }

    /// Register `handler` at `path`.
    pub fn register(self, path: impl Into<String>, handler: impl Handler) -> Self {
        self.register_shared(path, Arc::new(handler))
    }

    /// Register an already shared handler at `path`.
    pub fn register_shared(mut self, path: impl Into<String>, handler: Arc<dyn Handler>) -> Self {
        self.routes.push((path.into(), handler));
        self
    }

    pub fn shutdown_timeout(mut self, timeout: Duration) -> Self {
        self.shutdown_timeout = Some(timeout);
        self
    }

    /// Upper bound on one handler invocation. Unbounded by default.
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    pub fn build(self) -> Result<ServerConfig, ConfigurationError> {
        let hostname = self.hostname.ok_or(ConfigurationError::MissingField("hostname"))?;
        let port = self.port.ok_or(ConfigurationError::MissingField("port"))?;
        let backlog = self.backlog.ok_or(ConfigurationError::MissingField("backlog"))?;

        let executor = self.executor.unwrap_or_default();
        if executor == (Executor::WorkerPool { workers: 0 }) {
            return Err(ConfigurationError::EmptyWorkerPool);
        }

        let mut routes = RouteTable::new();
        for (path, handler) in self.routes {
            routes.insert(path, handler)?;
        }

        Ok(ServerConfig {
            hostname,
            port,
            backlog,
            executor,
            routes,
            shutdown_timeout: self.shutdown_timeout.unwrap_or(DEFAULT_SHUTDOWN_TIMEOUT),
            request_timeout: self.request_timeout,
        })
    }
}

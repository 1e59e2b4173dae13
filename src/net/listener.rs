//! TCP listener with backlog and worker-pool limits.
//!
//! # Responsibilities
//! - Resolve the configured host name
//! - Bind with the configured backlog
//! - Enforce the worker-pool size via semaphore
//! - Graceful handling of accept errors

use std::net::SocketAddr;
use std::sync::Arc;

use thiserror::Error;
use tokio::net::{TcpListener, TcpSocket, TcpStream};
use tokio::sync::Semaphore;

use crate::config::{Executor, ServerConfig};

/// Error type for listener operations.
#[derive(Debug, Error)]
pub enum ListenerError {
    /// The host name did not resolve to any address.
    #[error("failed to resolve {host}: {source}")]
    Resolve {
        host: String,
        #[source]
        source: std::io::Error,
    },
    /// Failed to bind to address.
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },
    /// Failed to accept connection.
    #[error("failed to accept: {0}")]
    Accept(#[source] std::io::Error),
    /// The worker pool was shut down.
    #[error("worker pool closed")]
    Closed,
}

/// A TCP listener that optionally limits concurrent connections.
///
/// With [`Executor::WorkerPool`] a semaphore enforces the worker count: when
/// every worker is busy, accepting waits until one becomes free.
pub struct Listener {
    /// The underlying TCP listener.
    inner: TcpListener,
    /// Semaphore limiting concurrent connections, if any.
    connection_limit: Option<Arc<Semaphore>>,
}

impl Listener {
    /// Resolve and bind the configured address.
    pub async fn bind(config: &ServerConfig) -> Result<Self, ListenerError> {
        let host = config.hostname();
        let addr = tokio::net::lookup_host((host, config.port()))
            .await
            .map_err(|source| ListenerError::Resolve {
                host: host.to_string(),
                source,
            })?
            .next()
            .ok_or_else(|| ListenerError::Resolve {
                host: host.to_string(),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "no addresses"),
            })?;

        let bind_err = |source| ListenerError::Bind { addr, source };
        let socket = if addr.is_ipv4() {
            TcpSocket::new_v4()
        } else {
            TcpSocket::new_v6()
        }
        .map_err(bind_err)?;
        socket.set_reuseaddr(true).map_err(bind_err)?;
        socket.bind(addr).map_err(bind_err)?;
        let inner = socket.listen(config.effective_backlog()).map_err(bind_err)?;

        let connection_limit = match config.executor() {
            Executor::Inline => None,
            Executor::WorkerPool { workers } => Some(Arc::new(Semaphore::new(workers))),
        };

        tracing::info!(
            address = %inner.local_addr().map_err(bind_err)?,
            backlog = config.effective_backlog(),
            executor = ?config.executor(),
            "Listener bound"
        );

        Ok(Self {
            inner,
            connection_limit,
        })
    }

    /// Accept a new connection, respecting the worker limit.
    ///
    /// Returns the stream and, for worker pools, a permit that must be held
    /// for the connection's lifetime.
    pub async fn accept(
        &self,
    ) -> Result<(TcpStream, SocketAddr, Option<ConnectionPermit>), ListenerError> {
        // Acquire permit first (backpressure)
        let permit = match &self.connection_limit {
            Some(limit) => Some(ConnectionPermit {
                _permit: limit
                    .clone()
                    .acquire_owned()
                    .await
                    .map_err(|_| ListenerError::Closed)?,
            }),
            None => None,
        };

        let (stream, addr) = self.inner.accept().await.map_err(ListenerError::Accept)?;

        tracing::debug!(
            peer_addr = %addr,
            available_workers = self.available_permits(),
            "Connection accepted"
        );

        Ok((stream, addr, permit))
    }

    /// Get the local address this listener is bound to.
    pub fn local_addr(&self) -> Result<SocketAddr, std::io::Error> {
        self.inner.local_addr()
    }

    /// Idle workers, or `None` when connections are served inline.
    pub fn available_permits(&self) -> Option<usize> {
        self.connection_limit
            .as_ref()
            .map(|limit| limit.available_permits())
    }
}

/// A permit representing a busy worker.
///
/// When dropped, the worker is released back to the pool, even if the
/// connection task panics.
#[derive(Debug)]
pub struct ConnectionPermit {
    _permit: tokio::sync::OwnedSemaphorePermit,
}

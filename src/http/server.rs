//! HTTP server setup and lifecycle.
//!
//! # Responsibilities
//! - Create the Axum router resolving requests by longest registered prefix
//! - Bind the listener with the configured backlog
//! - Serve connections inline or on the worker pool
//! - Drive the NotStarted → Running → Stopped lifecycle with graceful drain

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Router;
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper_util::rt::{TokioIo, TokioTimer};
use hyper_util::service::TowerToHyperService;
use tokio::net::TcpStream;
use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;
use tower::ServiceExt;
use tower_http::trace::TraceLayer;

use crate::config::{Executor, ServerConfig};
use crate::error::{Error, LifecycleError};
use crate::http::dispatch::{dispatch, Route};
use crate::lifecycle::shutdown::triggered;
use crate::lifecycle::{LifecycleState, Shutdown};
use crate::net::connection::{ConnectionGuard, ConnectionTracker};
use crate::net::listener::Listener;

/// Delay before accepting again after an accept error.
const ACCEPT_RETRY_DELAY: Duration = Duration::from_millis(100);

enum Lifecycle {
    NotStarted,
    Running {
        local_addr: SocketAddr,
        accept_loop: JoinHandle<()>,
    },
    Stopped,
}

impl Lifecycle {
    fn state(&self) -> LifecycleState {
        match self {
            Lifecycle::NotStarted => LifecycleState::NotStarted,
            Lifecycle::Running { .. } => LifecycleState::Running,
            Lifecycle::Stopped => LifecycleState::Stopped,
        }
    }
}

/// HTTP server dispatching requests to registered handlers.
pub struct Server {
    config: Arc<ServerConfig>,
    shutdown: Shutdown,
    tracker: ConnectionTracker,
    lifecycle: Mutex<Lifecycle>,
}

impl Server {
    /// Create a server; nothing is bound until [`Server::start`].
    pub fn new(config: ServerConfig) -> Self {
        Self {
            config: Arc::new(config),
            shutdown: Shutdown::new(),
            tracker: ConnectionTracker::new(),
            lifecycle: Mutex::new(Lifecycle::NotStarted),
        }
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    pub async fn state(&self) -> LifecycleState {
        self.lifecycle.lock().await.state()
    }

    /// The bound address while running.
    pub async fn local_addr(&self) -> Option<SocketAddr> {
        match &*self.lifecycle.lock().await {
            Lifecycle::Running { local_addr, .. } => Some(*local_addr),
            _ => None,
        }
    }

    /// Connections currently open.
    pub fn active_connections(&self) -> u64 {
        self.tracker.active_count()
    }

    /// Bind, install the routes and start accepting connections.
    ///
    /// Returns the bound address. Only allowed once.
    pub async fn start(&self) -> Result<SocketAddr, Error> {
        let mut lifecycle = self.lifecycle.lock().await;
        if !matches!(*lifecycle, Lifecycle::NotStarted) {
            return Err(LifecycleError {
                action: "start",
                state: lifecycle.state(),
            }
            .into());
        }

        let listener = Listener::bind(&self.config).await?;
        let local_addr = listener.local_addr()?;
        let app = build_router(&self.config, self.shutdown.subscribe());

        let accept_loop = tokio::spawn(accept_loop(
            listener,
            app,
            self.config.executor(),
            self.shutdown.subscribe(),
            self.tracker.clone(),
        ));

        tracing::info!(
            address = %local_addr,
            routes = ?self.config.routes().paths().collect::<Vec<_>>(),
            "HTTP server started"
        );
        *lifecycle = Lifecycle::Running {
            local_addr,
            accept_loop,
        };
        Ok(local_addr)
    }

    /// Stop accepting, cancel in-flight handlers and wait for connections to
    /// drain, up to the configured shutdown timeout.
    pub async fn stop(&self) -> Result<(), Error> {
        let mut lifecycle = self.lifecycle.lock().await;
        let accept_loop = match std::mem::replace(&mut *lifecycle, Lifecycle::Stopped) {
            Lifecycle::Running { accept_loop, .. } => accept_loop,
            other => {
                let state = other.state();
                *lifecycle = other;
                return Err(LifecycleError {
                    action: "stop",
                    state,
                }
                .into());
            }
        };

        tracing::info!(
            active_connections = self.tracker.active_count(),
            "HTTP server stopping"
        );
        self.shutdown.trigger();

        let abort = accept_loop.abort_handle();
        let drain = async {
            let _ = accept_loop.await;
            self.tracker.wait_for_drain().await;
        };
        if tokio::time::timeout(self.config.shutdown_timeout(), drain)
            .await
            .is_err()
        {
            tracing::warn!(
                active_connections = self.tracker.active_count(),
                "Shutdown timeout elapsed, abandoning open connections"
            );
            abort.abort();
        }

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Start, run until `signal` resolves, then stop.
    pub async fn run_until<F>(&self, signal: F) -> Result<(), Error>
    where
        F: Future<Output = ()>,
    {
        self.start().await?;
        signal.await;
        self.stop().await
    }
}

/// Build the Axum router. Every request resolves to the handler registered
/// at its longest path prefix; anything else is an empty 404.
fn build_router(config: &ServerConfig, shutdown: watch::Receiver<bool>) -> Router {
    let routes = config.routes().clone();
    let request_timeout = config.request_timeout();

    let resolve = move |request: axum::http::Request<Body>| {
        let route = routes
            .resolve(request.uri().path())
            .map(|(_, handler)| Route {
                handler: Arc::clone(handler),
                shutdown: shutdown.clone(),
                request_timeout,
            });
        async move {
            match route {
                Some(route) => dispatch(route, request).await,
                None => StatusCode::NOT_FOUND.into_response(),
            }
        }
    };
    Router::new()
        .fallback(resolve)
        .layer(TraceLayer::new_for_http())
}

async fn accept_loop(
    listener: Listener,
    app: Router,
    executor: Executor,
    mut shutdown: watch::Receiver<bool>,
    tracker: ConnectionTracker,
) {
    loop {
        let accepted = tokio::select! {
            biased;
            _ = triggered(&mut shutdown) => None,
            accepted = listener.accept() => Some(accepted),
        };

        let (stream, peer_addr, permit) = match accepted {
            None => break,
            Some(Ok(accepted)) => accepted,
            Some(Err(e)) => {
                tracing::warn!(error = %e, "Accept failed");
                tokio::time::sleep(ACCEPT_RETRY_DELAY).await;
                continue;
            }
        };

        let connection = serve_connection(
            stream,
            peer_addr,
            app.clone(),
            shutdown.clone(),
            tracker.track(),
        );
        match executor {
            Executor::Inline => connection.await,
            Executor::WorkerPool { .. } => {
                tokio::spawn(async move {
                    let _permit = permit;
                    connection.await;
                });
            }
        }
    }
    tracing::debug!("Accept loop finished");
}

async fn serve_connection(
    stream: TcpStream,
    peer_addr: SocketAddr,
    app: Router,
    mut shutdown: watch::Receiver<bool>,
    guard: ConnectionGuard,
) {
    let service = TowerToHyperService::new(
        app.map_request(|request: axum::http::Request<Incoming>| request.map(Body::new)),
    );

    let mut builder = http1::Builder::new();
    // One exchange per connection: the connection closes after the response.
    builder.timer(TokioTimer::new()).keep_alive(false);
    let connection = builder.serve_connection(TokioIo::new(stream), service);
    let mut connection = std::pin::pin!(connection);

    let result = tokio::select! {
        result = connection.as_mut() => result,
        _ = triggered(&mut shutdown) => {
            connection.as_mut().graceful_shutdown();
            connection.await
        }
    };

    if let Err(e) = result {
        tracing::debug!(
            connection_id = %guard.id(),
            peer_addr = %peer_addr,
            error = %e,
            "Connection ended with error"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::{Handler, HandlerFuture, Request, Response, ResponseSender, Status};

    struct Hello;

    impl Handler for Hello {
        fn get<'a>(&'a self, _request: Request, sender: &'a mut ResponseSender) -> HandlerFuture<'a> {
            Box::pin(async move {
                sender
                    .send(Response::builder().status(Status::Ok).text("hello").build())
                    .await
            })
        }
    }

    fn server() -> Server {
        let config = ServerConfig::builder()
            .hostname("127.0.0.1")
            .port(0)
            .backlog(0)
            .register("/hello", Hello)
            .build()
            .unwrap();
        Server::new(config)
    }

    #[tokio::test]
    async fn lifecycle_transitions_happen_once() {
        let server = server();
        assert_eq!(server.state().await, LifecycleState::NotStarted);

        let err = server.stop().await.unwrap_err();
        assert!(matches!(
            err,
            Error::Lifecycle(LifecycleError { state: LifecycleState::NotStarted, .. })
        ));

        let addr = server.start().await.unwrap();
        assert_eq!(server.state().await, LifecycleState::Running);
        assert_eq!(server.local_addr().await, Some(addr));
        assert!(matches!(server.start().await, Err(Error::Lifecycle(_))));

        server.stop().await.unwrap();
        assert_eq!(server.state().await, LifecycleState::Stopped);
        assert_eq!(server.local_addr().await, None);
        assert!(matches!(server.start().await, Err(Error::Lifecycle(_))));
        assert!(matches!(server.stop().await, Err(Error::Lifecycle(_))));
    }

    #[tokio::test]
    async fn stopped_server_refuses_connections() {
        let server = server();
        let addr = server.start().await.unwrap();
        server.stop().await.unwrap();

        assert!(TcpStream::connect(addr).await.is_err());
    }

    #[tokio::test]
    async fn router_serves_registered_prefixes_only() {
        let config = ServerConfig::builder()
            .hostname("127.0.0.1")
            .port(0)
            .backlog(0)
            .register("/hello", Hello)
            .build()
            .unwrap();
        let (_, shutdown) = watch::channel(false);
        let router = build_router(&config, shutdown);

        let status = |uri: &'static str| {
            let router = router.clone();
            async move {
                let request = axum::http::Request::builder()
                    .uri(uri)
                    .body(Body::empty())
                    .unwrap();
                router.oneshot(request).await.unwrap().status()
            }
        };
        assert_eq!(status("/hello").await, 200);
        assert_eq!(status("/hello/more").await, 200);
        assert_eq!(status("/hellothere").await, 404);
        assert_eq!(status("/").await, 404);
    }
}

//! Minimal HTTP server library.
//!
//! Handlers are registered per resource path and receive a [`http::Request`]
//! together with a [`http::ResponseSender`] that writes either one complete
//! response or a chunked stream.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request
//!     ──────────────▶ net::listener ──▶ http::server ──▶ routing (exact path)
//!                                                            │
//!                                                            ▼
//!                                                      http::dispatch
//!                                                      Handler::get/post/...
//!                                                            │
//!     Client Response                                        ▼
//!     ◀────────────── hyper connection ◀──────────── ResponseSender
//!                                                    (send | chunks)
//!
//!     Cross-cutting: config, lifecycle (start/stop, signals), observability
//! ```
//!
//! # Example
//!
//! ```ignore
//! let config = ServerConfig::builder()
//!     .hostname("localhost")
//!     .port(8000)
//!     .worker_pool(3)
//!     .register("/action/foo", demo::FooAction)
//!     .build()?;
//! Server::new(config).run_until(lifecycle::signals::shutdown_signal()).await?;
//! ```

// Core subsystems
pub mod config;
pub mod error;
pub mod http;
pub mod net;
pub mod routing;

// Cross-cutting concerns
pub mod lifecycle;
pub mod observability;

// Example handlers
pub mod demo;

pub use config::{Executor, ServerConfig, ServerConfigBuilder};
pub use error::{Error, Result};
pub use http::{
    Handler, HandlerFuture, HandlerResult, HeaderSet, Request, Response, ResponseSender, Server,
    Status,
};
pub use lifecycle::{LifecycleState, Shutdown};

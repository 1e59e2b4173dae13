//! Error types for simple-http.
//!
//! Every failure a handler can observe is a variant of [`Error`], so handler
//! bodies can use `?` on header lookups, query lookups and sender calls alike.

use thiserror::Error;

use crate::http::sender::{SenderOp, SenderState};

/// A required or malformed server configuration value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    /// A required field was never set on the builder.
    #[error("the {0} field must be set")]
    MissingField(&'static str),

    /// Two handlers were registered for the same resource path.
    #[error("a handler is already registered for path {0}")]
    DuplicatePath(String),

    /// The resource path is empty or does not start with `/`.
    #[error("invalid resource path {0:?}: must start with '/'")]
    InvalidPath(String),

    /// A worker pool was requested with no workers.
    #[error("worker pool must have at least one worker")]
    EmptyWorkerPool,
}

/// A [`ResponseSender`](crate::http::ResponseSender) method was called in a
/// state that does not allow it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("cannot {op} while the response is {state}: {reason}")]
pub struct ProtocolStateError {
    pub op: SenderOp,
    pub state: SenderState,
    pub reason: &'static str,
}

/// `get_only` found more or fewer than one value for a header.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("expected 1 value for header {name} but found {count}")]
pub struct ValueCountError {
    pub name: String,
    pub count: usize,
}

/// The request does not carry what the handler asked for.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RequestError {
    /// A query parameter was looked up but is not present.
    #[error("key {key} is not in query parameters {query:?}")]
    MissingQueryParam { key: String, query: String },

    /// A query parameter is present but could not be converted.
    #[error("query parameter {key}={value:?} is invalid: {reason}")]
    InvalidQueryParam {
        key: String,
        value: String,
        reason: String,
    },
}

/// Writing to or reading from the client failed.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The client went away before the write could be delivered.
    #[error("connection closed by peer")]
    Closed,

    /// The request body could not be read.
    #[error("failed to read request body: {0}")]
    Body(String),

    /// The status code cannot be written on a status line.
    #[error("invalid status code {0}")]
    InvalidStatus(u16),

    /// A header could not be represented on the wire.
    #[error("invalid header {name}: {reason}")]
    InvalidHeader { name: String, reason: String },
}

/// `start` or `stop` was called in the wrong lifecycle state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("cannot {action} a server that is {state}")]
pub struct LifecycleError {
    pub action: &'static str,
    pub state: crate::lifecycle::LifecycleState,
}

/// Main error type for all simple-http operations.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    #[error(transparent)]
    ProtocolState(#[from] ProtocolStateError),

    #[error(transparent)]
    ValueCount(#[from] ValueCountError),

    #[error(transparent)]
    Request(#[from] RequestError),

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Lifecycle(#[from] LifecycleError),

    #[error(transparent)]
    Listener(#[from] crate::net::listener::ListenerError),

    /// The handler ran past the configured request timeout.
    #[error("handler did not finish within {0:?}")]
    DeadlineExceeded(std::time::Duration),

    /// The handler panicked; carries the panic message.
    #[error("handler panicked: {0}")]
    HandlerPanicked(String),

    /// I/O error while binding or accepting.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias using [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

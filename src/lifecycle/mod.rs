//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! NotStarted ──start()──▶ Running ──stop()──▶ Stopped
//!
//! Shutdown (shutdown.rs):
//!     stop() → signal every subscriber → stop accepting
//!            → cancel in-flight senders → drain connections
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → stop()
//! ```
//!
//! # Design Decisions
//! - Each transition happens at most once; a stopped server is not restarted
//! - Shutdown has a timeout: connections still open after it are abandoned

pub mod shutdown;
pub mod signals;

use std::fmt;

pub use shutdown::Shutdown;

/// Where a server is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    NotStarted,
    Running,
    Stopped,
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            LifecycleState::NotStarted => "not started",
            LifecycleState::Running => "running",
            LifecycleState::Stopped => "stopped",
        })
    }
}

//! Network layer subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming TCP connection
//!     → listener.rs (resolve, bind with backlog, worker-pool permits)
//!     → connection.rs (lifecycle tracking, connection ids)
//!     → Hand off to HTTP layer
//! ```
//!
//! # Design Decisions
//! - Backlog is applied with listen(2), not emulated in user space
//! - A worker pool is a semaphore acquired before accept
//! - Each connection tracked for graceful shutdown

pub mod connection;
pub mod listener;

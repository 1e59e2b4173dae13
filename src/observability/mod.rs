//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! server, dispatch, handlers
//!     → tracing events and spans (request_id per dispatch)
//!     → logging.rs subscriber (pretty or JSON on stdout)
//! ```

pub mod logging;

pub use logging::init_logging;

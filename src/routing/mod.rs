//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Configuration time:
//!     register(path, handler)
//!     → router.rs (validate path, reject duplicates)
//!     → RouteTable (frozen inside ServerConfig)
//!
//! Every request:
//!     RouteTable::resolve(path) (longest registered prefix)
//!     → dispatch by method
//! ```
//!
//! # Design Decisions
//! - Routes are validated when the configuration is built, never at request time
//! - A request resolves to the longest registered path prefix, on segment
//!   boundaries; anything else gets an empty 404
//! - Immutable after construction (shared without locks)

pub mod router;

pub use router::RouteTable;

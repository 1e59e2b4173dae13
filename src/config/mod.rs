//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! settings file (TOML)                 CLI flags
//!     → loader.rs (parse & deserialize)    │
//!     → validation.rs (semantic checks)    │
//!     → Settings ──────────────────────────┴──▶ ServerConfigBuilder
//!                                                 + register(path, handler)
//!                                                 → ServerConfig (validated, immutable)
//! ```
//!
//! # Design Decisions
//! - Config is immutable once built; no mid-flight reconfiguration
//! - All file fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod server;
pub mod validation;

pub use schema::{LogFormat, LoggingConfig, Settings};
pub use server::{Executor, ServerConfig, ServerConfigBuilder};

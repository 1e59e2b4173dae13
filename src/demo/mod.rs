//! Example handlers served by the `simple-http` binary.
//!
//! - [`FooAction`] at [`FOO_PATH`]: one complete response built from query
//!   parameters
//! - [`FooStreamAction`] at [`FOO_STREAM_PATH`]: a chunked response paced by
//!   a delay

mod foo;
mod foo_stream;

pub use foo::{FooAction, FOO_PATH};
pub use foo_stream::{FooStreamAction, FOO_STREAM_PATH};

use crate::config::ServerConfigBuilder;

/// Register both demo handlers at their paths.
pub fn register_all(builder: ServerConfigBuilder) -> ServerConfigBuilder {
    builder
        .register(FOO_PATH, FooAction)
        .register(FOO_STREAM_PATH, FooStreamAction)
}

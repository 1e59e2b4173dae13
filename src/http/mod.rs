//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (hyper connection, Axum route per registered path)
//!     → dispatch.rs (build Request, create ResponseSender, pick method)
//!     → handler.rs (user logic)
//!     → sender.rs (single response or chunk stream, state machine)
//!     → Send to client
//! ```

pub(crate) mod dispatch;
pub mod handler;
pub mod headers;
pub mod request;
pub mod response;
pub mod sender;
pub mod server;
pub mod status;

pub use handler::{Handler, HandlerFuture, HandlerResult};
pub use headers::{names as header_names, HeaderSet, HeaderSetBuilder};
pub use request::{Request, RequestBuilder};
pub use response::{Charset, Response, ResponseBuilder};
pub use sender::{PendingResponse, ResponseSender, SenderOp, SenderState};
pub use server::Server;
pub use status::{Method, Status};

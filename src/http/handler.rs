//! Handlers: per-method request logic for one resource path.
//!
//! A handler overrides the methods it supports. Every method it leaves alone
//! answers with an empty `404 Not Found`.
//!
//! # Example
//!
//! ```ignore
//! struct Hello;
//!
//! impl Handler for Hello {
//!     fn get<'a>(&'a self, request: Request, sender: &'a mut ResponseSender) -> HandlerFuture<'a> {
//!         Box::pin(async move {
//!             let name = request.query_param("name")?;
//!             let response = Response::builder().status(Status::Ok).text(format!("hi {name}")).build();
//!             sender.send(response).await
//!         })
//!     }
//! }
//! ```

use futures_util::future::BoxFuture;

use crate::error::Error;
use crate::http::request::Request;
use crate::http::response::Response;
use crate::http::sender::ResponseSender;
use crate::http::status::{Method, Status};

/// Result type for handler operations.
pub type HandlerResult = Result<(), Error>;

/// Boxed future returned by handler operations.
pub type HandlerFuture<'a> = BoxFuture<'a, HandlerResult>;

/// Request logic for one resource path.
///
/// Each operation must finish the response through `sender`: either one
/// [`ResponseSender::send`], or chunks closed by
/// [`ResponseSender::end_chunk_encoding`]. Returning an error instead lets the
/// server answer with `500 Internal Server Error`.
pub trait Handler: Send + Sync + 'static {
    /// Handles GET requests.
    fn get<'a>(&'a self, request: Request, sender: &'a mut ResponseSender) -> HandlerFuture<'a> {
        let _ = request;
        Box::pin(not_found(sender))
    }

    /// Handles POST requests.
    fn post<'a>(&'a self, request: Request, sender: &'a mut ResponseSender) -> HandlerFuture<'a> {
        let _ = request;
        Box::pin(not_found(sender))
    }

    /// Handles PUT requests.
    fn put<'a>(&'a self, request: Request, sender: &'a mut ResponseSender) -> HandlerFuture<'a> {
        let _ = request;
        Box::pin(not_found(sender))
    }

    /// Handles PATCH requests.
    fn patch<'a>(&'a self, request: Request, sender: &'a mut ResponseSender) -> HandlerFuture<'a> {
        let _ = request;
        Box::pin(not_found(sender))
    }

    /// Handles DELETE requests.
    fn delete<'a>(&'a self, request: Request, sender: &'a mut ResponseSender) -> HandlerFuture<'a> {
        let _ = request;
        Box::pin(not_found(sender))
    }
}

/// Invoke the operation of `handler` that matches `method`.
///
/// Methods outside the supported set get the same answer as an operation the
/// handler does not implement.
pub fn call<'a>(
    handler: &'a dyn Handler,
    method: Option<Method>,
    request: Request,
    sender: &'a mut ResponseSender,
) -> HandlerFuture<'a> {
    match method {
        Some(Method::Get) => handler.get(request, sender),
        Some(Method::Post) => handler.post(request, sender),
        Some(Method::Put) => handler.put(request, sender),
        Some(Method::Patch) => handler.patch(request, sender),
        Some(Method::Delete) => handler.delete(request, sender),
        None => Box::pin(not_found(sender)),
    }
}

/// Answer with an empty `404 Not Found`.
pub async fn not_found(sender: &mut ResponseSender) -> HandlerResult {
    let response = Response::builder().status(Status::NotFound).build();
    sender.send(response).await
}

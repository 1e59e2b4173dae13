//! Per-request dispatch from the transport to a handler.
//!
//! # Data Flow
//! ```text
//! transport request
//!     → Request::from_http (read body, convert headers)
//!     → ResponseSender::channel (fresh sender per request)
//!     → handler task: handler::call(method) → finalize
//!     → PendingResponse resolves with status + headers
//!     → transport writes the head, then streams the body
//! ```
//!
//! # Design Decisions
//! - The handler runs in its own task so chunks stream while it works
//! - Failures before anything was written become an empty 500
//! - Failures after chunking started abort the body instead
//! - Panics are caught and handled like errors

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response as HttpResponse};
use futures_util::FutureExt;
use tokio::sync::watch;
use tracing::Instrument;
use uuid::Uuid;

use crate::error::Error;
use crate::http::handler::{self, Handler, HandlerResult};
use crate::http::request::Request;
use crate::http::response::Response;
use crate::http::sender::{ResponseSender, SenderState};
use crate::http::status::{Method, Status};

/// Everything dispatch needs for one registered path.
#[derive(Clone)]
pub(crate) struct Route {
    pub(crate) handler: Arc<dyn Handler>,
    pub(crate) shutdown: watch::Receiver<bool>,
    pub(crate) request_timeout: Option<Duration>,
}

/// Serve one transport request with the route's handler.
pub(crate) async fn dispatch(route: Route, request: axum::http::Request<Body>) -> HttpResponse {
    let span = tracing::info_span!(
        "dispatch",
        request_id = %Uuid::new_v4(),
        method = %request.method(),
        path = %request.uri().path(),
    );

    async move {
        let method = Method::from_http(request.method());
        if method.is_none() {
            tracing::debug!("Unsupported method, answering not found");
        }

        let request = match Request::from_http(request).await {
            Ok(request) => request,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read request");
                return StatusCode::BAD_REQUEST.into_response();
            }
        };

        let (sender, pending) = ResponseSender::channel(route.shutdown.clone());
        let task = tokio::spawn(
            run_handler(route, method, request, sender).instrument(tracing::Span::current()),
        );

        match pending.recv().await {
            Some(response) => response,
            None => {
                if let Err(e) = task.await {
                    tracing::error!(error = %e, "Handler task failed before responding");
                }
                StatusCode::INTERNAL_SERVER_ERROR.into_response()
            }
        }
    }
    .instrument(span)
    .await
}

async fn run_handler(
    route: Route,
    method: Option<Method>,
    request: Request,
    mut sender: ResponseSender,
) {
    let invocation = AssertUnwindSafe(handler::call(
        route.handler.as_ref(),
        method,
        request,
        &mut sender,
    ))
    .catch_unwind()
    .map(|outcome| {
        outcome.unwrap_or_else(|panic| Err(Error::HandlerPanicked(panic_message(&*panic))))
    });
    let result = match route.request_timeout {
        Some(limit) => tokio::time::timeout(limit, invocation)
            .await
            .unwrap_or(Err(Error::DeadlineExceeded(limit))),
        None => invocation.await,
    };
    finalize(&mut sender, result).await;
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

/// Make sure the client gets a complete answer, or a visibly broken one.
async fn finalize(sender: &mut ResponseSender, result: HandlerResult) {
    match (sender.state(), result) {
        (SenderState::Sent, Ok(())) => {}
        (SenderState::Sent, Err(e)) => {
            tracing::warn!(error = %e, "Handler failed after its response was complete");
        }
        (SenderState::Ready, result) => {
            match result {
                Ok(()) => tracing::warn!("Handler returned without responding"),
                Err(e) => tracing::error!(error = %e, "Handler failed"),
            }
            let response = Response::builder()
                .status(Status::InternalServerError)
                .build();
            if let Err(e) = sender.send(response).await {
                tracing::debug!(error = %e, "Could not deliver error response");
            }
        }
        (SenderState::Chunking, result) => {
            match result {
                Ok(()) => tracing::warn!("Handler returned without ending chunked encoding"),
                Err(e) => tracing::error!(error = %e, "Handler failed while streaming"),
            }
            sender.abort().await;
        }
    }
}

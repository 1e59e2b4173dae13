//! Response sender: the protocol state machine between a handler and the
//! transport.
//!
//! A handler either calls [`ResponseSender::send`] once, or streams with
//! [`ResponseSender::send_next_chunk`] any number of times followed by
//! [`ResponseSender::end_chunk_encoding`]. The transfer mode is decided by the
//! first call, so a handler never declares upfront whether it will stream.
//!
//! ```text
//!            send
//!   Ready ──────────────────────────▶ Sent
//!     │                                 ▲
//!     │ send_next_chunk                 │ end_chunk_encoding
//!     ▼                                 │
//!   Chunking ───────────────────────────┘
//!     ⟲ send_next_chunk
//! ```
//!
//! # Example
//!
//! ```ignore
//! for i in 0..3 {
//!     let chunk = Response::builder().status(Status::Ok).text(format!("{i}\n")).build();
//!     sender.send_next_chunk(chunk).await?;
//! }
//! sender.end_chunk_encoding().await?;
//! ```

use std::fmt;

use axum::body::{Body, Bytes};
use axum::http::header::{HeaderName, HeaderValue, CONTENT_LENGTH, TRANSFER_ENCODING};
use axum::http::StatusCode;
use futures_util::stream;
use thiserror::Error;
use tokio::sync::{mpsc, oneshot, watch};

use crate::error::{Error, ProtocolStateError, TransportError};
use crate::http::response::Response;

/// Chunks buffered between the handler and the connection before
/// `send_next_chunk` waits for the client.
const CHUNK_BUFFER: usize = 8;

type HttpResponse = axum::http::Response<Body>;

/// Where a sender is in its protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SenderState {
    /// Nothing written yet.
    Ready,
    /// Headers and at least one chunk written.
    Chunking,
    /// The response is complete.
    Sent,
}

/// Operations a handler performs on a sender.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SenderOp {
    Send,
    SendNextChunk,
    EndChunkEncoding,
}

impl SenderState {
    /// The state after applying `op`, or why `op` is not allowed now.
    pub fn transition(self, op: SenderOp) -> Result<SenderState, ProtocolStateError> {
        use SenderOp::*;
        use SenderState::*;

        let illegal = |reason| ProtocolStateError {
            op,
            state: self,
            reason,
        };

        match (self, op) {
            (Ready, Send) => Ok(Sent),
            (_, Send) => Err(illegal("only one non-chunked response per request")),
            (Ready | Chunking, SendNextChunk) => Ok(Chunking),
            (Sent, SendNextChunk) => Err(illegal("the response is already complete")),
            (Chunking, EndChunkEncoding) => Ok(Sent),
            (_, EndChunkEncoding) => Err(illegal(
                "chunks must be sent before ending chunked encoding",
            )),
        }
    }
}

impl fmt::Display for SenderState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SenderState::Ready => "ready",
            SenderState::Chunking => "chunking",
            SenderState::Sent => "sent",
        })
    }
}

impl fmt::Display for SenderOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SenderOp::Send => "send",
            SenderOp::SendNextChunk => "send next chunk",
            SenderOp::EndChunkEncoding => "end chunk encoding",
        })
    }
}

/// Body stream error that makes the transport cut a chunked response short.
#[derive(Debug, Error)]
#[error("chunked response aborted")]
struct StreamAborted;

/// The transport side of a [`ResponseSender`]: resolves once the status line
/// and headers are ready to be written.
#[derive(Debug)]
pub struct PendingResponse(oneshot::Receiver<HttpResponse>);

impl PendingResponse {
    /// Wait for the response head. `None` if the sender was dropped without
    /// writing anything.
    pub async fn recv(self) -> Option<HttpResponse> {
        self.0.await.ok()
    }
}

/// Sends the response for one request.
///
/// Owned by exactly one dispatch; never shared between requests.
#[derive(Debug)]
pub struct ResponseSender {
    state: SenderState,
    head: Option<oneshot::Sender<HttpResponse>>,
    body: Option<mpsc::Sender<Result<Bytes, StreamAborted>>>,
    shutdown: watch::Receiver<bool>,
}

impl ResponseSender {
    /// Create a sender that observes `shutdown` for cancellation.
    pub fn channel(shutdown: watch::Receiver<bool>) -> (Self, PendingResponse) {
        let (head_tx, head_rx) = oneshot::channel();
        let sender = Self {
            state: SenderState::Ready,
            head: Some(head_tx),
            body: None,
            shutdown,
        };
        (sender, PendingResponse(head_rx))
    }

    /// Create a sender that is only cancelled by its [`PendingResponse`]
    /// being dropped. Useful for exercising handlers without a server.
    pub fn detached() -> (Self, PendingResponse) {
        let (_, shutdown) = watch::channel(false);
        Self::channel(shutdown)
    }

    pub fn state(&self) -> SenderState {
        self.state
    }

    /// Send a complete response with an explicit content length.
    pub async fn send(&mut self, response: Response) -> Result<(), Error> {
        let next = self.state.transition(SenderOp::Send)?;

        let length = response.body().len();
        let mut http = to_http(&response, Body::from(response.body().clone()))?;
        http.headers_mut().remove(TRANSFER_ENCODING);
        http.headers_mut().insert(CONTENT_LENGTH, HeaderValue::from(length));
        self.deliver_head(http)?;

        tracing::debug!(status = response.status(), length, "Response sent");
        self.state = next;
        Ok(())
    }

    /// Send the next chunk of a streamed response.
    ///
    /// The status and headers of `response` are only written on the first
    /// chunk; later chunks contribute their body alone.
    pub async fn send_next_chunk(&mut self, response: Response) -> Result<(), Error> {
        let next = self.state.transition(SenderOp::SendNextChunk)?;

        if self.state == SenderState::Ready {
            let (body_tx, body_rx) = mpsc::channel(CHUNK_BUFFER);
            let chunks = stream::unfold(body_rx, |mut rx| async move {
                rx.recv().await.map(|chunk| (chunk, rx))
            });
            let mut http = to_http(&response, Body::from_stream(chunks))?;
            // Framing headers from the handler would turn off chunked encoding.
            http.headers_mut().remove(CONTENT_LENGTH);
            http.headers_mut().remove(TRANSFER_ENCODING);
            self.deliver_head(http)?;
            self.body = Some(body_tx);
            self.state = SenderState::Chunking;
            tracing::debug!(status = response.status(), "Chunked response started");
        }

        let chunk = response.body().clone();
        if !chunk.is_empty() {
            let length = chunk.len();
            let body = self.body.as_ref().ok_or(TransportError::Closed)?;
            body.send(Ok(chunk))
                .await
                .map_err(|_| TransportError::Closed)?;
            tracing::trace!(length, "Chunk sent");
        }

        self.state = next;
        Ok(())
    }

    /// Finish a streamed response.
    pub async fn end_chunk_encoding(&mut self) -> Result<(), Error> {
        let next = self.state.transition(SenderOp::EndChunkEncoding)?;
        // Dropping the channel ends the body stream and writes the last chunk.
        self.body = None;
        self.state = next;
        tracing::debug!("Chunked response ended");
        Ok(())
    }

    /// True once the server is shutting down or the client went away.
    pub fn is_cancelled(&self) -> bool {
        *self.shutdown.borrow()
            || self.head.as_ref().is_some_and(oneshot::Sender::is_closed)
            || self.body.as_ref().is_some_and(mpsc::Sender::is_closed)
    }

    /// Resolves when the server starts shutting down or the client goes away.
    pub async fn cancelled(&mut self) {
        let Self {
            shutdown,
            head,
            body,
            ..
        } = self;

        let shutdown_requested = async move {
            let requested = shutdown.wait_for(|stop| *stop).await.is_ok();
            if !requested {
                // Nobody can request shutdown any more.
                std::future::pending::<()>().await;
            }
        };
        let client_gone = async move {
            match (head.as_mut(), body.as_ref()) {
                (_, Some(body)) => body.closed().await,
                (Some(head), None) => head.closed().await,
                (None, None) => std::future::pending::<()>().await,
            }
        };

        tokio::select! {
            _ = shutdown_requested => {}
            _ = client_gone => {}
        }
    }

    /// Cut a streamed response short so the client sees an incomplete
    /// transfer rather than a well-formed one.
    pub(crate) async fn abort(&mut self) {
        if let Some(body) = self.body.take() {
            let _ = body.send(Err(StreamAborted)).await;
        }
        self.state = SenderState::Sent;
    }

    fn deliver_head(&mut self, http: HttpResponse) -> Result<(), TransportError> {
        let head = self.head.take().ok_or(TransportError::Closed)?;
        head.send(http).map_err(|_| TransportError::Closed)
    }
}

impl Drop for ResponseSender {
    /// Fails an unfinished chunked body so the client sees a truncated
    /// transfer.
    fn drop(&mut self) {
        if self.state != SenderState::Chunking {
            return;
        }
        if let Some(body) = self.body.take() {
            if body.try_send(Err(StreamAborted)).is_err() {
                tracing::debug!("Could not abort chunked response on drop");
            }
        }
    }
}

/// Status line and headers of `response` in front of `body`.
fn to_http(response: &Response, body: Body) -> Result<HttpResponse, TransportError> {
    let status = StatusCode::from_u16(response.status())
        .map_err(|_| TransportError::InvalidStatus(response.status()))?;

    let mut http = axum::http::Response::new(body);
    *http.status_mut() = status;
    for (name, values) in response.headers().iter() {
        let invalid = |reason: String| TransportError::InvalidHeader {
            name: name.to_string(),
            reason,
        };
        let header_name =
            HeaderName::from_bytes(name.as_bytes()).map_err(|e| invalid(e.to_string()))?;
        for value in values {
            let header_value = HeaderValue::from_str(value).map_err(|e| invalid(e.to_string()))?;
            http.headers_mut().append(header_name.clone(), header_value);
        }
    }
    Ok(http)
}

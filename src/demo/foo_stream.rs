use std::time::Duration;

use crate::http::header_names::{ACCESS_CONTROL_ALLOW_ORIGIN, CONTENT_TYPE};
use crate::http::{Handler, HandlerFuture, HeaderSet, Request, Response, ResponseSender, Status};

pub const FOO_STREAM_PATH: &str = "/action/foostream";

/// Streams `times` lines of `foo {i}`, sleeping `delay` milliseconds after
/// each one.
#[derive(Debug, Default, Clone, Copy)]
pub struct FooStreamAction;

impl Handler for FooStreamAction {
    fn get<'a>(&'a self, request: Request, sender: &'a mut ResponseSender) -> HandlerFuture<'a> {
        Box::pin(async move {
            let times: u32 = request.query_param_as("times")?;
            let delay = Duration::from_millis(request.query_param_as("delay")?);
            let headers = HeaderSet::builder()
                .add(ACCESS_CONTROL_ALLOW_ORIGIN, "*")
                .add(CONTENT_TYPE, "text/plain")
                .build();

            for i in 0..times {
                if sender.is_cancelled() {
                    tracing::debug!(sent = i, times, "Stream cancelled");
                    break;
                }
                let chunk = Response::builder()
                    .headers(headers.clone())
                    .text(format!("foo {i}\n"))
                    .status(Status::Ok)
                    .build();
                sender.send_next_chunk(chunk).await?;
                tokio::time::sleep(delay).await;
            }
            sender.end_chunk_encoding().await
        })
    }
}

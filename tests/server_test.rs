//! End-to-end tests over real sockets.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use simple_http::http::header_names::CONTENT_TYPE;
use simple_http::{Handler, HandlerFuture, Request, Response, ResponseSender, Status};

mod common;

#[tokio::test]
async fn foo_describes_the_query() {
    let (server, addr) = common::start_demo(3).await;

    let res = common::client()
        .get(format!("http://{addr}/action/foo?name=Rex&age=3&gender=male"))
        .send()
        .await
        .expect("server unreachable");

    assert_eq!(res.status(), 200);
    assert_eq!(res.content_length(), Some(47));
    assert_eq!(
        res.text().await.unwrap(),
        "We have a male foo named Rex who is 3 years old"
    );
    server.stop().await.unwrap();
}

#[tokio::test]
async fn foostream_delivers_every_chunk() {
    let (server, addr) = common::start_demo(3).await;

    let res = common::client()
        .get(format!("http://{addr}/action/foostream?times=3&delay=0"))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), 200);
    assert_eq!(res.headers()["access-control-allow-origin"], "*");
    assert_eq!(res.headers()["content-type"], "text/plain");
    assert_eq!(res.headers()["transfer-encoding"], "chunked");
    assert_eq!(res.text().await.unwrap(), "foo 0\nfoo 1\nfoo 2\n");
    server.stop().await.unwrap();
}

#[tokio::test]
async fn unregistered_path_is_not_found() {
    let (server, addr) = common::start_demo(1).await;

    let res = common::client()
        .get(format!("http://{addr}/action/bar"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 404);
    server.stop().await.unwrap();
}

#[tokio::test]
async fn subpaths_reach_the_handler_registered_above_them() {
    let (server, addr) = common::start_demo(1).await;
    let client = common::client();

    let nested = client
        .get(format!("http://{addr}/action/foo/x?name=Rex&age=3&gender=male"))
        .send()
        .await
        .unwrap();
    assert_eq!(nested.status(), 200);
    assert_eq!(
        nested.text().await.unwrap(),
        "We have a male foo named Rex who is 3 years old"
    );

    let sibling = client
        .get(format!("http://{addr}/action/bar"))
        .send()
        .await
        .unwrap();
    assert_eq!(sibling.status(), 404);
    server.stop().await.unwrap();
}

#[tokio::test]
async fn unimplemented_method_is_not_found() {
    let (server, addr) = common::start_demo(1).await;
    let client = common::client();

    let post = client
        .post(format!("http://{addr}/action/foo?name=Rex&age=3&gender=male"))
        .body("ignored")
        .send()
        .await
        .unwrap();
    assert_eq!(post.status(), 404);
    assert_eq!(post.text().await.unwrap(), "");

    let delete = client
        .delete(format!("http://{addr}/action/foostream"))
        .send()
        .await
        .unwrap();
    assert_eq!(delete.status(), 404);
    server.stop().await.unwrap();
}

#[tokio::test]
async fn handler_error_is_an_empty_500() {
    let (server, addr) = common::start_demo(1).await;

    let res = common::client()
        .get(format!("http://{addr}/action/foo?name=Rex"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 500);
    assert_eq!(res.text().await.unwrap(), "");
    server.stop().await.unwrap();
}

/// Echoes the request back: method, a header, a query parameter and the body.
struct Echo;

impl Handler for Echo {
    fn put<'a>(&'a self, request: Request, sender: &'a mut ResponseSender) -> HandlerFuture<'a> {
        Box::pin(async move {
            let content_type = request.headers().get_only("content-type")?;
            let tag = request.query_param("tag")?;
            let response = Response::builder()
                .headers(
                    simple_http::HeaderSet::builder()
                        .add(CONTENT_TYPE, content_type)
                        .add("X-Tag", tag)
                        .build(),
                )
                .body(request.body().to_vec())
                .status(Status::Created)
                .build();
            sender.send(response).await
        })
    }
}

#[tokio::test]
async fn request_parts_reach_the_handler() {
    let (server, addr) = common::start(common::local_builder().register("/echo", Echo)).await;

    let res = common::client()
        .put(format!("http://{addr}/echo?tag=a+b%21"))
        .header("content-type", "application/octet-stream")
        .body(vec![0u8, 1, 2, 3])
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), 201);
    assert_eq!(res.headers()["x-tag"], "a b!");
    assert_eq!(res.headers()["content-type"], "application/octet-stream");
    assert_eq!(res.bytes().await.unwrap().as_ref(), &[0u8, 1, 2, 3]);
    server.stop().await.unwrap();
}

/// Sleeps, then answers with how many requests were in flight at the peak.
struct Slow {
    delay: Duration,
    in_flight: AtomicUsize,
    peak: AtomicUsize,
}

impl Slow {
    fn new(delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            delay,
            in_flight: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
        })
    }
}

impl Handler for Slow {
    fn get<'a>(&'a self, _request: Request, sender: &'a mut ResponseSender) -> HandlerFuture<'a> {
        Box::pin(async move {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(self.delay).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            sender
                .send(Response::builder().status(Status::Ok).text("done").build())
                .await
        })
    }
}

async fn fire(addr: std::net::SocketAddr, count: usize) {
    let client = common::client();
    let requests = (0..count).map(|_| {
        let client = client.clone();
        async move {
            let res = client.get(format!("http://{addr}/slow")).send().await.unwrap();
            assert_eq!(res.status(), 200);
        }
    });
    futures_util::future::join_all(requests).await;
}

#[tokio::test]
async fn worker_pool_serves_connections_concurrently() {
    let slow = Slow::new(Duration::from_millis(300));
    let handler: Arc<dyn Handler> = slow.clone();
    let builder = common::local_builder()
        .worker_pool(3)
        .register_shared("/slow", handler);
    let (server, addr) = common::start(builder).await;

    let started = Instant::now();
    fire(addr, 3).await;

    assert_eq!(slow.peak.load(Ordering::SeqCst), 3);
    assert!(started.elapsed() < Duration::from_millis(900));
    server.stop().await.unwrap();
}

#[tokio::test]
async fn inline_executor_serves_one_connection_at_a_time() {
    let slow = Slow::new(Duration::from_millis(200));
    let handler: Arc<dyn Handler> = slow.clone();
    let builder = common::local_builder().register_shared("/slow", handler);
    let (server, addr) = common::start(builder).await;

    let started = Instant::now();
    fire(addr, 2).await;

    assert_eq!(slow.peak.load(Ordering::SeqCst), 1);
    assert!(started.elapsed() >= Duration::from_millis(400));
    server.stop().await.unwrap();
}

//! Byte-level checks of what the server writes on the connection.

use std::time::Duration;

use simple_http::LifecycleState;

mod common;

#[tokio::test]
async fn complete_response_has_length_and_closes() {
    let (server, addr) = common::start_demo(1).await;

    let raw = common::raw_exchange(addr, "GET", "/action/foo?name=Rex&age=3&gender=male").await;
    let (head, body) = common::split_response(&raw);

    assert_eq!(head[0], "http/1.1 200 ok");
    assert!(head.contains(&"content-length: 47".to_string()));
    assert!(head.contains(&"connection: close".to_string()));
    assert_eq!(body, "We have a male foo named Rex who is 3 years old");
    server.stop().await.unwrap();
}

#[tokio::test]
async fn chunked_response_writes_headers_once_and_chunks_in_order() {
    let (server, addr) = common::start_demo(1).await;

    let raw = common::raw_exchange(addr, "GET", "/action/foostream?times=3&delay=10").await;
    let (head, body) = common::split_response(&raw);

    assert_eq!(head[0], "http/1.1 200 ok");
    let count = |line: &str| head.iter().filter(|l| *l == line).count();
    assert_eq!(count("transfer-encoding: chunked"), 1);
    assert_eq!(count("access-control-allow-origin: *"), 1);
    assert_eq!(count("content-type: text/plain"), 1);
    assert!(!head.iter().any(|l| l.starts_with("content-length")));

    assert_eq!(
        body,
        "6\r\nfoo 0\n\r\n6\r\nfoo 1\n\r\n6\r\nfoo 2\n\r\n0\r\n\r\n"
    );
    server.stop().await.unwrap();
}

#[tokio::test]
async fn stop_cuts_long_streams_short() {
    let (server, addr) = common::start_demo(2).await;

    let stream = tokio::spawn(async move {
        common::raw_exchange(addr, "GET", "/action/foostream?times=1000&delay=20").await
    });
    tokio::time::sleep(Duration::from_millis(200)).await;
    assert_eq!(server.active_connections(), 1);

    tokio::time::timeout(Duration::from_secs(5), server.stop())
        .await
        .expect("stop did not finish")
        .unwrap();
    assert_eq!(server.state().await, LifecycleState::Stopped);
    assert_eq!(server.active_connections(), 0);

    let raw = stream.await.unwrap();
    let (_, body) = common::split_response(&raw);
    assert!(body.starts_with("6\r\nfoo 0\n\r\n"));
    assert!(!body.contains("foo 999"));
}

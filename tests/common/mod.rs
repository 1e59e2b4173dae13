//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

use simple_http::{demo, Server, ServerConfig, ServerConfigBuilder};

/// Builder bound to an ephemeral loopback port.
pub fn local_builder() -> ServerConfigBuilder {
    ServerConfig::builder()
        .hostname("127.0.0.1")
        .port(0)
        .backlog(0)
        .shutdown_timeout(Duration::from_secs(5))
}

/// Start a server from `builder` and return it with its address.
pub async fn start(builder: ServerConfigBuilder) -> (Server, SocketAddr) {
    let server = Server::new(builder.build().unwrap());
    let addr = server.start().await.unwrap();
    (server, addr)
}

/// Start a server with the demo handlers on a worker pool.
pub async fn start_demo(workers: usize) -> (Server, SocketAddr) {
    start(demo::register_all(local_builder()).worker_pool(workers)).await
}

pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .timeout(Duration::from_secs(10))
        .build()
        .unwrap()
}

/// Send a raw request line and read everything until the server closes.
pub async fn raw_exchange(addr: SocketAddr, method: &str, target: &str) -> String {
    let mut stream = TcpStream::connect(addr).await.unwrap();
    let request = format!("{method} {target} HTTP/1.1\r\nHost: {addr}\r\n\r\n");
    stream.write_all(request.as_bytes()).await.unwrap();

    let mut raw = Vec::new();
    tokio::time::timeout(Duration::from_secs(10), stream.read_to_end(&mut raw))
        .await
        .expect("server did not close the connection")
        .unwrap();
    String::from_utf8(raw).unwrap()
}

/// Split a raw response into lowercased head lines and the body.
pub fn split_response(raw: &str) -> (Vec<String>, String) {
    let (head, body) = raw.split_once("\r\n\r\n").expect("incomplete response");
    let lines = head.lines().map(str::to_ascii_lowercase).collect();
    (lines, body.to_string())
}

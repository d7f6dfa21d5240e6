//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::io::Write;
use std::net::SocketAddr;
use std::time::Duration;

use flate2::write::GzEncoder;
use flate2::Compression;
use openapi_gateway::config::{BackendConfig, GatewayConfig, RouteConfig};
use openapi_gateway::{HttpServer, Shutdown};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::sync::mpsc;

/// Canned response served by a mock service instance.
#[derive(Clone)]
pub struct MockResponse {
    pub status: u16,
    pub headers: Vec<(&'static str, &'static str)>,
    pub body: Vec<u8>,
}

impl MockResponse {
    pub fn json(body: &str) -> Self {
        Self {
            status: 200,
            headers: vec![("Content-Type", "application/json")],
            body: body.as_bytes().to_vec(),
        }
    }

    pub fn gzip_json(body: &str) -> Self {
        Self {
            status: 200,
            headers: vec![
                ("Content-Type", "application/json"),
                ("Content-Encoding", "gzip"),
            ],
            body: gzip(body.as_bytes()),
        }
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = status;
        self
    }

    pub fn with_header(mut self, name: &'static str, value: &'static str) -> Self {
        self.headers.push((name, value));
        self
    }
}

pub fn gzip(data: &[u8]) -> Vec<u8> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data).unwrap();
    encoder.finish().unwrap()
}

/// Start a mock service instance on an ephemeral port that answers every
/// request with `response`.
pub async fn start_mock_backend(response: MockResponse) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            let response = response.clone();
            tokio::spawn(async move {
                // Requests in these tests carry no body; read up to the header terminator.
                let mut buf = Vec::new();
                let mut chunk = [0u8; 1024];
                while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
                    match socket.read(&mut chunk).await {
                        Ok(0) | Err(_) => return,
                        Ok(n) => buf.extend_from_slice(&chunk[..n]),
                    }
                }

                let mut head = format!("HTTP/1.1 {} Mock\r\n", response.status);
                for (name, value) in &response.headers {
                    head.push_str(&format!("{}: {}\r\n", name, value));
                }
                head.push_str(&format!(
                    "Content-Length: {}\r\nConnection: close\r\n\r\n",
                    response.body.len()
                ));

                let _ = socket.write_all(head.as_bytes()).await;
                let _ = socket.write_all(&response.body).await;
                let _ = socket.shutdown().await;
            });
        }
    });

    addr
}

/// Config with one route `/services/{service}/{instance}` to a single backend.
pub fn gateway_config(service: &str, instance: &str, backend: SocketAddr) -> GatewayConfig {
    let mut config = GatewayConfig::default();
    config.backends.push(BackendConfig {
        name: format!("{}-backend", instance),
        group: instance.to_string(),
        address: backend.to_string(),
        max_connections: 10,
    });
    config.routes.push(RouteConfig {
        name: format!("{}-route", service),
        host: None,
        path_prefix: Some(format!("/services/{}/{}", service, instance)),
        backend_group: instance.to_string(),
        priority: 0,
        strip_prefix: true,
    });
    config
}

/// Start the gateway on an ephemeral port. Returns its address and the
/// shutdown handle.
pub async fn start_gateway(config: GatewayConfig) -> (SocketAddr, Shutdown) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    let (_, config_updates) = mpsc::unbounded_channel();
    let server = HttpServer::new(config);

    tokio::spawn(async move {
        let _ = server.run(listener, config_updates, server_shutdown).await;
    });

    tokio::time::sleep(Duration::from_millis(100)).await;
    (addr, shutdown)
}

pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}

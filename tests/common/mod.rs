//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::future::Future;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use ixgen::config::ServerConfig;
use ixgen::http::HttpServer;
use ixgen::lifecycle::Shutdown;
use ixgen::registry::Registry;
use serde_json::{json, Value};
use tempfile::TempDir;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpListener;

pub const DECIX: &str = "DE-CIX Frankfurt/Main";

/// A running server on an ephemeral port, stopped on drop.
pub struct TestServer {
    pub addr: SocketAddr,
    pub client: reqwest::Client,
    pub registry: Registry,
    shutdown: Shutdown,
    _cache: TempDir,
}

impl TestServer {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    pub async fn get_json(&self, path: &str) -> Value {
        let res = self.client.get(self.url(path)).send().await.unwrap();
        assert_eq!(res.status(), 200, "GET {}", path);
        res.json().await.unwrap()
    }

    pub async fn submit(&self, path: &str, body: &Value) -> reqwest::Response {
        self.client
            .post(self.url(path))
            .json(body)
            .send()
            .await
            .unwrap()
    }

    /// Post `body` exactly as written.
    pub async fn submit_raw(&self, path: &str, body: &str) -> reqwest::Response {
        self.client
            .post(self.url(path))
            .header("content-type", "application/json")
            .body(body.to_string())
            .send()
            .await
            .unwrap()
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

pub fn templates_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("templates")
}

/// Registry snapshots for two exchanges and three networks.
pub fn write_fixtures(dir: &Path) {
    let ix = json!({"data": [
        {"id": 31, "name": DECIX, "city": "Frankfurt", "country": "DE"},
        {"id": 26, "name": "AMS-IX", "city": "Amsterdam", "country": "NL"}
    ]});
    let ixlan = json!({"data": [
        {"id": 31, "ix_id": 31, "name": "", "rs_asn": 6695, "mtu": 1500},
        {"id": 26, "ix_id": 26, "name": "", "rs_asn": 6777, "mtu": 1500}
    ]});
    let netixlan = json!({"data": [
        {"id": 1, "ixlan_id": 31, "asn": 196922, "ipaddr4": "80.81.194.25",
         "ipaddr6": "2001:7f8::3:13a:0:1", "speed": 10000, "is_rs_peer": false},
        {"id": 2, "ixlan_id": 31, "asn": 3356, "ipaddr4": "80.81.192.47",
         "ipaddr6": "2001:7f8::d1c:0:1", "speed": 100000, "is_rs_peer": true},
        {"id": 3, "ixlan_id": 31, "asn": 6695, "ipaddr4": "80.81.192.157",
         "ipaddr6": "2001:7f8::1a27:5051:c09d", "speed": 10000, "is_rs_peer": false},
        {"id": 4, "ixlan_id": 26, "asn": 3356, "ipaddr4": "80.249.209.167",
         "ipaddr6": "2001:7f8:1::a500:3356:1", "speed": 100000, "is_rs_peer": true}
    ]});
    let net = json!({"data": [
        {"id": 1, "asn": 196922, "name": "Hofmeir Media", "irr_as_set": "AS-HOFMEIR",
         "info_prefixes4": 64, "info_prefixes6": 10, "info_type": "Content",
         "website": "https://hofmeir.de"},
        {"id": 2, "asn": 3356, "name": "Lumen", "irr_as_set": "AS3356",
         "info_prefixes4": 400000, "info_prefixes6": 20000, "info_type": "NSP"},
        {"id": 3, "asn": 6695, "name": "DE-CIX Route Servers", "irr_as_set": "AS-DECIX",
         "info_prefixes4": 200000, "info_prefixes6": 50000, "info_type": "Route Server"}
    ]});

    for (name, doc) in [("ix", ix), ("ixlan", ixlan), ("netixlan", netixlan), ("net", net)] {
        std::fs::write(dir.join(name), serde_json::to_vec(&doc).unwrap()).unwrap();
    }
}

/// Start a server against fresh fixtures, after `configure` adjusts the config.
pub async fn start_server(configure: impl FnOnce(&mut ServerConfig)) -> TestServer {
    start_server_with(true, configure, |server| server).await
}

pub async fn start_server_with(
    fixtures: bool,
    configure: impl FnOnce(&mut ServerConfig),
    customize: impl FnOnce(HttpServer) -> HttpServer,
) -> TestServer {
    let cache = tempfile::tempdir().unwrap();
    if fixtures {
        write_fixtures(cache.path());
    }

    let mut config = ServerConfig::default();
    config.listener.bind_address = "127.0.0.1:0".into();
    config.cache.directory = cache.path().to_path_buf();
    config.templates.directory = templates_dir();
    config.merge.deadline_secs = 10;
    configure(&mut config);

    let listener = TcpListener::bind(&config.listener.bind_address).await.unwrap();
    let addr = listener.local_addr().unwrap();

    let server = customize(HttpServer::new(config));
    let registry = server.registry().clone();

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    let client = reqwest::Client::builder()
        .no_proxy()
        .timeout(Duration::from_secs(15))
        .build()
        .unwrap();

    TestServer {
        addr,
        client,
        registry,
        shutdown,
        _cache: cache,
    }
}

/// One DE-CIX exchange requesting sessions with `asns`, in order.
pub fn decix_submission(asns: &[&str]) -> Value {
    let peers: serde_json::Map<String, Value> = asns
        .iter()
        .map(|asn| (asn.to_string(), json!([{"asn": asn}])))
        .collect();
    let mut configured = serde_json::Map::new();
    configured.insert(DECIX.to_string(), Value::Object(peers));
    json!({
        "additionalconfig": null,
        "ixname": DECIX,
        "options": {},
        "peeringgroups": {},
        "peers_configured": configured,
        "peersready": [],
        "routeserverready": null
    })
}

/// Start a programmable mock backend answering every request with `f()`.
pub async fn start_programmable_backend<F, Fut>(f: F) -> SocketAddr
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = (u16, String)> + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let f = std::sync::Arc::new(f);

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            let f = f.clone();
            tokio::spawn(async move {
                let (status, body) = f().await;
                let status_text = match status {
                    200 => "200 OK",
                    404 => "404 Not Found",
                    500 => "500 Internal Server Error",
                    503 => "503 Service Unavailable",
                    _ => "200 OK",
                };

                let response = format!(
                    "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    status_text,
                    body.len(),
                    body
                );
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            });
        }
    });
    addr
}

//! Shared utilities for integration testing.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use planner_services::config::{ClientConfig, ServiceConfig};
use planner_services::ServiceClient;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

/// A running programmable provider stub.
#[allow(dead_code)]
pub struct MockProvider {
    pub addr: SocketAddr,
    hits: Arc<AtomicU32>,
    requests: Arc<Mutex<Vec<String>>>,
}

#[allow(dead_code)]
impl MockProvider {
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Requests received so far.
    pub fn hits(&self) -> u32 {
        self.hits.load(Ordering::SeqCst)
    }

    /// Request lines ("GET /path?query HTTP/1.1") received so far.
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

/// Start a provider stub on an ephemeral port.
///
/// `f` receives the zero-based request index and returns the status and JSON
/// body to answer with. It may sleep to simulate a slow provider.
pub async fn start_programmable_backend<F, Fut>(f: F) -> MockProvider
where
    F: Fn(u32) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = (u16, String)> + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let hits = Arc::new(AtomicU32::new(0));
    let requests = Arc::new(Mutex::new(Vec::new()));
    let f = Arc::new(f);

    let (task_hits, task_requests) = (hits.clone(), requests.clone());
    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    let f = f.clone();
                    let hits = task_hits.clone();
                    let requests = task_requests.clone();
                    tokio::spawn(async move {
                        let head = read_request_head(&mut socket).await;
                        if let Some(line) = head.lines().next() {
                            requests.lock().unwrap().push(line.to_string());
                        }
                        let index = hits.fetch_add(1, Ordering::SeqCst);

                        let (status, body) = f(index).await;
                        let status_text = match status {
                            200 => "200 OK",
                            304 => "304 Not Modified",
                            400 => "400 Bad Request",
                            401 => "401 Unauthorized",
                            404 => "404 Not Found",
                            429 => "429 Too Many Requests",
                            500 => "500 Internal Server Error",
                            502 => "502 Bad Gateway",
                            503 => "503 Service Unavailable",
                            _ => "200 OK",
                        };

                        let response_str = format!(
                            "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                            status_text,
                            body.len(),
                            body
                        );
                        let _ = socket.write_all(response_str.as_bytes()).await;
                        let _ = socket.shutdown().await;
                        tokio::time::sleep(Duration::from_millis(10)).await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    MockProvider { addr, hits, requests }
}

async fn read_request_head(socket: &mut tokio::net::TcpStream) -> String {
    let mut head = Vec::new();
    let mut chunk = [0u8; 1024];
    loop {
        match socket.read(&mut chunk).await {
            Ok(0) | Err(_) => break,
            Ok(n) => {
                head.extend_from_slice(&chunk[..n]);
                if head.windows(4).any(|w| w == b"\r\n\r\n") {
                    break;
                }
            }
        }
    }
    String::from_utf8_lossy(&head).into_owned()
}

/// A fast service policy pointing at `base_url`.
#[allow(dead_code)]
pub fn service(name: &str, base_url: &str, max_retries: u32) -> ServiceConfig {
    ServiceConfig {
        name: name.to_string(),
        base_url: base_url.to_string(),
        timeout_ms: 1_000,
        max_retries,
        retry_delays_ms: vec![5; max_retries as usize],
    }
}

/// Configuration with every provider pointing at `base_url`.
#[allow(dead_code)]
pub fn config_for(base_url: &str, max_retries: u32) -> ClientConfig {
    let mut config = ClientConfig::default();
    config.directions.0 = service("directions", base_url, max_retries);
    config.routing.0 = service("routing", base_url, max_retries);
    config.weather.0 = service("weather", base_url, max_retries);
    config
}

/// HTTP client that never goes through an environment proxy.
#[allow(dead_code)]
pub fn http_client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}

#[allow(dead_code)]
pub fn client(config: ClientConfig) -> ServiceClient {
    ServiceClient::with_http(config, http_client())
}

#[allow(dead_code)]
pub fn directions_ok() -> String {
    serde_json::json!({
        "status": "OK",
        "routes": [{
            "legs": [{
                "distance": { "value": 287_412 },
                "duration": { "value": 10_490 }
            }],
            "overview_polyline": { "points": "_p~iF~ps|U_ulLnnqC_mqNvxq`@" }
        }]
    })
    .to_string()
}

#[allow(dead_code)]
pub fn forecast_ok() -> String {
    serde_json::json!({
        "cod": "200",
        "list": [{
            "main": { "temp": 18.4 },
            "pop": 0.42,
            "wind": { "speed": 5.1 },
            "weather": [{ "main": "Rain", "description": "light rain" }]
        }]
    })
    .to_string()
}

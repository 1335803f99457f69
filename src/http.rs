//! Minimal HTTP/1.1 JSON API over a raw tokio `TcpListener`.
//!
//! Only `GET` (and `OPTIONS` preflight) is served. Metric failures stay
//! in-band: status 200 with an `error` key, which is what the dashboard
//! checks for. Protocol-level problems get a real status code.

use crate::dataset::{Dataset, Dimension};
use crate::engine::{respond, ErrorBody, GrowthBasis, Metric, MetricOptions};
use crate::config::AppConfig;
use chrono::{DateTime, Utc};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tracing::{debug, error, info, info_span, warn, Instrument};
use uuid::Uuid;

const READ_TIMEOUT: Duration = Duration::from_secs(5);
const MAX_REQUEST_BYTES: usize = 64 * 1024;
const SERVICE: &str = "sales-dashboard";

/// Everything a request handler needs; built once in `main`.
#[derive(Debug)]
pub struct AppContext {
    pub dataset: Arc<Dataset>,
    pub config: AppConfig,
    pub source: String,
    pub started_at: DateTime<Utc>,
}

impl AppContext {
    pub fn new(dataset: Dataset, config: AppConfig) -> Self {
        Self {
            source: config.source.describe(),
            dataset: Arc::new(dataset),
            config,
            started_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub method: String,
    pub path: String,
    pub query: HashMap<String, String>,
}

impl Request {
    /// Parse the request line. Headers and body are ignored.
    pub fn parse(raw: &str) -> Option<Request> {
        let line = raw.lines().next()?;
        let mut parts = line.split_whitespace();
        let method = parts.next()?.to_uppercase();
        let target = parts.next()?;
        if !parts.next()?.starts_with("HTTP/") {
            return None;
        }

        let (path, query) = match target.split_once('?') {
            Some((path, query)) => (path, parse_query(query)),
            None => (target, HashMap::new()),
        };

        // Trailing slashes are not significant, except for the root
        let mut path = path.trim_end_matches('/').to_string();
        if path.is_empty() {
            path = "/".to_string();
        }

        Some(Request { method, path, query })
    }
}

/// Form-style decoding: `+` is a space, then `%XX` escapes. Invalid UTF-8
/// after decoding leaves the component as sent.
fn decode_component(raw: &str) -> String {
    let spaced = raw.replace('+', " ");
    urlencoding::decode(&spaced)
        .map(|decoded| decoded.into_owned())
        .unwrap_or_else(|_| spaced.clone())
}

fn parse_query(query: &str) -> HashMap<String, String> {
    query
        .split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            (decode_component(key), decode_component(value))
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    pub status: u16,
    pub body: String,
}

impl Response {
    pub fn json(status: u16, value: &Value) -> Self {
        Self {
            status,
            body: value.to_string(),
        }
    }

    pub fn error(status: u16, message: impl Into<String>) -> Self {
        Self::json(status, &json!({ "error": message.into() }))
    }

    pub fn no_content() -> Self {
        Self {
            status: 204,
            body: String::new(),
        }
    }

    pub fn json_body(&self) -> Option<Value> {
        serde_json::from_str(&self.body).ok()
    }

    fn status_text(&self) -> &'static str {
        match self.status {
            200 => "OK",
            204 => "No Content",
            400 => "Bad Request",
            404 => "Not Found",
            405 => "Method Not Allowed",
            408 => "Request Timeout",
            413 => "Payload Too Large",
            504 => "Gateway Timeout",
            _ => "Internal Server Error",
        }
    }

    pub fn to_http(&self) -> String {
        format!(
            "HTTP/1.1 {} {}\r\n\
             Content-Type: application/json\r\n\
             Access-Control-Allow-Origin: *\r\n\
             Access-Control-Allow-Methods: GET, OPTIONS\r\n\
             Access-Control-Allow-Headers: Content-Type\r\n\
             Content-Length: {}\r\n\
             Connection: close\r\n\
             \r\n\
             {}",
            self.status,
            self.status_text(),
            self.body.len(),
            self.body
        )
    }
}

/// A blank line ends the header block; some clients send bare `\n`.
fn headers_complete(buffer: &[u8]) -> bool {
    buffer.windows(4).any(|w| w == b"\r\n\r\n") || buffer.windows(2).any(|w| w == b"\n\n")
}

/// Read until the end of the header block.
async fn read_request(stream: &mut TcpStream) -> Result<String, Response> {
    let mut buffer = Vec::with_capacity(1024);
    let mut chunk = [0u8; 1024];

    let read_headers = async {
        loop {
            let size = stream
                .read(&mut chunk)
                .await
                .map_err(|e| Response::error(400, format!("Failed to read request: {}", e)))?;
            if size == 0 {
                break;
            }
            buffer.extend_from_slice(&chunk[..size]);
            if headers_complete(&buffer) {
                break;
            }
            if buffer.len() > MAX_REQUEST_BYTES {
                return Err(Response::error(413, "Request too large"));
            }
        }
        Ok(())
    };

    match tokio::time::timeout(READ_TIMEOUT, read_headers).await {
        Ok(Ok(())) => Ok(String::from_utf8_lossy(&buffer).into_owned()),
        Ok(Err(response)) => Err(response),
        Err(_) => Err(Response::error(408, "Timed out reading request")),
    }
}

fn catalogue() -> Value {
    let metrics: Vec<Value> = Metric::ALL
        .iter()
        .map(|m| {
            json!({
                "slug": m.slug(),
                "title": m.title(),
                "path": format!("/api/{}", m.slug()),
            })
        })
        .collect();
    json!({ "service": SERVICE, "metrics": metrics })
}

fn data_info(ctx: &AppContext) -> Value {
    let dataset = &ctx.dataset;
    let distinct = |dimension: Dimension| dataset.distinct_count(dimension).unwrap_or(0);
    let periods = dataset.periods().unwrap_or_default();

    json!({
        "source": ctx.source,
        "rows": dataset.len(),
        "columns": dataset.column_names(),
        "periods": periods.len(),
        "first_period": periods.first().map(|p| p.label()),
        "last_period": periods.last().map(|p| p.label()),
        "suppliers": if dataset.is_empty() { 0 } else { distinct(Dimension::Supplier) },
        "items": if dataset.is_empty() { 0 } else { distinct(Dimension::ItemCode) },
        "item_types": if dataset.is_empty() { 0 } else { distinct(Dimension::ItemType) },
    })
}

async fn run_metric(ctx: &AppContext, metric: Metric, options: MetricOptions) -> Response {
    let dataset = Arc::clone(&ctx.dataset);
    let debug_errors = ctx.config.debug_errors;
    let task =
        tokio::task::spawn_blocking(move || respond(metric, &dataset, &options, debug_errors));

    match tokio::time::timeout(ctx.config.request_timeout, task).await {
        Ok(Ok(response)) => Response::json(200, &response.into_value()),
        Ok(Err(join_error)) => {
            error!("💥 {} panicked: {}", metric.slug(), join_error);
            let body = ErrorBody {
                error: format!("Error calculating {}: {}", metric.title(), join_error),
                details: debug_errors.then(|| format!("{:?}", join_error)),
            };
            Response::json(200, &json!(body))
        }
        Err(_) => {
            warn!("⏱️  {} exceeded {:?}", metric.slug(), ctx.config.request_timeout);
            Response::error(504, format!("Timed out calculating {}", metric.title()))
        }
    }
}

pub async fn route(ctx: &AppContext, request: &Request) -> Response {
    if request.method == "OPTIONS" {
        return Response::no_content();
    }
    if request.method != "GET" {
        return Response::error(405, format!("Method {} not allowed", request.method));
    }

    match request.path.as_str() {
        "/" | "/api/metrics" => Response::json(200, &catalogue()),
        "/api/test" => Response::json(
            200,
            &json!({ "message": "API is working", "rows": ctx.dataset.len() }),
        ),
        "/api/health" => Response::json(
            200,
            &json!({
                "status": "ok",
                "service": SERVICE,
                "timestamp": Utc::now().to_rfc3339(),
                "uptime_seconds": (Utc::now() - ctx.started_at).num_seconds(),
                "rows": ctx.dataset.len(),
            }),
        ),
        "/api/data-info" => Response::json(200, &data_info(ctx)),
        path => {
            let Some(metric) = path.strip_prefix("/api/").and_then(Metric::from_slug) else {
                return Response::error(404, format!("Not found: {}", path));
            };

            let mut options = MetricOptions::default();
            if let Some(raw) = request.query.get("basis") {
                match raw.parse::<GrowthBasis>() {
                    Ok(basis) => options.growth_basis = basis,
                    Err(err) => return Response::error(400, err.to_string()),
                }
            }
            run_metric(ctx, metric, options).await
        }
    }
}

async fn handle_connection(mut stream: TcpStream, ctx: Arc<AppContext>) {
    let response = match read_request(&mut stream).await {
        Ok(raw) => match Request::parse(&raw) {
            Some(request) => {
                info!("🔍 {} {}", request.method, request.path);
                route(&ctx, &request).await
            }
            None => Response::error(400, "Malformed request"),
        },
        Err(response) => response,
    };

    debug!("Responding {}", response.status);
    if let Err(e) = stream.write_all(response.to_http().as_bytes()).await {
        warn!("Failed to write response: {}", e);
    }
    let _ = stream.shutdown().await;
}

/// Accept connections until the listener fails. Each connection runs on its
/// own task inside a span carrying a fresh request id.
pub async fn serve(listener: TcpListener, ctx: Arc<AppContext>) -> std::io::Result<()> {
    loop {
        let (stream, addr) = listener.accept().await?;
        let span = info_span!("request", id = %Uuid::new_v4(), peer = %addr);
        tokio::spawn(handle_connection(stream, Arc::clone(&ctx)).instrument(span));
    }
}

//! Dashboard HTTP server.
//!
//! One connection at a time on a current-thread runtime: read the request
//! head, route on the first line, write one response, close. Every page load
//! re-runs the board's queries against the shared store.

use std::path::Path;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use serde_json::json;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

use crate::board::{self, runlife_cycles};
use crate::config::{BoardKind, Config};
use crate::export::{self, ExportFormat};
use crate::logging::{log, log_error, log_request, obj, v_str, Domain, Level};
use crate::render::{render_html, style_css};
use crate::store::Store;

const MAX_HEAD: usize = 16 * 1024;

#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    pub status: &'static str,
    pub content_type: &'static str,
    pub disposition: Option<String>,
    pub body: Vec<u8>,
}

impl Response {
    fn ok(content_type: &'static str, body: impl Into<Vec<u8>>) -> Self {
        Self { status: "200 OK", content_type, disposition: None, body: body.into() }
    }

    fn json(value: &serde_json::Value) -> Self {
        Self::ok("application/json", value.to_string())
    }

    fn not_found() -> Self {
        Self { status: "404 NOT FOUND", content_type: "text/plain", disposition: None, body: b"Not Found".to_vec() }
    }

    fn method_not_allowed() -> Self {
        Self {
            status: "405 METHOD NOT ALLOWED",
            content_type: "text/plain",
            disposition: None,
            body: b"Method Not Allowed".to_vec(),
        }
    }

    fn internal_error() -> Self {
        Self {
            status: "500 INTERNAL SERVER ERROR",
            content_type: "text/plain",
            disposition: None,
            body: b"Internal Server Error".to_vec(),
        }
    }

    pub fn status_code(&self) -> u16 {
        self.status
            .split_whitespace()
            .next()
            .and_then(|c| c.parse().ok())
            .unwrap_or(500)
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let disposition = self
            .disposition
            .as_ref()
            .map(|name| format!("Content-Disposition: attachment; filename=\"{name}\"\r\n"))
            .unwrap_or_default();
        let head = format!(
            "HTTP/1.1 {}\r\n\
             Content-Type: {}\r\n\
             {}\
             Access-Control-Allow-Origin: *\r\n\
             Connection: close\r\n\
             Content-Length: {}\r\n\r\n",
            self.status,
            self.content_type,
            disposition,
            self.body.len()
        );
        let mut out = head.into_bytes();
        out.extend_from_slice(&self.body);
        out
    }
}

/// `GET /export/pdf?x=1 HTTP/1.1` -> (`GET`, `/export/pdf`)
pub fn parse_request_line(line: &str) -> Option<(&str, &str)> {
    let mut parts = line.split_whitespace();
    let method = parts.next()?;
    let target = parts.next()?;
    let path = target.split('?').next().unwrap_or(target);
    Some((method, path))
}

pub fn route(method: &str, path: &str, store: &Store, cfg: &Config, kind: BoardKind) -> Response {
    if method != "GET" {
        return Response::method_not_allowed();
    }
    let handled = match path {
        "/" | "/index.html" => board::assemble(kind, store, cfg)
            .map(|b| Response::ok("text/html; charset=utf-8", render_html(&b))),
        "/api/dashboard" => board::assemble(kind, store, cfg)
            .and_then(|b| serde_json::to_value(&b).context("serialize dashboard"))
            .map(|v| Response::json(&v)),
        "/api/runlife" => runlife_cycles(store, cfg)
            .and_then(|c| serde_json::to_value(&c).context("serialize run-life cycles"))
            .map(|v| Response::json(&v)),
        "/api/health" => Ok(Response::json(&json!({"status": "ok", "board": kind.as_str()}))),
        "/assets/style.css" => Ok(Response::ok("text/css", style_css())),
        _ => match path.strip_prefix("/export/").map(ExportFormat::parse) {
            Some(Ok(format)) => export_response(format, store, cfg, kind),
            _ => return Response::not_found(),
        },
    };
    match handled {
        Ok(resp) => resp,
        Err(err) => {
            log_error(Domain::Http, "route_failed", &err.context(format!("{method} {path}")));
            Response::internal_error()
        }
    }
}

fn export_response(format: ExportFormat, store: &Store, cfg: &Config, kind: BoardKind) -> Result<Response> {
    let board = board::assemble(kind, store, cfg)?;
    let written = export::export_to_dir(format, &board, Path::new(&cfg.export_dir))?;
    let body = std::fs::read(&written.path).with_context(|| format!("read {}", written.path.display()))?;
    Ok(Response {
        status: "200 OK",
        content_type: format.content_type(),
        disposition: Some(format.file_name(&board.brand)),
        body,
    })
}

async fn read_head(stream: &mut TcpStream, deadline: Duration) -> Result<String> {
    tokio::time::timeout(deadline, read_until_blank_line(stream))
        .await
        .with_context(|| format!("no request head within {} ms", deadline.as_millis()))?
}

async fn read_until_blank_line(stream: &mut TcpStream) -> Result<String> {
    let mut buf = Vec::with_capacity(1024);
    let mut chunk = [0u8; 1024];
    loop {
        let n = stream.read(&mut chunk).await.context("read request")?;
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
        if buf.windows(4).any(|w| w == b"\r\n\r\n") || buf.len() >= MAX_HEAD {
            break;
        }
    }
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

async fn handle(mut stream: TcpStream, store: &Store, cfg: &Config, kind: BoardKind) -> Result<()> {
    let started = Instant::now();
    let head = read_head(&mut stream, Duration::from_millis(cfg.read_timeout_ms)).await?;
    let line = head.lines().next().unwrap_or("");
    let (method, path, resp) = match parse_request_line(line) {
        Some((method, path)) => (method, path, route(method, path, store, cfg, kind)),
        None => ("-", "-", Response::not_found()),
    };
    let bytes = resp.to_bytes();
    stream.write_all(&bytes).await.context("write response")?;
    stream.shutdown().await.ok();
    log_request(method, path, resp.status_code(), resp.body.len(), started.elapsed().as_secs_f64() * 1000.0);
    Ok(())
}

/// Binds the configured address and serves until Ctrl-C.
pub async fn serve(store: &Store, cfg: &Config, kind: BoardKind) -> Result<()> {
    let listener = TcpListener::bind(&cfg.bind_addr)
        .await
        .with_context(|| format!("bind {}", cfg.bind_addr))?;
    serve_on(listener, store, cfg, kind).await
}

/// Accept loop until Ctrl-C. Connections are handled inline, so the store is
/// only ever touched by one request; a client that sends nothing is dropped
/// after `read_timeout_ms`.
pub async fn serve_on(listener: TcpListener, store: &Store, cfg: &Config, kind: BoardKind) -> Result<()> {
    let addr = listener.local_addr().map(|a| a.to_string()).unwrap_or_else(|_| cfg.bind_addr.clone());
    log(
        Level::Info,
        Domain::System,
        "listening",
        obj(&[("addr", v_str(&addr)), ("board", v_str(kind.as_str()))]),
    );
    let interrupted = tokio::signal::ctrl_c();
    tokio::pin!(interrupted);
    loop {
        let stream = tokio::select! {
            accepted = listener.accept() => match accepted {
                Ok((stream, _)) => stream,
                Err(err) => {
                    log_error(Domain::Http, "accept_failed", &anyhow::Error::new(err));
                    continue;
                }
            },
            _ = &mut interrupted => break,
        };
        tokio::select! {
            handled = handle(stream, store, cfg, kind) => {
                if let Err(err) = handled {
                    log_error(Domain::Http, "connection_failed", &err);
                }
            }
            _ = &mut interrupted => break,
        }
    }
    log(Level::Info, Domain::System, "shutdown", obj(&[("reason", v_str("ctrl_c"))]));
    Ok(())
}

/// Config load, store open and serve; exits non-zero when the store cannot
/// be opened.
pub fn run(kind: Option<BoardKind>) -> Result<()> {
    let cfg = Config::from_env();
    let kind = kind.unwrap_or(cfg.board);
    let store = match Store::open(&cfg.db_path) {
        Ok(store) => store,
        Err(err) => {
            log_error(Domain::Store, "db_connect", &err);
            std::process::exit(1);
        }
    };
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("build runtime")?;
    runtime.block_on(serve(&store, &cfg, kind))?;
    store.close()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seed;

    fn seeded() -> (Store, Config) {
        let store = Store::open_in_memory().unwrap();
        store.init_schema().unwrap();
        seed::seed_demo(&store, 7).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let cfg = Config { export_dir: dir.into_path().display().to_string(), ..Config::default() };
        (store, cfg)
    }

    #[test]
    fn request_line_strips_query() {
        assert_eq!(parse_request_line("GET /export/pdf?x=1 HTTP/1.1"), Some(("GET", "/export/pdf")));
        assert_eq!(parse_request_line(""), None);
    }

    #[test]
    fn response_head_format() {
        let text = String::from_utf8(Response::ok("text/plain", "hi").to_bytes()).unwrap();
        assert!(text.starts_with("HTTP/1.1 200 OK\r\nContent-Type: text/plain\r\n"));
        assert!(text.contains("Access-Control-Allow-Origin: *\r\n"));
        assert!(text.ends_with("Content-Length: 2\r\n\r\nhi"));
    }

    #[test]
    fn routes() {
        let (store, cfg) = seeded();
        assert_eq!(route("GET", "/api/health", &store, &cfg, BoardKind::Kpi).status_code(), 200);
        assert_eq!(route("GET", "/nope", &store, &cfg, BoardKind::Kpi).status_code(), 404);
        assert_eq!(route("GET", "/export/gif", &store, &cfg, BoardKind::Kpi).status_code(), 404);
        assert_eq!(route("POST", "/", &store, &cfg, BoardKind::Kpi).status_code(), 405);
        let page = route("GET", "/", &store, &cfg, BoardKind::Trajectory);
        assert_eq!(page.status_code(), 200);
        assert!(String::from_utf8_lossy(&page.body).contains("Wells Trajectory"));
        let css = route("GET", "/assets/style.css", &store, &cfg, BoardKind::Kpi);
        assert_eq!(css.content_type, "text/css");
    }

    #[test]
    fn export_route_attaches_file() {
        let (store, cfg) = seeded();
        let resp = route("GET", "/export/png", &store, &cfg, BoardKind::Kpi);
        assert_eq!(resp.status_code(), 200);
        assert_eq!(resp.disposition.as_deref(), Some("Geohallitians_dashboard.png"));
        assert_eq!(&resp.body[..4], b"\x89PNG");
    }

    #[test]
    fn query_failure_is_500() {
        let store = Store::open_in_memory().unwrap();
        let cfg = Config::default();
        assert_eq!(route("GET", "/api/dashboard", &store, &cfg, BoardKind::Kpi).status_code(), 500);
    }

    #[tokio::test]
    async fn idle_client_does_not_block_the_next_request() {
        let (store, cfg) = seeded();
        let cfg = Config { read_timeout_ms: 200, ..cfg };
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let client = async {
            let _idle = TcpStream::connect(addr).await.unwrap();
            let mut stream = TcpStream::connect(addr).await.unwrap();
            stream.write_all(b"GET /api/health HTTP/1.1\r\n\r\n").await.unwrap();
            let mut out = Vec::new();
            stream.read_to_end(&mut out).await.unwrap();
            out
        };
        let out = tokio::select! {
            _ = serve_on(listener, &store, &cfg, BoardKind::Kpi) => panic!("server stopped"),
            out = tokio::time::timeout(Duration::from_secs(10), client) => out.expect("health request stalled"),
        };
        let text = String::from_utf8_lossy(&out);
        assert!(text.starts_with("HTTP/1.1 200 OK"), "{}", text);
    }
}

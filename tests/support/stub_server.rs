//! Minimal in-process HTTP stub for exercising the API client end to end.

use std::{
    io::{BufRead, BufReader, Read, Write},
    net::{TcpListener, TcpStream},
    sync::{Arc, Mutex},
    thread,
};

/// One canned response, keyed by `"METHOD /path"`.
pub struct Route {
    pub request: &'static str,
    pub status: u16,
    pub body: String,
}

/// One request the stub actually received.
#[derive(Debug, Clone)]
pub struct Hit {
    pub request: String,
    pub body: String,
}

pub struct StubServer {
    base_url: String,
    hits: Arc<Mutex<Vec<Hit>>>,
}

impl StubServer {
    /// Bind an ephemeral port and answer requests with the canned routes.
    /// Unknown requests get a 404 with an `error` body.
    pub fn start(routes: Vec<Route>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind stub server");
        let addr = listener.local_addr().expect("stub server addr");
        let hits = Arc::new(Mutex::new(Vec::new()));
        let recorded = hits.clone();
        thread::spawn(move || {
            for stream in listener.incoming() {
                let Ok(stream) = stream else { break };
                handle(stream, &routes, &recorded);
            }
        });
        Self {
            base_url: format!("http://{addr}"),
            hits,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Requests received so far, in arrival order.
    pub fn hits(&self) -> Vec<Hit> {
        self.hits
            .lock()
            .unwrap_or_else(|err| err.into_inner())
            .clone()
    }
}

fn handle(mut stream: TcpStream, routes: &[Route], hits: &Mutex<Vec<Hit>>) {
    let Ok(read_half) = stream.try_clone() else {
        return;
    };
    let mut reader = BufReader::new(read_half);

    let mut request_line = String::new();
    if reader.read_line(&mut request_line).is_err() {
        return;
    }
    let mut parts = request_line.trim_end().splitn(3, ' ');
    let method = parts.next().unwrap_or_default();
    let path = parts.next().unwrap_or_default();
    let request = format!("{method} {path}");

    let mut content_length = 0usize;
    loop {
        let mut line = String::new();
        if reader.read_line(&mut line).is_err() {
            return;
        }
        let line = line.trim_end().to_ascii_lowercase();
        if line.is_empty() {
            break;
        }
        if let Some(value) = line.strip_prefix("content-length:") {
            content_length = value.trim().parse().unwrap_or(0);
        }
    }
    let mut body = vec![0u8; content_length];
    if content_length > 0 && reader.read_exact(&mut body).is_err() {
        return;
    }

    hits.lock()
        .unwrap_or_else(|err| err.into_inner())
        .push(Hit {
            request: request.clone(),
            body: String::from_utf8_lossy(&body).to_string(),
        });

    let (status, payload) = match routes.iter().find(|route| route.request == request) {
        Some(route) => (route.status, route.body.clone()),
        None => (404, r#"{"error":"not found"}"#.to_string()),
    };
    let reason = match status {
        200 => "OK",
        201 => "Created",
        204 => "No Content",
        400 => "Bad Request",
        401 => "Unauthorized",
        404 => "Not Found",
        _ => "Error",
    };
    let response = format!(
        "HTTP/1.1 {status} {reason}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        payload.len(),
        payload
    );
    let _ = stream.write_all(response.as_bytes());
}

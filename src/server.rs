//! Minimal synchronous JSON endpoint for the dashboard front end.
//!
//! One request is handled at a time to completion. Endpoints:
//!
//! - `GET /api/health`                 - liveness
//! - `GET /api/tabs`                   - tab values and labels
//! - `GET /api/tab?name=<tab>`         - views offered by a tab
//! - `GET /api/view?name=<view>`       - figure JSON for a view
//! - `GET /api/login_map`              - raw stats and layers for the heatmap
//! - `GET /api/datasets`               - loaded / failed datasets

use std::io::{BufRead, BufReader, Write};
use std::net::{TcpListener, TcpStream};

use serde_json::json;
use url::Url;

use crate::dashboard::{Dashboard, Tab};
use crate::logging::{log, obj, v_str, Domain, Level};

#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    pub status: &'static str,
    pub content_type: &'static str,
    pub body: String,
}

impl Response {
    fn json(body: String) -> Self {
        Self {
            status: "200 OK",
            content_type: "application/json",
            body,
        }
    }

    fn error(status: &'static str, message: &str) -> Self {
        Self {
            status,
            content_type: "application/json",
            body: json!({ "error": message }).to_string(),
        }
    }

    pub fn to_http(&self) -> String {
        format!(
            "HTTP/1.1 {}\r\n\
             Content-Type: {}\r\n\
             Access-Control-Allow-Origin: *\r\n\
             Content-Length: {}\r\n\r\n{}",
            self.status,
            self.content_type,
            self.body.len(),
            self.body
        )
    }
}

/// Route one HTTP request line, e.g. `GET /api/view?name=business_hours HTTP/1.1`.
pub fn route(dashboard: &Dashboard, request_line: &str) -> Response {
    let mut parts = request_line.split_whitespace();
    let (Some(method), Some(target)) = (parts.next(), parts.next()) else {
        return Response::error("400 BAD REQUEST", "malformed request line");
    };
    if method != "GET" {
        return Response::error("405 METHOD NOT ALLOWED", "only GET is supported");
    }
    let Ok(url) = Url::parse(&format!("http://localhost{}", target)) else {
        return Response::error("400 BAD REQUEST", "malformed request target");
    };
    let name = url
        .query_pairs()
        .find(|(k, _)| k == "name")
        .map(|(_, v)| v.into_owned());

    match (url.path(), name) {
        ("/api/health", _) => Response::json(json!({ "status": "ok" }).to_string()),
        ("/api/tabs", _) => {
            let tabs: Vec<_> = Tab::ALL
                .iter()
                .map(|t| json!({ "value": t.value(), "label": t.label() }))
                .collect();
            Response::json(json!(tabs).to_string())
        }
        ("/api/tab", Some(name)) => match Tab::parse(&name) {
            Ok(tab) => Response::json(json!(dashboard.tab_content(tab)).to_string()),
            Err(err) => Response::error("404 NOT FOUND", &err.to_string()),
        },
        ("/api/view", Some(name)) => Response::json(dashboard.render_named_view(&name).to_json()),
        ("/api/login_map", _) => match dashboard.login_map() {
            Ok(map) => Response::json(json!(map).to_string()),
            Err(err) => Response::error("503 SERVICE UNAVAILABLE", &err.to_string()),
        },
        ("/api/datasets", _) => Response::json(json!(dashboard.datasets()).to_string()),
        ("/api/tab", None) | ("/api/view", None) => {
            Response::error("400 BAD REQUEST", "missing 'name' query parameter")
        }
        _ => Response::error("404 NOT FOUND", "not found"),
    }
}

fn handle(dashboard: &Dashboard, stream: &mut TcpStream) {
    let request = {
        let reader = BufReader::new(&*stream);
        match reader.lines().next() {
            Some(Ok(line)) => line,
            _ => return,
        }
    };
    let response = route(dashboard, &request);
    log(
        Level::Info,
        Domain::Server,
        "request",
        obj(&[("request", v_str(&request)), ("status", v_str(response.status))]),
    );
    if let Err(err) = stream.write_all(response.to_http().as_bytes()) {
        log(
            Level::Warn,
            Domain::Server,
            "write_failed",
            obj(&[("msg", v_str(&err.to_string()))]),
        );
    }
}

/// Serve forever on `listener`, one connection at a time.
pub fn serve(listener: TcpListener, dashboard: &Dashboard) {
    for stream in listener.incoming() {
        match stream {
            Ok(mut s) => handle(dashboard, &mut s),
            Err(err) => log(
                Level::Warn,
                Domain::Server,
                "accept_failed",
                obj(&[("msg", v_str(&err.to_string()))]),
            ),
        }
    }
}

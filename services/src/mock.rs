//! Stand-in for a Portainer server, for tests.
//!
//! Runs an actix-web server on an ephemeral loopback port and records every
//! request it receives so tests can assert on the calls made upstream.

use actix_web::http::{StatusCode, header};
use actix_web::{App, HttpRequest, HttpResponse, HttpServer, web};
use serde_json::{Value, json};
use std::sync::{Arc, Mutex};

pub const MOCK_JWT: &str = "mock-jwt-token";

/// How the mock answers each kind of call.
#[derive(Debug, Clone)]
pub struct MockBehaviour {
    pub auth_status: u16,
    pub list_status: u16,
    pub list_body: Value,
    pub action_status: u16,
    /// Answer forwarded calls with a redirect to a port nobody listens on,
    /// so they fail at the transport level after authentication succeeded.
    pub forwards_unreachable: bool,
}

impl Default for MockBehaviour {
    fn default() -> Self {
        Self {
            auth_status: 200,
            list_status: 200,
            list_body: json!([]),
            action_status: 204,
            forwards_unreachable: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    pub method: String,
    pub path: String,
    pub authorization: Option<String>,
    pub body: String,
}

struct MockState {
    behaviour: MockBehaviour,
    unreachable_url: String,
    calls: Arc<Mutex<Vec<RecordedCall>>>,
}

pub struct MockPortainer {
    url: String,
    calls: Arc<Mutex<Vec<RecordedCall>>>,
}

impl MockPortainer {
    /// Bind and spawn the mock on the current actix system.
    pub async fn start(behaviour: MockBehaviour) -> std::io::Result<Self> {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let unreachable_url = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0")?;
            format!("http://{}", listener.local_addr()?)
        };
        let state = web::Data::new(MockState {
            behaviour,
            unreachable_url,
            calls: Arc::clone(&calls),
        });

        let server = HttpServer::new(move || {
            App::new()
                .app_data(state.clone())
                .default_service(web::to(handle))
        })
        .workers(1)
        .disable_signals()
        .bind(("127.0.0.1", 0))?;

        let addr = server.addrs()[0];
        actix_web::rt::spawn(server.run());

        Ok(Self {
            url: format!("http://{}", addr),
            calls,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Every request received, in arrival order.
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    /// Requests other than `/api/auth`.
    pub fn forwarded_calls(&self) -> Vec<RecordedCall> {
        self.calls()
            .into_iter()
            .filter(|c| c.path != "/api/auth")
            .collect()
    }
}

fn status(code: u16) -> StatusCode {
    StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
}

async fn handle(req: HttpRequest, body: web::Bytes, state: web::Data<MockState>) -> HttpResponse {
    let call = RecordedCall {
        method: req.method().to_string(),
        path: req.path().to_string(),
        authorization: req
            .headers()
            .get("Authorization")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
        body: String::from_utf8_lossy(&body).into_owned(),
    };
    if let Ok(mut calls) = state.calls.lock() {
        calls.push(call);
    }

    let behaviour = &state.behaviour;
    let path = req.path();

    if path == "/api/auth" {
        if behaviour.auth_status == 200 {
            return HttpResponse::Ok().json(json!({ "jwt": MOCK_JWT }));
        }
        return HttpResponse::build(status(behaviour.auth_status))
            .json(json!({ "message": "Invalid credentials" }));
    }

    if behaviour.forwards_unreachable {
        return HttpResponse::TemporaryRedirect()
            .insert_header((header::LOCATION, format!("{}{}", state.unreachable_url, path)))
            .finish();
    }

    if path.ends_with("/docker/containers/json") {
        return HttpResponse::build(status(behaviour.list_status)).json(&behaviour.list_body);
    }

    HttpResponse::build(status(behaviour.action_status)).finish()
}

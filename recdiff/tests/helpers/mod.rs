//! Fixture instance for client integration tests
//!
//! A local axum server on an ephemeral port that answers the table API and
//! the record XML export from in-memory fixtures, and records every request.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::extract::{Path, Query, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};

pub const USER: &str = "admin";
pub const PASSWORD: &str = "secret";
/// `Basic base64("admin:secret")`
const EXPECTED_AUTHORIZATION: &str = "Basic YWRtaW46c2VjcmV0";

/// Request seen by the fixture server
#[derive(Debug, Clone)]
pub struct SeenRequest {
    pub path: String,
    pub params: HashMap<String, String>,
}

/// Tables and records served by one fixture instance
#[derive(Debug, Default, Clone)]
pub struct Fixture {
    /// table -> listing entries
    listings: HashMap<String, Vec<Value>>,
    /// (table, sys_id) -> export XML
    exports: HashMap<(String, String), String>,
}

impl Fixture {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn listing(mut self, table: &str, entries: Vec<Value>) -> Self {
        self.listings.insert(table.to_string(), entries);
        self
    }

    pub fn export(mut self, table: &str, sys_id: &str, xml: &str) -> Self {
        self.exports
            .insert((table.to_string(), sys_id.to_string()), xml.to_string());
        self
    }

    /// Record with a plain field list, exported as `<xml><table>...</table></xml>`
    pub fn record(self, table: &str, sys_id: &str, fields: &[(&str, &str)]) -> Self {
        let body: String = fields
            .iter()
            .map(|(name, value)| format!("<{0}><![CDATA[{1}]]></{0}>", name, value))
            .collect();
        let xml = format!(
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?><xml><{0} action=\"INSERT_OR_UPDATE\"><sys_id>{1}</sys_id>{2}</{0}></xml>",
            table, sys_id, body
        );
        self.export(table, sys_id, &xml)
    }
}

struct ServerState {
    fixture: Fixture,
    requests: Mutex<Vec<SeenRequest>>,
}

impl ServerState {
    fn remember(&self, path: String, params: &HashMap<String, String>) {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(SeenRequest {
                path,
                params: params.clone(),
            });
        }
    }
}

/// Running fixture server
pub struct FixtureServer {
    pub addr: SocketAddr,
    state: Arc<ServerState>,
}

impl FixtureServer {
    pub async fn start(fixture: Fixture) -> Self {
        let state = Arc::new(ServerState {
            fixture,
            requests: Mutex::new(Vec::new()),
        });

        let router = Router::new()
            .route("/api/now/table/:table", get(list_table))
            .route("/:file", get(export_record))
            .with_state(Arc::clone(&state));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind fixture server");
        let addr = listener.local_addr().expect("fixture server address");

        tokio::spawn(async move {
            axum::serve(listener, router).await.expect("fixture server");
        });

        Self { addr, state }
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn requests(&self) -> Vec<SeenRequest> {
        self.state.requests.lock().expect("requests lock").clone()
    }
}

fn authorized(headers: &HeaderMap) -> bool {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(|v| v == EXPECTED_AUTHORIZATION)
        .unwrap_or(false)
}

fn unauthorized() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({"error": {"message": "User Not Authenticated"}})),
    )
        .into_response()
}

async fn list_table(
    State(state): State<Arc<ServerState>>,
    Path(table): Path<String>,
    Query(params): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> Response {
    state.remember(format!("/api/now/table/{}", table), &params);
    if !authorized(&headers) {
        return unauthorized();
    }

    let Some(entries) = state.fixture.listings.get(&table) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"error": {"message": "Invalid table", "detail": table}})),
        )
            .into_response();
    };

    let limit = params
        .get("sysparm_limit")
        .and_then(|l| l.parse::<usize>().ok())
        .unwrap_or(usize::MAX);
    let result: Vec<Value> = entries.iter().take(limit).cloned().collect();
    Json(json!({ "result": result })).into_response()
}

async fn export_record(
    State(state): State<Arc<ServerState>>,
    Path(file): Path<String>,
    Query(params): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> Response {
    state.remember(format!("/{}", file), &params);
    if !authorized(&headers) {
        return unauthorized();
    }

    let (Some(table), true, Some(sys_id)) = (
        file.strip_suffix(".do"),
        params.contains_key("XML"),
        params.get("sys_id"),
    ) else {
        return (StatusCode::BAD_REQUEST, "Unsupported request").into_response();
    };

    match state.fixture.exports.get(&(table.to_string(), sys_id.clone())) {
        Some(xml) => ([(header::CONTENT_TYPE, "application/xml")], xml.clone()).into_response(),
        None => (StatusCode::NOT_FOUND, "Record not found").into_response(),
    }
}

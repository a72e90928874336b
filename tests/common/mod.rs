//! In-process stand-in for the sync daemon's web UI, good enough to exercise
//! the token handshake, basic auth, the session cookie and the three actions
//! the CLI uses.

#![allow(dead_code)]

use axum::extract::{Query, State};
use axum::http::{header, HeaderMap, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;

pub const TOKEN: &str = "Zm9vYmFyYmF6";
pub const SESSION_COOKIE: &str = "GUID=stubsession42";

#[derive(Clone, Debug)]
pub struct RecordedRequest {
    pub path: String,
    pub query: HashMap<String, String>,
    pub authorization: Option<String>,
}

impl RecordedRequest {
    pub fn action(&self) -> Option<&str> {
        self.query.get("action").map(String::as_str)
    }
}

#[derive(Clone, Debug, Default)]
pub struct StubConfig {
    pub folders: Vec<Value>,
    /// Reject `addsyncfolder` with this message.
    pub add_error: Option<String>,
    /// `Authorization` header value required on every request.
    pub expected_auth: Option<String>,
}

pub struct StubDaemon {
    pub port: u16,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl StubDaemon {
    pub async fn start(config: StubConfig) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let requests = Arc::new(Mutex::new(Vec::new()));

        let state = StubState {
            config: Arc::new(config),
            requests: requests.clone(),
        };
        let app = Router::new()
            .route("/gui/token.html", get(token_page))
            .route("/gui/", get(gui_action))
            .fallback(not_found)
            .with_state(state);

        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { port, requests }
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn actions(&self) -> Vec<String> {
        self.requests()
            .iter()
            .filter_map(|r| r.action().map(str::to_owned))
            .collect()
    }

    pub fn base_url(&self) -> String {
        format!("http://127.0.0.1:{}", self.port)
    }
}

pub fn folder(name: &str, peers: &[(&str, &str)]) -> Value {
    let peers: Vec<Value> = peers
        .iter()
        .map(|(name, status)| json!({ "name": name, "status": status }))
        .collect();
    json!({ "name": name, "secret": "FOLDERSECRET", "size": "0 B in 0 files", "peers": peers })
}

/// Write a daemon config file pointing at `port`.
pub fn write_sync_conf(path: &std::path::Path, port: u16, login: &str, password: &str) {
    let content = format!(
        "{{\n  // written by the test suite\n  \"webui\": {{\n    \"listen\": \"127.0.0.1:{}\",\n    \"login\": \"{}\",\n    \"password\": \"{}\"\n  }}\n}}\n",
        port, login, password
    );
    std::fs::write(path, content).unwrap();
}

/// Whether this process can hand a directory it owns to `gid`: root can
/// pick any group, everyone else only their own.
pub fn may_assign_group(gid: u32) -> bool {
    if unsafe { libc::geteuid() } == 0 || unsafe { libc::getegid() } == gid {
        return true;
    }
    let count = unsafe { libc::getgroups(0, std::ptr::null_mut()) };
    let mut groups: Vec<libc::gid_t> = vec![0; count.max(0) as usize];
    let count = unsafe { libc::getgroups(count, groups.as_mut_ptr()) };
    groups.truncate(count.max(0) as usize);
    groups.contains(&gid)
}

#[derive(Clone)]
struct StubState {
    config: Arc<StubConfig>,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl StubState {
    /// Record the request and check its basic auth header.
    fn admit(
        &self,
        uri: &Uri,
        query: &HashMap<String, String>,
        headers: &HeaderMap,
    ) -> Result<(), Response> {
        let authorization = headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned);

        self.requests.lock().unwrap().push(RecordedRequest {
            path: uri.path().to_string(),
            query: query.clone(),
            authorization: authorization.clone(),
        });

        match &self.config.expected_auth {
            Some(expected) if authorization.as_deref() != Some(expected.as_str()) => {
                Err((StatusCode::UNAUTHORIZED, "invalid credentials").into_response())
            }
            _ => Ok(()),
        }
    }
}

async fn token_page(
    State(state): State<StubState>,
    uri: Uri,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> Response {
    if let Err(rejected) = state.admit(&uri, &query, &headers) {
        return rejected;
    }

    let body = format!("<html><div id='token' style='display:none;'>{}</div></html>", TOKEN);
    (
        [
            (header::CONTENT_TYPE, "text/html".to_string()),
            (header::SET_COOKIE, format!("{}; path=/", SESSION_COOKIE)),
        ],
        body,
    )
        .into_response()
}

async fn gui_action(
    State(state): State<StubState>,
    uri: Uri,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> Response {
    if let Err(rejected) = state.admit(&uri, &query, &headers) {
        return rejected;
    }

    let has_session = headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .any(|c| c.contains(SESSION_COOKIE));
    if query.get("token").map(String::as_str) != Some(TOKEN) || !has_session {
        return (StatusCode::BAD_REQUEST, "invalid request").into_response();
    }

    let config = &state.config;
    let body = match query.get("action").map(String::as_str) {
        Some("getsyncfolders") => json!({ "folders": config.folders, "speed": "0 B/s up, 0 B/s down" }),
        Some("generatesecret") => json!({ "secret": "RWGENERATED", "rosecret": "ROGENERATED" }),
        Some("addsyncfolder") => match &config.add_error {
            Some(message) => json!({ "error": 105, "message": message }),
            None => json!({ "error": 0 }),
        },
        _ => return (StatusCode::BAD_REQUEST, "unknown action").into_response(),
    };

    Json(body).into_response()
}

async fn not_found(
    State(state): State<StubState>,
    uri: Uri,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> Response {
    if let Err(rejected) = state.admit(&uri, &query, &headers) {
        return rejected;
    }
    (StatusCode::NOT_FOUND, "not found").into_response()
}

/*!
Mock master for development without a real backend.

Serves the master's wire contract in-process: enveloped HTTP responses
(plus legacy and binary ones registered per path), the alert snapshot
endpoint, and the WebSocket push hub. Records the bearer header of the
last API call and counts push-channel connections so tests can assert on
auth and reconnect behavior. Frames are broadcast to every connected
client; `drop_clients` force-closes them to simulate a master restart.
*/

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Request, State};
use axum::http::{header, StatusCode, Uri};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{any, get};
use axum::{Json, Router};
use futures::{SinkExt, StreamExt};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::broadcast;

#[derive(Clone)]
struct CannedResponse {
    status: StatusCode,
    content_type: String,
    body: Vec<u8>,
}

#[derive(Clone)]
enum HubSignal {
    Frame(String),
    Close,
}

struct MasterState {
    canned: Mutex<HashMap<String, CannedResponse>>,
    alerts_active: Mutex<Vec<Value>>,
    alerts_failing: AtomicBool,
    last_auth: Mutex<Option<String>>,
    frames: broadcast::Sender<HubSignal>,
    ws_connects: AtomicUsize,
    ws_live: AtomicUsize,
}

pub struct MockMaster {
    addr: SocketAddr,
    state: Arc<MasterState>,
}

impl MockMaster {
    /// Binds an ephemeral port and serves until dropped.
    pub async fn start() -> anyhow::Result<Self> {
        env_logger::try_init().ok();

        let (frames, _) = broadcast::channel(64);
        let state = Arc::new(MasterState {
            canned: Mutex::new(HashMap::new()),
            alerts_active: Mutex::new(Vec::new()),
            alerts_failing: AtomicBool::new(false),
            last_auth: Mutex::new(None),
            frames,
            ws_connects: AtomicUsize::new(0),
            ws_live: AtomicUsize::new(0),
        });

        let app = build_router(state.clone());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                log::error!("[MOCK] master serve error: {e}");
            }
        });

        log::info!("[MOCK] master listening on http://{addr}");
        Ok(Self { addr, state })
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn ws_url(&self) -> String {
        format!("ws://{}/api/ws", self.addr)
    }

    /// Sets the active section served by `GET /api/alerts/events`.
    pub fn set_active_alerts(&self, events: Vec<Value>) {
        *self.state.alerts_active.lock().unwrap() = events;
    }

    /// Makes `GET /api/alerts/events` answer 500 until turned off again.
    pub fn set_alerts_failing(&self, failing: bool) {
        self.state.alerts_failing.store(failing, Ordering::SeqCst);
    }

    /// Registers a raw JSON body (any status) for a path. Use a body
    /// without a `code` field to exercise the legacy passthrough.
    pub fn respond_json(&self, path: &str, status: u16, body: Value) {
        self.insert_canned(path, status, "application/json", body.to_string().into_bytes());
    }

    /// Registers a standard success envelope wrapping `data`.
    pub fn respond_enveloped(&self, path: &str, data: Value) {
        self.respond_json(path, 200, json!({ "code": 0, "msg": "success", "data": data }));
    }

    /// Registers a business rejection (HTTP 200, envelope `code != 0`).
    pub fn respond_business_error(&self, path: &str, code: i64, msg: &str) {
        self.respond_json(path, 200, json!({ "code": code, "msg": msg, "data": null }));
    }

    pub fn respond_binary(&self, path: &str, content_type: &str, body: Vec<u8>) {
        self.insert_canned(path, 200, content_type, body);
    }

    fn insert_canned(&self, path: &str, status: u16, content_type: &str, body: Vec<u8>) {
        let canned = CannedResponse {
            status: StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            content_type: content_type.to_string(),
            body,
        };
        self.state.canned.lock().unwrap().insert(path.to_string(), canned);
    }

    /// Broadcasts one frame to every connected push client.
    pub fn push(&self, frame: &Value) {
        self.push_text(&frame.to_string());
    }

    /// Broadcasts a raw text frame, valid JSON or not.
    pub fn push_text(&self, raw: &str) {
        let _ = self.state.frames.send(HubSignal::Frame(raw.to_string()));
        log::info!("[MOCK] pushed frame: {} bytes", raw.len());
    }

    /// Force-closes every connected push client, like a master restart.
    pub fn drop_clients(&self) {
        let _ = self.state.frames.send(HubSignal::Close);
        log::info!("[MOCK] dropping push clients");
    }

    /// Total push-channel connections ever accepted.
    pub fn ws_connections(&self) -> usize {
        self.state.ws_connects.load(Ordering::SeqCst)
    }

    /// Currently connected push clients.
    pub fn live_connections(&self) -> usize {
        self.state.ws_live.load(Ordering::SeqCst)
    }

    /// `Authorization` header of the most recent API call.
    pub fn last_auth_header(&self) -> Option<String> {
        self.state.last_auth.lock().unwrap().clone()
    }
}

fn build_router(state: Arc<MasterState>) -> Router {
    Router::new()
        .route("/api/alerts/events", get(alerts_events))
        .route("/api/ws", any(ws_handler))
        .fallback(canned_response)
        .layer(middleware::from_fn_with_state(state.clone(), capture_auth))
        .with_state(state)
}

async fn capture_auth(State(st): State<Arc<MasterState>>, req: Request, next: Next) -> Response {
    if let Some(auth) = req.headers().get(header::AUTHORIZATION).and_then(|v| v.to_str().ok()) {
        *st.last_auth.lock().unwrap() = Some(auth.to_string());
    }
    next.run(req).await
}

async fn alerts_events(State(st): State<Arc<MasterState>>) -> Response {
    if st.alerts_failing.load(Ordering::SeqCst) {
        return (StatusCode::INTERNAL_SERVER_ERROR, "alert store unavailable").into_response();
    }
    let active = st.alerts_active.lock().unwrap().clone();
    Json(json!({
        "code": 0,
        "msg": "success",
        "data": { "active": active, "history": [] }
    }))
    .into_response()
}

async fn canned_response(State(st): State<Arc<MasterState>>, uri: Uri) -> Response {
    let canned = st.canned.lock().unwrap().get(uri.path()).cloned();
    match canned {
        Some(c) => (c.status, [(header::CONTENT_TYPE, c.content_type)], c.body).into_response(),
        None => (StatusCode::NOT_FOUND, "not found").into_response(),
    }
}

async fn ws_handler(State(st): State<Arc<MasterState>>, ws: WebSocketUpgrade) -> impl IntoResponse {
    ws.on_upgrade(move |socket| client_session(socket, st))
}

async fn client_session(socket: WebSocket, st: Arc<MasterState>) {
    // Subscribe before announcing the connection so a frame pushed right
    // after `live_connections()` ticks up cannot be lost.
    let mut rx = st.frames.subscribe();
    st.ws_connects.fetch_add(1, Ordering::SeqCst);
    st.ws_live.fetch_add(1, Ordering::SeqCst);
    log::info!("[MOCK] push client connected ({} live)", st.ws_live.load(Ordering::SeqCst));
    let (mut sink, mut stream) = socket.split();
    loop {
        tokio::select! {
            signal = rx.recv() => match signal {
                Ok(HubSignal::Frame(frame)) => {
                    if sink.send(Message::Text(frame.into())).await.is_err() {
                        break;
                    }
                }
                Ok(HubSignal::Close) => {
                    let _ = sink.send(Message::Close(None)).await;
                    break;
                }
                Err(broadcast::error::RecvError::Lagged(_)) => continue,
                Err(broadcast::error::RecvError::Closed) => break,
            },
            inbound = stream.next() => match inbound {
                Some(Ok(_)) => {}
                Some(Err(_)) | None => break,
            },
        }
    }

    st.ws_live.fetch_sub(1, Ordering::SeqCst);
    log::info!("[MOCK] push client disconnected ({} live)", st.ws_live.load(Ordering::SeqCst));
}

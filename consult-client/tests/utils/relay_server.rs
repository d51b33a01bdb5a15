use axum::extract::{Query, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use consult_core::RelayedSignal;
use serde::Deserialize;
use serde_json::{Value, json};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::Mutex;

#[derive(Default)]
struct ServerState {
    rooms: HashMap<String, Vec<RelayedSignal>>,
    next_id: u64,
}

type Shared = Arc<Mutex<ServerState>>;

#[derive(Deserialize)]
struct PushBody {
    room_id: String,
    data: String,
}

#[derive(Deserialize)]
struct FetchParams {
    room_id: String,
    #[serde(default)]
    since_id: u64,
}

async fn push_signal(State(state): State<Shared>, Json(body): Json<PushBody>) -> Json<Value> {
    if body.room_id.is_empty() {
        return Json(json!({ "success": false, "message": "room_id is required" }));
    }
    let mut state = state.lock().await;
    state.next_id += 1;
    let id = state.next_id;
    state
        .rooms
        .entry(body.room_id)
        .or_default()
        .push(RelayedSignal { id, data: body.data });
    Json(json!({ "success": true }))
}

async fn fetch_signals(
    State(state): State<Shared>,
    Query(params): Query<FetchParams>,
) -> Json<Value> {
    let state = state.lock().await;
    let signals: Vec<&RelayedSignal> = state
        .rooms
        .get(&params.room_id)
        .map(|signals| signals.iter().filter(|s| s.id > params.since_id).collect())
        .unwrap_or_default();
    Json(json!({ "success": true, "signals": signals }))
}

/// Starts a relay speaking the `/signal` + `/signals` protocol on a free
/// local port and returns its base url.
pub async fn spawn_relay_server() -> String {
    let app = Router::new()
        .route("/signal", post(push_signal))
        .route("/signals", get(fetch_signals))
        .with_state(Shared::default());

    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind relay server");
    let addr: SocketAddr = listener.local_addr().expect("No local address");

    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("Relay server failed");
    });

    format!("http://{}", addr)
}

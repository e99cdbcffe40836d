//! HTTP surface: Prometheus metrics, the subject-registry admin endpoints,
//! and the per-player WebSocket transport endpoint, all on one Axum router,
//! grounded in the teacher's single-route Axum server shape.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{ConnectInfo, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use futures_util::{SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{error, info, warn};

use crate::auth::AuthGate;
use crate::broker::Envelope;
use crate::command::{Registry as CommandRegistry, Services};
use crate::connection::{DisconnectReason, Transport};
use crate::presence::PresenceView;
use crate::session::SessionLifecycle;
use crate::subject::SubjectRegistry;

#[derive(Clone)]
pub struct AppState {
    pub subjects: Arc<SubjectRegistry>,
    pub auth: Arc<AuthGate>,
    pub sessions: Arc<SessionLifecycle>,
    pub commands: Arc<CommandRegistry>,
    pub services: Services,
    pub command_max_length: usize,
    pub shutting_down: Arc<AtomicBool>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/metrics", get(metrics_handler))
        .route("/nats/subjects/health", get(subjects_health))
        .route("/nats/subjects/validate", post(subjects_validate))
        .route("/nats/subjects/patterns", get(subjects_list_patterns))
        .route("/nats/subjects/patterns", post(subjects_register_pattern))
        .route("/ws", get(ws_upgrade))
        .with_state(state)
}

pub async fn run_http_server(addr: &str, state: AppState) {
    let app = router(state);
    let addr: SocketAddr = match addr.parse() {
        Ok(addr) => addr,
        Err(e) => {
            error!(addr, error = %e, "invalid telemetry.metrics_addr, HTTP surface not started");
            return;
        }
    };

    info!(%addr, "HTTP surface listening");
    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!(%addr, error = %e, "failed to bind HTTP surface");
            return;
        }
    };

    if let Err(e) = axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    {
        error!(error = %e, "HTTP surface error");
    }
}

async fn metrics_handler() -> String {
    crate::metrics::gather_metrics()
}

async fn subjects_health(State(state): State<AppState>) -> Json<Value> {
    let snapshot = state.subjects.metrics();
    Json(serde_json::json!({
        "status": "ok",
        "metrics": snapshot,
    }))
}

#[derive(Deserialize)]
struct ValidateRequest {
    subject: String,
    token: Option<String>,
}

#[derive(Serialize)]
struct ValidateResponse {
    subject: String,
    is_valid: bool,
    validation_time_ms: f64,
    details: Option<String>,
}

async fn subjects_validate(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    Json(body): Json<ValidateRequest>,
) -> impl IntoResponse {
    if let Err(err) = require_admin(&state, &addr, body.token.as_deref()).await {
        return admin_error(err);
    }

    let start = Instant::now();
    let is_valid = state.subjects.validate(&body.subject);
    let validation_time_ms = start.elapsed().as_secs_f64() * 1000.0;

    Json(ValidateResponse {
        subject: body.subject,
        is_valid,
        validation_time_ms,
        details: None,
    })
    .into_response()
}

#[derive(Deserialize)]
struct PatternsQuery {
    token: Option<String>,
}

async fn subjects_list_patterns(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    Query(query): Query<PatternsQuery>,
) -> impl IntoResponse {
    if let Err(err) = require_admin(&state, &addr, query.token.as_deref()).await {
        return admin_error(err);
    }
    Json(state.subjects.all_patterns()).into_response()
}

#[derive(Deserialize)]
struct RegisterPatternRequest {
    token: Option<String>,
    name: String,
    template: String,
    required_params: Vec<String>,
    description: String,
}

async fn subjects_register_pattern(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    Json(body): Json<RegisterPatternRequest>,
) -> impl IntoResponse {
    if let Err(err) = require_admin(&state, &addr, body.token.as_deref()).await {
        return admin_error(err);
    }

    match state
        .subjects
        .register(&body.name, &body.template, body.required_params, &body.description)
    {
        Ok(()) => StatusCode::CREATED.into_response(),
        Err(e) => (StatusCode::BAD_REQUEST, e.to_string()).into_response(),
    }
}

async fn require_admin(
    state: &AppState,
    addr: &SocketAddr,
    token: Option<&str>,
) -> Result<(), StatusCode> {
    let token = token.ok_or(StatusCode::FORBIDDEN)?;
    let user = state
        .auth
        .validate_session_token(&addr.ip().to_string(), token)
        .await
        .map_err(|_| StatusCode::FORBIDDEN)?;
    state.auth.require_admin(&user).map_err(|_| StatusCode::FORBIDDEN)
}

fn admin_error(status: StatusCode) -> axum::response::Response {
    (status, "admin permissions required").into_response()
}

#[derive(Deserialize)]
struct ConnectQuery {
    token: String,
}

async fn ws_upgrade(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    Query(query): Query<ConnectQuery>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state, addr, query.token))
}

/// Bridges the connection manager's synchronous `Transport::send` to an
/// async WebSocket sink via an unbounded channel and a forwarding task.
struct WsTransport {
    outbound: tokio::sync::mpsc::UnboundedSender<Envelope>,
}

impl Transport for WsTransport {
    fn send(&self, envelope: &Envelope) {
        let _ = self.outbound.send(envelope.clone());
    }
}

async fn handle_socket(socket: WebSocket, state: AppState, addr: SocketAddr, token: String) {
    let source = addr.ip().to_string();
    let (mut sink, mut stream) = socket.split();
    let (outbound_tx, mut outbound_rx) = tokio::sync::mpsc::unbounded_channel::<Envelope>();

    let forward_task = tokio::spawn(async move {
        while let Some(envelope) = outbound_rx.recv().await {
            let Ok(text) = serde_json::to_string(&envelope) else {
                continue;
            };
            if sink.send(Message::Text(text)).await.is_err() {
                break;
            }
        }
    });

    let transport: Arc<dyn Transport> = Arc::new(WsTransport { outbound: outbound_tx });

    let (session_id, player) = match state.sessions.begin(&source, &token, transport).await {
        Ok(pair) => pair,
        Err(e) => {
            warn!(source = %source, error = %e, "websocket connection rejected");
            forward_task.abort();
            return;
        }
    };

    info!(player_id = %player.id, session_id = %session_id, "player connected");

    if let Some(room) = state
        .services
        .persistence
        .get_room_by_id(&player.current_room_id)
        .await
        .ok()
        .flatten()
    {
        let view = PresenceView::new(
            state.services.connections.clone(),
            state.services.persistence.clone(),
            state.services.npc_runtime.clone(),
        );
        if let Ok(occupants) = view.list_occupants(&player.current_room_id, &player.id).await {
            let text = crate::look::render_room(&room, &occupants);
            state.services.connections.send_personal(
                &player.id,
                Envelope::new("chat.system", 0, serde_json::json!({"text": text})),
            );
        }
    }

    while let Some(Ok(message)) = stream.next().await {
        let line = match message {
            Message::Text(text) => text,
            Message::Close(_) => break,
            _ => continue,
        };

        let shutting_down = state.shutting_down.load(Ordering::Relaxed);
        let in_grace = state.services.connections.is_in_grace(&player.id);
        match state
            .commands
            .dispatch(
                &state.services,
                &player.id,
                &line,
                state.command_max_length,
                shutting_down,
                in_grace,
            )
            .await
        {
            Ok(outcome) => {
                state.services.connections.send_personal(
                    &player.id,
                    Envelope::new("chat.system", 0, serde_json::json!({"text": outcome.text})),
                );
            }
            Err(e) => {
                state.services.connections.send_personal(
                    &player.id,
                    Envelope::new(
                        "chat.system",
                        0,
                        serde_json::json!({"text": e.to_reply(&session_id)}),
                    ),
                );
            }
        }
    }

    state.sessions.end(&session_id, DisconnectReason::Transient).await;
    forward_task.abort();
    info!(player_id = %player.id, session_id = %session_id, "player disconnected");
}

//! HTTP chat server.
//!
//! Each client opens its own session and posts queries to it. The catalog
//! and settings are shared read-only through one [`Assistant`]; sessions
//! live in a registry keyed by a random UUID and never see each other's
//! messages or context.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET`    | `/health` | Health check (returns version and catalog size) |
//! | `POST`   | `/sessions` | Open a session, returns its id and greeting log |
//! | `GET`    | `/sessions/{id}/messages` | Full message log |
//! | `POST`   | `/sessions/{id}/messages` | Submit `{ "query": "..." }`, returns the turn or `null` |
//! | `POST`   | `/sessions/{id}/reset` | Reset to the greeting, returns the new log |
//! | `DELETE` | `/sessions/{id}` | Close a session |
//!
//! # Error Contract
//!
//! ```json
//! { "error": { "code": "not_found", "message": "unknown session: 1234" } }
//! ```
//!
//! Error codes: `bad_request` (400), `not_found` (404), `capacity` (503),
//! `internal` (500).
//!
//! # CORS
//!
//! All origins, methods, and headers are permitted so a storefront page
//! can talk to the server directly.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use betsy_core::models::Message;
use betsy_core::{Assistant, Session, TurnResult};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use tower_http::cors::{Any, CorsLayer};

use crate::chat::build_assistant;
use crate::config::Config;

/// Shared application state passed to all route handlers via Axum's `State` extractor.
#[derive(Clone)]
struct AppState {
    assistant: Arc<Assistant>,
    sessions: Arc<Mutex<HashMap<String, Session>>>,
    max_sessions: usize,
}

impl AppState {
    fn sessions(&self) -> Result<MutexGuard<'_, HashMap<String, Session>>, AppError> {
        self.sessions
            .lock()
            .map_err(|_| internal("session registry is unavailable"))
    }
}

/// Starts the HTTP server on `[server].bind`.
///
/// Runs until the process is terminated.
pub async fn run_server(config: &Config) -> anyhow::Result<()> {
    let assistant = Arc::new(build_assistant(config)?);
    let bind_addr = config.server.bind.clone();

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!(
        addr = %bind_addr,
        products = assistant.catalog().len(),
        max_sessions = config.server.max_sessions,
        "server listening"
    );
    println!("Betsy listening on http://{}", bind_addr);

    axum::serve(listener, router(assistant, config.server.max_sessions)).await?;
    Ok(())
}

/// The full route table over `assistant`.
pub fn router(assistant: Arc<Assistant>, max_sessions: usize) -> Router {
    let state = AppState {
        assistant,
        sessions: Arc::new(Mutex::new(HashMap::new())),
        max_sessions,
    };

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(handle_health))
        .route("/sessions", post(handle_create_session))
        .route(
            "/sessions/{id}/messages",
            get(handle_get_messages).post(handle_submit),
        )
        .route("/sessions/{id}/reset", post(handle_reset))
        .route("/sessions/{id}", axum::routing::delete(handle_delete))
        .layer(cors)
        .with_state(state)
}

// ============ Errors ============

/// JSON error response body.
#[derive(Serialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Serialize)]
struct ErrorDetail {
    /// Machine-readable error code (e.g., `"bad_request"`, `"not_found"`).
    code: String,
    message: String,
}

/// Internal error type that converts into an Axum HTTP response.
#[derive(Debug)]
struct AppError {
    status: StatusCode,
    code: String,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: ErrorDetail {
                code: self.code,
                message: self.message,
            },
        };
        (self.status, Json(body)).into_response()
    }
}

fn bad_request(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::BAD_REQUEST,
        code: "bad_request".to_string(),
        message: message.into(),
    }
}

fn not_found(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::NOT_FOUND,
        code: "not_found".to_string(),
        message: message.into(),
    }
}

/// Constructs a 503 error when the session registry is full.
fn capacity(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::SERVICE_UNAVAILABLE,
        code: "capacity".to_string(),
        message: message.into(),
    }
}

fn internal(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::INTERNAL_SERVER_ERROR,
        code: "internal".to_string(),
        message: message.into(),
    }
}

fn unknown_session(id: &str) -> AppError {
    not_found(format!("unknown session: {}", id))
}

// ============ GET /health ============

#[derive(Serialize)]
struct HealthResponse {
    /// Always `"ok"` when the server is running.
    status: String,
    version: String,
    products: usize,
}

async fn handle_health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        products: state.assistant.catalog().len(),
    })
}

// ============ Sessions ============

/// Response body carrying a session's id and full log.
#[derive(Serialize)]
struct SessionResponse {
    id: String,
    messages: Vec<Message>,
}

impl SessionResponse {
    fn new(id: impl Into<String>, session: &Session) -> Self {
        Self {
            id: id.into(),
            messages: session.messages().to_vec(),
        }
    }
}

async fn handle_create_session(
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<SessionResponse>), AppError> {
    let mut sessions = state.sessions()?;
    if sessions.len() >= state.max_sessions {
        tracing::warn!(open = sessions.len(), "session limit reached");
        return Err(capacity(format!(
            "session limit of {} reached",
            state.max_sessions
        )));
    }

    let id = uuid::Uuid::new_v4().to_string();
    let session = state.assistant.start_session();
    let body = SessionResponse::new(id.clone(), &session);
    sessions.insert(id.clone(), session);
    tracing::debug!(%id, open = sessions.len(), "session opened");

    Ok((StatusCode::CREATED, Json(body)))
}

async fn handle_get_messages(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SessionResponse>, AppError> {
    let sessions = state.sessions()?;
    let session = sessions.get(&id).ok_or_else(|| unknown_session(&id))?;
    Ok(Json(SessionResponse::new(id, session)))
}

/// Request body for `POST /sessions/{id}/messages`.
#[derive(Deserialize)]
struct QueryRequest {
    query: String,
}

/// Handler for `POST /sessions/{id}/messages`.
///
/// A blank query is accepted and answered with `null`; the session is left
/// untouched.
async fn handle_submit(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<QueryRequest>, JsonRejection>,
) -> Result<Json<Option<TurnResult>>, AppError> {
    let Json(request) = body.map_err(|e| bad_request(e.body_text()))?;

    let mut sessions = state.sessions()?;
    let session = sessions.get_mut(&id).ok_or_else(|| unknown_session(&id))?;
    let turn = state.assistant.submit(session, &request.query);
    Ok(Json(turn))
}

async fn handle_reset(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SessionResponse>, AppError> {
    let mut sessions = state.sessions()?;
    let session = sessions.get_mut(&id).ok_or_else(|| unknown_session(&id))?;
    state.assistant.reset(session);
    Ok(Json(SessionResponse::new(id, session)))
}

async fn handle_delete(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    let mut sessions = state.sessions()?;
    sessions.remove(&id).ok_or_else(|| unknown_session(&id))?;
    tracing::debug!(%id, open = sessions.len(), "session closed");
    Ok(StatusCode::NO_CONTENT)
}

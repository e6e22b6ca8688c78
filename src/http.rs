use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    response::{
        IntoResponse,
        sse::{Event, KeepAlive, Sse},
    },
    routing::{get, post},
};
use futures::{Stream, StreamExt};
use serde::{Deserialize, Serialize};
use tokio_stream::wrappers::BroadcastStream;
use tower_http::trace::TraceLayer;
use tracing::warn;

use crate::{
    orchestrator::{ChatSession, SendOutcome},
    types::{GenerateResult, Message, SafetySettings},
};

#[derive(Clone)]
pub struct AppState {
    pub session: Arc<ChatSession>,
}

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub content: String,
}

#[derive(Debug, Deserialize)]
pub struct GenerateRequest {
    pub prompt: String,
}

#[derive(Debug, Deserialize)]
pub struct LimitQuery {
    #[serde(default = "default_limit")]
    pub limit: usize,
}

fn default_limit() -> usize {
    200
}

#[derive(Serialize)]
struct ClearedResponse {
    cleared: bool,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/health", get(health))
        .route("/messages", get(list_messages))
        .route("/chat", post(chat))
        .route("/generate", post(generate))
        .route("/events", get(events))
        .route("/settings", get(get_settings).put(put_settings))
        .route("/clear", post(clear))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn index() -> &'static str {
    "nanochat on-device assistant demo"
}

async fn health() -> &'static str {
    "ok"
}

async fn list_messages(
    State(state): State<AppState>,
    Query(query): Query<LimitQuery>,
) -> Result<Json<Vec<Message>>, (StatusCode, String)> {
    let messages = state
        .session
        .messages(query.limit)
        .await
        .map_err(internal_error)?;
    Ok(Json(messages))
}

async fn chat(
    State(state): State<AppState>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<SendOutcome>, (StatusCode, String)> {
    if request.content.trim().is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            "content must not be empty".to_owned(),
        ));
    }

    let outcome = state
        .session
        .send_message(&request.content)
        .await
        .map_err(internal_error)?;
    Ok(Json(outcome))
}

async fn generate(
    State(state): State<AppState>,
    Json(request): Json<GenerateRequest>,
) -> Sse<impl Stream<Item = Result<Event, axum::Error>>> {
    let stream = state
        .session
        .generate(&request.prompt)
        .await
        .map(|result| {
            Event::default()
                .event(event_name(&result))
                .json_data(&result)
        });
    Sse::new(stream).keep_alive(KeepAlive::default())
}

async fn events(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, axum::Error>>> {
    let stream = BroadcastStream::new(state.session.subscribe()).filter_map(|update| async move {
        match update {
            Ok(message) => Some(Event::default().event("message").json_data(&message)),
            Err(error) => {
                warn!(?error, "event subscriber lagged; skipping updates");
                None
            }
        }
    });
    Sse::new(stream).keep_alive(KeepAlive::default())
}

async fn get_settings(State(state): State<AppState>) -> Json<SafetySettings> {
    Json(state.session.safety_settings().await)
}

async fn put_settings(
    State(state): State<AppState>,
    Json(settings): Json<SafetySettings>,
) -> Json<SafetySettings> {
    state.session.update_safety_settings(settings).await;
    Json(settings)
}

async fn clear(State(state): State<AppState>) -> Result<impl IntoResponse, (StatusCode, String)> {
    state.session.clear_chat().await.map_err(internal_error)?;
    Ok(Json(ClearedResponse { cleared: true }))
}

fn event_name(result: &GenerateResult) -> &'static str {
    match result {
        GenerateResult::Processing => "processing",
        GenerateResult::Chunk(_) => "chunk",
        GenerateResult::Complete(_) => "complete",
        GenerateResult::Filtered(_) => "filtered",
        GenerateResult::Error(_) => "error",
    }
}

fn internal_error(error: anyhow::Error) -> (StatusCode, String) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        format!("internal error: {error}"),
    )
}

//! REST endpoints for checkup sessions.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{Value, json};
use uuid::Uuid;

use crate::error::ValidationError;

use super::manager::AssessmentManager;
use super::registry::SessionRegistry;
use super::session::SessionSnapshot;

/// Shared state for session routes.
#[derive(Clone)]
pub struct SessionRouteState {
    pub registry: Arc<SessionRegistry>,
}

fn status_for(error: &ValidationError) -> StatusCode {
    match error {
        ValidationError::QuestionMismatch { .. }
        | ValidationError::UnknownOption { .. }
        | ValidationError::EmptyQuestionnaire
        | ValidationError::DuplicateQuestion(_)
        | ValidationError::DuplicateOption { .. } => StatusCode::BAD_REQUEST,
        ValidationError::Unanswered { .. }
        | ValidationError::AtFirstQuestion
        | ValidationError::InvalidTransition { .. } => StatusCode::CONFLICT,
    }
}

fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(json!({ "error": message.into() }))).into_response()
}

fn respond(result: Result<SessionSnapshot, ValidationError>) -> Response {
    match result {
        Ok(snapshot) => Json(snapshot).into_response(),
        Err(e) => error_response(status_for(&e), e.to_string()),
    }
}

async fn lookup(state: &SessionRouteState, id: Uuid) -> Result<Arc<AssessmentManager>, Response> {
    state
        .registry
        .get(id)
        .await
        .ok_or_else(|| error_response(StatusCode::NOT_FOUND, format!("No session {id}")))
}

/// GET /api/questionnaire
async fn get_questionnaire(State(state): State<SessionRouteState>) -> impl IntoResponse {
    Json(json!({ "questions": state.registry.questionnaire().questions() }))
}

/// POST /api/sessions
async fn start_session(State(state): State<SessionRouteState>) -> impl IntoResponse {
    let manager = state.registry.start_session().await;
    let snapshot = manager.snapshot().await;
    (
        StatusCode::CREATED,
        Json(json!({ "sessionId": manager.id(), "snapshot": snapshot })),
    )
}

/// GET /api/sessions/{id}
async fn get_session(State(state): State<SessionRouteState>, Path(id): Path<Uuid>) -> Response {
    match lookup(&state, id).await {
        Ok(manager) => Json(manager.snapshot().await).into_response(),
        Err(response) => response,
    }
}

/// DELETE /api/sessions/{id}
async fn end_session(State(state): State<SessionRouteState>, Path(id): Path<Uuid>) -> Response {
    if state.registry.end_session(id).await {
        StatusCode::NO_CONTENT.into_response()
    } else {
        error_response(StatusCode::NOT_FOUND, format!("No session {id}"))
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AnswerBody {
    question_id: String,
    /// Option value; numbers are accepted for scale questions.
    value: Value,
}

/// POST /api/sessions/{id}/answers
async fn record_answer(
    State(state): State<SessionRouteState>,
    Path(id): Path<Uuid>,
    Json(body): Json<AnswerBody>,
) -> Response {
    let manager = match lookup(&state, id).await {
        Ok(manager) => manager,
        Err(response) => return response,
    };
    let value = match body.value {
        Value::String(s) => s,
        Value::Number(n) => n.to_string(),
        _ => return error_response(StatusCode::BAD_REQUEST, "Answer value must be a string or number"),
    };
    respond(manager.record_answer(&body.question_id, &value).await)
}

/// POST /api/sessions/{id}/advance
async fn advance(State(state): State<SessionRouteState>, Path(id): Path<Uuid>) -> Response {
    match lookup(&state, id).await {
        Ok(manager) => respond(manager.advance().await),
        Err(response) => response,
    }
}

/// POST /api/sessions/{id}/retreat
async fn retreat(State(state): State<SessionRouteState>, Path(id): Path<Uuid>) -> Response {
    match lookup(&state, id).await {
        Ok(manager) => respond(manager.retreat().await),
        Err(response) => response,
    }
}

/// POST /api/sessions/{id}/dismiss-crisis
async fn dismiss_crisis(State(state): State<SessionRouteState>, Path(id): Path<Uuid>) -> Response {
    match lookup(&state, id).await {
        Ok(manager) => respond(manager.dismiss_crisis_interrupt().await),
        Err(response) => response,
    }
}

/// POST /api/sessions/{id}/restart
async fn restart(State(state): State<SessionRouteState>, Path(id): Path<Uuid>) -> Response {
    match lookup(&state, id).await {
        Ok(manager) => Json(manager.restart().await).into_response(),
        Err(response) => response,
    }
}

/// Build the session REST routes.
pub fn session_routes(state: SessionRouteState) -> Router {
    Router::new()
        .route("/api/questionnaire", get(get_questionnaire))
        .route("/api/sessions", post(start_session))
        .route("/api/sessions/{id}", get(get_session).delete(end_session))
        .route("/api/sessions/{id}/answers", post(record_answer))
        .route("/api/sessions/{id}/advance", post(advance))
        .route("/api/sessions/{id}/retreat", post(retreat))
        .route("/api/sessions/{id}/dismiss-crisis", post(dismiss_crisis))
        .route("/api/sessions/{id}/restart", post(restart))
        .with_state(state)
}

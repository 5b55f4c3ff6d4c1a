//! Wellness Check — questionnaire flow with crisis interrupt and
//! AI-backed analysis that always degrades to a usable result.

pub mod analysis;
pub mod assessment;
pub mod config;
pub mod error;
pub mod llm;

use std::sync::Arc;

use axum::routing::get;
use axum::{Json, Router};
use tower_http::cors::CorsLayer;

use analysis::{AnalysisGateway, AnalysisRouteState, analysis_routes};
use assessment::{SessionRegistry, SessionRouteState, session_routes};

/// GET /health
async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok", "version": env!("CARGO_PKG_VERSION") }))
}

/// Assemble the full HTTP surface: session routes, analysis routes and
/// `/health`, with permissive CORS.
pub fn app(registry: Arc<SessionRegistry>, gateway: Arc<AnalysisGateway>) -> Router {
    session_routes(SessionRouteState { registry })
        .merge(analysis_routes(AnalysisRouteState { gateway }))
        .route("/health", get(health))
        .layer(CorsLayer::permissive())
}

//! REST endpoints for stand-alone analyses.
//!
//! Provider failure never produces a 5xx here: the gateway has already
//! substituted a fallback by the time a handler sees the result.

use std::sync::{Arc, LazyLock};

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use regex::Regex;
use serde::Deserialize;
use serde_json::{Map, Value, json};
use tracing::debug;

use super::gateway::AnalysisGateway;
use super::model::{AnswerSet, InsightsRequest};

static DATA_URL_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^data:image/[a-z]+;base64,").expect("valid data URL regex"));

/// Shared state for analysis routes.
#[derive(Clone)]
pub struct AnalysisRouteState {
    pub gateway: Arc<AnalysisGateway>,
}

fn bad_request(message: &str) -> Response {
    (StatusCode::BAD_REQUEST, Json(json!({ "error": message }))).into_response()
}

/// Strip an optional `data:image/...;base64,` prefix and decode.
pub fn decode_image_payload(payload: &str) -> Result<Vec<u8>, base64::DecodeError> {
    let stripped = DATA_URL_PREFIX.replace(payload.trim(), "");
    STANDARD.decode(stripped.as_bytes())
}

/// Flatten `{question: string | number}` into an answer set.
fn answers_from_json(responses: &Map<String, Value>) -> Option<AnswerSet> {
    responses
        .iter()
        .map(|(key, value)| match value {
            Value::String(s) => Some((key.clone(), s.clone())),
            Value::Number(n) => Some((key.clone(), n.to_string())),
            _ => None,
        })
        .collect()
}

#[derive(Debug, Deserialize)]
struct AnalyzeWellnessBody {
    responses: Option<Value>,
}

/// POST /api/ai/analyze-wellness
async fn analyze_wellness(
    State(state): State<AnalysisRouteState>,
    Json(body): Json<AnalyzeWellnessBody>,
) -> Response {
    let answers = match body.responses {
        Some(Value::Object(map)) => answers_from_json(&map),
        _ => None,
    };
    let Some(answers) = answers else {
        return bad_request("Invalid wellness responses data");
    };

    let analysis = state.gateway.analyze_wellness(&answers).await;
    Json(json!({ "success": true, "analysis": analysis })).into_response()
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AnalyzePhotoBody {
    image_base64: Option<String>,
    analysis_type: Option<String>,
}

/// POST /api/ai/analyze-photo
///
/// `analysisType` is `"food"` or `"health"`.
async fn analyze_photo(
    State(state): State<AnalysisRouteState>,
    Json(body): Json<AnalyzePhotoBody>,
) -> Response {
    let (Some(image_base64), Some(analysis_type)) = (body.image_base64, body.analysis_type) else {
        return bad_request("Missing image data or analysis type");
    };
    if image_base64.trim().is_empty() {
        return bad_request("Missing image data or analysis type");
    }
    if analysis_type != "food" && analysis_type != "health" {
        return bad_request("Invalid analysis type. Must be \"food\" or \"health\"");
    }

    let image = match decode_image_payload(&image_base64) {
        Ok(bytes) => bytes,
        Err(e) => {
            debug!(error = %e, "Rejected undecodable image payload");
            return bad_request("Image data is not valid base64");
        }
    };

    let analysis = if analysis_type == "food" {
        serde_json::to_value(state.gateway.analyze_food(image).await)
    } else {
        serde_json::to_value(state.gateway.analyze_health_indicators(image).await)
    };

    match analysis {
        Ok(analysis) => Json(json!({
            "success": true,
            "analysis": analysis,
            "analysisType": analysis_type,
        }))
        .into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": format!("Failed to serialize analysis: {e}") })),
        )
            .into_response(),
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InsightsBody {
    recent_scores: Option<Vec<u32>>,
    #[serde(default)]
    patterns: Option<Map<String, Value>>,
    #[serde(default)]
    goals: Option<Vec<String>>,
}

/// POST /api/ai/insights
async fn insights(
    State(state): State<AnalysisRouteState>,
    Json(body): Json<InsightsBody>,
) -> Response {
    let Some(recent_scores) = body.recent_scores else {
        return bad_request("Invalid recent scores data");
    };
    let request = InsightsRequest {
        recent_scores,
        patterns: body.patterns.unwrap_or_default(),
        goals: body.goals.unwrap_or_default(),
    };

    let insights = state.gateway.generate_insights(&request).await;
    Json(json!({ "success": true, "insights": insights })).into_response()
}

/// Build the analysis REST routes.
pub fn analysis_routes(state: AnalysisRouteState) -> Router {
    Router::new()
        .route("/api/ai/analyze-wellness", post(analyze_wellness))
        .route("/api/ai/analyze-photo", post(analyze_photo))
        .route("/api/ai/insights", post(insights))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_strips_data_url_prefix() {
        assert_eq!(decode_image_payload("data:image/jpeg;base64,/9g=").unwrap(), vec![0xFF, 0xD8]);
        let png = decode_image_payload("data:image/png;base64,iVBORw0KGgo=").unwrap();
        assert_eq!(&png[1..4], b"PNG");
        assert_eq!(decode_image_payload("/9g=").unwrap(), vec![0xFF, 0xD8]);
    }

    #[test]
    fn decode_rejects_garbage() {
        assert!(decode_image_payload("not base64!!").is_err());
    }

    #[test]
    fn decode_keeps_non_image_prefix() {
        // Only image data URLs are stripped, so this is undecodable.
        assert!(decode_image_payload("data:text/plain;base64,aGk=").is_err());
    }

    #[test]
    fn answers_accept_strings_and_numbers() {
        let map = json!({"mood": 5, "safety": "no"});
        let answers = answers_from_json(map.as_object().unwrap()).unwrap();
        assert_eq!(answers["mood"], "5");
        assert_eq!(answers["safety"], "no");
    }

    #[test]
    fn answers_reject_nested_values() {
        let map = json!({"mood": {"value": 5}});
        assert!(answers_from_json(map.as_object().unwrap()).is_none());
    }
}

//! Integration tests for the HTTP provider clients.
//!
//! A stub Axum server stands in for the OpenAI-compatible and Gemini
//! endpoints so the real wire formats are exercised end to end.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::routing::post;
use axum::{Json, Router};
use secrecy::SecretString;
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tokio::time::timeout;

use wellness_check::analysis::{AnalysisGateway, GatewayConfig, fallback};
use wellness_check::error::LlmError;
use wellness_check::llm::{
    ChatMessage, CompletionRequest, FinishReason, GeminiProvider, ImageAttachment, LlmProvider,
    OpenAiCompatProvider,
};

/// Maximum time any test is allowed to run before we consider it hung.
const TEST_TIMEOUT: Duration = Duration::from_secs(10);

/// A request as the stub saw it.
#[derive(Debug, Clone)]
struct Seen {
    path: String,
    auth: Option<String>,
    body: Value,
}

type Log = Arc<Mutex<Vec<Seen>>>;

fn header(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

async fn openai_ok(State(log): State<Log>, headers: HeaderMap, Json(body): Json<Value>) -> Json<Value> {
    log.lock().unwrap().push(Seen {
        path: "/v1/chat/completions".into(),
        auth: header(&headers, "authorization"),
        body,
    });
    Json(json!({
        "choices": [{
            "message": {
                "content": "Here you go: {\"foodName\": \"Salad\", \"confidence\": 0.8, \"nutrition\": {\"calories\": 220, \"protein\": 6, \"carbs\": 18, \"fat\": 14, \"fiber\": 5, \"sugar\": 7, \"sodium\": 310}}"
            },
            "finish_reason": "stop"
        }],
        "usage": {"prompt_tokens": 900, "completion_tokens": 60}
    }))
}

async fn openai_fail() -> impl IntoResponse {
    (StatusCode::INTERNAL_SERVER_ERROR, "upstream exploded")
}

async fn openai_slow() -> Json<Value> {
    tokio::time::sleep(Duration::from_secs(5)).await;
    Json(json!({ "choices": [] }))
}

async fn gemini(
    State(log): State<Log>,
    Path(call): Path<String>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Json<Value> {
    log.lock().unwrap().push(Seen {
        path: format!("/gemini/models/{call}"),
        auth: header(&headers, "x-goog-api-key"),
        body,
    });
    Json(json!({
        "candidates": [{
            "content": {"parts": [
                {"text": "{\"overallScore\": 64, "},
                {"text": "\"category\": \"fair\"}"}
            ]},
            "finishReason": "STOP"
        }],
        "usageMetadata": {"promptTokenCount": 300, "candidatesTokenCount": 20}
    }))
}

/// Start the stub provider server, return (base URL, request log).
async fn start_stub() -> (String, Log) {
    let log: Log = Arc::new(Mutex::new(Vec::new()));
    let app = Router::new()
        .route("/v1/chat/completions", post(openai_ok))
        .route("/fail/chat/completions", post(openai_fail))
        .route("/slow/chat/completions", post(openai_slow))
        .route("/gemini/models/{call}", post(gemini))
        .with_state(log.clone());

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    // Give the server a moment to start accepting connections.
    tokio::time::sleep(Duration::from_millis(50)).await;

    (format!("http://127.0.0.1:{port}"), log)
}

fn openai(endpoint: String, timeout: Duration) -> OpenAiCompatProvider {
    OpenAiCompatProvider::new(
        "openrouter",
        endpoint,
        Some(SecretString::from("sk-test")),
        "vision-test",
        timeout,
    )
    .unwrap()
}

// ── OpenAI-compatible ────────────────────────────────────────────────

#[tokio::test]
async fn openai_sends_bearer_and_image_data_url() {
    timeout(TEST_TIMEOUT, async {
        let (base, log) = start_stub().await;
        let provider = openai(format!("{base}/v1/chat/completions"), Duration::from_secs(5));

        let request = CompletionRequest::new(vec![
            ChatMessage::user("What is this?").with_image(ImageAttachment::from_bytes(vec![0xFF, 0xD8])),
        ])
        .with_max_tokens(100);
        let response = provider.complete(request).await.unwrap();

        assert!(response.content.contains("Salad"));
        assert_eq!(response.input_tokens, 900);
        assert_eq!(response.output_tokens, 60);
        assert_eq!(response.finish_reason, FinishReason::Stop);

        let seen = log.lock().unwrap()[0].clone();
        assert_eq!(seen.auth.as_deref(), Some("Bearer sk-test"));
        assert_eq!(seen.body["model"], "vision-test");
        assert_eq!(seen.body["max_tokens"], 100);
        let parts = seen.body["messages"][0]["content"].as_array().unwrap();
        assert_eq!(parts[0]["text"], "What is this?");
        assert_eq!(parts[1]["image_url"]["url"], "data:image/jpeg;base64,/9g=");
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn openai_non_2xx_is_http_status_error() {
    timeout(TEST_TIMEOUT, async {
        let (base, _log) = start_stub().await;
        let provider = openai(format!("{base}/fail/chat/completions"), Duration::from_secs(5));

        let err = provider
            .complete(CompletionRequest::new(vec![ChatMessage::user("hi")]))
            .await
            .unwrap_err();
        match err {
            LlmError::HttpStatus { status, body, .. } => {
                assert_eq!(status, 500);
                assert_eq!(body, "upstream exploded");
            }
            other => panic!("expected HttpStatus, got {other:?}"),
        }
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn openai_client_timeout_is_timeout_error() {
    timeout(TEST_TIMEOUT, async {
        let (base, _log) = start_stub().await;
        let provider = openai(format!("{base}/slow/chat/completions"), Duration::from_millis(200));

        let err = provider
            .complete(CompletionRequest::new(vec![ChatMessage::user("hi")]))
            .await
            .unwrap_err();
        assert!(matches!(err, LlmError::Timeout { .. }), "got {err:?}");
    })
    .await
    .expect("test timed out");
}

// ── Gemini ───────────────────────────────────────────────────────────

#[tokio::test]
async fn gemini_sends_key_header_and_joins_parts() {
    timeout(TEST_TIMEOUT, async {
        let (base, log) = start_stub().await;
        let provider = GeminiProvider::new(
            format!("{base}/gemini"),
            Some(SecretString::from("g-key")),
            "gemini-test",
            Duration::from_secs(5),
        )
        .unwrap();

        let request = CompletionRequest::new(vec![
            ChatMessage::system("Be kind."),
            ChatMessage::user("Score me."),
        ])
        .with_temperature(0.4);
        let response = provider.complete(request).await.unwrap();

        assert_eq!(response.content, r#"{"overallScore": 64, "category": "fair"}"#);
        assert_eq!(response.input_tokens, 300);

        let seen = log.lock().unwrap()[0].clone();
        assert_eq!(seen.path, "/gemini/models/gemini-test:generateContent");
        assert_eq!(seen.auth.as_deref(), Some("g-key"));
        assert_eq!(seen.body["systemInstruction"]["parts"][0]["text"], "Be kind.");
        assert_eq!(seen.body["contents"][0]["role"], "user");
        assert!(seen.body["generationConfig"]["temperature"].is_number());
    })
    .await
    .expect("test timed out");
}

// ── Gateway over real clients ────────────────────────────────────────

#[tokio::test]
async fn gateway_normalizes_live_replies() {
    timeout(TEST_TIMEOUT, async {
        let (base, _log) = start_stub().await;
        let text: Arc<dyn LlmProvider> = Arc::new(
            GeminiProvider::new(
                format!("{base}/gemini"),
                Some(SecretString::from("g-key")),
                "gemini-test",
                Duration::from_secs(5),
            )
            .unwrap(),
        );
        let vision: Arc<dyn LlmProvider> =
            Arc::new(openai(format!("{base}/v1/chat/completions"), Duration::from_secs(5)));
        let gateway = AnalysisGateway::new(text, vision, GatewayConfig::default());

        let wellness = gateway.analyze_wellness(&Default::default()).await;
        assert_eq!(wellness.overall_score, 64);
        assert!(wellness.recommendations.is_empty());

        let food = gateway.analyze_food(vec![0xFF, 0xD8, 0xFF]).await;
        assert_eq!(food.food_name, "Salad");
        assert_eq!(food.confidence, Some(0.8));
        assert_eq!(food.nutrition.calories, 220.0);
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn gateway_falls_back_on_server_error() {
    timeout(TEST_TIMEOUT, async {
        let (base, _log) = start_stub().await;
        let failing: Arc<dyn LlmProvider> =
            Arc::new(openai(format!("{base}/fail/chat/completions"), Duration::from_secs(5)));
        let gateway = AnalysisGateway::new(failing.clone(), failing, GatewayConfig::default());

        assert_eq!(&gateway.analyze_food(vec![1, 2, 3]).await, fallback::food());
        assert_eq!(
            &gateway.analyze_health_indicators(vec![1, 2, 3]).await,
            fallback::health_indicators()
        );
    })
    .await
    .expect("test timed out");
}

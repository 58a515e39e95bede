use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode, Uri},
    response::{IntoResponse, Response},
    Router,
};
use serde_json::{json, Value};

use fitzone_backend::config::GeminiConfig;
use fitzone_backend::llm::{ChatModel, ChatRequest, GeminiClient, LlmError, Turn};

/// Scripted stand-in for the Gemini API. Each call pops the next status;
/// once the script runs out every call succeeds.
#[derive(Clone)]
struct FakeGemini {
    calls: Arc<AtomicUsize>,
    script: Arc<Mutex<Vec<StatusCode>>>,
    delay: Duration,
    last_key: Arc<Mutex<Option<String>>>,
    last_path: Arc<Mutex<Option<String>>>,
    last_body: Arc<Mutex<Option<Value>>>,
}

impl FakeGemini {
    fn new(script: Vec<StatusCode>) -> Self {
        Self {
            calls: Arc::new(AtomicUsize::new(0)),
            script: Arc::new(Mutex::new(script)),
            delay: Duration::ZERO,
            last_key: Arc::new(Mutex::new(None)),
            last_path: Arc::new(Mutex::new(None)),
            last_body: Arc::new(Mutex::new(None)),
        }
    }
}

async fn generate(
    State(fake): State<FakeGemini>,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    fake.calls.fetch_add(1, Ordering::SeqCst);
    *fake.last_path.lock().unwrap() = Some(uri.path().to_string());
    *fake.last_key.lock().unwrap() = headers
        .get("x-goog-api-key")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    *fake.last_body.lock().unwrap() = serde_json::from_slice(&body).ok();

    if !fake.delay.is_zero() {
        tokio::time::sleep(fake.delay).await;
    }

    let next = {
        let mut script = fake.script.lock().unwrap();
        if script.is_empty() {
            None
        } else {
            Some(script.remove(0))
        }
    };
    match next {
        Some(status) if !status.is_success() => (status, "scripted failure").into_response(),
        _ => axum::Json(json!({
            "candidates": [{
                "content": {"role": "model", "parts": [{"text": "Keep "}, {"text": "moving!"}]}
            }]
        }))
        .into_response(),
    }
}

async fn spawn(fake: FakeGemini) -> String {
    let app = Router::new().fallback(generate).with_state(fake);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}/v1beta")
}

fn config(base_url: String, max_retries: u32, timeout: Duration) -> GeminiConfig {
    GeminiConfig {
        api_key: Some("secret".into()),
        model: "gemini-test".into(),
        temperature: 0.6,
        base_url,
        timeout,
        max_retries,
    }
}

fn request() -> ChatRequest {
    let mut req = ChatRequest::new("coach", "Be brief.");
    req.push(Turn::user("Motivate me"));
    req
}

#[tokio::test]
async fn test_success_concatenates_parts() {
    let fake = FakeGemini::new(vec![]);
    let base = spawn(fake.clone()).await;
    let client = GeminiClient::from_config(&config(base, 1, Duration::from_secs(5)))
        .unwrap()
        .unwrap();

    let text = client.complete(&request()).await.unwrap();
    assert_eq!(text, "Keep moving!");
    assert_eq!(fake.calls.load(Ordering::SeqCst), 1);
    assert_eq!(fake.last_key.lock().unwrap().as_deref(), Some("secret"));
    assert_eq!(
        fake.last_path.lock().unwrap().as_deref(),
        Some("/v1beta/models/gemini-test:generateContent")
    );

    let body = fake.last_body.lock().unwrap().clone().unwrap();
    assert_eq!(body["systemInstruction"]["parts"][0]["text"], "Be brief.");
    assert_eq!(body["contents"][0]["role"], "user");
    assert_eq!(body["contents"][0]["parts"][0]["text"], "Motivate me");
}

#[tokio::test]
async fn test_retries_transient_status() {
    let fake = FakeGemini::new(vec![StatusCode::SERVICE_UNAVAILABLE]);
    let base = spawn(fake.clone()).await;
    let client = GeminiClient::new("secret", &config(base, 1, Duration::from_secs(5))).unwrap();

    let text = client.complete(&request()).await.unwrap();
    assert_eq!(text, "Keep moving!");
    assert_eq!(fake.calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_retry_budget_exhausted() {
    let fake = FakeGemini::new(vec![
        StatusCode::SERVICE_UNAVAILABLE,
        StatusCode::TOO_MANY_REQUESTS,
    ]);
    let base = spawn(fake.clone()).await;
    let client = GeminiClient::new("secret", &config(base, 1, Duration::from_secs(5))).unwrap();

    let err = client.complete(&request()).await.unwrap_err();
    assert!(matches!(err, LlmError::Status { status: 429, .. }));
    assert_eq!(fake.calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_client_error_not_retried() {
    let fake = FakeGemini::new(vec![StatusCode::BAD_REQUEST]);
    let base = spawn(fake.clone()).await;
    let client = GeminiClient::new("secret", &config(base, 3, Duration::from_secs(5))).unwrap();

    let err = client.complete(&request()).await.unwrap_err();
    assert!(matches!(err, LlmError::Status { status: 400, .. }));
    assert_eq!(fake.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_timeout_reported() {
    let mut fake = FakeGemini::new(vec![]);
    fake.delay = Duration::from_secs(2);
    let base = spawn(fake.clone()).await;
    let client =
        GeminiClient::new("secret", &config(base, 0, Duration::from_millis(200))).unwrap();

    let err = client.complete(&request()).await.unwrap_err();
    assert!(matches!(err, LlmError::Timeout));
}

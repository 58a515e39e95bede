// Gemini `generateContent` client.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::{ChatModel, ChatRequest, LlmError, TurnRole};
use crate::config::GeminiConfig;

const API_KEY_HEADER: &str = "x-goog-api-key";
const RETRY_BACKOFF: Duration = Duration::from_millis(250);

// =============================================================================
// Wire types
// =============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content<'a>>,
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'static str>,
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

impl GenerateResponse {
    /// Concatenate the text parts of the first candidate.
    fn into_text(self) -> Option<String> {
        let content = self.candidates.into_iter().next()?.content?;
        let text: String = content.parts.into_iter().filter_map(|p| p.text).collect();
        if text.trim().is_empty() {
            None
        } else {
            Some(text)
        }
    }
}

fn wire_role(role: TurnRole) -> &'static str {
    match role {
        TurnRole::User => "user",
        TurnRole::Model => "model",
    }
}

// =============================================================================
// Client
// =============================================================================

/// Shared Gemini client. Holds one connection pool for the whole process.
pub struct GeminiClient {
    headers: HeaderMap,
    http: reqwest::Client,
    base_url: String,
    model: String,
    temperature: f32,
    max_retries: u32,
}

impl GeminiClient {
    pub fn new(api_key: &str, config: &GeminiConfig) -> Result<Self, LlmError> {
        let mut key = HeaderValue::from_str(api_key)
            .map_err(|_| LlmError::Config("API key is not a valid header value".into()))?;
        key.set_sensitive(true);
        let mut headers = HeaderMap::new();
        headers.insert(API_KEY_HEADER, key);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| LlmError::Transport(e.to_string()))?;
        Ok(Self {
            headers,
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            temperature: config.temperature,
            max_retries: config.max_retries,
        })
    }

    /// Build a client when the config carries an API key.
    pub fn from_config(config: &GeminiConfig) -> Result<Option<Self>, LlmError> {
        match config.api_key.as_deref() {
            Some(key) => Self::new(key, config).map(Some),
            None => Ok(None),
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }

    fn build_body<'a>(&self, request: &'a ChatRequest) -> GenerateRequest<'a> {
        GenerateRequest {
            system_instruction: request.system.as_deref().map(|text| Content {
                role: None,
                parts: vec![Part { text }],
            }),
            contents: request
                .turns
                .iter()
                .map(|turn| Content {
                    role: Some(wire_role(turn.role)),
                    parts: vec![Part { text: &turn.text }],
                })
                .collect(),
            generation_config: GenerationConfig {
                temperature: self.temperature,
            },
        }
    }

    async fn send_once(&self, body: &GenerateRequest<'_>) -> Result<String, LlmError> {
        let response = self
            .http
            .post(self.endpoint())
            .headers(self.headers.clone())
            .json(body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::Status { status, body });
        }

        let parsed: GenerateResponse = response.json().await?;
        parsed.into_text().ok_or(LlmError::EmptyResponse)
    }
}

#[async_trait]
impl ChatModel for GeminiClient {
    fn model_name(&self) -> &str {
        &self.model
    }

    async fn complete(&self, request: &ChatRequest) -> Result<String, LlmError> {
        let body = self.build_body(request);
        let mut attempt: u32 = 0;
        loop {
            attempt += 1;
            let started = Instant::now();
            debug!(
                model = %self.model,
                purpose = request.purpose,
                attempt,
                turns = request.turns.len(),
                "Gemini request"
            );

            match self.send_once(&body).await {
                Ok(text) => {
                    debug!(
                        model = %self.model,
                        purpose = request.purpose,
                        attempt,
                        elapsed_ms = started.elapsed().as_millis() as u64,
                        "Gemini response"
                    );
                    return Ok(text);
                }
                Err(e) if e.is_transient() && attempt <= self.max_retries => {
                    warn!(
                        model = %self.model,
                        purpose = request.purpose,
                        attempt,
                        "Gemini request failed, retrying: {e}"
                    );
                    tokio::time::sleep(RETRY_BACKOFF * attempt).await;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::Turn;

    fn client() -> GeminiClient {
        GeminiClient::new("test-key", &GeminiConfig::default()).unwrap()
    }

    #[test]
    fn test_request_body_shape() {
        let mut req = ChatRequest::new("coach", "You are a coach");
        req.push(Turn::user("hi"));
        req.push(Turn::model("hello"));

        let client = client();
        let body = serde_json::to_value(client.build_body(&req)).unwrap();
        assert_eq!(body["systemInstruction"]["parts"][0]["text"], "You are a coach");
        assert!(body["systemInstruction"].get("role").is_none());
        assert_eq!(body["contents"][0]["role"], "user");
        assert_eq!(body["contents"][1]["role"], "model");
        assert_eq!(body["contents"][1]["parts"][0]["text"], "hello");
        assert!((body["generationConfig"]["temperature"].as_f64().unwrap() - 0.6).abs() < 1e-6);
    }

    #[test]
    fn test_no_system_instruction_omitted() {
        let req = ChatRequest {
            purpose: "coach",
            system: None,
            turns: vec![Turn::user("hi")],
        };
        let body = serde_json::to_value(client().build_body(&req)).unwrap();
        assert!(body.get("systemInstruction").is_none());
    }

    #[test]
    fn test_invalid_api_key_rejected_at_construction() {
        let err = GeminiClient::new("bad\nkey", &GeminiConfig::default())
            .err()
            .unwrap();
        assert!(matches!(err, LlmError::Config(_)));
        assert!(!err.is_transient());
    }

    #[test]
    fn test_api_key_header_prepared_once() {
        let client = client();
        assert_eq!(client.headers.get(API_KEY_HEADER).unwrap(), "test-key");
        assert!(client.headers.get(API_KEY_HEADER).unwrap().is_sensitive());
        assert_eq!(client.headers.get(CONTENT_TYPE).unwrap(), "application/json");
    }

    #[test]
    fn test_endpoint() {
        let config = GeminiConfig {
            base_url: "http://localhost:1234/v1beta/".into(),
            ..GeminiConfig::default()
        };
        let client = GeminiClient::new("k", &config).unwrap();
        assert_eq!(
            client.endpoint(),
            "http://localhost:1234/v1beta/models/gemini-2.5-flash:generateContent"
        );
    }

    #[test]
    fn test_response_text_concatenated() {
        let raw = r#"{"candidates":[{"content":{"role":"model","parts":[{"text":"Hello "},{"text":"runner"}]}}]}"#;
        let parsed: GenerateResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed.into_text().as_deref(), Some("Hello runner"));
    }

    #[test]
    fn test_response_without_candidates() {
        let parsed: GenerateResponse = serde_json::from_str(r#"{"promptFeedback":{}}"#).unwrap();
        assert!(parsed.into_text().is_none());
    }

    #[test]
    fn test_from_config_without_key() {
        assert!(GeminiClient::from_config(&GeminiConfig::default())
            .unwrap()
            .is_none());
    }
}

// Language-model abstraction shared by the coach and zone reasoning.

pub mod gemini;

use async_trait::async_trait;

pub use gemini::GeminiClient;

// =============================================================================
// Message Types
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnRole {
    User,
    Model,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Turn {
    pub role: TurnRole,
    pub text: String,
}

impl Turn {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: TurnRole::User,
            text: text.into(),
        }
    }

    pub fn model(text: impl Into<String>) -> Self {
        Self {
            role: TurnRole::Model,
            text: text.into(),
        }
    }
}

/// One generation request: an optional system instruction plus the turn history.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChatRequest {
    /// What the call is for (`coach`, `reasoning`); used in logs and metrics.
    pub purpose: &'static str,
    pub system: Option<String>,
    pub turns: Vec<Turn>,
}

impl ChatRequest {
    pub fn new(purpose: &'static str, system: impl Into<String>) -> Self {
        Self {
            purpose,
            system: Some(system.into()),
            turns: Vec::new(),
        }
    }

    pub fn push(&mut self, turn: Turn) {
        self.turns.push(turn);
    }
}

// =============================================================================
// Errors
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("model request timed out")]
    Timeout,
    #[error("model request failed: {0}")]
    Transport(String),
    #[error("model API error ({status}): {body}")]
    Status { status: u16, body: String },
    #[error("model returned an empty response")]
    EmptyResponse,
    #[error("model returned an unreadable response: {0}")]
    InvalidResponse(String),
    #[error("model client misconfigured: {0}")]
    Config(String),
}

impl LlmError {
    /// Whether a retry has a reasonable chance of succeeding.
    pub fn is_transient(&self) -> bool {
        match self {
            LlmError::Timeout | LlmError::Transport(_) => true,
            LlmError::Status { status, .. } => *status == 429 || *status >= 500,
            LlmError::EmptyResponse | LlmError::InvalidResponse(_) | LlmError::Config(_) => false,
        }
    }
}

impl From<reqwest::Error> for LlmError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            LlmError::Timeout
        } else if e.is_decode() {
            LlmError::InvalidResponse(e.to_string())
        } else {
            LlmError::Transport(e.to_string())
        }
    }
}

// =============================================================================
// ChatModel Trait
// =============================================================================

/// A text-generation backend. Built once at startup and shared across requests.
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Model identifier reported back to clients.
    fn model_name(&self) -> &str;

    /// Run one generation and return the concatenated reply text.
    async fn complete(&self, request: &ChatRequest) -> Result<String, LlmError>;
}

/// Strip markdown code fences that models like to wrap JSON in.
pub fn strip_code_blocks(response: &str) -> &str {
    response
        .trim()
        .trim_start_matches("```json")
        .trim_start_matches("```")
        .trim_end_matches("```")
        .trim()
}

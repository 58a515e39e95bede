// AI coach: prompt assembly, model call, and reply shaping.
//
// Each call is stateless. The client sends the full chat history every time.

use std::time::Instant;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::engine::geo::Coordinate;
use crate::engine::route::TimeOfDay;
use crate::error::ApiError;
use crate::llm::{strip_code_blocks, ChatModel, ChatRequest, Turn};
use crate::metrics;

pub const SYSTEM_PROMPT: &str = "\
You are FitZone Coach, an energetic and motivating fitness coach in a gamified territory-capture fitness app.

Your personality:
- Enthusiastic and supportive, like a personal trainer
- Uses gaming terminology (XP, levels, conquering zones)
- Gives practical, actionable fitness advice
- Considers the user's fitness level and goals
- Recommends nearby places for workouts when relevant

When responding:
- Keep responses concise (2-3 sentences max)
- Include emojis sparingly for energy
- Reference their stats and progress
- Suggest specific activities based on time of day
- If they mention a location, recommend nearby gyms or parks

Never:
- Give medical advice
- Recommend extreme diets or dangerous exercises
- Be discouraging about their progress

Reply with a JSON object: {\"message\": string, \"suggestions\": [string] (optional), \
\"recommendedPlace\": object (optional, one of the nearby places)}.";

pub const MISSING_KEY_MESSAGE: &str = "GEMINI_API_KEY is not set";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    System,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

/// Player stats sent alongside the chat history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserContext {
    pub name: String,
    pub fitness_level: String,
    pub fitness_goals: Vec<String>,
    pub total_distance: f64,
    pub total_activities: u64,
    pub xp: u64,
    pub level: u32,
    pub streak: u32,
    pub zones_owned: u32,
    #[serde(default)]
    pub current_location: Option<Coordinate>,
    pub time_of_day: TimeOfDay,
    #[serde(default)]
    pub nearby_places: Option<Vec<Map<String, Value>>>,
}

impl UserContext {
    pub fn validate(&self) -> Result<(), ApiError> {
        if let Some(location) = &self.current_location {
            location.validate()?;
        }
        if !self.total_distance.is_finite() || self.total_distance < 0.0 {
            return Err(ApiError::validation("totalDistance must be a non-negative number"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoachResponse {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggestions: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recommended_place: Option<Map<String, Value>>,
}

/// What the model sent back, resolved once.
#[derive(Debug, Clone, PartialEq)]
pub enum CoachReply {
    /// The model answered with a JSON object.
    Structured(CoachResponse),
    /// Free text; becomes the `message` as-is.
    PlainText(String),
}

impl CoachReply {
    pub fn parse(raw: &str) -> CoachReply {
        let object = match serde_json::from_str::<Value>(strip_code_blocks(raw)) {
            Ok(Value::Object(object)) => object,
            _ => return CoachReply::PlainText(raw.trim().to_string()),
        };

        let message = object
            .get("message")
            .and_then(Value::as_str)
            .filter(|m| !m.trim().is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| raw.trim().to_string());

        let suggestions = object.get("suggestions").and_then(Value::as_array).map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect::<Vec<_>>()
        });

        let recommended_place = object
            .get("recommendedPlace")
            .and_then(Value::as_object)
            .cloned();

        CoachReply::Structured(CoachResponse {
            message,
            suggestions,
            recommended_place,
        })
    }

    pub fn into_response(self) -> CoachResponse {
        match self {
            CoachReply::Structured(response) => response,
            CoachReply::PlainText(message) => CoachResponse {
                message,
                suggestions: None,
                recommended_place: None,
            },
        }
    }
}

/// Assemble the model conversation: persona, context hint, then the chat turns.
///
/// The model takes a single system instruction, so `system` chat turns are
/// sent as user content.
pub fn build_chat_request(
    messages: &[ChatMessage],
    context: &UserContext,
) -> Result<ChatRequest, ApiError> {
    let context_json = serde_json::to_string(context)
        .map_err(|e| ApiError::validation(format!("context is not serializable: {e}")))?;

    let mut request = ChatRequest::new("coach", SYSTEM_PROMPT);
    request.push(Turn::user(format!("User context (JSON): {context_json}")));
    for msg in messages {
        let turn = match msg.role {
            Role::User | Role::System => Turn::user(msg.content.clone()),
            Role::Assistant => Turn::model(msg.content.clone()),
        };
        request.push(turn);
    }
    Ok(request)
}

/// Run one coaching exchange.
pub async fn run_coach(
    model: Option<&dyn ChatModel>,
    messages: &[ChatMessage],
    context: &UserContext,
) -> Result<CoachResponse, ApiError> {
    context.validate()?;
    let request = build_chat_request(messages, context)?;
    let model = model.ok_or_else(|| ApiError::Config(MISSING_KEY_MESSAGE.to_string()))?;

    let started = Instant::now();
    let result = model.complete(&request).await;
    metrics::observe_llm_call(request.purpose, result.is_ok(), started.elapsed().as_secs_f64());

    let raw = result?;
    let reply = CoachReply::parse(&raw);
    if let CoachReply::PlainText(_) = reply {
        tracing::debug!(model = model.model_name(), "Coach reply was not JSON, wrapping text");
    }
    Ok(reply.into_response())
}

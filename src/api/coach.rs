// POST /ai-coach

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde::Deserialize;

use super::AppState;
use crate::coach::{self, ChatMessage, CoachResponse, UserContext};
use crate::error::ApiError;

#[derive(Debug, Deserialize)]
pub struct CoachRequest {
    pub messages: Vec<ChatMessage>,
    pub context: UserContext,
}

pub async fn ai_coach(
    State(state): State<AppState>,
    payload: Result<Json<CoachRequest>, JsonRejection>,
) -> Result<Json<CoachResponse>, ApiError> {
    let Json(req) = payload?;
    let response = coach::run_coach(state.model(), &req.messages, &req.context).await?;
    Ok(Json(response))
}

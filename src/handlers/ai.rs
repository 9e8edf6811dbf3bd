use crate::domain::{HistoryFilter, QueryContext};
use crate::error::Result;
use crate::responder::Answer;
use crate::state::AppState;
use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;
use std::sync::Arc;

#[derive(Debug, Deserialize)]
pub struct AiQueryRequest {
    pub query: String,
    #[serde(default)]
    pub context: Option<QueryContext>,
}

#[derive(Debug, Default, Deserialize)]
pub struct HistoryParams {
    #[serde(alias = "memberId")]
    pub member_id: Option<String>,
    #[serde(alias = "authorizationId")]
    pub authorization_id: Option<String>,
}

/// POST /ai/query - Answer a free-text question and record the interaction.
pub async fn query_ai_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<AiQueryRequest>,
) -> Result<Json<Answer>> {
    let context = request.context.unwrap_or_default();
    let answer = state.responder.answer(&request.query, context).await?;
    Ok(Json(answer))
}

/// GET /ai/history?member_id=&authorization_id= - Past answers, newest first.
pub async fn ai_history_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<HistoryParams>,
) -> Result<Json<Vec<Answer>>> {
    let filter = HistoryFilter::new(params.member_id, params.authorization_id);
    Ok(Json(state.responder.get_history(&filter).await?))
}

use crate::domain::Authorization;
use crate::error::{AppError, Result};
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    Json,
};
use std::sync::Arc;

/// GET /authorizations/{id}
pub async fn get_authorization_handler(
    State(state): State<Arc<AppState>>,
    Path(authorization_id): Path<String>,
) -> Result<Json<Authorization>> {
    state
        .authorizations
        .find_by_id(&authorization_id)
        .await?
        .map(Json)
        .ok_or_else(|| {
            AppError::NotFound(format!("Authorization not found: {}", authorization_id))
        })
}

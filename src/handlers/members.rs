use crate::domain::{Authorization, CareGap, Member};
use crate::error::{AppError, Result};
use crate::state::AppState;
use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use std::sync::Arc;

#[derive(Debug, Default, Deserialize)]
pub struct MemberSearchParams {
    #[serde(rename = "memberId", alias = "member_id")]
    pub member_id: Option<String>,
    pub name: Option<String>,
}

/// GET /members?memberId=&name= - Partial, case-insensitive member search.
pub async fn search_members_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<MemberSearchParams>,
) -> Result<Json<Vec<Member>>> {
    let members = state
        .members
        .search(params.member_id.as_deref(), params.name.as_deref())
        .await?;

    tracing::debug!(
        member_id = params.member_id.as_deref().unwrap_or(""),
        name = params.name.as_deref().unwrap_or(""),
        matches = members.len(),
        "Member search"
    );

    Ok(Json(members))
}

/// GET /members/{id}
pub async fn get_member_handler(
    State(state): State<Arc<AppState>>,
    Path(member_id): Path<String>,
) -> Result<Json<Member>> {
    state
        .members
        .find_by_id(&member_id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Member not found: {}", member_id)))
}

/// GET /members/{id}/care-gaps
pub async fn member_care_gaps_handler(
    State(state): State<Arc<AppState>>,
    Path(member_id): Path<String>,
) -> Result<Json<Vec<CareGap>>> {
    Ok(Json(state.care_gaps.find_by_member(&member_id).await?))
}

/// GET /members/{id}/authorizations
pub async fn member_authorizations_handler(
    State(state): State<Arc<AppState>>,
    Path(member_id): Path<String>,
) -> Result<Json<Vec<Authorization>>> {
    Ok(Json(state.authorizations.find_by_member(&member_id).await?))
}

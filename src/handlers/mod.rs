pub mod ai;
pub mod authorizations;
pub mod health;
pub mod members;

pub use ai::{ai_history_handler, query_ai_handler};
pub use authorizations::get_authorization_handler;
pub use health::health_handler;
pub use members::{
    get_member_handler, member_authorizations_handler, member_care_gaps_handler,
    search_members_handler,
};

use crate::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

/// Data Access API routes, without the metrics endpoint or middleware.
pub fn api_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/members", get(search_members_handler))
        .route("/members/:member_id", get(get_member_handler))
        .route("/members/:member_id/care-gaps", get(member_care_gaps_handler))
        .route(
            "/members/:member_id/authorizations",
            get(member_authorizations_handler),
        )
        .route("/authorizations/:authorization_id", get(get_authorization_handler))
        .route("/ai/query", post(query_ai_handler))
        .route("/ai/history", get(ai_history_handler))
        .route("/health", get(health_handler))
        .with_state(state)
}

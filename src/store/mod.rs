//! Storage ports for the Data Access API.
//!
//! Handlers and the query responder only see these traits. `MemoryStore`
//! backs every port from seed data; `persistence::JsonlInteractionLog`
//! swaps in a durable interaction log.

pub mod memory;
pub mod seed;

use crate::domain::{
    AiInteraction, Authorization, CareGap, HistoryFilter, Member, NewInteraction,
};
use async_trait::async_trait;
use thiserror::Error;

pub use memory::MemoryStore;
pub use seed::SeedData;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid data: {0}")]
    Invalid(String),

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

#[async_trait]
pub trait MemberStore: Send + Sync {
    /// Case-insensitive partial match; both filters combine with AND.
    async fn search(&self, member_id: Option<&str>, name: Option<&str>)
        -> StoreResult<Vec<Member>>;

    async fn find_by_id(&self, id: &str) -> StoreResult<Option<Member>>;
}

#[async_trait]
pub trait AuthorizationStore: Send + Sync {
    async fn find_by_id(&self, id: &str) -> StoreResult<Option<Authorization>>;

    async fn find_by_member(&self, member_id: &str) -> StoreResult<Vec<Authorization>>;
}

#[async_trait]
pub trait CareGapStore: Send + Sync {
    async fn find_by_member(&self, member_id: &str) -> StoreResult<Vec<CareGap>>;
}

#[async_trait]
pub trait InteractionStore: Send + Sync {
    /// Persists one interaction. Returning `Ok` means the write committed.
    async fn record(&self, interaction: NewInteraction) -> StoreResult<AiInteraction>;

    /// Matching interactions, newest first. No match is an empty vec.
    async fn history(&self, filter: &HistoryFilter) -> StoreResult<Vec<AiInteraction>>;
}

/// Sorts newest first. Input must be in reverse insertion order so that
/// records sharing a timestamp keep the later write in front.
pub(crate) fn newest_first(mut records: Vec<AiInteraction>) -> Vec<AiInteraction> {
    records.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    records
}

use crate::config::Config;
use crate::persistence::JsonlInteractionLog;
use crate::responder::QueryResponder;
use crate::store::{
    AuthorizationStore, CareGapStore, InteractionStore, MemberStore, MemoryStore, SeedData,
    StoreResult,
};
use std::sync::Arc;

/// Application state shared across all request handlers.
/// Stores are trait objects so tests can substitute fakes.
#[derive(Clone)]
pub struct AppState {
    pub members: Arc<dyn MemberStore>,
    pub authorizations: Arc<dyn AuthorizationStore>,
    pub care_gaps: Arc<dyn CareGapStore>,
    pub responder: QueryResponder,
}

impl AppState {
    /// Build state from configuration: seed records from `SEED_PATH` or the
    /// built-in sample, interactions in `INTERACTION_LOG_PATH` or memory.
    pub async fn new(config: &Config) -> StoreResult<Self> {
        let seed = match &config.seed_path {
            Some(path) => SeedData::load(path)?,
            None => {
                tracing::info!("No SEED_PATH set, using built-in sample records");
                SeedData::builtin()?
            }
        };

        let store = Arc::new(MemoryStore::new(seed));
        let interactions: Arc<dyn InteractionStore> = match &config.interaction_log_path {
            Some(path) => Arc::new(JsonlInteractionLog::open(path).await?),
            None => {
                tracing::warn!("No INTERACTION_LOG_PATH set, interactions are kept in memory only");
                store.clone()
            }
        };

        Ok(Self::with_interactions(store, interactions))
    }

    /// Everything in memory, from the given seed.
    pub fn in_memory(seed: SeedData) -> Self {
        let store = Arc::new(MemoryStore::new(seed));
        Self::with_interactions(store.clone(), store)
    }

    /// Seed-backed reference data with a caller-chosen interaction store.
    pub fn with_interactions(
        store: Arc<MemoryStore>,
        interactions: Arc<dyn InteractionStore>,
    ) -> Self {
        Self {
            members: store.clone(),
            authorizations: store.clone(),
            care_gaps: store,
            responder: QueryResponder::with_store(interactions),
        }
    }
}

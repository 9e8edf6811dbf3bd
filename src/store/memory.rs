use super::{
    newest_first, AuthorizationStore, CareGapStore, InteractionStore, MemberStore, SeedData,
    StoreResult,
};
use crate::domain::{
    AiInteraction, Authorization, CareGap, HistoryFilter, Member, NewInteraction,
};
use async_trait::async_trait;
use tokio::sync::RwLock;

/// Seed-backed store. Reference data is read-only; interactions are kept in
/// insertion order and lost on restart.
pub struct MemoryStore {
    members: Vec<Member>,
    authorizations: Vec<Authorization>,
    care_gaps: Vec<CareGap>,
    interactions: RwLock<Vec<AiInteraction>>,
}

impl MemoryStore {
    pub fn new(seed: SeedData) -> Self {
        let mut members = seed.members;
        members.sort_by(|a, b| a.id.cmp(&b.id));

        Self {
            members,
            authorizations: seed.authorizations,
            care_gaps: seed.care_gaps,
            interactions: RwLock::new(Vec::new()),
        }
    }
}

fn contains_ci(haystack: &str, needle_lower: &str) -> bool {
    haystack.to_lowercase().contains(needle_lower)
}

fn name_matches(member: &Member, needle_lower: &str) -> bool {
    contains_ci(&member.first_name, needle_lower)
        || contains_ci(&member.last_name, needle_lower)
        || contains_ci(&member.full_name(), needle_lower)
}

#[async_trait]
impl MemberStore for MemoryStore {
    async fn search(
        &self,
        member_id: Option<&str>,
        name: Option<&str>,
    ) -> StoreResult<Vec<Member>> {
        let id_filter = member_id
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_lowercase);
        let name_filter = name
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_lowercase);

        Ok(self
            .members
            .iter()
            .filter(|m| id_filter.as_deref().map_or(true, |f| contains_ci(&m.id, f)))
            .filter(|m| name_filter.as_deref().map_or(true, |f| name_matches(m, f)))
            .cloned()
            .collect())
    }

    async fn find_by_id(&self, id: &str) -> StoreResult<Option<Member>> {
        Ok(self.members.iter().find(|m| m.id == id).cloned())
    }
}

#[async_trait]
impl AuthorizationStore for MemoryStore {
    async fn find_by_id(&self, id: &str) -> StoreResult<Option<Authorization>> {
        Ok(self.authorizations.iter().find(|a| a.id == id).cloned())
    }

    async fn find_by_member(&self, member_id: &str) -> StoreResult<Vec<Authorization>> {
        Ok(self
            .authorizations
            .iter()
            .filter(|a| a.member_id == member_id)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl CareGapStore for MemoryStore {
    async fn find_by_member(&self, member_id: &str) -> StoreResult<Vec<CareGap>> {
        Ok(self
            .care_gaps
            .iter()
            .filter(|g| g.member_id == member_id)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl InteractionStore for MemoryStore {
    async fn record(&self, interaction: NewInteraction) -> StoreResult<AiInteraction> {
        let record = interaction.into_record();
        self.interactions.write().await.push(record.clone());
        Ok(record)
    }

    async fn history(&self, filter: &HistoryFilter) -> StoreResult<Vec<AiInteraction>> {
        let interactions = self.interactions.read().await;
        let matching = interactions
            .iter()
            .rev()
            .filter(|i| filter.matches(i))
            .cloned()
            .collect();
        Ok(newest_first(matching))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> MemoryStore {
        MemoryStore::new(SeedData::builtin().unwrap())
    }

    #[tokio::test]
    async fn test_search_by_partial_name_case_insensitive() {
        let store = store();

        let found = store.search(None, Some("john")).await.unwrap();
        let ids: Vec<_> = found.iter().map(|m| m.id.as_str()).collect();
        // "john" hits John Smith by first name and Robert Johnson by last name
        assert_eq!(ids, vec!["MBR-001", "MBR-003"]);

        let found = store.search(None, Some("John Smith")).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, "MBR-001");
    }

    #[tokio::test]
    async fn test_search_filters_combine_with_and() {
        let store = store();

        let found = store.search(Some("mbr-00"), Some("garcia")).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, "MBR-002");

        let found = store.search(Some("003"), Some("garcia")).await.unwrap();
        assert!(found.is_empty());
    }

    #[tokio::test]
    async fn test_search_without_filters_returns_all() {
        let store = store();
        let found = store.search(Some(""), None).await.unwrap();
        assert_eq!(found.len(), 3);
    }

    #[tokio::test]
    async fn test_authorizations_by_member() {
        let store = store();

        let auths = AuthorizationStore::find_by_member(&store, "MBR-001").await.unwrap();
        assert_eq!(auths.len(), 2);

        let missing = AuthorizationStore::find_by_id(&store, "AUTH-999").await.unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn test_history_newest_first() {
        let store = store();

        for text in ["first", "second", "third"] {
            store
                .record(NewInteraction {
                    query_text: text.into(),
                    member_id: Some("MBR-001".into()),
                    authorization_id: None,
                    response_text: text.into(),
                })
                .await
                .unwrap();
        }

        let history = store
            .history(&HistoryFilter::new(Some("MBR-001".into()), None))
            .await
            .unwrap();
        let texts: Vec<_> = history.iter().map(|i| i.response_text.as_str()).collect();
        assert_eq!(texts, vec!["third", "second", "first"]);

        let none = store
            .history(&HistoryFilter::new(Some("MBR-404".into()), None))
            .await
            .unwrap();
        assert!(none.is_empty());
    }
}

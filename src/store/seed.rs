//! Seed records for the in-memory store.

use super::{StoreError, StoreResult};
use crate::domain::{Authorization, CareGap, Member};
use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;

const BUILTIN_SEED: &str = include_str!("../../data/sample_seed.json");

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeedData {
    #[serde(default)]
    pub members: Vec<Member>,
    #[serde(default)]
    pub authorizations: Vec<Authorization>,
    #[serde(default, alias = "care_gaps")]
    pub care_gaps: Vec<CareGap>,
}

impl SeedData {
    /// The sample data set compiled into the binary.
    pub fn builtin() -> StoreResult<Self> {
        Self::parse(BUILTIN_SEED)
    }

    /// Load a seed file, replacing the built-in sample set.
    pub fn load(path: &Path) -> StoreResult<Self> {
        let raw = std::fs::read_to_string(path)?;
        let seed = Self::parse(&raw)?;
        tracing::info!(
            path = %path.display(),
            members = seed.members.len(),
            authorizations = seed.authorizations.len(),
            care_gaps = seed.care_gaps.len(),
            "Seed file loaded"
        );
        Ok(seed)
    }

    pub fn parse(raw: &str) -> StoreResult<Self> {
        let seed: SeedData = serde_json::from_str(raw)
            .map_err(|e| StoreError::Invalid(format!("Malformed seed data: {}", e)))?;
        seed.validated()
    }

    /// Rejects duplicate primary keys and drops records whose owning member
    /// does not exist.
    fn validated(mut self) -> StoreResult<Self> {
        let mut member_ids = HashSet::with_capacity(self.members.len());
        for member in &self.members {
            if !member_ids.insert(member.id.clone()) {
                return Err(StoreError::Invalid(format!(
                    "Duplicate member id: {}",
                    member.id
                )));
            }
        }

        let mut auth_ids = HashSet::new();
        for auth in &self.authorizations {
            if !auth_ids.insert(auth.id.as_str()) {
                return Err(StoreError::Invalid(format!(
                    "Duplicate authorization id: {}",
                    auth.id
                )));
            }
        }

        let mut gap_ids = HashSet::new();
        for gap in &self.care_gaps {
            if !gap_ids.insert(gap.id.as_str()) {
                return Err(StoreError::Invalid(format!(
                    "Duplicate care gap id: {}",
                    gap.id
                )));
            }
        }

        self.authorizations.retain(|auth| {
            let known = member_ids.contains(&auth.member_id);
            if !known {
                tracing::warn!(
                    authorization_id = %auth.id,
                    member_id = %auth.member_id,
                    "Skipping authorization for unknown member"
                );
            }
            known
        });

        self.care_gaps.retain(|gap| {
            let known = member_ids.contains(&gap.member_id);
            if !known {
                tracing::warn!(
                    care_gap_id = %gap.id,
                    member_id = %gap.member_id,
                    "Skipping care gap for unknown member"
                );
            }
            known
        });

        Ok(self)
    }
}

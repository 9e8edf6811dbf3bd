//! Record types shared by the API, the bridge and the agent.
//!
//! Wire format is camelCase. The snake_case column names are accepted as
//! aliases so seed files exported straight from the relational store load
//! without a mapping step.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    pub id: String,
    #[serde(alias = "first_name")]
    pub first_name: String,
    #[serde(alias = "last_name")]
    pub last_name: String,
    #[serde(alias = "date_of_birth")]
    pub date_of_birth: NaiveDate,
    pub gender: String,
    #[serde(alias = "risk_tier")]
    pub risk_tier: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

impl Member {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Authorization {
    pub id: String,
    #[serde(alias = "member_id")]
    pub member_id: String,
    #[serde(rename = "type")]
    pub auth_type: String,
    pub status: String,
    #[serde(alias = "request_date")]
    pub request_date: NaiveDate,
    #[serde(default, alias = "decision_date")]
    pub decision_date: Option<NaiveDate>,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub units: Option<i32>,
    #[serde(default, alias = "unit_type", skip_serializing_if = "Option::is_none")]
    pub unit_type: Option<String>,
    #[serde(default, alias = "denial_reason", skip_serializing_if = "Option::is_none")]
    pub denial_reason: Option<String>,
    #[serde(
        default,
        alias = "policy_reference",
        skip_serializing_if = "Option::is_none"
    )]
    pub policy_reference: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CareGap {
    pub id: String,
    #[serde(alias = "member_id")]
    pub member_id: String,
    #[serde(rename = "type")]
    pub gap_type: String,
    pub description: String,
    pub priority: String,
    #[serde(alias = "due_date")]
    pub due_date: NaiveDate,
    pub status: String,
}

/// Optional identifiers attached to a free-text query.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryContext {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub member_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authorization_id: Option<String>,
}

impl QueryContext {
    pub fn new(member_id: Option<String>, authorization_id: Option<String>) -> Self {
        Self {
            member_id: non_blank(member_id),
            authorization_id: non_blank(authorization_id),
        }
    }

    /// Drops blank identifiers so `""` and absent mean the same thing.
    pub fn normalized(self) -> Self {
        Self::new(self.member_id, self.authorization_id)
    }
}

/// A persisted query/response pair. Written once, never updated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AiInteraction {
    pub id: Uuid,
    pub query_text: String,
    #[serde(default)]
    pub member_id: Option<String>,
    #[serde(default)]
    pub authorization_id: Option<String>,
    pub response_text: String,
    pub created_at: DateTime<Utc>,
}

/// Interaction fields supplied by the caller; id and timestamp are assigned
/// by the store on write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewInteraction {
    pub query_text: String,
    pub member_id: Option<String>,
    pub authorization_id: Option<String>,
    pub response_text: String,
}

impl NewInteraction {
    pub fn into_record(self) -> AiInteraction {
        AiInteraction {
            id: Uuid::new_v4(),
            query_text: self.query_text,
            member_id: self.member_id,
            authorization_id: self.authorization_id,
            response_text: self.response_text,
            created_at: Utc::now(),
        }
    }
}

/// AND-combined history filter. `None` matches everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HistoryFilter {
    pub member_id: Option<String>,
    pub authorization_id: Option<String>,
}

impl HistoryFilter {
    pub fn new(member_id: Option<String>, authorization_id: Option<String>) -> Self {
        Self {
            member_id: non_blank(member_id),
            authorization_id: non_blank(authorization_id),
        }
    }

    pub fn matches(&self, interaction: &AiInteraction) -> bool {
        let member_ok = self
            .member_id
            .as_deref()
            .map_or(true, |id| interaction.member_id.as_deref() == Some(id));
        let auth_ok = self
            .authorization_id
            .as_deref()
            .map_or(true, |id| interaction.authorization_id.as_deref() == Some(id));
        member_ok && auth_ok
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

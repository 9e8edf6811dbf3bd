//! Query responder: classify, pick the canned answer, record, return.

use crate::domain::{HistoryFilter, NewInteraction, QueryContext};
use crate::error::{AppError, Result};
use crate::intent::{Intent, IntentClassifier, KeywordClassifier};
use crate::store::InteractionStore;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Fixed answer text and citations for one intent.
#[derive(Debug, Clone, Copy)]
pub struct ResponseTemplate {
    pub text: &'static str,
    pub sources: &'static [&'static str],
}

const DENIAL_EXPLANATION: ResponseTemplate = ResponseTemplate {
    text: "This authorization was denied because medical necessity \
criteria were not met based on the submitted documentation.\n\n\
**Recommended Next Steps:**\n\
1. Review policy requirements\n\
2. Gather additional clinical documentation\n\
3. Consider submitting an appeal or peer-to-peer review",
    sources: &["Authorization Policy", "Utilization Management Guidelines"],
};

const CARE_GAP: ResponseTemplate = ResponseTemplate {
    text: "This member has outstanding care gaps that require follow-up.\n\n\
**Recommendations:**\n\
1. Prioritize high-risk gaps\n\
2. Coordinate with the PCP\n\
3. Schedule necessary screenings",
    sources: &["Care Gap Registry", "Quality Measures"],
};

const NEXT_ACTION: ResponseTemplate = ResponseTemplate {
    text: "Recommended next actions include:\n\
1. Follow up on pending authorizations\n\
2. Address high-priority care gaps\n\
3. Perform care management outreach",
    sources: &["Care Management Playbook"],
};

const HELP: ResponseTemplate = ResponseTemplate {
    text: "I am your AI Care Navigator. You can ask me about:\n\
- Authorization denials\n\
- Care gaps\n\
- Recommended next actions\n\
- Policy explanations",
    sources: &["AI Care Navigator"],
};

pub fn template_for(intent: Intent) -> &'static ResponseTemplate {
    match intent {
        Intent::DenialExplanation => &DENIAL_EXPLANATION,
        Intent::CareGap => &CARE_GAP,
        Intent::NextAction => &NEXT_ACTION,
        Intent::Unknown => &HELP,
    }
}

/// Wire shape of an answer: `{response, sources}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Answer {
    pub response: String,
    pub sources: Vec<String>,
}

impl Answer {
    fn from_template(template: &ResponseTemplate) -> Self {
        Self {
            response: template.text.to_string(),
            sources: template.sources.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// Answers free-text queries and keeps the interaction history.
#[derive(Clone)]
pub struct QueryResponder {
    classifier: Arc<dyn IntentClassifier>,
    interactions: Arc<dyn InteractionStore>,
}

impl QueryResponder {
    pub fn new(
        classifier: Arc<dyn IntentClassifier>,
        interactions: Arc<dyn InteractionStore>,
    ) -> Self {
        Self {
            classifier,
            interactions,
        }
    }

    /// Responder using the default keyword rules.
    pub fn with_store(interactions: Arc<dyn InteractionStore>) -> Self {
        Self::new(Arc::new(KeywordClassifier::default()), interactions)
    }

    /// Produce the canned answer for `query` and record the interaction.
    ///
    /// The answer is only returned once the interaction write has committed;
    /// a failed write surfaces as [`AppError::PersistenceFailure`].
    pub async fn answer(&self, query: &str, context: QueryContext) -> Result<Answer> {
        let context = context.normalized();
        let intent = self.classifier.classify(query);
        let answer = Answer::from_template(template_for(intent));

        let record = self
            .interactions
            .record(NewInteraction {
                query_text: query.to_string(),
                member_id: context.member_id,
                authorization_id: context.authorization_id,
                response_text: answer.response.clone(),
            })
            .await
            .map_err(|e| AppError::PersistenceFailure(e.to_string()))?;

        tracing::info!(
            intent = intent.as_str(),
            interaction_id = %record.id,
            member_id = record.member_id.as_deref().unwrap_or("-"),
            authorization_id = record.authorization_id.as_deref().unwrap_or("-"),
            "AI query answered"
        );
        metrics::counter!("ai_queries_total", "intent" => intent.as_str()).increment(1);

        Ok(answer)
    }

    /// Past answers matching the filter, newest first. Sources are derived
    /// again from the stored query text.
    pub async fn get_history(&self, filter: &HistoryFilter) -> Result<Vec<Answer>> {
        let records = self.interactions.history(filter).await?;

        Ok(records
            .into_iter()
            .map(|record| {
                let template = template_for(self.classifier.classify(&record.query_text));
                Answer {
                    response: record.response_text,
                    sources: template.sources.iter().map(|s| s.to_string()).collect(),
                }
            })
            .collect())
    }
}

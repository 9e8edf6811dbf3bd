//! Free-text query classification.
//!
//! Classification is an ordered table of `(trigger phrases, intent)` rules
//! evaluated top to bottom; the first rule with a matching phrase wins.
//! Rule order is therefore a product decision: a query mentioning both a
//! denial and a care gap resolves to `DenialExplanation` because that rule
//! comes first.

/// The closed set of response categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Intent {
    DenialExplanation,
    CareGap,
    NextAction,
    Unknown,
}

impl Intent {
    pub fn as_str(&self) -> &'static str {
        match self {
            Intent::DenialExplanation => "denial_explanation",
            Intent::CareGap => "care_gap",
            Intent::NextAction => "next_action",
            Intent::Unknown => "unknown",
        }
    }
}

/// Maps a query to an [`Intent`]. Implementations must be deterministic.
pub trait IntentClassifier: Send + Sync {
    fn classify(&self, query: &str) -> Intent;
}

/// One row of the rule table. Trigger phrases must be lowercase.
#[derive(Debug, Clone, Copy)]
pub struct IntentRule {
    pub triggers: &'static [&'static str],
    pub intent: Intent,
}

/// Default precedence: denial, then care gap, then next action.
pub const DEFAULT_RULES: &[IntentRule] = &[
    IntentRule {
        triggers: &["denied", "denial"],
        intent: Intent::DenialExplanation,
    },
    IntentRule {
        triggers: &["care gap", "care gaps"],
        intent: Intent::CareGap,
    },
    IntentRule {
        triggers: &["next action", "next step"],
        intent: Intent::NextAction,
    },
];

/// Case-insensitive substring matcher over an ordered rule table.
#[derive(Debug, Clone)]
pub struct KeywordClassifier {
    rules: &'static [IntentRule],
}

impl KeywordClassifier {
    pub fn new(rules: &'static [IntentRule]) -> Self {
        Self { rules }
    }
}

impl Default for KeywordClassifier {
    fn default() -> Self {
        Self::new(DEFAULT_RULES)
    }
}

impl IntentClassifier for KeywordClassifier {
    fn classify(&self, query: &str) -> Intent {
        let query = query.trim();
        if query.is_empty() {
            return Intent::Unknown;
        }

        let lowered = query.to_lowercase();
        self.rules
            .iter()
            .find(|rule| rule.triggers.iter().any(|t| lowered.contains(t)))
            .map_or(Intent::Unknown, |rule| rule.intent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classify(query: &str) -> Intent {
        KeywordClassifier::default().classify(query)
    }

    #[test]
    fn test_denial_triggers_any_case() {
        assert_eq!(classify("Why was this Denied?"), Intent::DenialExplanation);
        assert_eq!(classify("explain the DENIAL"), Intent::DenialExplanation);
        assert_eq!(
            classify("Why was this authorization denied?"),
            Intent::DenialExplanation
        );
    }

    #[test]
    fn test_care_gap_and_next_action() {
        assert_eq!(classify("Any open Care Gaps?"), Intent::CareGap);
        assert_eq!(classify("what is the next step"), Intent::NextAction);
        assert_eq!(classify("Recommend a NEXT ACTION"), Intent::NextAction);
    }

    #[test]
    fn test_unmatched_and_blank_are_unknown() {
        assert_eq!(classify("hello there"), Intent::Unknown);
        assert_eq!(classify(""), Intent::Unknown);
        assert_eq!(classify("   \t\n"), Intent::Unknown);
    }

    #[test]
    fn test_first_matching_rule_wins() {
        assert_eq!(
            classify("was the care gap visit denied? what is the next step"),
            Intent::DenialExplanation
        );
        assert_eq!(
            classify("next step for this care gap"),
            Intent::CareGap
        );
    }

    #[test]
    fn test_custom_rule_order_changes_precedence() {
        const CARE_GAP_FIRST: &[IntentRule] = &[
            IntentRule {
                triggers: &["care gap"],
                intent: Intent::CareGap,
            },
            IntentRule {
                triggers: &["denied"],
                intent: Intent::DenialExplanation,
            },
        ];

        let classifier = KeywordClassifier::new(CARE_GAP_FIRST);
        assert_eq!(
            classifier.classify("care gap visit denied"),
            Intent::CareGap
        );
    }

    #[test]
    fn test_classification_is_repeatable() {
        let classifier = KeywordClassifier::default();
        for query in ["denied", "care gap", "next action", "other", ""] {
            assert_eq!(classifier.classify(query), classifier.classify(query));
        }
    }
}

use crate::types::{FilterDecision, SafetySettings};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HarmCategory {
    Harassment,
    HateSpeech,
    DangerousContent,
}

impl HarmCategory {
    pub fn reason(self) -> &'static str {
        match self {
            HarmCategory::Harassment => "Content blocked: Potential harassment detected",
            HarmCategory::HateSpeech => "Content blocked: Potential hate speech detected",
            HarmCategory::DangerousContent => "Content blocked: Potential dangerous content detected",
        }
    }

    fn enabled_in(self, settings: &SafetySettings) -> bool {
        match self {
            HarmCategory::Harassment => settings.block_harassment,
            HarmCategory::HateSpeech => settings.block_hate_speech,
            HarmCategory::DangerousContent => settings.block_dangerous_content,
        }
    }
}

#[derive(Debug, Clone)]
struct CategoryTerms {
    category: HarmCategory,
    terms: Vec<String>,
}

/// Keyword filter. Categories are checked in list order and the first
/// enabled category with a matching term wins. Matching is plain substring
/// containment on the lower-cased input. `block_sexual_content` has no term
/// list, so it never blocks.
#[derive(Debug, Clone)]
pub struct SafetyPolicy {
    categories: Vec<CategoryTerms>,
}

impl Default for SafetyPolicy {
    fn default() -> Self {
        Self {
            categories: vec![
                CategoryTerms::new(
                    HarmCategory::Harassment,
                    &["bully", "harass", "threaten", "attack"],
                ),
                CategoryTerms::new(
                    HarmCategory::HateSpeech,
                    &["hate", "racist", "bigot", "slur"],
                ),
                CategoryTerms::new(
                    HarmCategory::DangerousContent,
                    &["bomb", "weapon", "kill", "harm", "explosive", "poison"],
                ),
            ],
        }
    }
}

impl CategoryTerms {
    fn new(category: HarmCategory, terms: &[&str]) -> Self {
        Self {
            category,
            terms: terms.iter().map(|term| (*term).to_owned()).collect(),
        }
    }
}

impl SafetyPolicy {
    pub fn evaluate(&self, input: &str, settings: &SafetySettings) -> FilterDecision {
        self.matched_category(input, settings)
            .map(|category| FilterDecision::block(category.reason()))
            .unwrap_or_else(FilterDecision::pass)
    }

    pub fn matched_category(&self, input: &str, settings: &SafetySettings) -> Option<HarmCategory> {
        let lowercase = input.to_lowercase();
        self.categories
            .iter()
            .filter(|entry| entry.category.enabled_in(settings))
            .find(|entry| {
                entry
                    .terms
                    .iter()
                    .any(|term| lowercase.contains(term.as_str()))
            })
            .map(|entry| entry.category)
    }
}

#[cfg(test)]
mod tests {
    use crate::types::{FilterDecision, SafetyLevel, SafetySettings};

    use super::{HarmCategory, SafetyPolicy};

    fn all_off() -> SafetySettings {
        SafetySettings {
            level: SafetyLevel::Permissive,
            block_harassment: false,
            block_hate_speech: false,
            block_sexual_content: false,
            block_dangerous_content: false,
        }
    }

    #[test]
    fn blocks_harassment_with_default_settings() {
        let decision =
            SafetyPolicy::default().evaluate("please don't harass me", &SafetySettings::default());
        assert_eq!(
            decision,
            FilterDecision {
                blocked: true,
                reason: Some("Content blocked: Potential harassment detected".to_owned()),
            }
        );
    }

    #[test]
    fn matching_ignores_case() {
        let decision = SafetyPolicy::default().evaluate("BOMB", &SafetySettings::default());
        assert_eq!(
            decision.reason.as_deref(),
            Some(HarmCategory::DangerousContent.reason())
        );
    }

    #[test]
    fn matches_substrings_inside_words() {
        let decision =
            SafetyPolicy::default().evaluate("what a charming day", &SafetySettings::default());
        assert!(decision.blocked);
        assert_eq!(
            decision.reason.as_deref(),
            Some("Content blocked: Potential dangerous content detected")
        );
    }

    #[test]
    fn earlier_category_wins_when_several_match() {
        let policy = SafetyPolicy::default();
        let settings = SafetySettings::default();

        let decision = policy.evaluate("they hate us and attack with a bomb", &settings);
        assert_eq!(decision.reason.as_deref(), Some(HarmCategory::Harassment.reason()));

        let decision = policy.evaluate("racist poison", &settings);
        assert_eq!(decision.reason.as_deref(), Some(HarmCategory::HateSpeech.reason()));
    }

    #[test]
    fn disabled_category_falls_through_to_next() {
        let settings = SafetySettings {
            block_harassment: false,
            ..SafetySettings::default()
        };
        let decision = SafetyPolicy::default().evaluate("attack with a weapon", &settings);
        assert_eq!(
            decision.reason.as_deref(),
            Some(HarmCategory::DangerousContent.reason())
        );
    }

    #[test]
    fn nothing_blocks_when_every_flag_is_off() {
        let decision = SafetyPolicy::default().evaluate("harass hate bomb", &all_off());
        assert_eq!(decision, FilterDecision::pass());
    }

    #[test]
    fn sexual_content_flag_has_no_terms() {
        let settings = SafetySettings {
            block_sexual_content: true,
            ..all_off()
        };
        let decision = SafetyPolicy::default().evaluate("anything at all", &settings);
        assert!(!decision.blocked);
    }

    #[test]
    fn clean_input_passes() {
        let decision =
            SafetyPolicy::default().evaluate("hello from devfest", &SafetySettings::default());
        assert!(!decision.blocked);
        assert!(decision.reason.is_none());
    }

    #[test]
    fn level_does_not_change_the_decision() {
        let policy = SafetyPolicy::default();
        for level in [SafetyLevel::Strict, SafetyLevel::Moderate, SafetyLevel::Permissive] {
            let settings = SafetySettings {
                level,
                ..SafetySettings::default()
            };
            assert!(policy.evaluate("threaten", &settings).blocked);
            assert!(!policy.evaluate("hi there", &settings).blocked);
        }
    }

    #[test]
    fn evaluation_is_repeatable() {
        let policy = SafetyPolicy::default();
        let settings = SafetySettings::default();
        let first = policy.evaluate("how to make poison", &settings);
        let second = policy.evaluate("how to make poison", &settings);
        assert_eq!(first, second);
    }
}

use regex::Regex;

use super::{Rule, RuleSet};

/// Strength of innocence phrasing found by the keyword fallback
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InnocenceTier {
    Strong,
    Medium,
    Weak,
}

impl InnocenceTier {
    /// Priority points for this tier (out of 30)
    pub fn points(&self) -> u32 {
        match self {
            InnocenceTier::Strong => 30,
            InnocenceTier::Medium => 20,
            InnocenceTier::Weak => 10,
        }
    }
}

fn patterns(sources: &[&str]) -> Vec<Regex> {
    sources
        .iter()
        .filter_map(|s| Regex::new(&format!("(?i){}", s)).ok())
        .collect()
}

/// Keyword tiers used when a case has no analysis result, strongest first
pub fn innocence_keyword_rules() -> RuleSet<str, InnocenceTier> {
    RuleSet::new(vec![
        Rule::any_pattern(
            "strong explicit phrasing",
            InnocenceTier::Strong,
            patterns(&[
                r"I did not commit",
                r"I am innocent",
                r"wrongly convicted",
                r"falsely accused",
                r"maintain.*innocence",
            ]),
        ),
        Rule::any_pattern(
            "hedged phrasing",
            InnocenceTier::Medium,
            patterns(&[
                r"maintain.*different",
                r"circumstances.*different",
                r"didn't.*do",
                r"did not.*do",
            ]),
        ),
        Rule::any_pattern(
            "ambiguous phrasing",
            InnocenceTier::Weak,
            patterns(&[r"innocent", r"wrongly", r"falsely", r"mistake"]),
        ),
    ])
}

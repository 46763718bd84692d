use crate::models::RoleCategory;

use super::{Rule, RuleSet};

/// Uppercase and collapse internal whitespace, for label comparison
pub fn normalize_label(label: &str) -> String {
    label
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_uppercase()
}

/// Role classification rules for speaker labels.
///
/// Order matters: the subject-name hint is checked first, then the fixed
/// keyword rules. Note that "DISTRICT ATTORNEY" contains "ATTORNEY" and so
/// resolves to defense counsel; prosecution only catches labels without it.
pub fn role_rules(subject_hint: Option<&str>) -> RuleSet<str, RoleCategory> {
    let mut rules = Vec::new();

    if let Some(hint) = subject_hint.map(normalize_label).filter(|h| !h.is_empty()) {
        rules.push(Rule::new(
            "subject name hint",
            RoleCategory::Subject,
            move |label: &str| label == hint || label.contains(&hint) || hint.contains(label),
        ));
    }

    rules.push(Rule::contains_any(
        "subject keywords",
        RoleCategory::Subject,
        &["DEFENDANT", "INMATE", "PRISONER", "INCARCERATED PERSON"],
    ));
    rules.push(Rule::contains_any(
        "adjudicator keywords",
        RoleCategory::Adjudicator,
        &["COURT", "PRESIDING", "COMMISSIONER", "JUDGE"],
    ));
    rules.push(Rule::contains_any(
        "defense keywords",
        RoleCategory::CounselDefense,
        &["DEFENSE", "ATTORNEY", "COUNSEL"],
    ));
    rules.push(Rule::contains_any(
        "prosecution keywords",
        RoleCategory::CounselProsecution,
        &["PROSECUTOR", "DISTRICT ATTORNEY", "D.A."],
    ));
    rules.push(Rule::contains_any(
        "witness keywords",
        RoleCategory::Witness,
        &["WITNESS"],
    ));

    RuleSet::new(rules)
}

/// Resolve a raw label to a role category
pub fn classify_label(rules: &RuleSet<str, RoleCategory>, label: &str) -> RoleCategory {
    let normalized = normalize_label(label);
    if normalized.is_empty() {
        return RoleCategory::Unknown;
    }
    rules.first_match(&normalized).unwrap_or(RoleCategory::Unknown)
}

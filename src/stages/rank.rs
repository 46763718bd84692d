use chrono::NaiveDate;
use tracing::debug;

use crate::heuristics::{
    innocence_keyword_rules, InnocenceTier, PanelAssessment, PanelExtractor, RoleLookup, RuleSet,
};
use crate::models::{
    CaseSnapshot, CaseStatus, PriorityPolicy, PriorityRecommendation, ScoreBreakdown,
};

/// Fallback reason when no threshold is crossed
pub const NEUTRAL_REASON: &str = "Case ready for review";

/// Scores and ranks cases for reviewer triage
pub struct PriorityRanker<'a> {
    lookup: &'a dyn RoleLookup,
    policy: PriorityPolicy,
    today: NaiveDate,
    panel: PanelExtractor,
    keywords: RuleSet<str, InnocenceTier>,
}

impl<'a> PriorityRanker<'a> {
    pub fn new(lookup: &'a dyn RoleLookup, policy: PriorityPolicy, today: NaiveDate) -> Self {
        Self {
            lookup,
            policy,
            today,
            panel: PanelExtractor::new(),
            keywords: innocence_keyword_rules(),
        }
    }

    /// Score every case, sort descending (ties keep input order), assign
    /// ranks 1..N and keep the top `top_n`
    pub fn rank(&self, cases: &[CaseSnapshot], top_n: usize) -> Vec<PriorityRecommendation> {
        let mut scored: Vec<PriorityRecommendation> =
            cases.iter().map(|c| self.score_case(c)).collect();

        scored.sort_by(|a, b| b.score.cmp(&a.score));

        for (i, rec) in scored.iter_mut().enumerate() {
            rec.rank = i + 1;
        }

        scored.truncate(top_n);
        scored
    }

    /// Score a single case; `rank` is left at 0 until ranked
    pub fn score_case(&self, case: &CaseSnapshot) -> PriorityRecommendation {
        let breakdown = ScoreBreakdown {
            innocence: self.innocence_points(case),
            bias: self.bias_points(&case.raw_text),
            urgency: self.urgency_points(case.hearing_date),
            status: status_points(&case.status, case.assigned_to.as_deref()),
        };

        debug!(
            subject_id = %case.subject_id,
            innocence = breakdown.innocence,
            bias = breakdown.bias,
            urgency = breakdown.urgency,
            status = breakdown.status,
            "Scored case"
        );

        PriorityRecommendation {
            subject_id: case.subject_id.clone(),
            score: breakdown.total(),
            rank: 0,
            breakdown,
            reasons: generate_reasons(&breakdown, case),
        }
    }

    /// 0-30: analysis score when present, keyword tiers otherwise
    pub fn innocence_points(&self, case: &CaseSnapshot) -> u32 {
        match &case.analysis {
            Some(analysis) => (analysis.innocence_score.clamp(0.0, 1.0) * 30.0).round() as u32,
            None => self
                .keywords
                .first_match(&case.raw_text)
                .map(|tier| tier.points())
                .unwrap_or(0),
        }
    }

    /// 0-25 from panel composition
    pub fn bias_points(&self, raw_text: &str) -> u32 {
        let assessment = self.assess_panel(raw_text);
        if assessment.adjudicators.is_empty() || assessment.enforcement_aligned.is_empty() {
            return 0;
        }

        if assessment.enforcement_aligned.len() == assessment.adjudicators.len() {
            25
        } else if assessment.aligned_ratio() >= self.policy.majority_ratio {
            15
        } else {
            5
        }
    }

    pub fn assess_panel(&self, raw_text: &str) -> PanelAssessment {
        PanelAssessment::assess(self.panel.extract(raw_text), self.lookup)
    }

    /// 0-25 from months since the hearing; unknown dates get the lowest tier
    pub fn urgency_points(&self, hearing_date: Option<NaiveDate>) -> u32 {
        let Some(hearing) = hearing_date else {
            return 5;
        };

        let months_ago = (self.today - hearing).num_days() as f64 / 30.0;
        if months_ago <= self.policy.recent_months {
            25
        } else if months_ago <= self.policy.year_months {
            15
        } else if months_ago <= self.policy.old_months {
            10
        } else {
            5
        }
    }
}

/// 0-20 from workflow state; unknown states are treated as needing attention
pub fn status_points(status: &CaseStatus, assigned_to: Option<&str>) -> u32 {
    let has_assignee = assigned_to.is_some_and(|a| !a.trim().is_empty());

    match status {
        CaseStatus::Completed => 0,
        CaseStatus::Unassigned if !has_assignee => 20,
        CaseStatus::Flagged => 15,
        CaseStatus::Unassigned | CaseStatus::Assigned => 10,
        CaseStatus::InReview => 5,
        CaseStatus::Other(_) => 20,
    }
}

/// Threshold-driven reason sentences; never empty
pub fn generate_reasons(breakdown: &ScoreBreakdown, case: &CaseSnapshot) -> Vec<String> {
    let mut reasons = Vec::new();
    let from_analysis = case.analysis.is_some();

    let innocence_reason = match breakdown.innocence {
        25.. if from_analysis => Some("High innocence score from AI analysis"),
        25.. => Some("Strong explicit innocence claim detected"),
        15.. if from_analysis => Some("Moderate innocence score from AI analysis"),
        15.. => Some("Innocence-related language found"),
        10.. if from_analysis => Some("AI detected potential innocence signals"),
        10.. => Some("Potential innocence indicators present"),
        _ => None,
    };
    reasons.extend(innocence_reason.map(String::from));

    if breakdown.bias >= 20 {
        reasons.push("100% law enforcement/prosecution panel (high bias risk)".to_string());
    } else if breakdown.bias >= 10 {
        reasons.push("Majority LE/prosecution panel".to_string());
    }

    if breakdown.urgency >= 20 {
        reasons.push("Recent hearing (within 6 months)".to_string());
    } else if breakdown.urgency >= 15 {
        reasons.push("Hearing within past year".to_string());
    }

    if breakdown.status >= 15 {
        if case.status == CaseStatus::Flagged {
            reasons.push("Case flagged for review".to_string());
        } else {
            reasons.push("Unassigned - needs volunteer".to_string());
        }
    }

    if reasons.is_empty() {
        reasons.push(NEUTRAL_REASON.to_string());
    }

    reasons
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    use crate::models::{AdjudicatorBackground, AnalysisResult};

    struct TestLookup;

    impl RoleLookup for TestLookup {
        fn lookup(&self, name: &str) -> Option<AdjudicatorBackground> {
            match name {
                "MICHAEL RUFF" => Some(AdjudicatorBackground::LawEnforcement),
                "JULIE GARLAND" => Some(AdjudicatorBackground::Prosecution),
                "JACK WEISS" => Some(AdjudicatorBackground::Prosecution),
                "TEAL KOZEL" => Some(AdjudicatorBackground::MentalHealth),
                "TROY TAIRA" => Some(AdjudicatorBackground::Legal),
                "DIANNE DOBBS" => Some(AdjudicatorBackground::Legal),
                _ => None,
            }
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 1, 1).unwrap()
    }

    fn ranker() -> PriorityRanker<'static> {
        PriorityRanker::new(&TestLookup, PriorityPolicy::default(), today())
    }

    fn case(id: &str, raw_text: &str) -> CaseSnapshot {
        CaseSnapshot {
            subject_id: id.to_string(),
            analysis: None,
            raw_text: raw_text.to_string(),
            hearing_date: None,
            status: CaseStatus::Completed,
            assigned_to: None,
        }
    }

    fn analysis(score: f64) -> AnalysisResult {
        AnalysisResult {
            run_id: Uuid::new_v4(),
            document_id: "doc".to_string(),
            claims: vec![],
            innocence_score: score,
            model_version: "test".to_string(),
            analyzed_at: Utc::now(),
        }
    }

    fn panel(names: &[&str]) -> String {
        let mut text = "PANEL PRESENT:\n".to_string();
        for (i, name) in names.iter().enumerate() {
            let title = if i == 0 { "Presiding" } else { "Deputy" };
            text.push_str(&format!("{}, {} Commissioner\n", name, title));
        }
        text.push_str("OTHERS PRESENT:\nINMATE: Hello.\n");
        text
    }

    #[test]
    fn test_fully_biased_panel() {
        let ranker = ranker();
        let c = case("a", &panel(&["MICHAEL RUFF", "JULIE GARLAND"]));
        let rec = ranker.score_case(&c);

        assert_eq!(rec.breakdown.bias, 25);
        assert!(
            rec.reasons
                .iter()
                .any(|r| r.contains("100% law enforcement/prosecution panel"))
        );
    }

    #[test]
    fn test_bias_tiers() {
        let ranker = ranker();
        assert_eq!(ranker.bias_points(&panel(&["MICHAEL RUFF", "TEAL KOZEL"])), 15);
        assert_eq!(
            ranker.bias_points(&panel(&["JACK WEISS", "TEAL KOZEL", "TROY TAIRA"])),
            5
        );
        assert_eq!(ranker.bias_points(&panel(&["TEAL KOZEL", "TROY TAIRA"])), 0);
        assert_eq!(ranker.bias_points("no roster here"), 0);
    }

    #[test]
    fn test_urgency_tiers() {
        let ranker = ranker();
        let months_ago = |days: i64| Some(today() - chrono::Duration::days(days));

        assert_eq!(ranker.urgency_points(months_ago(30)), 25);
        assert_eq!(ranker.urgency_points(months_ago(300)), 15);
        assert_eq!(ranker.urgency_points(months_ago(600)), 10);
        assert_eq!(ranker.urgency_points(months_ago(1000)), 5);
        assert_eq!(ranker.urgency_points(None), 5);
    }

    #[test]
    fn test_status_points() {
        assert_eq!(status_points(&CaseStatus::Completed, Some("vol")), 0);
        assert_eq!(status_points(&CaseStatus::Unassigned, None), 20);
        assert_eq!(status_points(&CaseStatus::Unassigned, Some("vol")), 10);
        assert_eq!(status_points(&CaseStatus::Flagged, None), 15);
        assert_eq!(status_points(&CaseStatus::Assigned, Some("vol")), 10);
        assert_eq!(status_points(&CaseStatus::InReview, None), 5);
        assert_eq!(status_points(&CaseStatus::Other("archived".to_string()), None), 20);
    }

    #[test]
    fn test_innocence_points_prefers_analysis() {
        let ranker = ranker();
        let mut c = case("a", "I am innocent");
        assert_eq!(ranker.innocence_points(&c), 30);

        c.analysis = Some(analysis(0.36));
        assert_eq!(ranker.innocence_points(&c), 11);

        c.analysis = Some(analysis(0.0));
        assert_eq!(ranker.innocence_points(&c), 0);
    }

    #[test]
    fn test_neutral_reason_when_nothing_stands_out() {
        let rec = ranker().score_case(&case("a", "Nothing notable."));
        assert_eq!(rec.reasons, vec![NEUTRAL_REASON.to_string()]);
        assert_eq!(rec.score, 5);
    }

    #[test]
    fn test_rank_is_stable_and_contiguous() {
        let ranker = ranker();
        let mut top = case("top", &panel(&["MICHAEL RUFF"]));
        top.status = CaseStatus::Unassigned;

        let cases = vec![
            case("first-tie", "plain"),
            top,
            case("second-tie", "plain"),
            case("third-tie", "plain"),
        ];

        let ranked = ranker.rank(&cases, 10);
        let ids: Vec<&str> = ranked.iter().map(|r| r.subject_id.as_str()).collect();
        assert_eq!(ids, vec!["top", "first-tie", "second-tie", "third-tie"]);
        let ranks: Vec<usize> = ranked.iter().map(|r| r.rank).collect();
        assert_eq!(ranks, vec![1, 2, 3, 4]);

        let top_two = ranker.rank(&cases, 2);
        assert_eq!(top_two.len(), 2);
        assert_eq!(top_two[1].subject_id, "first-tie");
    }

    #[test]
    fn test_score_bounds() {
        let ranker = ranker();
        let mut c = case("max", &panel(&["MICHAEL RUFF", "JULIE GARLAND"]));
        c.analysis = Some(analysis(1.0));
        c.hearing_date = Some(today());
        c.status = CaseStatus::Unassigned;

        let rec = ranker.score_case(&c);
        assert_eq!(rec.score, 100);
        assert!(rec.score <= 100);
    }
}

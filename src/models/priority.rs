use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::AnalysisResult;

/// Workflow state of a case
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaseStatus {
    #[default]
    Unassigned,
    Assigned,
    InReview,
    Flagged,
    Completed,
    /// Any state this crate does not know about
    #[serde(untagged)]
    Other(String),
}

/// Background category of an adjudicator in the roster
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdjudicatorBackground {
    LawEnforcement,
    Prosecution,
    MentalHealth,
    Legal,
    Administration,
    Unknown,
}

impl AdjudicatorBackground {
    /// Corrections, law enforcement or prosecution career
    pub fn is_enforcement_aligned(&self) -> bool {
        matches!(
            self,
            AdjudicatorBackground::LawEnforcement | AdjudicatorBackground::Prosecution
        )
    }
}

/// Everything the ranker needs to know about one case
#[derive(Debug, Clone)]
pub struct CaseSnapshot {
    pub subject_id: String,
    /// Latest analysis run, if the transcript was analyzed
    pub analysis: Option<AnalysisResult>,
    /// Raw transcript text, used for the panel roster and keyword fallback
    pub raw_text: String,
    pub hearing_date: Option<NaiveDate>,
    pub status: CaseStatus,
    pub assigned_to: Option<String>,
}

/// Per-factor points of a priority score
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    /// 0-30
    pub innocence: u32,
    /// 0-25
    pub bias: u32,
    /// 0-25
    pub urgency: u32,
    /// 0-20
    pub status: u32,
}

impl ScoreBreakdown {
    pub fn total(&self) -> u32 {
        self.innocence + self.bias + self.urgency + self.status
    }
}

/// Derived ranking entry; recomputed on every request and never persisted
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriorityRecommendation {
    pub subject_id: String,
    /// 0-100
    pub score: u32,
    /// 1-based position in the ranking
    pub rank: usize,
    pub breakdown: ScoreBreakdown,
    pub reasons: Vec<String>,
}

/// Product policy thresholds used by the ranker
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PriorityPolicy {
    /// Hearings at most this many months old get full urgency
    pub recent_months: f64,
    /// Second urgency tier
    pub year_months: f64,
    /// Third urgency tier
    pub old_months: f64,
    /// Share of enforcement-aligned adjudicators that counts as a majority panel
    pub majority_ratio: f64,
}

impl Default for PriorityPolicy {
    fn default() -> Self {
        Self {
            recent_months: 6.0,
            year_months: 12.0,
            old_months: 24.0,
            majority_ratio: 0.5,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_case_status_accepts_unknown_values() {
        let status: CaseStatus = serde_json::from_str(r#""in_review""#).unwrap();
        assert_eq!(status, CaseStatus::InReview);

        let status: CaseStatus = serde_json::from_str(r#""archived""#).unwrap();
        assert_eq!(status, CaseStatus::Other("archived".to_string()));
    }

    #[test]
    fn test_policy_defaults_fill_missing_fields() {
        let policy: PriorityPolicy = serde_json::from_str(r#"{"recent_months": 3}"#).unwrap();
        assert_eq!(policy.recent_months, 3.0);
        assert_eq!(policy.year_months, 12.0);
    }
}

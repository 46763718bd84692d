use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Claim, SignalType};

/// A transcript handed to the analysis pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptDocument {
    /// Identifier of the parent document record
    pub id: String,
    /// Already-extracted plain text (line numbers stripped, whitespace normalized)
    pub text: String,
    /// Name used as the subject-role matching hint
    #[serde(default)]
    pub subject_name: Option<String>,
}

/// Outcome of one completed analysis run. Never mutated; re-running produces a new one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    /// Unique id of this run
    pub run_id: Uuid,
    pub document_id: String,
    pub claims: Vec<Claim>,
    /// Weighted aggregate in [0, 1]
    pub innocence_score: f64,
    pub model_version: String,
    pub analyzed_at: DateTime<Utc>,
}

impl AnalysisResult {
    pub fn claims_of(&self, signal_type: SignalType) -> impl Iterator<Item = &Claim> {
        self.claims
            .iter()
            .filter(move |c| c.signal_type == signal_type)
    }
}

/// Persisted shape of an analysis run, owned by the external store.
///
/// Explicit claims are kept apart; the other three signal types share one array.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisRecord {
    pub id: Uuid,
    pub document_id: String,
    pub innocence_score: f64,
    #[serde(default)]
    pub explicit_claims: Vec<Claim>,
    #[serde(default)]
    pub implicit_signals: Vec<Claim>,
    #[serde(default)]
    pub model_version: Option<String>,
    pub analyzed_at: DateTime<Utc>,
}

impl AnalysisRecord {
    pub fn from_result(result: &AnalysisResult) -> Self {
        let (explicit_claims, implicit_signals): (Vec<Claim>, Vec<Claim>) = result
            .claims
            .iter()
            .cloned()
            .partition(|c| c.signal_type == SignalType::Explicit);

        Self {
            id: result.run_id,
            document_id: result.document_id.clone(),
            innocence_score: result.innocence_score,
            explicit_claims,
            implicit_signals,
            model_version: Some(result.model_version.clone()),
            analyzed_at: result.analyzed_at,
        }
    }

    /// Read the record back into a result, grouping claims by signal type
    pub fn into_result(self) -> AnalysisResult {
        let mut claims = self.explicit_claims;
        for signal_type in [
            SignalType::Implicit,
            SignalType::Contextual,
            SignalType::BiasLanguage,
        ] {
            claims.extend(
                self.implicit_signals
                    .iter()
                    .filter(|c| c.signal_type == signal_type)
                    .cloned(),
            );
        }

        AnalysisResult {
            run_id: self.id,
            document_id: self.document_id,
            claims,
            innocence_score: self.innocence_score,
            model_version: self.model_version.unwrap_or_default(),
            analyzed_at: self.analyzed_at,
        }
    }
}

/// Structured, caller-facing outcome of an analysis attempt.
///
/// Failures never propagate as errors: `success` is false, `error` carries a
/// readable message and every score and claim list is zero or empty.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub success: bool,
    pub document_id: String,
    pub explicit_claims: Vec<Claim>,
    pub implicit_signals: Vec<Claim>,
    pub contextual_signals: Vec<Claim>,
    pub bias_language: Vec<Claim>,
    pub innocence_score: f64,
    /// Chunks actually sent to the classifier
    pub chunks_processed: usize,
    /// Chunks planned
    pub chunks_total: usize,
    /// Analysis stopped early at a chunk boundary
    #[serde(default)]
    pub cancelled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub run_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AnalysisReport {
    pub fn failed(document_id: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            success: false,
            document_id: document_id.into(),
            explicit_claims: vec![],
            implicit_signals: vec![],
            contextual_signals: vec![],
            bias_language: vec![],
            innocence_score: 0.0,
            chunks_processed: 0,
            chunks_total: 0,
            cancelled: false,
            run_id: None,
            error: Some(error.into()),
        }
    }

    pub fn claim_count(&self) -> usize {
        self.explicit_claims.len()
            + self.implicit_signals.len()
            + self.contextual_signals.len()
            + self.bias_language.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Anchor;

    fn claim(signal_type: SignalType) -> Claim {
        Claim {
            text: signal_type.to_string(),
            signal_type,
            confidence: 0.5,
            start_offset: 0,
            end_offset: 4,
            explanation: String::new(),
            anchor: Anchor::Exact,
        }
    }

    #[test]
    fn test_record_round_trip_regroups_claims() {
        let result = AnalysisResult {
            run_id: Uuid::new_v4(),
            document_id: "doc-1".to_string(),
            claims: vec![
                claim(SignalType::BiasLanguage),
                claim(SignalType::Explicit),
                claim(SignalType::Implicit),
            ],
            innocence_score: 0.3,
            model_version: "test".to_string(),
            analyzed_at: Utc::now(),
        };

        let record = AnalysisRecord::from_result(&result);
        assert_eq!(record.explicit_claims.len(), 1);
        assert_eq!(record.implicit_signals.len(), 2);

        let restored = record.into_result();
        let types: Vec<SignalType> = restored.claims.iter().map(|c| c.signal_type).collect();
        assert_eq!(
            types,
            vec![
                SignalType::Explicit,
                SignalType::Implicit,
                SignalType::BiasLanguage
            ]
        );
        assert_eq!(restored.innocence_score, 0.3);
    }

    #[test]
    fn test_failed_report_is_zeroed() {
        let report = AnalysisReport::failed("doc-9", "boom");
        assert!(!report.success);
        assert_eq!(report.innocence_score, 0.0);
        assert_eq!(report.claim_count(), 0);
        assert_eq!(report.error.as_deref(), Some("boom"));
    }
}

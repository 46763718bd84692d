use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;

use crate::models::{Anchor, AnalysisReport, Claim, PriorityRecommendation};

/// Write any serializable output as pretty JSON
pub fn write_json<T: Serialize + ?Sized>(value: &T, path: &Path) -> Result<()> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("Failed to create file: {:?}", path))?;
    serde_json::to_writer_pretty(file, value).context("Failed to write JSON")?;
    Ok(())
}

/// Human-readable rendering of one analysis report
pub struct ReportSummary<'a> {
    report: &'a AnalysisReport,
}

impl<'a> ReportSummary<'a> {
    pub fn new(report: &'a AnalysisReport) -> Self {
        Self { report }
    }

    pub fn format(&self) -> String {
        let report = self.report;
        let mut output = format!("Document: {}\n", report.document_id);

        if let Some(error) = &report.error {
            output.push_str(&format!("Analysis failed: {}\n", error));
            return output;
        }

        output.push_str(&format!(
            "Innocence score: {:.2} ({} claims, {}/{} chunks{})\n",
            report.innocence_score,
            report.claim_count(),
            report.chunks_processed,
            report.chunks_total,
            if report.cancelled { ", cancelled" } else { "" }
        ));

        for (title, claims) in [
            ("Explicit claims", &report.explicit_claims),
            ("Implicit signals", &report.implicit_signals),
            ("Contextual signals", &report.contextual_signals),
            ("Bias language", &report.bias_language),
        ] {
            if claims.is_empty() {
                continue;
            }
            output.push_str(&format!("\n{} ({}):\n", title, claims.len()));
            for claim in claims {
                output.push_str(&format_claim(claim));
            }
        }

        output
    }

    pub fn write_file(&self, path: &Path) -> Result<()> {
        let mut file = std::fs::File::create(path)
            .with_context(|| format!("Failed to create file: {:?}", path))?;
        write!(file, "{}", self.format())?;
        Ok(())
    }
}

fn format_claim(claim: &Claim) -> String {
    let marker = match claim.anchor {
        Anchor::Exact => "",
        Anchor::Fuzzy => " [fuzzy]",
        Anchor::Unanchored => " [unanchored]",
    };
    let mut line = format!(
        "  [{:.2}] @{}..{}{}\n    \"{}\"\n",
        claim.confidence,
        claim.start_offset,
        claim.end_offset,
        marker,
        wrap_text(&claim.text, 72).replace('\n', "\n     ")
    );
    if !claim.explanation.is_empty() {
        line.push_str(&format!(
            "    {}\n",
            wrap_text(&claim.explanation, 72).replace('\n', "\n    ")
        ));
    }
    line
}

/// Ranked recommendations as an aligned table
pub fn format_recommendations(recommendations: &[PriorityRecommendation]) -> String {
    let mut output = format!(
        "{:>4}  {:<20} {:>5}  {:>4} {:>4} {:>4} {:>4}  {}\n",
        "RANK", "SUBJECT", "SCORE", "INN", "BIAS", "URG", "STAT", "REASONS"
    );

    for rec in recommendations {
        output.push_str(&format!(
            "{:>4}  {:<20} {:>5}  {:>4} {:>4} {:>4} {:>4}  {}\n",
            rec.rank,
            rec.subject_id,
            rec.score,
            rec.breakdown.innocence,
            rec.breakdown.bias,
            rec.breakdown.urgency,
            rec.breakdown.status,
            rec.reasons.join("; ")
        ));
    }

    output
}

/// Wrap text at approximately the given width
fn wrap_text(text: &str, width: usize) -> String {
    let mut result = String::new();
    let mut line_len = 0;

    for word in text.split_whitespace() {
        let word_len = word.chars().count();
        if line_len + word_len + 1 > width && line_len > 0 {
            result.push('\n');
            line_len = 0;
        }
        if line_len > 0 {
            result.push(' ');
            line_len += 1;
        }
        result.push_str(word);
        line_len += word_len;
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ScoreBreakdown, SignalType};

    fn claim(anchor: Anchor) -> Claim {
        Claim {
            text: "I did not commit this crime.".to_string(),
            signal_type: SignalType::Explicit,
            confidence: 0.9,
            start_offset: 8,
            end_offset: 36,
            explanation: "Direct denial".to_string(),
            anchor,
        }
    }

    #[test]
    fn test_report_summary() {
        let mut report = AnalysisReport::failed("doc-1", "unused");
        report.success = true;
        report.error = None;
        report.innocence_score = 0.36;
        report.chunks_processed = 1;
        report.chunks_total = 1;
        report.explicit_claims = vec![claim(Anchor::Exact)];
        report.bias_language = vec![claim(Anchor::Unanchored)];

        let text = ReportSummary::new(&report).format();
        assert!(text.contains("Innocence score: 0.36 (2 claims, 1/1 chunks)"));
        assert!(text.contains("Explicit claims (1):"));
        assert!(text.contains("[unanchored]"));
        assert!(!text.contains("Implicit signals"));
    }

    #[test]
    fn test_failed_report_summary() {
        let report = AnalysisReport::failed("doc-2", "No subject speech found");
        let text = ReportSummary::new(&report).format();
        assert_eq!(text, "Document: doc-2\nAnalysis failed: No subject speech found\n");
    }

    #[test]
    fn test_format_recommendations() {
        let recs = vec![PriorityRecommendation {
            subject_id: "A-1".to_string(),
            score: 70,
            rank: 1,
            breakdown: ScoreBreakdown {
                innocence: 20,
                bias: 25,
                urgency: 15,
                status: 10,
            },
            reasons: vec!["Strong innocence claims".to_string()],
        }];
        let table = format_recommendations(&recs);
        assert_eq!(table.lines().count(), 2);
        assert!(table.lines().nth(1).unwrap().contains("Strong innocence claims"));
    }

    #[test]
    fn test_wrap_text() {
        let text = "This is a test of the text wrapping function that should wrap at 20 chars";
        for line in wrap_text(text, 20).lines() {
            assert!(line.len() <= 20);
        }
    }

    #[test]
    fn test_write_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.json");
        write_json(&AnalysisReport::failed("doc-3", "boom"), &path).unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["success"], false);
        assert_eq!(value["error"], "boom");
    }
}

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use crate::models::{subject_blocks, subject_turns, RoleCategory, SpeakerTurn};
use crate::stages::SpeakerSegmenter;

const MAX_RAW_LABELS: usize = 10;
const PREVIEW_CHARS: usize = 500;
const EXCERPT_CHARS: usize = 100;
const MAX_EXCERPTS: usize = 3;

/// Speaker-detection dump used to debug documents where no subject speech
/// was found
#[derive(Debug, Clone, Serialize)]
pub struct SpeakerDiagnostics {
    pub document_len: usize,
    pub subject_hint: Option<String>,
    pub turn_count: usize,
    pub role_counts: BTreeMap<RoleCategory, usize>,
    pub label_counts: BTreeMap<String, usize>,
    pub subject_turn_count: usize,
    pub subject_block_count: usize,
    /// First raw labels found at line starts
    pub raw_labels: Vec<String>,
    /// Subject excerpts, or the start of the document when there are none
    pub preview: Vec<String>,
}

impl SpeakerDiagnostics {
    pub fn collect(segmenter: &SpeakerSegmenter, text: &str, subject_hint: Option<&str>) -> Self {
        let turns = segmenter.segment(text, subject_hint);
        Self::from_turns(segmenter, text, subject_hint, &turns)
    }

    pub fn from_turns(
        segmenter: &SpeakerSegmenter,
        text: &str,
        subject_hint: Option<&str>,
        turns: &[SpeakerTurn],
    ) -> Self {
        let mut role_counts = BTreeMap::new();
        let mut label_counts = BTreeMap::new();
        for turn in turns {
            *role_counts.entry(turn.role).or_insert(0) += 1;
            *label_counts.entry(turn.speaker_label.clone()).or_insert(0) += 1;
        }

        let subject = subject_turns(turns);
        let preview = if subject.is_empty() {
            vec![truncate_chars(text, PREVIEW_CHARS)]
        } else {
            subject
                .iter()
                .take(MAX_EXCERPTS)
                .map(|t| truncate_chars(&t.text, EXCERPT_CHARS))
                .collect()
        };

        Self {
            document_len: text.len(),
            subject_hint: subject_hint.map(str::to_string),
            turn_count: turns.len(),
            role_counts,
            label_counts,
            subject_turn_count: subject.len(),
            subject_block_count: subject_blocks(turns).len(),
            raw_labels: segmenter
                .raw_labels(text)
                .into_iter()
                .take(MAX_RAW_LABELS)
                .map(str::to_string)
                .collect(),
            preview,
        }
    }
}

fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}

impl fmt::Display for SpeakerDiagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Speaker detection ===")?;
        writeln!(f, "Document length: {} bytes", self.document_len)?;
        writeln!(
            f,
            "Subject hint: {}",
            self.subject_hint.as_deref().unwrap_or("(none)")
        )?;
        writeln!(f, "Turns: {}", self.turn_count)?;

        writeln!(f, "\nTurns by role:")?;
        for (role, count) in &self.role_counts {
            writeln!(f, "  {:<16} {}", role.as_str(), count)?;
        }

        writeln!(f, "\nTurns by label:")?;
        for (label, count) in &self.label_counts {
            writeln!(f, "  {:<40} {}", label, count)?;
        }

        writeln!(
            f,
            "\nSubject turns: {} in {} block(s)",
            self.subject_turn_count, self.subject_block_count
        )?;
        writeln!(f, "First labels: {:?}", self.raw_labels)?;

        if self.subject_turn_count == 0 {
            writeln!(f, "\nDocument preview:")?;
        } else {
            writeln!(f, "\nSubject excerpts:")?;
        }
        for line in &self.preview {
            writeln!(f, "  {}", line)?;
        }
        Ok(())
    }
}

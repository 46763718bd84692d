use regex::Regex;

use crate::heuristics::{classify_label, role_rules};
use crate::models::{RoleCategory, SpeakerTurn};

/// Label shown for the single turn of an unlabeled document
pub const UNKNOWN_SPEAKER: &str = "UNKNOWN";

/// Splits a transcript into attributed speaker turns.
///
/// A label is an uppercase run (letters, periods, commas, hyphens, spaces)
/// anchored at a line start and terminated by a colon.
pub struct SpeakerSegmenter {
    label_pattern: Regex,
}

impl Default for SpeakerSegmenter {
    fn default() -> Self {
        Self::new()
    }
}

impl SpeakerSegmenter {
    pub fn new() -> Self {
        Self {
            label_pattern: Regex::new(r"(?m)^([A-Z][A-Z \t.,\-]+?):[ \t]*")
                .expect("speaker label pattern is valid"),
        }
    }

    /// Raw labels found at line starts, in document order
    pub fn raw_labels<'a>(&self, text: &'a str) -> Vec<&'a str> {
        self.label_pattern
            .captures_iter(text)
            .filter_map(|c| c.get(1))
            .map(|m| m.as_str().trim())
            .collect()
    }

    /// Segment `text` into turns. Never fails: a document without labels comes
    /// back as one UNKNOWN turn spanning the whole text.
    pub fn segment(&self, text: &str, subject_hint: Option<&str>) -> Vec<SpeakerTurn> {
        let matches: Vec<(usize, usize, &str)> = self
            .label_pattern
            .captures_iter(text)
            .filter_map(|c| {
                let whole = c.get(0)?;
                let label = c.get(1)?;
                Some((whole.start(), whole.end(), label.as_str().trim()))
            })
            .collect();

        if matches.is_empty() {
            return vec![SpeakerTurn {
                speaker_label: UNKNOWN_SPEAKER.to_string(),
                role: RoleCategory::Unknown,
                text: text.to_string(),
                start_offset: 0,
                end_offset: text.len(),
            }];
        }

        let rules = role_rules(subject_hint);
        let mut turns = Vec::with_capacity(matches.len());

        for (i, &(_, body_start, label)) in matches.iter().enumerate() {
            let end_offset = matches
                .get(i + 1)
                .map(|&(next_start, _, _)| next_start)
                .unwrap_or(text.len());

            let body = text[body_start..end_offset].trim();
            if body.is_empty() {
                continue;
            }

            turns.push(SpeakerTurn {
                speaker_label: label.to_string(),
                role: classify_label(&rules, label),
                text: body.to_string(),
                start_offset: body_start,
                end_offset,
            });
        }

        turns
    }
}

use std::fmt;

use serde::{Deserialize, Serialize};

/// Role category a speaker label resolves to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoleCategory {
    /// The person whose statements are analyzed
    Subject,
    /// Judge, commissioner or presiding member
    Adjudicator,
    /// Defense attorney or counsel
    CounselDefense,
    /// Prosecutor or district attorney
    CounselProsecution,
    /// Any witness
    Witness,
    /// Label matched no rule
    Unknown,
}

impl RoleCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            RoleCategory::Subject => "subject",
            RoleCategory::Adjudicator => "adjudicator",
            RoleCategory::CounselDefense => "defense counsel",
            RoleCategory::CounselProsecution => "prosecution",
            RoleCategory::Witness => "witness",
            RoleCategory::Unknown => "unknown",
        }
    }
}

impl fmt::Display for RoleCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One attributed speaker turn of a transcript.
///
/// Offsets are byte offsets into the preprocessed document and always fall on
/// UTF-8 character boundaries, so `&document[start_offset..end_offset]` is valid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeakerTurn {
    /// Label as written in the transcript (e.g. "PRESIDING COMMISSIONER RUFF")
    pub speaker_label: String,
    /// Resolved role for the label
    pub role: RoleCategory,
    /// Trimmed text spoken in this turn
    pub text: String,
    /// Start of the turn body (just after the label and colon)
    pub start_offset: usize,
    /// Start of the next label, or document end
    pub end_offset: usize,
}

impl SpeakerTurn {
    pub fn is_subject(&self) -> bool {
        self.role == RoleCategory::Subject
    }

    /// Length of the turn span in bytes
    pub fn span_len(&self) -> usize {
        self.end_offset.saturating_sub(self.start_offset)
    }
}

/// Turns attributed to the subject
pub fn subject_turns(turns: &[SpeakerTurn]) -> Vec<&SpeakerTurn> {
    turns.iter().filter(|t| t.is_subject()).collect()
}

/// Group maximal runs of consecutive subject turns, returned as index ranges
/// into `turns`
pub fn subject_blocks(turns: &[SpeakerTurn]) -> Vec<std::ops::Range<usize>> {
    let mut blocks = Vec::new();
    let mut block_start: Option<usize> = None;

    for (i, turn) in turns.iter().enumerate() {
        match (turn.is_subject(), block_start) {
            (true, None) => block_start = Some(i),
            (false, Some(start)) => {
                blocks.push(start..i);
                block_start = None;
            }
            _ => {}
        }
    }

    if let Some(start) = block_start {
        blocks.push(start..turns.len());
    }

    blocks
}

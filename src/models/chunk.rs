use serde::{Deserialize, Serialize};

use super::{RoleCategory, SpeakerTurn};

/// Configuration for chunk planning
#[derive(Debug, Clone)]
pub struct ChunkConfig {
    /// Character budget per chunk (~4 chars per classifier token)
    pub max_chars: usize,
}

impl Default for ChunkConfig {
    fn default() -> Self {
        Self {
            max_chars: 32_000, // ~8000 tokens
        }
    }
}

/// A contiguous slice of the transcript sent to the classifier as one unit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptChunk {
    /// Turns covered by this chunk, in document order
    pub turns: Vec<SpeakerTurn>,
    /// Always `document[start_offset..end_offset]`
    pub text: String,
    /// Start of the first turn
    pub start_offset: usize,
    /// End of the last turn
    pub end_offset: usize,
}

impl TranscriptChunk {
    /// Number of subject turns in this chunk
    pub fn subject_turn_count(&self) -> usize {
        self.turns.iter().filter(|t| t.is_subject()).count()
    }

    /// Distinct roles present, in order of first appearance
    pub fn roles(&self) -> Vec<RoleCategory> {
        let mut roles = Vec::new();
        for turn in &self.turns {
            if !roles.contains(&turn.role) {
                roles.push(turn.role);
            }
        }
        roles
    }

    pub fn len(&self) -> usize {
        self.end_offset.saturating_sub(self.start_offset)
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }
}

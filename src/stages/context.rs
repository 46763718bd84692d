use crate::models::TranscriptChunk;

/// Default upper bound for a context summary, in characters
pub const DEFAULT_CONTEXT_MAX_LEN: usize = 500;

const PREFIX: &str = "Context from previous sections: ";
const ELLIPSIS: &str = "...";

/// One sentence describing a processed chunk
pub fn chunk_summary(chunk: &TranscriptChunk) -> String {
    let subject_turns = chunk.subject_turn_count();
    if subject_turns == 0 {
        return "No subject statements in this section.".to_string();
    }

    let roles = chunk
        .roles()
        .iter()
        .map(|r| r.as_str())
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        "Previous section included {} subject statement(s) with speakers: {}.",
        subject_turns, roles
    )
}

/// Summarize the chunks processed so far for the next classifier call.
///
/// Deterministic for a given chunk list; the result never exceeds `max_len`
/// characters and is empty when there is nothing to carry forward.
pub fn summarize(preceding: &[&TranscriptChunk], max_len: usize) -> String {
    if preceding.is_empty() || max_len == 0 {
        return String::new();
    }

    let body = preceding
        .iter()
        .map(|c| chunk_summary(c))
        .collect::<Vec<_>>()
        .join(" ");
    let full = format!("{}{}", PREFIX, body);

    if full.chars().count() <= max_len {
        return full;
    }

    let keep = max_len.saturating_sub(ELLIPSIS.len());
    let mut truncated: String = full.chars().take(keep).collect();
    truncated.push_str(&ELLIPSIS[..max_len.min(ELLIPSIS.len())]);
    truncated
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{RoleCategory, SpeakerTurn};

    fn chunk(roles: &[RoleCategory]) -> TranscriptChunk {
        let turns = roles
            .iter()
            .enumerate()
            .map(|(i, &role)| SpeakerTurn {
                speaker_label: "X".to_string(),
                role,
                text: "text".to_string(),
                start_offset: i * 10,
                end_offset: i * 10 + 10,
            })
            .collect::<Vec<_>>();
        TranscriptChunk {
            text: "x".repeat(turns.len() * 10),
            start_offset: 0,
            end_offset: turns.len() * 10,
            turns,
        }
    }

    #[test]
    fn test_empty_input_yields_empty_summary() {
        assert_eq!(summarize(&[], 500), "");
    }

    #[test]
    fn test_summary_lists_counts_and_roles() {
        let a = chunk(&[
            RoleCategory::Adjudicator,
            RoleCategory::Subject,
            RoleCategory::Subject,
        ]);
        let b = chunk(&[RoleCategory::Witness]);

        let summary = summarize(&[&a, &b], 500);
        assert_eq!(
            summary,
            "Context from previous sections: Previous section included 2 subject statement(s) \
with speakers: adjudicator, subject. No subject statements in this section."
        );
    }

    #[test]
    fn test_summary_is_bounded_and_deterministic() {
        let chunks: Vec<TranscriptChunk> = (0..50)
            .map(|_| chunk(&[RoleCategory::Subject, RoleCategory::CounselDefense]))
            .collect();
        let refs: Vec<&TranscriptChunk> = chunks.iter().collect();

        let first = summarize(&refs, 200);
        let second = summarize(&refs, 200);

        assert_eq!(first, second);
        assert_eq!(first.chars().count(), 200);
        assert!(first.ends_with("..."));
    }

    #[test]
    fn test_tiny_budget() {
        let a = chunk(&[RoleCategory::Subject]);
        assert_eq!(summarize(&[&a], 2), "..");
    }
}

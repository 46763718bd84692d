use crate::models::{ChunkConfig, SpeakerTurn, TranscriptChunk};

/// Plan classifier chunks over the segmented turns.
///
/// Greedy single pass. A chunk is closed before a turn only when appending it
/// would exceed `max_chars`, the chunk is non-empty, and the cut would not
/// separate two adjacent subject turns. Otherwise the turn is appended even if
/// that overruns the budget, so a run of subject turns is never split.
///
/// Returns no chunks when the document has no subject turn at all.
pub fn plan_chunks(
    document: &str,
    turns: &[SpeakerTurn],
    config: &ChunkConfig,
) -> Vec<TranscriptChunk> {
    if !turns.iter().any(|t| t.is_subject()) {
        return vec![];
    }

    let mut chunks = Vec::new();
    let mut current: Vec<&SpeakerTurn> = Vec::new();

    for turn in turns {
        if let Some(first) = current.first() {
            let would_be_len = turn.end_offset.saturating_sub(first.start_offset);
            let splits_subject_run =
                turn.is_subject() && current.last().is_some_and(|prev| prev.is_subject());

            if would_be_len > config.max_chars && !splits_subject_run {
                chunks.push(build_chunk(document, &current));
                current.clear();
            }
        }
        current.push(turn);
    }

    if !current.is_empty() {
        chunks.push(build_chunk(document, &current));
    }

    chunks
}

/// Create a chunk spanning the given consecutive turns
fn build_chunk(document: &str, turns: &[&SpeakerTurn]) -> TranscriptChunk {
    let start_offset = turns.first().map(|t| t.start_offset).unwrap_or(0);
    let end_offset = turns
        .last()
        .map(|t| t.end_offset)
        .unwrap_or(start_offset)
        .min(document.len());

    TranscriptChunk {
        turns: turns.iter().map(|&t| t.clone()).collect(),
        text: document
            .get(start_offset..end_offset)
            .unwrap_or_default()
            .to_string(),
        start_offset,
        end_offset,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{subject_blocks, RoleCategory};
    use crate::stages::SpeakerSegmenter;

    fn config(max_chars: usize) -> ChunkConfig {
        ChunkConfig { max_chars }
    }

    fn sample_document() -> String {
        let mut doc = String::new();
        for i in 0..6 {
            doc.push_str(&format!("THE COURT: Question number {} for the record.\n", i));
            doc.push_str(&format!("INMATE: First answer part {}.\n", i));
            doc.push_str(&format!("INMATE: Second answer part {}.\n", i));
            doc.push_str("DEFENSE COUNSEL: Nothing further.\n");
        }
        doc
    }

    #[test]
    fn test_no_subject_turns_yields_no_chunks() {
        let text = "plain text with no colons";
        let turns = SpeakerSegmenter::new().segment(text, None);
        assert!(plan_chunks(text, &turns, &config(100)).is_empty());
    }

    #[test]
    fn test_small_document_is_one_chunk() {
        let text = "INMATE: I did not commit this crime.\nTHE COURT: Noted.";
        let turns = SpeakerSegmenter::new().segment(text, Some("INMATE"));
        let chunks = plan_chunks(text, &turns, &config(32_000));

        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].turns.len(), 2);
        assert_eq!(chunks[0].start_offset, 8);
        assert_eq!(chunks[0].text, &text[8..]);
    }

    #[test]
    fn test_chunks_are_ordered_and_faithful() {
        let doc = sample_document();
        let turns = SpeakerSegmenter::new().segment(&doc, None);
        let chunks = plan_chunks(&doc, &turns, &config(120));

        assert!(chunks.len() > 1);
        for chunk in &chunks {
            assert_eq!(chunk.text, &doc[chunk.start_offset..chunk.end_offset]);
        }
        for pair in chunks.windows(2) {
            assert!(pair[0].end_offset <= pair[1].start_offset);
        }

        let planned: usize = chunks.iter().map(|c| c.turns.len()).sum();
        assert_eq!(planned, turns.len());
    }

    #[test]
    fn test_subject_runs_never_split() {
        let doc = sample_document();
        let turns = SpeakerSegmenter::new().segment(&doc, None);

        for budget in [1, 40, 80, 120, 500] {
            let chunks = plan_chunks(&doc, &turns, &config(budget));
            for block in subject_blocks(&turns) {
                let block_turns = &turns[block];
                let holders: Vec<usize> = chunks
                    .iter()
                    .enumerate()
                    .filter(|(_, c)| c.turns.iter().any(|t| block_turns.contains(t)))
                    .map(|(i, _)| i)
                    .collect();
                assert_eq!(holders.len(), 1, "budget {} split a subject run", budget);
                let chunk = &chunks[holders[0]];
                assert!(block_turns.iter().all(|t| chunk.turns.contains(t)));
            }
        }
    }

    #[test]
    fn test_oversized_subject_run_overruns_budget() {
        let doc = "THE COURT: Go ahead.\nINMATE: One long statement.\nINMATE: And another one.\n";
        let turns = SpeakerSegmenter::new().segment(doc, None);
        let chunks = plan_chunks(doc, &turns, &config(5));

        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].turns[0].role, RoleCategory::Adjudicator);
        assert_eq!(chunks[1].turns.len(), 2);
        assert!(chunks[1].len() > 5);
    }
}

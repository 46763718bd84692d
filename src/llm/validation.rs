use std::ops::Range;

use serde_json::Value;
use tracing::{debug, warn};

use crate::models::{Anchor, Claim, RawClaim, SignalType, TranscriptChunk};

/// Remove a surrounding Markdown code fence (```json ... ``` or ``` ... ```)
pub fn strip_code_fences(response: &str) -> &str {
    let trimmed = response.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };

    // Drop the info string ("json") up to the end of the opening line
    let rest = match rest.find('\n') {
        Some(newline) if rest[..newline].chars().all(|c| c.is_ascii_alphanumeric()) => {
            &rest[newline + 1..]
        }
        _ => rest.strip_prefix("json").unwrap_or(rest),
    };

    rest.trim_end().strip_suffix("```").unwrap_or(rest).trim()
}

/// Parse the classifier's response into raw claim elements.
///
/// Unparseable or non-array responses yield nothing; elements that are not
/// objects of the expected shape are skipped individually.
pub fn parse_raw_claims(response: &str) -> Vec<RawClaim> {
    let json = strip_code_fences(response);

    let parsed: Value = match serde_json::from_str(json) {
        Ok(value) => value,
        Err(e) => {
            warn!("Classifier response is not valid JSON: {}", e);
            debug!("Response text: {}", response);
            return vec![];
        }
    };

    let Value::Array(elements) = parsed else {
        warn!("Classifier response is not an array");
        return vec![];
    };

    elements
        .into_iter()
        .filter_map(|element| match serde_json::from_value::<RawClaim>(element) {
            Ok(raw) => Some(raw),
            Err(e) => {
                warn!("Skipping malformed claim element: {}", e);
                None
            }
        })
        .collect()
}

/// Validate one raw claim against its chunk and re-anchor it to document offsets.
///
/// Rejects a missing quote, an unknown signal type, or a confidence outside
/// [0, 1]. A quote that cannot be located is kept, flagged `Unanchored`.
pub fn validate_claim(raw: &RawClaim, chunk: &TranscriptChunk) -> Option<Claim> {
    let text = raw.text.as_deref().map(str::trim).filter(|t| !t.is_empty())?;

    let signal_type = match raw.signal_type.as_deref().map(str::parse::<SignalType>) {
        Some(Ok(signal_type)) => signal_type,
        Some(Err(e)) => {
            warn!("Invalid signal type: {}", e);
            return None;
        }
        None => {
            warn!("Claim without signal type: {:.50}", text);
            return None;
        }
    };

    let confidence = match raw.confidence {
        Some(c) if c.is_finite() && (0.0..=1.0).contains(&c) => c,
        other => {
            warn!("Invalid confidence value: {:?}", other);
            return None;
        }
    };

    let (anchor, local) = match locate_quote(text, &chunk.text) {
        Some((anchor, range)) => (anchor, range),
        None => {
            warn!("Claim not found in chunk (keeping anyway): {:.50}", text);
            (Anchor::Unanchored, 0..unanchored_end(text.len(), &chunk.text))
        }
    };

    if anchor == Anchor::Fuzzy {
        debug!("Fuzzy match found for: {:.50}", text);
    }

    Some(Claim {
        text: text.to_string(),
        signal_type,
        confidence,
        start_offset: chunk.start_offset + local.start,
        end_offset: chunk.start_offset + local.end,
        explanation: raw.explanation.clone().unwrap_or_default(),
        anchor,
    })
}

/// Quote length clamped to the chunk and moved back onto a char boundary
fn unanchored_end(quote_len: usize, chunk_text: &str) -> usize {
    let mut end = quote_len.min(chunk_text.len());
    while !chunk_text.is_char_boundary(end) {
        end -= 1;
    }
    end
}

/// Parse and validate a whole response for one chunk
pub fn validate_response(response: &str, chunk: &TranscriptChunk) -> Vec<Claim> {
    parse_raw_claims(response)
        .iter()
        .filter_map(|raw| validate_claim(raw, chunk))
        .collect()
}

/// Find `quote` in `haystack`, exactly first and then after normalization.
/// Returns chunk-local byte ranges.
pub fn locate_quote(quote: &str, haystack: &str) -> Option<(Anchor, Range<usize>)> {
    if let Some(start) = haystack.find(quote) {
        return Some((Anchor::Exact, start..start + quote.len()));
    }

    let needle = NormalizedText::new(quote).text;
    if needle.is_empty() {
        return None;
    }

    let normalized = NormalizedText::new(haystack);
    let start = normalized.text.find(&needle)?;
    let end = start + needle.len();
    let source_start = normalized.source_spans[start].start;
    let source_end = normalized.source_spans[end - 1].end;

    Some((Anchor::Fuzzy, source_start..source_end))
}

/// Lowercased text with punctuation stripped and whitespace collapsed, keeping
/// for every normalized byte the source character it came from
struct NormalizedText {
    text: String,
    source_spans: Vec<Range<usize>>,
}

impl NormalizedText {
    fn new(source: &str) -> Self {
        let mut text = String::with_capacity(source.len());
        let mut source_spans = Vec::with_capacity(source.len());

        for (i, c) in source.char_indices() {
            let span = i..i + c.len_utf8();

            if c.is_whitespace() {
                if !text.is_empty() && !text.ends_with(' ') {
                    text.push(' ');
                    source_spans.push(span);
                }
            } else if c.is_alphanumeric() || c == '_' {
                for lower in c.to_lowercase() {
                    text.push(lower);
                    source_spans.extend(std::iter::repeat_n(span.clone(), lower.len_utf8()));
                }
            }
        }

        if text.ends_with(' ') {
            text.pop();
            source_spans.pop();
        }

        Self { text, source_spans }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{RoleCategory, SpeakerTurn};

    fn chunk(document: &str, start: usize) -> TranscriptChunk {
        TranscriptChunk {
            turns: vec![SpeakerTurn {
                speaker_label: "INMATE".to_string(),
                role: RoleCategory::Subject,
                text: document[start..].trim().to_string(),
                start_offset: start,
                end_offset: document.len(),
            }],
            text: document[start..].to_string(),
            start_offset: start,
            end_offset: document.len(),
        }
    }

    fn raw(text: &str, signal_type: &str, confidence: f64) -> RawClaim {
        RawClaim {
            text: Some(text.to_string()),
            signal_type: Some(signal_type.to_string()),
            confidence: Some(confidence),
            explanation: None,
        }
    }

    #[test]
    fn test_strip_code_fences() {
        assert_eq!(strip_code_fences("```json\n[]\n```"), "[]");
        assert_eq!(strip_code_fences("```\n[1]\n```\n"), "[1]");
        assert_eq!(strip_code_fences("```json[2]```"), "[2]");
        assert_eq!(strip_code_fences("  [3]  "), "[3]");
    }

    #[test]
    fn test_parse_skips_bad_elements_only() {
        let response = r#"```json
[
  {"text": "I was home", "signal_type": "explicit", "confidence": 0.9},
  {"text": "bad confidence type", "signal_type": "explicit", "confidence": "high"},
  "not an object",
  {"signal_type": "implicit", "confidence": 0.4}
]
```"#;
        let raws = parse_raw_claims(response);
        assert_eq!(raws.len(), 2);
        assert!(raws[1].text.is_none());
    }

    #[test]
    fn test_parse_malformed_response() {
        assert!(parse_raw_claims("Sure! Here are the claims: [").is_empty());
        assert!(parse_raw_claims(r#"{"text": "x"}"#).is_empty());
    }

    #[test]
    fn test_exact_match_offsets_are_global() {
        let doc = "INMATE: I did not commit this crime.\nTHE COURT: Noted.";
        let chunk = chunk(doc, 8);
        let claim = validate_claim(&raw("I did not commit this crime.", "explicit", 0.9), &chunk)
            .unwrap();

        assert_eq!(claim.anchor, Anchor::Exact);
        assert_eq!(claim.start_offset, 8);
        assert_eq!(&doc[claim.start_offset..claim.end_offset], "I did not commit this crime.");
    }

    #[test]
    fn test_fuzzy_match_keeps_claim() {
        let doc = "THE COURT: Go on.\nINMATE: I  never,\nsaw that   man before.";
        let chunk = chunk(doc, 11);
        let claim =
            validate_claim(&raw("I never saw that man before", "explicit", 0.7), &chunk).unwrap();

        assert_eq!(claim.anchor, Anchor::Fuzzy);
        assert!(claim.is_unanchored());
        assert_eq!(
            &doc[claim.start_offset..claim.end_offset],
            "I  never,\nsaw that   man before"
        );
    }

    #[test]
    fn test_unlocatable_quote_is_kept_unanchored() {
        let doc = "INMATE: Something else entirely.";
        let chunk = chunk(doc, 8);
        let claim = validate_claim(&raw("I was framed", "contextual", 0.6), &chunk).unwrap();

        assert_eq!(claim.anchor, Anchor::Unanchored);
        assert_eq!(claim.start_offset, 8);
        assert_eq!(claim.end_offset, 8 + "I was framed".len());
    }

    #[test]
    fn test_unanchored_offsets_stay_sliceable() {
        let doc = "INMATE: Hi.";
        let long_quote = raw("I was wrongly convicted back then", "explicit", 0.8);
        let claim = validate_claim(&long_quote, &chunk(doc, 8)).unwrap();
        assert_eq!(claim.anchor, Anchor::Unanchored);
        assert_eq!((claim.start_offset, claim.end_offset), (8, doc.len()));

        let doc = "INMATE: héllo there";
        let claim = validate_claim(&raw("Xy", "implicit", 0.4), &chunk(doc, 8)).unwrap();
        assert_eq!(claim.end_offset, 9);
        assert!(doc.get(claim.start_offset..claim.end_offset).is_some());
    }

    #[test]
    fn test_rejections() {
        let doc = "INMATE: I was home.";
        let chunk = chunk(doc, 8);

        assert!(validate_claim(&raw("I was home.", "remorse", 0.5), &chunk).is_none());
        assert!(validate_claim(&raw("I was home.", "explicit", 1.5), &chunk).is_none());
        assert!(validate_claim(&raw("I was home.", "explicit", -0.1), &chunk).is_none());
        assert!(validate_claim(&raw("   ", "explicit", 0.5), &chunk).is_none());
        assert!(validate_claim(&RawClaim::default(), &chunk).is_none());
    }

    #[test]
    fn test_validate_response_bounds() {
        let doc = "INMATE: I was home. I am innocent.";
        let chunk = chunk(doc, 8);
        let response = r#"[
            {"text": "I was home.", "signal_type": "contextual", "confidence": 1.0},
            {"text": "I am innocent.", "signal_type": "explicit", "confidence": 0.0},
            {"text": "I am innocent.", "signal_type": "explicit", "confidence": 7}
        ]"#;

        let claims = validate_response(response, &chunk);
        assert_eq!(claims.len(), 2);
        assert!(claims.iter().all(|c| (0.0..=1.0).contains(&c.confidence)));
    }
}

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Signal categories the classifier may report - restricted enum, anything else is rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalType {
    /// Direct denial of guilt ("I did not commit this crime")
    Explicit,
    /// Maintained innocence despite cost (refused deals, consistent denials)
    Implicit,
    /// Problematic case circumstances (recantations, chain-of-custody gaps)
    Contextual,
    /// Institutional language penalizing denial ("lack of insight")
    BiasLanguage,
}

impl SignalType {
    pub const ALL: [SignalType; 4] = [
        SignalType::Explicit,
        SignalType::Implicit,
        SignalType::Contextual,
        SignalType::BiasLanguage,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SignalType::Explicit => "explicit",
            SignalType::Implicit => "implicit",
            SignalType::Contextual => "contextual",
            SignalType::BiasLanguage => "bias_language",
        }
    }
}

impl fmt::Display for SignalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SignalType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "explicit" => Ok(SignalType::Explicit),
            "implicit" => Ok(SignalType::Implicit),
            "contextual" => Ok(SignalType::Contextual),
            "bias_language" => Ok(SignalType::BiasLanguage),
            other => Err(format!("unknown signal type: {}", other)),
        }
    }
}

/// One element of the classifier's JSON array, before validation.
///
/// Every field is optional so that a single malformed element can be
/// rejected without failing the whole response.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawClaim {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub signal_type: Option<String>,
    #[serde(default)]
    pub confidence: Option<f64>,
    #[serde(default)]
    pub explanation: Option<String>,
}

/// How precisely a claim's quote was located in its chunk
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Anchor {
    /// Quote found verbatim; offsets cover exactly the quote
    Exact,
    /// Found only after punctuation, case and whitespace normalization;
    /// offsets cover the matching source span
    Fuzzy,
    /// Not found at all; offsets default to the chunk start plus the quote length
    Unanchored,
}

/// A validated innocence signal with document-global offsets
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claim {
    /// Quote as returned by the classifier
    pub text: String,
    pub signal_type: SignalType,
    /// Classifier confidence, always within [0, 1]
    pub confidence: f64,
    /// Start byte offset in the document
    pub start_offset: usize,
    /// End byte offset in the document. For `Anchor::Unanchored` the span starts
    /// at the chunk start and covers the quote length, clamped to the chunk, so
    /// it is sliceable but does not hold the quote.
    pub end_offset: usize,
    #[serde(default)]
    pub explanation: String,
    #[serde(default = "default_anchor")]
    pub anchor: Anchor,
}

fn default_anchor() -> Anchor {
    Anchor::Exact
}

impl Claim {
    /// Quote could not be located verbatim (fuzzy or unanchored)
    pub fn is_unanchored(&self) -> bool {
        self.anchor != Anchor::Exact
    }
}

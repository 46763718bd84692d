use std::collections::BTreeMap;

use crate::models::{Claim, SignalType};

/// Claims grouped by signal type plus the weighted transcript score
#[derive(Debug, Clone, PartialEq)]
pub struct Aggregate {
    pub by_type: BTreeMap<SignalType, Vec<Claim>>,
    /// Weighted score in [0, 1], rounded to two decimals
    pub innocence_score: f64,
}

impl Aggregate {
    pub fn claims(&self, signal_type: SignalType) -> &[Claim] {
        self.by_type
            .get(&signal_type)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

/// Weight of each signal type in the innocence score.
/// Explicit self-reported innocence counts most, bias language least.
pub fn signal_weight(signal_type: SignalType) -> f64 {
    match signal_type {
        SignalType::Explicit => 0.4,
        SignalType::Contextual => 0.3,
        SignalType::Implicit => 0.2,
        SignalType::BiasLanguage => 0.1,
    }
}

/// Mean confidence of the claims, 0.0 when there are none
pub fn mean_confidence(claims: &[Claim]) -> f64 {
    if claims.is_empty() {
        return 0.0;
    }
    claims.iter().map(|c| c.confidence).sum::<f64>() / claims.len() as f64
}

/// Combine all validated claims of a document into one score. Never fails;
/// an empty claim list scores exactly 0.
pub fn aggregate(claims: &[Claim]) -> Aggregate {
    let mut by_type: BTreeMap<SignalType, Vec<Claim>> = BTreeMap::new();
    for claim in claims {
        by_type
            .entry(claim.signal_type)
            .or_default()
            .push(claim.clone());
    }

    let weighted: f64 = SignalType::ALL
        .iter()
        .map(|t| {
            let claims = by_type.get(t).map(Vec::as_slice).unwrap_or(&[]);
            signal_weight(*t) * mean_confidence(claims)
        })
        .sum();

    Aggregate {
        by_type,
        innocence_score: round2(weighted).clamp(0.0, 1.0),
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};

use crate::heuristics::{RoleLookup, normalize_label};
use crate::models::AdjudicatorBackground;

/// Roster shipped with the crate
const BUNDLED_ROSTER: &str = include_str!("../../data/roster.json");

/// Name -> background table loaded from JSON reference data.
///
/// Expected format:
/// ```json
/// {"MICHAEL RUFF": "law_enforcement", "TEAL KOZEL": "mental_health"}
/// ```
#[derive(Debug, Clone, Default)]
pub struct Roster {
    entries: HashMap<String, AdjudicatorBackground>,
}

impl Roster {
    pub fn from_json(json: &str) -> Result<Self> {
        let raw: HashMap<String, AdjudicatorBackground> =
            serde_json::from_str(json).context("Failed to parse roster JSON")?;
        Ok(raw.into_iter().collect())
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read roster file: {:?}", path))?;
        Self::from_json(&content)
    }

    /// The roster bundled under `data/roster.json`
    pub fn bundled() -> Result<Self> {
        Self::from_json(BUNDLED_ROSTER)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(String, AdjudicatorBackground)> for Roster {
    fn from_iter<T: IntoIterator<Item = (String, AdjudicatorBackground)>>(iter: T) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(name, background)| (normalize_label(&name), background))
                .collect(),
        }
    }
}

impl RoleLookup for Roster {
    fn lookup(&self, name: &str) -> Option<AdjudicatorBackground> {
        self.entries.get(&normalize_label(name)).copied()
    }
}

use regex::Regex;

use crate::models::AdjudicatorBackground;

/// Capability to resolve an adjudicator name to a background category
pub trait RoleLookup: Send + Sync {
    /// `name` is uppercased with single spaces
    fn lookup(&self, name: &str) -> Option<AdjudicatorBackground>;
}

/// Extracts adjudicator names from the "PANEL PRESENT" roster section
pub struct PanelExtractor {
    section_pattern: Regex,
    name_pattern: Regex,
}

impl Default for PanelExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl PanelExtractor {
    pub fn new() -> Self {
        Self {
            section_pattern: Regex::new(r"(?i)PANEL PRESENT:?\s*([\s\S]*?)(?:OTHERS PRESENT|$)")
                .expect("panel section pattern is valid"),
            name_pattern: Regex::new(
                r"(?i)([A-Z][A-Z'\-]*(?:[ \t]+[A-Z][A-Z'\-]*)+),?\s+(?:Presiding|Deputy)\s+Commissioner",
            )
            .expect("panel name pattern is valid"),
        }
    }

    /// Distinct adjudicator names in order of appearance, uppercased.
    /// Names must be two to four words long.
    pub fn extract(&self, text: &str) -> Vec<String> {
        let Some(section) = self
            .section_pattern
            .captures(text)
            .and_then(|c| c.get(1))
        else {
            return vec![];
        };

        let mut names: Vec<String> = Vec::new();
        for caps in self.name_pattern.captures_iter(section.as_str()) {
            let name = caps[1].split_whitespace().collect::<Vec<_>>().join(" ").to_uppercase();
            let word_count = name.split(' ').count();
            if (2..=4).contains(&word_count) && !names.contains(&name) {
                names.push(name);
            }
        }
        names
    }
}

/// Panel composition as seen through a role lookup
#[derive(Debug, Clone, PartialEq)]
pub struct PanelAssessment {
    pub adjudicators: Vec<String>,
    /// Adjudicators with law-enforcement or prosecution backgrounds
    pub enforcement_aligned: Vec<String>,
}

impl PanelAssessment {
    pub fn assess(adjudicators: Vec<String>, lookup: &dyn RoleLookup) -> Self {
        let enforcement_aligned = adjudicators
            .iter()
            .filter(|name| {
                lookup
                    .lookup(name)
                    .is_some_and(|b| b.is_enforcement_aligned())
            })
            .cloned()
            .collect();

        Self {
            adjudicators,
            enforcement_aligned,
        }
    }

    /// Share of enforcement-aligned adjudicators, 0.0 for an empty panel
    pub fn aligned_ratio(&self) -> f64 {
        if self.adjudicators.is_empty() {
            return 0.0;
        }
        self.enforcement_aligned.len() as f64 / self.adjudicators.len() as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedLookup;

    impl RoleLookup for FixedLookup {
        fn lookup(&self, name: &str) -> Option<AdjudicatorBackground> {
            match name {
                "MICHAEL RUFF" => Some(AdjudicatorBackground::LawEnforcement),
                "JULIE GARLAND" => Some(AdjudicatorBackground::Prosecution),
                "TEAL KOZEL" => Some(AdjudicatorBackground::MentalHealth),
                _ => None,
            }
        }
    }

    const HEADER: &str = "SUBSEQUENT PAROLE CONSIDERATION HEARING\n\
PANEL PRESENT:\n\
MICHAEL RUFF, Presiding Commissioner\n\
Teal Kozel, Deputy Commissioner\n\
OTHERS PRESENT:\n\
JANE ROE, Deputy Commissioner\n";

    #[test]
    fn test_extract_stops_at_others_present() {
        let names = PanelExtractor::new().extract(HEADER);
        assert_eq!(names, vec!["MICHAEL RUFF", "TEAL KOZEL"]);
    }

    #[test]
    fn test_extract_without_section() {
        let names = PanelExtractor::new().extract("MICHAEL RUFF, Presiding Commissioner");
        assert!(names.is_empty());
    }

    #[test]
    fn test_extract_handles_hyphens_and_duplicates() {
        let text = "PANEL PRESENT: ROSALIND SARGENT-BURNS, Presiding Commissioner\n\
ROSALIND SARGENT-BURNS, Presiding Commissioner";
        let names = PanelExtractor::new().extract(text);
        assert_eq!(names, vec!["ROSALIND SARGENT-BURNS"]);
    }

    #[test]
    fn test_assessment_ratio() {
        let assessment = PanelAssessment::assess(
            vec!["MICHAEL RUFF".to_string(), "TEAL KOZEL".to_string()],
            &FixedLookup,
        );
        assert_eq!(assessment.enforcement_aligned, vec!["MICHAEL RUFF"]);
        assert!((assessment.aligned_ratio() - 0.5).abs() < 1e-9);
    }
}

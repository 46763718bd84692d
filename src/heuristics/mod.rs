pub mod keywords;
pub mod panel;
pub mod roles;

pub use keywords::*;
pub use panel::*;
pub use roles::*;

use regex::Regex;

type Predicate<I> = Box<dyn Fn(&I) -> bool + Send + Sync>;

/// A named predicate paired with the tag it yields
pub struct Rule<I: ?Sized, T> {
    pub name: String,
    pub tag: T,
    predicate: Predicate<I>,
}

impl<I: ?Sized, T> Rule<I, T> {
    pub fn new(
        name: impl Into<String>,
        tag: T,
        predicate: impl Fn(&I) -> bool + Send + Sync + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            tag,
            predicate: Box::new(predicate),
        }
    }

    pub fn matches(&self, input: &I) -> bool {
        (self.predicate)(input)
    }
}

impl<T> Rule<str, T> {
    /// Matches when the input contains any of the given substrings
    pub fn contains_any(name: impl Into<String>, tag: T, needles: &[&'static str]) -> Self {
        let needles = needles.to_vec();
        Self::new(name, tag, move |input: &str| {
            needles.iter().any(|n| input.contains(n))
        })
    }

    /// Matches when any of the patterns is found in the input
    pub fn any_pattern(name: impl Into<String>, tag: T, patterns: Vec<Regex>) -> Self {
        Self::new(name, tag, move |input: &str| {
            patterns.iter().any(|p| p.is_match(input))
        })
    }
}

/// Ordered rule list evaluated first-match-wins
pub struct RuleSet<I: ?Sized, T> {
    rules: Vec<Rule<I, T>>,
}

impl<I: ?Sized, T: Copy> RuleSet<I, T> {
    pub fn new(rules: Vec<Rule<I, T>>) -> Self {
        Self { rules }
    }

    /// Tag of the first matching rule
    pub fn first_match(&self, input: &I) -> Option<T> {
        self.matching_rule(input).map(|r| r.tag)
    }

    /// The first matching rule itself, for auditing which rule fired
    pub fn matching_rule(&self, input: &I) -> Option<&Rule<I, T>> {
        self.rules.iter().find(|r| r.matches(input))
    }

    pub fn rules(&self) -> &[Rule<I, T>] {
        &self.rules
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_match_wins() {
        let rules: RuleSet<str, u8> = RuleSet::new(vec![
            Rule::contains_any("first", 1, &["AB"]),
            Rule::contains_any("second", 2, &["A"]),
        ]);

        assert_eq!(rules.first_match("XABX"), Some(1));
        assert_eq!(rules.first_match("XAX"), Some(2));
        assert_eq!(rules.first_match("XYZ"), None);
        assert_eq!(rules.matching_rule("AB").map(|r| r.name.as_str()), Some("first"));
    }
}

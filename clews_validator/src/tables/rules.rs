//! Technology to expected-commodity rules
//!
//! Resolution is priority ordered: exact names first, then glob patterns in
//! table order, then compound prefixes keyed by the 3-character sub-code that
//! follows the prefix. The result is total: either an [`Expectation`] or an
//! explicit [`Resolution::NoRule`].
use super::TableError;
use globset::{Glob, GlobMatcher};
use std::fmt;

/// Test over `(technology, commodity)`
pub type CommodityTest = fn(&str, &str) -> bool;

/// Named predicate over a commodity code
#[derive(Clone, Copy)]
pub struct Predicate {
    pub description: &'static str,
    pub test: CommodityTest,
}

impl fmt::Debug for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Predicate")
            .field("description", &self.description)
            .finish()
    }
}

/// What a rule expects the commodity to be
#[derive(Debug, Clone)]
pub enum Expectation {
    Scalar(String),
    OneOf(Vec<String>),
    Predicate(Predicate),
}

impl Expectation {
    pub fn scalar(code: &str) -> Self {
        Expectation::Scalar(code.to_string())
    }

    pub fn one_of(codes: &[&str]) -> Self {
        Expectation::OneOf(codes.iter().map(|c| c.to_string()).collect())
    }

    pub fn predicate(description: &'static str, test: CommodityTest) -> Self {
        Expectation::Predicate(Predicate { description, test })
    }

    pub fn accepts(&self, technology: &str, commodity: &str) -> bool {
        match self {
            Expectation::Scalar(code) => code == commodity,
            Expectation::OneOf(codes) => codes.iter().any(|code| code == commodity),
            Expectation::Predicate(predicate) => (predicate.test)(technology, commodity),
        }
    }
}

impl fmt::Display for Expectation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expectation::Scalar(code) => write!(f, "{}", code),
            Expectation::OneOf(codes) => write!(f, "one of {}", codes.join(", ")),
            Expectation::Predicate(predicate) => write!(f, "{}", predicate.description),
        }
    }
}

#[derive(Debug, Clone)]
pub enum Rule {
    Exact {
        technology: String,
        expects: Expectation,
    },
    /// `*` matches any run of characters, `?` exactly one
    Glob {
        matcher: GlobMatcher,
        expects: Expectation,
    },
    Compound {
        prefix: String,
        subcodes: Vec<(String, Expectation)>,
        fallback: Option<Expectation>,
    },
}

impl Rule {
    pub fn exact(technology: &str, expects: Expectation) -> Self {
        Rule::Exact {
            technology: technology.to_string(),
            expects,
        }
    }

    pub fn glob(pattern: &str, expects: Expectation) -> Result<Self, TableError> {
        let glob = Glob::new(pattern).map_err(|e| TableError::InvalidRulePattern {
            pattern: pattern.to_string(),
            message: e.to_string(),
        })?;
        Ok(Rule::Glob {
            matcher: glob.compile_matcher(),
            expects,
        })
    }

    pub fn compound(
        prefix: &str,
        subcodes: Vec<(&str, Expectation)>,
        fallback: Option<Expectation>,
    ) -> Self {
        Rule::Compound {
            prefix: prefix.to_string(),
            subcodes: subcodes
                .into_iter()
                .map(|(code, expects)| (code.to_string(), expects))
                .collect(),
            fallback,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub enum Resolution<'a> {
    Rule(&'a Expectation),
    NoRule,
}

/// Outcome of checking one technology/commodity pair
#[derive(Debug, Clone, Copy)]
pub enum MappingOutcome<'a> {
    Accepted,
    Mismatch(&'a Expectation),
    NoRule,
}

/// Ordered rule list for one side (input or output) of the activity ratios
#[derive(Debug, Clone)]
pub struct RuleTable {
    name: &'static str,
    rules: Vec<Rule>,
}

impl RuleTable {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            rules: Vec::new(),
        }
    }

    pub fn with(mut self, rule: Rule) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn resolve(&self, technology: &str) -> Resolution<'_> {
        let exact = self.rules.iter().find_map(|rule| match rule {
            Rule::Exact {
                technology: name,
                expects,
            } if name == technology => Some(expects),
            _ => None,
        });
        if let Some(expects) = exact {
            return Resolution::Rule(expects);
        }

        let glob = self.rules.iter().find_map(|rule| match rule {
            Rule::Glob { matcher, expects } if matcher.is_match(technology) => Some(expects),
            _ => None,
        });
        if let Some(expects) = glob {
            return Resolution::Rule(expects);
        }

        for rule in &self.rules {
            if let Rule::Compound {
                prefix,
                subcodes,
                fallback,
            } = rule
            {
                let Some(rest) = technology.strip_prefix(prefix.as_str()) else {
                    continue;
                };
                let subcode = rest.get(..3);
                let matched = subcodes
                    .iter()
                    .find(|(code, _)| Some(code.as_str()) == subcode)
                    .map(|(_, expects)| expects)
                    .or(fallback.as_ref());
                if let Some(expects) = matched {
                    return Resolution::Rule(expects);
                }
            }
        }

        Resolution::NoRule
    }

    pub fn evaluate(&self, technology: &str, commodity: &str) -> MappingOutcome<'_> {
        match self.resolve(technology) {
            Resolution::Rule(expects) if expects.accepts(technology, commodity) => {
                MappingOutcome::Accepted
            }
            Resolution::Rule(expects) => MappingOutcome::Mismatch(expects),
            Resolution::NoRule => MappingOutcome::NoRule,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn table() -> RuleTable {
        RuleTable::new("test")
            .with(Rule::compound(
                "PWR",
                vec![("BIO", Expectation::scalar("BIO"))],
                None,
            ))
            .with(Rule::glob("PWR*X", Expectation::scalar("GLOB")).unwrap())
            .with(Rule::exact("PWRBIOX", Expectation::scalar("EXACT")))
            .with(Rule::compound(
                "LND",
                vec![("FOR", Expectation::one_of(&["LFOR", "WTREVT"]))],
                Some(Expectation::one_of(&["WTREVT"])),
            ))
    }

    fn expected(resolution: Resolution<'_>) -> String {
        match resolution {
            Resolution::Rule(expects) => expects.to_string(),
            Resolution::NoRule => "no rule".to_string(),
        }
    }

    #[test]
    fn test_exact_beats_glob_beats_compound() {
        let table = table();
        assert_eq!(expected(table.resolve("PWRBIOX")), "EXACT");
        assert_eq!(expected(table.resolve("PWRCOAX")), "GLOB");
        assert_eq!(expected(table.resolve("PWRBIO")), "BIO");
    }

    #[test]
    fn test_compound_fallback_and_no_rule() {
        let table = table();
        assert_eq!(expected(table.resolve("LNDFOR")), "one of LFOR, WTREVT");
        assert_eq!(expected(table.resolve("LNDXYZ")), "one of WTREVT");
        assert_eq!(expected(table.resolve("LN")), "no rule");
        assert_eq!(expected(table.resolve("PWRCOA")), "no rule");
        assert_eq!(expected(table.resolve("MINBIO")), "no rule");
    }

    #[test]
    fn test_evaluate_distinguishes_mismatch_from_no_rule() {
        let table = table();
        assert_matches!(table.evaluate("PWRBIO", "BIO"), MappingOutcome::Accepted);
        assert_matches!(table.evaluate("PWRBIO", "SOL"), MappingOutcome::Mismatch(_));
        assert_matches!(table.evaluate("XYZ123", "SOL"), MappingOutcome::NoRule);
    }

    #[test]
    fn test_predicate_expectation() {
        let expects =
            Expectation::predicate("CRP code of length 6", |_, c| c.starts_with("CRP") && c.len() == 6);
        assert!(expects.accepts("DEMTRABIO", "CRPMAI"));
        assert!(!expects.accepts("DEMTRABIO", "CRPMAIZ"));
        assert_eq!(expects.to_string(), "CRP code of length 6");
    }

    fn glob_accepts(pattern: &str, technology: &str) -> bool {
        let table = RuleTable::new("glob")
            .with(Rule::glob(pattern, Expectation::scalar("X")).unwrap());
        matches!(table.resolve(technology), Resolution::Rule(_))
    }

    #[test]
    fn test_glob_matching() {
        assert!(glob_accepts("LND*HR", "LNDMAIHR"));
        assert!(glob_accepts("LND*HR", "LNDHR"));
        assert!(!glob_accepts("LND*HR", "LNDMAIHI"));
        assert!(glob_accepts("IMP???", "IMPMAI"));
        assert!(!glob_accepts("IMP???", "IMPMAIZ"));
        assert!(glob_accepts("DEMPUB*WAT", "DEMPUBSURWAT"));
        assert!(!glob_accepts("dempub*wat", "DEMPUBSURWAT"));
        assert!(glob_accepts("*", ""));
        assert!(!glob_accepts("?", ""));
    }

    #[test]
    fn test_invalid_glob_is_rejected() {
        let result = Rule::glob("LND[HR", Expectation::scalar("X"));
        assert_matches!(result, Err(TableError::InvalidRulePattern { ref pattern, .. }) if pattern == "LND[HR");
    }
}

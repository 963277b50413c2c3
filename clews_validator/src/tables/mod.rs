//! Static reference tables consumed by the checks
//!
//! Everything here is loaded once per run and read-only during validation.

pub mod catalog;
pub mod ranges;
pub mod rules;

pub use ranges::{Direction, Range, RangeTable, TableError};
pub use rules::{Expectation, MappingOutcome, Resolution, Rule, RuleTable};

use crate::config::runtime::CheckPreferences;
use crate::logging::codes;
use std::path::Path;

/// Range table plus both commodity rule tables
#[derive(Debug, Clone)]
pub struct Tables {
    pub ranges: RangeTable,
    pub input_rules: RuleTable,
    pub output_rules: RuleTable,
}

impl Tables {
    pub fn builtin() -> Result<Self, TableError> {
        Ok(Self {
            ranges: RangeTable::builtin(),
            input_rules: catalog::input_rules()?,
            output_rules: catalog::output_rules()?,
        })
    }

    pub fn with_ranges(mut self, ranges: RangeTable) -> Self {
        self.ranges = ranges;
        self
    }

    /// Built-in tables, with the range table file from the preferences applied
    pub fn from_preferences(prefs: &CheckPreferences) -> Result<Self, TableError> {
        let tables = Self::builtin()?;
        match &prefs.range_table_path {
            Some(path) => {
                let ranges = RangeTable::load(Path::new(path))?;
                crate::log_info!(
                    "Loaded range table",
                    "path" => path,
                    "entries" => ranges.len()
                );
                Ok(tables.with_ranges(ranges))
            }
            None => Ok(tables),
        }
    }

    pub fn is_volatile(&self, parameter: &str) -> bool {
        catalog::VOLATILE_PARAMETERS.contains(&parameter)
    }

    pub fn watches_duplicates(&self, parameter: &str) -> bool {
        catalog::DUPLICATE_WATCH_PARAMETERS.contains(&parameter)
    }

    pub fn is_zero_transition_exempt(&self, parameter: &str) -> bool {
        catalog::ZERO_TRANSITION_EXEMPT_PREFIXES
            .iter()
            .any(|prefix| parameter.starts_with(prefix))
    }

    pub fn is_activity_ratio(&self, parameter: &str) -> bool {
        catalog::ACTIVITY_RATIO_PARAMETERS.contains(&parameter)
    }
}

pub fn init_tables_logging() -> Result<(), String> {
    codes::ensure_registered(
        "Tables",
        &[
            codes::tables::INVALID_RANGE_TABLE,
            codes::tables::INVALID_RANGE_BOUNDS,
            codes::tables::INVALID_RULE_PATTERN,
        ],
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn prefs(range_table_path: Option<String>) -> CheckPreferences {
        CheckPreferences {
            abrupt_change_threshold: 0.05,
            parallel_checks: false,
            range_table_path,
        }
    }

    #[test]
    fn test_parameter_groups() {
        let tables = Tables::builtin().unwrap();
        assert!(tables.is_volatile("CapitalCost"));
        assert!(!tables.is_volatile("OperationalLife"));
        assert!(tables.watches_duplicates("SpecifiedAnnualDemand"));
        assert!(!tables.watches_duplicates("CapitalCost"));
        assert!(tables.is_zero_transition_exempt("ResidualCapacity"));
        assert!(tables.is_zero_transition_exempt("TechnologyActivityByModeUpperLimitExtra"));
        assert!(!tables.is_zero_transition_exempt("CapitalCost"));
        assert!(tables.is_activity_ratio("OutputActivityRatio"));
    }

    #[test]
    fn test_from_preferences_without_file() {
        let tables = Tables::from_preferences(&prefs(None)).unwrap();
        assert_eq!(tables.ranges.len(), 15);
        assert_eq!(tables.input_rules.name(), "input");
        assert_eq!(tables.output_rules.name(), "output");
    }

    #[test]
    fn test_from_preferences_with_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ranges.toml");
        std::fs::write(&path, "[ranges]\nTotalAnnualMaxCapacity = { min = 0, max = 50 }\n").unwrap();

        let tables =
            Tables::from_preferences(&prefs(Some(path.display().to_string()))).unwrap();
        assert_eq!(tables.ranges.len(), 16);

        let missing = Tables::from_preferences(&prefs(Some(
            dir.path().join("none.toml").display().to_string(),
        )));
        assert_matches!(missing, Err(TableError::InvalidRangeTable { .. }));
    }

    #[test]
    fn test_init_logging() {
        assert!(init_tables_logging().is_ok());
    }
}

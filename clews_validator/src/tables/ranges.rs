//! Valid numeric ranges per parameter
use crate::logging::codes;
use crate::logging::Code;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

/// Range table loading errors
#[derive(Debug, Clone, thiserror::Error)]
pub enum TableError {
    #[error("Invalid range table {path}: {message}")]
    InvalidRangeTable { path: String, message: String },

    #[error("Invalid bounds for {parameter}: min {min} must not exceed max {max}")]
    InvalidRangeBounds { parameter: String, min: f64, max: f64 },

    #[error("Invalid technology pattern '{pattern}': {message}")]
    InvalidRulePattern { pattern: String, message: String },
}

impl TableError {
    pub fn error_code(&self) -> Code {
        match self {
            TableError::InvalidRangeTable { .. } => codes::tables::INVALID_RANGE_TABLE,
            TableError::InvalidRangeBounds { .. } => codes::tables::INVALID_RANGE_BOUNDS,
            TableError::InvalidRulePattern { .. } => codes::tables::INVALID_RULE_PATTERN,
        }
    }

    pub fn requires_halt(&self) -> bool {
        codes::requires_halt(self.error_code().as_str())
    }
}

/// Which side of a range a value fell on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    TooSmall,
    TooBig,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::TooSmall => write!(f, "too small"),
            Direction::TooBig => write!(f, "too big"),
        }
    }
}

/// Inclusive `[min, max]` bound
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Range {
    pub min: f64,
    pub max: f64,
}

impl Range {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, value: f64) -> bool {
        self.violation(value).is_none()
    }

    pub fn violation(&self, value: f64) -> Option<Direction> {
        if value < self.min {
            Some(Direction::TooSmall)
        } else if value > self.max {
            Some(Direction::TooBig)
        } else {
            None
        }
    }

    fn validate(&self, parameter: &str) -> Result<(), TableError> {
        if !self.min.is_finite() || !self.max.is_finite() || self.min > self.max {
            return Err(TableError::InvalidRangeBounds {
                parameter: parameter.to_string(),
                min: self.min,
                max: self.max,
            });
        }
        Ok(())
    }
}

const BUILTIN_RANGES: &[(&str, Range)] = &[
    ("CapitalCost", Range::new(0.0, 7000.0)),
    ("FixedCost", Range::new(0.0, 150.0)),
    ("VariableCost", Range::new(-5.0, 100.0)),
    ("OperationalLife", Range::new(0.0, 51.0)),
    ("CapacityToActivityUnit", Range::new(0.0, 32.0)),
    ("CapacityFactors", Range::new(0.0, 1.0)),
    ("DiscountRate", Range::new(0.0, 1.0)),
    ("ResidualCapacity", Range::new(0.0, 30.0)),
    ("EmissionActivityRatio", Range::new(0.0, 1.0)),
    ("YearSplit", Range::new(0.0, 1.0)),
    ("SpecifiedAnnualDemand", Range::new(0.0, 200.0)),
    ("SpecifiedDemandProfile", Range::new(0.0, 1.0)),
    ("InputActivityRatio", Range::new(0.01, 3.0)),
    ("OutputActivityRatio", Range::new(0.01, 20000.0)),
    ("AccumulatedAnnualDemand", Range::new(0.0, 10000.0)),
];

/// On-disk layout of a range table
///
/// ```toml
/// replace = false
///
/// [ranges]
/// CapitalCost = { min = 0, max = 9000 }
/// ```
#[derive(Debug, Deserialize)]
struct RangeTableFile {
    /// Drop the built-in entries instead of extending them
    #[serde(default)]
    replace: bool,
    #[serde(default)]
    ranges: BTreeMap<String, Range>,
}

/// Parameter name to inclusive range
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RangeTable {
    ranges: BTreeMap<String, Range>,
}

impl RangeTable {
    pub fn empty() -> Self {
        Self {
            ranges: BTreeMap::new(),
        }
    }

    pub fn builtin() -> Self {
        Self {
            ranges: BUILTIN_RANGES
                .iter()
                .map(|(name, range)| (name.to_string(), *range))
                .collect(),
        }
    }

    pub fn get(&self, parameter: &str) -> Option<&Range> {
        self.ranges.get(parameter)
    }

    pub fn insert(&mut self, parameter: &str, range: Range) -> Result<(), TableError> {
        range.validate(parameter)?;
        self.ranges.insert(parameter.to_string(), range);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.ranges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Range)> {
        self.ranges.iter().map(|(name, range)| (name.as_str(), range))
    }

    /// Apply a TOML table on top of `self`; `origin` names the source in errors
    pub fn apply_toml(mut self, text: &str, origin: &str) -> Result<Self, TableError> {
        let file: RangeTableFile =
            toml::from_str(text).map_err(|e| TableError::InvalidRangeTable {
                path: origin.to_string(),
                message: e.to_string(),
            })?;

        if file.replace {
            self.ranges.clear();
        }
        for (parameter, range) in file.ranges {
            self.insert(&parameter, range)?;
        }
        Ok(self)
    }

    /// Built-in table extended (or replaced) by a TOML file
    pub fn load(path: &Path) -> Result<Self, TableError> {
        let origin = path.display().to_string();
        let text = std::fs::read_to_string(path).map_err(|e| TableError::InvalidRangeTable {
            path: origin.clone(),
            message: e.to_string(),
        })?;
        Self::builtin().apply_toml(&text, &origin)
    }
}

impl Default for RangeTable {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_builtin_bounds() {
        let table = RangeTable::builtin();
        assert_eq!(table.len(), 15);

        let capital = table.get("CapitalCost").unwrap();
        assert_eq!(capital.violation(8000.0), Some(Direction::TooBig));
        assert_eq!(capital.violation(-1.0), Some(Direction::TooSmall));
        assert!(capital.contains(7000.0));
        assert!(capital.contains(0.0));

        let input = table.get("InputActivityRatio").unwrap();
        assert_eq!(input.violation(0.0), Some(Direction::TooSmall));
        assert!(table.get("TotalAnnualMaxCapacity").is_none());
    }

    #[test]
    fn test_toml_extends_builtin() {
        let text = "[ranges]\nCapitalCost = { min = 0, max = 9000 }\nTotalAnnualMaxCapacity = { min = 0.0, max = 1e6 }\n";
        let table = RangeTable::builtin().apply_toml(text, "inline").unwrap();

        assert_eq!(table.len(), 16);
        assert_eq!(table.get("CapitalCost").unwrap().max, 9000.0);
        assert!(table.get("FixedCost").is_some());
    }

    #[test]
    fn test_toml_replace() {
        let text = "replace = true\n[ranges]\nYearSplit = { min = 0, max = 1 }\n";
        let table = RangeTable::builtin().apply_toml(text, "inline").unwrap();
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_inverted_bounds_rejected() {
        let text = "[ranges]\nCapitalCost = { min = 10, max = 1 }\n";
        let result = RangeTable::builtin().apply_toml(text, "inline");
        assert_matches!(result, Err(TableError::InvalidRangeBounds { ref parameter, .. }) if parameter == "CapitalCost");
    }

    #[test]
    fn test_malformed_toml() {
        let result = RangeTable::builtin().apply_toml("[ranges\n", "bad.toml");
        let error = result.unwrap_err();
        assert_eq!(error.error_code().as_str(), "T001");
        assert!(error.to_string().contains("bad.toml"));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ranges.toml");
        std::fs::write(&path, "[ranges]\nFixedCost = { min = 0, max = 300 }\n").unwrap();

        let table = RangeTable::load(&path).unwrap();
        assert_eq!(table.get("FixedCost").unwrap().max, 300.0);

        let missing = RangeTable::load(&dir.path().join("missing.toml"));
        assert_matches!(missing, Err(TableError::InvalidRangeTable { .. }));
    }

    #[test]
    fn test_direction_display() {
        assert_eq!(Direction::TooSmall.to_string(), "too small");
        assert_eq!(Direction::TooBig.to_string(), "too big");
    }
}

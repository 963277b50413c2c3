//! Line-tagged output unit shared by every check
use super::CheckId;
use crate::logging::codes::{self, Code, Severity};
use crate::tables::Direction;
use serde::Serialize;
use std::fmt;

/// Check-specific payload of a finding
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FindingDetail {
    ZeroAfterNonZero {
        parameter: String,
        technology: Option<String>,
        year: i32,
    },
    ZeroInActivityRatio {
        parameter: String,
        technology: Option<String>,
        mode: Option<String>,
        year: i32,
    },
    OutOfRange {
        parameter: String,
        value: f64,
        direction: Direction,
        min: f64,
        max: f64,
    },
    AbruptChange {
        parameter: String,
        technology: Option<String>,
        mode: Option<String>,
        year: i32,
        previous: f64,
        current: f64,
    },
    DuplicateValue {
        parameter: String,
        commodity: Option<String>,
        value: f64,
        year: i32,
    },
    MissingItem {
        set: String,
        code: String,
    },
    CommodityMismatch {
        parameter: String,
        technology: String,
        commodity: String,
        expected: String,
    },
    UnexpectedTechnology {
        parameter: String,
        technology: String,
        commodity: String,
    },
}

fn or_unknown(field: &Option<String>) -> &str {
    field.as_deref().unwrap_or("?")
}

impl fmt::Display for FindingDetail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FindingDetail::ZeroAfterNonZero {
                parameter,
                technology,
                year,
            } => write!(
                f,
                "{} for {} drops to zero in {}",
                parameter,
                or_unknown(technology),
                year
            ),
            FindingDetail::ZeroInActivityRatio {
                parameter,
                technology,
                mode,
                year,
            } => write!(
                f,
                "{} for {} (mode {}) is zero in {}",
                parameter,
                or_unknown(technology),
                or_unknown(mode),
                year
            ),
            FindingDetail::OutOfRange {
                parameter,
                value,
                direction,
                min,
                max,
            } => write!(
                f,
                "{} value {:?} is {} (expected {} to {})",
                parameter, value, direction, min, max
            ),
            FindingDetail::AbruptChange {
                parameter,
                technology,
                mode,
                year,
                previous,
                current,
            } => write!(
                f,
                "{} for {} (mode {}) changes abruptly in {}: {} -> {}",
                parameter,
                or_unknown(technology),
                or_unknown(mode),
                year,
                previous,
                current
            ),
            FindingDetail::DuplicateValue {
                parameter,
                commodity,
                value,
                year,
            } => write!(
                f,
                "{} for {} repeats value {} in {}",
                parameter,
                or_unknown(commodity),
                value,
                year
            ),
            FindingDetail::MissingItem { set, code } => {
                write!(f, "required {} '{}' is not declared", set.to_lowercase(), code)
            }
            FindingDetail::CommodityMismatch {
                parameter,
                technology,
                commodity,
                expected,
            } => write!(
                f,
                "{}: technology {} uses {} but expects {}",
                parameter, technology, commodity, expected
            ),
            FindingDetail::UnexpectedTechnology {
                parameter,
                technology,
                commodity,
            } => write!(
                f,
                "{}: unexpected technology {} (commodity {}) has no mapping rule",
                parameter, technology, commodity
            ),
        }
    }
}

/// One reported validation issue
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Finding {
    /// 1-based source line; 0 for file-level findings
    pub line_number: usize,
    pub check: CheckId,
    pub code: Code,
    pub severity: Severity,
    pub detail: FindingDetail,
}

impl Finding {
    /// Severity is looked up from the code registry
    pub fn new(line_number: usize, check: CheckId, code: Code, detail: FindingDetail) -> Self {
        Self {
            line_number,
            check,
            code,
            severity: codes::get_severity(code.as_str()),
            detail,
        }
    }

    pub fn category(&self) -> &'static str {
        codes::get_category(self.code.as_str())
    }

    pub fn help(&self) -> &'static str {
        codes::get_action(self.code.as_str())
    }

    pub fn is_file_level(&self) -> bool {
        self.line_number == 0
    }
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_file_level() {
            write!(f, "[{}] {}", self.code, self.detail)
        } else {
            write!(f, "line {}: [{}] {}", self.line_number, self.code, self.detail)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_comes_from_registry() {
        let finding = Finding::new(
            7,
            CheckId::Range,
            codes::checks::VALUE_OUT_OF_RANGE,
            FindingDetail::OutOfRange {
                parameter: "CapitalCost".to_string(),
                value: 8000.0,
                direction: Direction::TooBig,
                min: 0.0,
                max: 7000.0,
            },
        );
        assert_eq!(finding.severity, Severity::High);
        assert_eq!(finding.category(), "Range");
        assert_eq!(
            finding.to_string(),
            "line 7: [V103] CapitalCost value 8000.0 is too big (expected 0 to 7000)"
        );
    }

    #[test]
    fn test_file_level_display() {
        let finding = Finding::new(
            0,
            CheckId::EssentialItems,
            codes::checks::MISSING_COMMODITY,
            FindingDetail::MissingItem {
                set: "COMMODITY".to_string(),
                code: "PVR".to_string(),
            },
        );
        assert!(finding.is_file_level());
        assert_eq!(finding.to_string(), "[V106] required commodity 'PVR' is not declared");
    }

    #[test]
    fn test_detail_serializes_with_kind_tag() {
        let detail = FindingDetail::UnexpectedTechnology {
            parameter: "InputActivityRatio".to_string(),
            technology: "XYZ001".to_string(),
            commodity: "ELC001".to_string(),
        };
        let json = serde_json::to_value(&detail).unwrap();
        assert_eq!(json["kind"], "unexpected_technology");
        assert_eq!(json["technology"], "XYZ001");
    }
}

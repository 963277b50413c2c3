//! Consolidated error, finding and success codes
//!
//! Single source of truth for every code the validator emits, together with its
//! category, severity and recommended action. Findings take their severity from
//! this registry, so the report layer never hard-codes one.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::OnceLock;

// ============================================================================
// CODE WRAPPER TYPE
// ============================================================================

/// Universal code wrapper for error, finding and success codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct Code(&'static str);

impl Code {
    pub const fn new(code: &'static str) -> Self {
        Self(code)
    }

    pub fn as_str(&self) -> &'static str {
        self.0
    }
}

impl std::fmt::Display for Code {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// ERROR CLASSIFICATION TYPES
// ============================================================================

/// Severity levels, most severe first
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Severity {
    Critical = 0,
    High = 1,
    Medium = 2,
    Low = 3,
}

impl Severity {
    pub const ALL: [Severity; 4] = [
        Severity::Critical,
        Severity::High,
        Severity::Medium,
        Severity::Low,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Critical => "Critical",
            Severity::High => "High",
            Severity::Medium => "Medium",
            Severity::Low => "Low",
        }
    }
}

/// Complete metadata for a code
#[derive(Debug, Clone)]
pub struct ErrorMetadata {
    pub code: &'static str,
    pub category: &'static str,
    pub severity: Severity,
    pub recoverable: bool,
    pub requires_halt: bool,
    pub description: &'static str,
    pub recommended_action: &'static str,
}

impl ErrorMetadata {
    pub fn new(
        code: &'static str,
        category: &'static str,
        severity: Severity,
        recoverable: bool,
        requires_halt: bool,
        description: &'static str,
        recommended_action: &'static str,
    ) -> Self {
        Self {
            code,
            category,
            severity,
            recoverable,
            requires_halt,
            description,
            recommended_action,
        }
    }
}

// ============================================================================
// ERROR CODE CONSTANTS
// ============================================================================

/// System error codes
pub mod system {
    use super::Code;

    pub const INTERNAL_ERROR: Code = Code::new("ERR001");
    pub const INITIALIZATION_FAILURE: Code = Code::new("ERR002");
}

/// File processing error codes
pub mod file_processing {
    use super::Code;

    pub const FILE_NOT_FOUND: Code = Code::new("E005");
    pub const INVALID_EXTENSION: Code = Code::new("E006");
    pub const FILE_TOO_LARGE: Code = Code::new("E007");
    pub const EMPTY_FILE: Code = Code::new("E008");
    pub const PERMISSION_DENIED: Code = Code::new("E009");
    pub const INVALID_ENCODING: Code = Code::new("E010");
    pub const IO_ERROR: Code = Code::new("E011");
    pub const INVALID_PATH: Code = Code::new("E012");
    pub const TOO_MANY_LINES: Code = Code::new("E013");
}

/// Record building error codes
pub mod records {
    use super::Code;

    pub const EMPTY_INPUT: Code = Code::new("P001");
    pub const MISSING_BASE_YEAR: Code = Code::new("P002");
    pub const INVALID_YEAR_DECLARATION: Code = Code::new("P003");
    pub const BASE_YEAR_OUT_OF_RANGE: Code = Code::new("P004");
}

/// Mapping table error codes
pub mod tables {
    use super::Code;

    pub const INVALID_RANGE_TABLE: Code = Code::new("T001");
    pub const INVALID_RANGE_BOUNDS: Code = Code::new("T002");
    pub const INVALID_RULE_PATTERN: Code = Code::new("T003");
}

/// Finding codes, one per kind of data issue
pub mod checks {
    use super::Code;

    pub const ZERO_AFTER_NON_ZERO: Code = Code::new("V101");
    pub const ZERO_IN_ACTIVITY_RATIO: Code = Code::new("V102");
    pub const VALUE_OUT_OF_RANGE: Code = Code::new("V103");
    pub const ABRUPT_CHANGE: Code = Code::new("V104");
    pub const DUPLICATE_VALUE: Code = Code::new("V105");
    pub const MISSING_COMMODITY: Code = Code::new("V106");
    pub const MISSING_TECHNOLOGY: Code = Code::new("V107");
    pub const INPUT_COMMODITY_MISMATCH: Code = Code::new("V108");
    pub const OUTPUT_COMMODITY_MISMATCH: Code = Code::new("V109");
    pub const UNEXPECTED_TECHNOLOGY: Code = Code::new("V110");
}

/// Batch processing error codes
pub mod batch {
    use super::Code;

    pub const DISCOVERY_FAILED: Code = Code::new("B001");
    pub const FILE_FAILED: Code = Code::new("B002");
}

// ============================================================================
// SUCCESS CODE CONSTANTS
// ============================================================================

/// Success codes
pub mod success {
    use super::Code;

    pub const OPERATION_COMPLETED_SUCCESSFULLY: Code = Code::new("I001");
    pub const SYSTEM_INITIALIZATION_COMPLETED: Code = Code::new("I004");

    pub const FILE_PROCESSING_SUCCESS: Code = Code::new("I006");
    pub const FILE_VALIDATION_PASSED: Code = Code::new("I007");

    pub const RECORD_BUILD_COMPLETE: Code = Code::new("I020");

    pub const CHECK_PASSED: Code = Code::new("I040");
    pub const CHECK_COMPLETED_WITH_FINDINGS: Code = Code::new("I041");

    pub const VALIDATION_COMPLETE: Code = Code::new("I050");
    pub const BATCH_COMPLETE: Code = Code::new("I060");
}

// ============================================================================
// ERROR METADATA REGISTRY
// ============================================================================

static ERROR_REGISTRY: OnceLock<HashMap<&'static str, ErrorMetadata>> = OnceLock::new();

fn get_error_registry() -> &'static HashMap<&'static str, ErrorMetadata> {
    ERROR_REGISTRY.get_or_init(|| {
        let mut registry = HashMap::new();

        // System errors
        registry.insert(
            "ERR001",
            ErrorMetadata::new(
                "ERR001",
                "System",
                Severity::Critical,
                false,
                true,
                "Internal validator error",
                "Re-run with CLEWS_LOGGING_MIN_LEVEL=debug and file a bug report",
            ),
        );
        registry.insert(
            "ERR002",
            ErrorMetadata::new(
                "ERR002",
                "System",
                Severity::Critical,
                false,
                true,
                "Validator initialization failure",
                "Check the CLEWS_* environment variables and the build profile",
            ),
        );

        // File processing errors
        registry.insert(
            "E005",
            ErrorMetadata::new(
                "E005",
                "FileProcessing",
                Severity::Critical,
                false,
                true,
                "Data file not found",
                "Verify the path to the model data file",
            ),
        );
        registry.insert(
            "E006",
            ErrorMetadata::new(
                "E006",
                "FileProcessing",
                Severity::High,
                false,
                true,
                "Data file has an unexpected extension",
                "Use a .txt or .dat data file, or unset CLEWS_REQUIRE_DATA_EXTENSION",
            ),
        );
        registry.insert(
            "E007",
            ErrorMetadata::new(
                "E007",
                "FileProcessing",
                Severity::High,
                false,
                true,
                "Data file exceeds the configured size limit",
                "Split the model or build with a larger max_file_size",
            ),
        );
        registry.insert(
            "E008",
            ErrorMetadata::new(
                "E008",
                "FileProcessing",
                Severity::High,
                false,
                true,
                "Data file is empty",
                "Export the model data again",
            ),
        );
        registry.insert(
            "E009",
            ErrorMetadata::new(
                "E009",
                "FileProcessing",
                Severity::Critical,
                false,
                true,
                "Permission denied reading data file",
                "Check file permissions",
            ),
        );
        registry.insert(
            "E010",
            ErrorMetadata::new(
                "E010",
                "FileProcessing",
                Severity::High,
                false,
                true,
                "Data file is not valid UTF-8",
                "Re-export the data file as UTF-8 text",
            ),
        );
        registry.insert(
            "E011",
            ErrorMetadata::new(
                "E011",
                "FileProcessing",
                Severity::High,
                true,
                true,
                "I/O error reading data file",
                "Retry; check disk and network mounts",
            ),
        );
        registry.insert(
            "E012",
            ErrorMetadata::new(
                "E012",
                "FileProcessing",
                Severity::High,
                false,
                true,
                "Path is not a regular file",
                "Pass a data file, or a directory for batch mode",
            ),
        );
        registry.insert(
            "E013",
            ErrorMetadata::new(
                "E013",
                "FileProcessing",
                Severity::High,
                false,
                true,
                "Data file has more lines than the configured limit",
                "Build with a larger max_line_count_for_analysis",
            ),
        );

        // Record building errors
        registry.insert(
            "P001",
            ErrorMetadata::new(
                "P001",
                "RecordBuilding",
                Severity::High,
                false,
                true,
                "Input contains no content lines",
                "Check that the correct data was submitted",
            ),
        );
        registry.insert(
            "P002",
            ErrorMetadata::new(
                "P002",
                "RecordBuilding",
                Severity::Critical,
                false,
                true,
                "Data rows appear before any 'set YEAR' declaration",
                "Declare 'set YEAR := <first year> ...;' before the first param section",
            ),
        );
        registry.insert(
            "P003",
            ErrorMetadata::new(
                "P003",
                "RecordBuilding",
                Severity::Critical,
                false,
                true,
                "'set YEAR' declaration has no year",
                "List the model years after 'set YEAR :='",
            ),
        );
        registry.insert(
            "P004",
            ErrorMetadata::new(
                "P004",
                "RecordBuilding",
                Severity::Critical,
                false,
                true,
                "Base year is outside the supported model calendar",
                "Check the first year after 'set YEAR :=' against the configured model years",
            ),
        );

        // Mapping table errors
        registry.insert(
            "T001",
            ErrorMetadata::new(
                "T001",
                "Tables",
                Severity::High,
                false,
                true,
                "Range table file could not be parsed",
                "Use '[ranges]' with 'Name = { min = .., max = .. }' entries",
            ),
        );
        registry.insert(
            "T002",
            ErrorMetadata::new(
                "T002",
                "Tables",
                Severity::High,
                false,
                true,
                "Range table entry has min greater than max",
                "Swap or correct the bounds",
            ),
        );
        registry.insert(
            "T003",
            ErrorMetadata::new(
                "T003",
                "Tables",
                Severity::High,
                false,
                true,
                "Technology pattern in a rule table is not a valid glob",
                "Use '*' and '?' wildcards only",
            ),
        );

        // Findings
        registry.insert(
            "V101",
            ErrorMetadata::new(
                "V101",
                "ZeroAfterNonZero",
                Severity::Medium,
                true,
                false,
                "Value drops to zero after a non-zero year",
                "Confirm the technology is meant to stop in that year",
            ),
        );
        registry.insert(
            "V102",
            ErrorMetadata::new(
                "V102",
                "ZeroInActivityRatio",
                Severity::High,
                true,
                false,
                "Activity ratio is zero",
                "Remove the row or give the ratio a positive value",
            ),
        );
        registry.insert(
            "V103",
            ErrorMetadata::new(
                "V103",
                "Range",
                Severity::High,
                true,
                false,
                "Value outside the plausible range for its parameter",
                "Check units and magnitude of the value",
            ),
        );
        registry.insert(
            "V104",
            ErrorMetadata::new(
                "V104",
                "AbruptChange",
                Severity::Low,
                true,
                false,
                "Year-on-year change exceeds the tolerated threshold",
                "Confirm the step change is intended",
            ),
        );
        registry.insert(
            "V105",
            ErrorMetadata::new(
                "V105",
                "DuplicateValue",
                Severity::Low,
                true,
                false,
                "Demand value repeats an earlier year",
                "Check whether the demand projection was copied forward",
            ),
        );
        registry.insert(
            "V106",
            ErrorMetadata::new(
                "V106",
                "EssentialItems",
                Severity::High,
                true,
                false,
                "Required commodity is not declared",
                "Add the commodity to 'set COMMODITY'",
            ),
        );
        registry.insert(
            "V107",
            ErrorMetadata::new(
                "V107",
                "EssentialItems",
                Severity::High,
                true,
                false,
                "Required technology is not declared",
                "Add the technology to 'set TECHNOLOGY'",
            ),
        );
        registry.insert(
            "V108",
            ErrorMetadata::new(
                "V108",
                "CommodityMapping",
                Severity::High,
                true,
                false,
                "Input commodity does not match the technology",
                "Use the commodity expected for this technology",
            ),
        );
        registry.insert(
            "V109",
            ErrorMetadata::new(
                "V109",
                "CommodityMapping",
                Severity::High,
                true,
                false,
                "Output commodity does not match the technology",
                "Use the commodity expected for this technology",
            ),
        );
        registry.insert(
            "V110",
            ErrorMetadata::new(
                "V110",
                "CommodityMapping",
                Severity::Medium,
                true,
                false,
                "Technology has no commodity mapping rule",
                "Check the technology code for typos",
            ),
        );

        // Batch errors
        registry.insert(
            "B001",
            ErrorMetadata::new(
                "B001",
                "Batch",
                Severity::High,
                false,
                true,
                "Batch file discovery failed",
                "Check the directory path and permissions",
            ),
        );
        registry.insert(
            "B002",
            ErrorMetadata::new(
                "B002",
                "Batch",
                Severity::Medium,
                true,
                false,
                "A file in the batch failed to validate",
                "Inspect the per-file error",
            ),
        );

        // Success codes
        for (code, description) in [
            ("I001", "Operation completed"),
            ("I004", "Validator initialized"),
            ("I006", "Data file read"),
            ("I007", "Data file passed intake checks"),
            ("I020", "Records built"),
            ("I040", "Check passed"),
            ("I041", "Check completed with findings"),
            ("I050", "Validation complete"),
            ("I060", "Batch complete"),
        ] {
            registry.insert(
                code,
                ErrorMetadata::new(
                    code,
                    "Success",
                    Severity::Low,
                    true,
                    false,
                    description,
                    "None",
                ),
            );
        }

        registry
    })
}

// ============================================================================
// CLASSIFICATION FUNCTIONS
// ============================================================================

pub fn get_error_metadata(code: &str) -> Option<&'static ErrorMetadata> {
    get_error_registry().get(code)
}

/// Get severity from code
pub fn get_severity(code: &str) -> Severity {
    get_error_registry()
        .get(code)
        .map(|metadata| metadata.severity)
        .unwrap_or(Severity::Medium)
}

pub fn is_recoverable(code: &str) -> bool {
    get_error_registry()
        .get(code)
        .map(|metadata| metadata.recoverable)
        .unwrap_or(true)
}

pub fn requires_halt(code: &str) -> bool {
    get_error_registry()
        .get(code)
        .map(|metadata| metadata.requires_halt)
        .unwrap_or(false)
}

/// Get human-readable description for code
pub fn get_description(code: &str) -> &'static str {
    get_error_registry()
        .get(code)
        .map(|metadata| metadata.description)
        .unwrap_or("Unknown error")
}

pub fn get_action(code: &str) -> &'static str {
    get_error_registry()
        .get(code)
        .map(|metadata| metadata.recommended_action)
        .unwrap_or("No specific action available")
}

pub fn get_category(code: &str) -> &'static str {
    get_error_registry()
        .get(code)
        .map(|metadata| metadata.category)
        .unwrap_or("Unknown")
}

/// Verify that every code in `codes` has registry metadata
pub fn ensure_registered(stage: &str, codes: &[Code]) -> Result<(), String> {
    for code in codes {
        if get_error_metadata(code.as_str()).is_none() {
            return Err(format!(
                "{} code {} not found in metadata registry",
                stage,
                code.as_str()
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_finding_codes_are_recoverable() {
        for code in [
            checks::ZERO_AFTER_NON_ZERO,
            checks::VALUE_OUT_OF_RANGE,
            checks::UNEXPECTED_TECHNOLOGY,
        ] {
            assert!(is_recoverable(code.as_str()));
            assert!(!requires_halt(code.as_str()));
        }
    }

    #[test]
    fn test_structural_codes_halt() {
        assert!(requires_halt(records::MISSING_BASE_YEAR.as_str()));
        assert!(requires_halt(file_processing::FILE_NOT_FOUND.as_str()));
        assert_eq!(get_severity("P002"), Severity::Critical);
    }

    #[test]
    fn test_unknown_code_defaults() {
        assert_eq!(get_description("ZZZ"), "Unknown error");
        assert_eq!(get_category("ZZZ"), "Unknown");
        assert_eq!(get_severity("ZZZ"), Severity::Medium);
    }

    #[test]
    fn test_mismatch_and_unexpected_are_distinct() {
        let mismatch = get_error_metadata("V108").unwrap();
        let unexpected = get_error_metadata("V110").unwrap();
        assert_ne!(mismatch.description, unexpected.description);
        assert_eq!(mismatch.category, unexpected.category);
    }

    #[test]
    fn test_ensure_registered_reports_missing() {
        assert!(ensure_registered("Checks", &[checks::ABRUPT_CHANGE]).is_ok());
        let err = ensure_registered("Test", &[Code::new("X999")]).unwrap_err();
        assert!(err.contains("X999"));
    }
}

//! Record building: classified lines to canonical records
//!
//! Every check consumes the [`ParsedModel`] produced here and never re-reads
//! the source text.

pub mod builder;
pub mod error;
pub mod types;

pub use builder::RecordBuilder;
pub use error::RecordError;
pub use types::{DeclaredSet, KeyBlock, ParsedModel, Record, YearValue};

use crate::logging::codes;

/// Build the record model for a whole source text
pub fn build_records(source: &str) -> Result<ParsedModel, RecordError> {
    RecordBuilder::new().build(source)
}

/// Check that every record-building code has registry metadata
pub fn init_records_logging() -> Result<(), String> {
    codes::ensure_registered(
        "Record builder",
        &[
            codes::records::EMPTY_INPUT,
            codes::records::MISSING_BASE_YEAR,
            codes::records::INVALID_YEAR_DECLARATION,
            codes::records::BASE_YEAR_OUT_OF_RANGE,
            codes::success::RECORD_BUILD_COMPLETE,
        ],
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(RecordError::EmptyInput.error_code().as_str(), "P001");
        let missing = RecordError::MissingBaseYear { line: 3 };
        assert_eq!(missing.error_code().as_str(), "P002");
        assert_eq!(missing.line(), Some(3));
        assert!(missing.requires_halt());
        assert!(missing.to_string().contains("Line 3"));
    }

    #[test]
    fn test_init_logging() {
        assert!(init_records_logging().is_ok());
    }

    #[test]
    fn test_build_records() {
        let model = build_records("set YEAR := 2020;\nparam FixedCost :=\nPWRBIO 5 5\n").unwrap();
        assert_eq!(model.records.len(), 1);
    }
}

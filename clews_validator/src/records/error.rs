use crate::config::compile_time::model::{MAX_MODEL_YEAR, MIN_MODEL_YEAR};
use crate::logging::codes;
use crate::logging::Code;

/// Structural failures that abort record building
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RecordError {
    #[error("Input contains no data")]
    EmptyInput,

    #[error("Line {line}: data row requires a base year but no 'set YEAR' declaration precedes it")]
    MissingBaseYear { line: usize },

    #[error("Line {line}: 'set YEAR' declaration contains no year")]
    InvalidYearDeclaration { line: usize },

    #[error(
        "Line {line}: base year {year} is outside the model calendar {}..={}",
        MIN_MODEL_YEAR,
        MAX_MODEL_YEAR
    )]
    BaseYearOutOfRange { line: usize, year: i32 },
}

impl RecordError {
    pub fn error_code(&self) -> Code {
        match self {
            RecordError::EmptyInput => codes::records::EMPTY_INPUT,
            RecordError::MissingBaseYear { .. } => codes::records::MISSING_BASE_YEAR,
            RecordError::InvalidYearDeclaration { .. } => codes::records::INVALID_YEAR_DECLARATION,
            RecordError::BaseYearOutOfRange { .. } => codes::records::BASE_YEAR_OUT_OF_RANGE,
        }
    }

    /// Offending line, when the error is tied to one
    pub fn line(&self) -> Option<usize> {
        match self {
            RecordError::EmptyInput => None,
            RecordError::MissingBaseYear { line }
            | RecordError::InvalidYearDeclaration { line }
            | RecordError::BaseYearOutOfRange { line, .. } => Some(*line),
        }
    }

    pub fn requires_halt(&self) -> bool {
        codes::requires_halt(self.error_code().as_str())
    }

    pub fn severity(&self) -> &'static str {
        codes::get_severity(self.error_code().as_str()).as_str()
    }
}

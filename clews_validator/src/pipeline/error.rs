use crate::file_processor::FileProcessorError;
use crate::logging::codes::{self, Code};
use crate::records::RecordError;
use crate::tables::TableError;

/// Errors that abort a validation run
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("File processing failed: {0}")]
    FileProcessing(#[from] FileProcessorError),

    #[error("Record building failed: {0}")]
    RecordBuilding(#[from] RecordError),

    #[error("Table loading failed: {0}")]
    Tables(#[from] TableError),

    #[error("Pipeline error: {message}")]
    Pipeline { message: String },
}

impl PipelineError {
    pub fn pipeline_error(message: &str) -> Self {
        Self::Pipeline {
            message: message.to_string(),
        }
    }

    pub fn error_code(&self) -> Code {
        match self {
            PipelineError::FileProcessing(error) => error.error_code(),
            PipelineError::RecordBuilding(error) => error.error_code(),
            PipelineError::Tables(error) => error.error_code(),
            PipelineError::Pipeline { .. } => codes::system::INTERNAL_ERROR,
        }
    }

    pub fn requires_halt(&self) -> bool {
        codes::requires_halt(self.error_code().as_str())
    }

    pub fn severity(&self) -> &'static str {
        codes::get_severity(self.error_code().as_str()).as_str()
    }
}

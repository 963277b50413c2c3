//! Data file intake with compile-time limits and global logging integration

mod processor;

use crate::config::compile_time::file_processing::{
    LARGE_FILE_THRESHOLD, MAX_FILE_SIZE, MAX_LINE_COUNT_FOR_ANALYSIS,
};
use crate::config::runtime::FileProcessorPreferences;
use crate::log_debug;
use crate::logging::codes;
pub use processor::{
    FileMetadata, FileProcessingResult, FileProcessor, FileProcessorError, DATA_EXTENSIONS,
};

/// Read a file with default settings
pub fn process_file(file_path: &str) -> Result<FileProcessingResult, FileProcessorError> {
    FileProcessor::new().process_file(file_path)
}

pub fn create_processor() -> FileProcessor {
    FileProcessor::new()
}

/// Create a file processor from runtime preferences structure
pub fn create_processor_from_preferences(prefs: &FileProcessorPreferences) -> FileProcessor {
    FileProcessor::from_preferences(prefs)
}

/// Compile-time maximum file size; not adjustable at runtime
pub fn get_max_file_size() -> u64 {
    MAX_FILE_SIZE
}

/// Check that every intake code has registry metadata (startup validation)
pub fn init_file_processor_logging() -> Result<(), String> {
    codes::ensure_registered(
        "File processor",
        &[
            codes::file_processing::FILE_NOT_FOUND,
            codes::file_processing::INVALID_EXTENSION,
            codes::file_processing::FILE_TOO_LARGE,
            codes::file_processing::EMPTY_FILE,
            codes::file_processing::PERMISSION_DENIED,
            codes::file_processing::INVALID_ENCODING,
            codes::file_processing::IO_ERROR,
            codes::file_processing::INVALID_PATH,
            codes::file_processing::TOO_MANY_LINES,
        ],
    )?;

    log_debug!("File processor compile-time configuration loaded",
        "max_file_size" => MAX_FILE_SIZE,
        "large_file_threshold" => LARGE_FILE_THRESHOLD,
        "max_line_count" => MAX_LINE_COUNT_FOR_ANALYSIS);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_module_api() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("model.dat");
        fs::write(&file_path, "set YEAR := 2020;\n").unwrap();

        let result = process_file(file_path.to_str().unwrap());
        assert!(result.is_ok());
    }

    #[test]
    fn test_limits_are_consistent() {
        assert_eq!(get_max_file_size(), FileProcessor::max_file_size());
        assert!(FileProcessor::large_file_threshold() <= get_max_file_size());
    }

    #[test]
    fn test_create_processor_from_preferences() {
        let prefs = FileProcessorPreferences {
            require_data_extension: true,
            enable_performance_logging: true,
        };
        assert!(create_processor_from_preferences(&prefs).require_data_extension);
        assert!(!create_processor().require_data_extension);
    }

    #[test]
    fn test_init_logging() {
        assert!(init_file_processor_logging().is_ok());
    }
}

//! Batch validation of a directory of model data files
//!
//! Provides directory discovery plus sequential and threaded execution.
//! Integrates with the global logging system and error collector for
//! cargo-style output.

use crate::config::compile_time::batch_processing::{MAX_FILES_PER_BATCH, MAX_WORKER_THREADS};
use crate::file_processor::DATA_EXTENSIONS;
use crate::logging::{self, codes, Code};
use crate::pipeline::{self, PipelineError, PipelineResult, ValidationOptions};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};
use walkdir::WalkDir;

// ============================================================================
// BATCH PROCESSING TYPES
// ============================================================================

#[derive(Debug, Clone)]
pub struct BatchConfig {
    pub max_threads: usize,
    pub recursive: bool,
    pub max_files: Option<usize>,
    /// Print one progress line per file on stderr
    pub progress_reporting: bool,
    pub fail_fast: bool,
    pub options: ValidationOptions,
}

impl BatchConfig {
    /// Recursive discovery on one worker per CPU
    pub fn new(options: ValidationOptions) -> Self {
        Self {
            max_threads: num_cpus::get().clamp(1, MAX_WORKER_THREADS),
            recursive: true,
            max_files: None,
            progress_reporting: false,
            fail_fast: false,
            options,
        }
    }

    pub fn with_options(mut self, options: ValidationOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_threads(mut self, threads: usize) -> Self {
        self.max_threads = threads.clamp(1, MAX_WORKER_THREADS);
        self
    }
}

#[derive(Debug, Default)]
pub struct BatchResults {
    pub successful_files: Vec<(PathBuf, PipelineResult)>,
    pub failed_files: Vec<(PathBuf, PipelineError)>,
    pub processing_duration: Duration,
    pub files_processed: usize,
    pub files_discovered: usize,
}

impl BatchResults {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn success_count(&self) -> usize {
        self.successful_files.len()
    }

    pub fn failure_count(&self) -> usize {
        self.failed_files.len()
    }

    pub fn success_rate(&self) -> f64 {
        if self.files_processed == 0 {
            0.0
        } else {
            self.successful_files.len() as f64 / self.files_processed as f64
        }
    }

    pub fn total_findings(&self) -> usize {
        self.successful_files
            .iter()
            .map(|(_, result)| result.report.findings.len())
            .sum()
    }

    /// Files that validated but produced at least one finding
    pub fn files_with_findings(&self) -> usize {
        self.successful_files
            .iter()
            .filter(|(_, result)| !result.report.is_clean())
            .count()
    }

    pub fn add_success(&mut self, file_path: PathBuf, result: PipelineResult) {
        self.successful_files.push((file_path, result));
        self.files_processed += 1;
    }

    pub fn add_failure(&mut self, file_path: PathBuf, error: PipelineError) {
        self.failed_files.push((file_path, error));
        self.files_processed += 1;
    }

    pub fn merge(&mut self, other: BatchResults) {
        self.successful_files.extend(other.successful_files);
        self.failed_files.extend(other.failed_files);
        self.files_processed += other.files_processed;
    }

    /// Path order, independent of thread scheduling
    fn sort(&mut self) {
        self.successful_files.sort_by(|a, b| a.0.cmp(&b.0));
        self.failed_files.sort_by(|a, b| a.0.cmp(&b.0));
    }
}

#[derive(Debug, thiserror::Error)]
pub enum BatchError {
    #[error("Directory not found: {path}")]
    DirectoryNotFound { path: String },

    #[error("Not a directory: {path}")]
    NotADirectory { path: String },

    #[error("No data files (.txt, .dat) found in directory: {path}")]
    NoFilesFound { path: String },

    #[error("Too many files found: {count} (max: {max})")]
    TooManyFiles { count: usize, max: usize },

    #[error("IO error during directory traversal: {error}")]
    IoError { error: String },

    #[error("Thread pool error: {message}")]
    ThreadError { message: String },
}

impl BatchError {
    pub fn error_code(&self) -> Code {
        match self {
            BatchError::ThreadError { .. } => codes::system::INTERNAL_ERROR,
            _ => codes::batch::DISCOVERY_FAILED,
        }
    }
}

// ============================================================================
// FILE DISCOVERY
// ============================================================================

/// Check if a path is a model data file
fn is_data_file(path: &Path) -> bool {
    path.is_file()
        && path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| DATA_EXTENSIONS.iter().any(|d| ext.eq_ignore_ascii_case(d)))
            .unwrap_or(false)
}

/// Discover data files under a directory, sorted by path
pub fn discover_data_files(
    dir_path: &Path,
    config: &BatchConfig,
) -> Result<Vec<PathBuf>, BatchError> {
    crate::log_info!("Starting file discovery",
        "directory" => dir_path.display(),
        "recursive" => config.recursive
    );

    if !dir_path.exists() {
        return Err(BatchError::DirectoryNotFound {
            path: dir_path.display().to_string(),
        });
    }
    if !dir_path.is_dir() {
        return Err(BatchError::NotADirectory {
            path: dir_path.display().to_string(),
        });
    }

    let max_depth = if config.recursive { usize::MAX } else { 1 };
    let mut files = Vec::new();

    for entry in WalkDir::new(dir_path)
        .min_depth(1)
        .max_depth(max_depth)
        .follow_links(false)
        .sort_by_file_name()
    {
        let entry = entry.map_err(|e| BatchError::IoError {
            error: e.to_string(),
        })?;

        if !is_data_file(entry.path()) {
            continue;
        }
        files.push(entry.into_path());

        if let Some(max_files) = config.max_files {
            if files.len() >= max_files {
                crate::log_warning!(
                    "Reached maximum file limit",
                    "files_found" => files.len(),
                    "limit" => max_files
                );
                break;
            }
        }
    }

    if files.is_empty() {
        return Err(BatchError::NoFilesFound {
            path: dir_path.display().to_string(),
        });
    }
    if files.len() > MAX_FILES_PER_BATCH {
        return Err(BatchError::TooManyFiles {
            count: files.len(),
            max: MAX_FILES_PER_BATCH,
        });
    }

    files.sort();

    crate::log_success!(
        codes::success::OPERATION_COMPLETED_SUCCESSFULLY,
        "File discovery completed",
        "files_found" => files.len(),
        "directory" => dir_path.display()
    );

    Ok(files)
}

// ============================================================================
// BATCH PROCESSING
// ============================================================================

fn validate_one(
    file_path: &Path,
    file_id: usize,
    options: &ValidationOptions,
) -> Result<PipelineResult, PipelineError> {
    logging::with_file_context(file_path.to_path_buf(), file_id, || {
        let result =
            pipeline::validate_file_in_context(&file_path.to_string_lossy(), options);
        if let Err(error) = &result {
            crate::log_error!(
                codes::batch::FILE_FAILED,
                "File validation failed",
                "file" => file_path.display(),
                "file_id" => file_id,
                "cause" => error.error_code()
            );
        }
        result
    })
}

pub fn process_directory_sequential(
    dir_path: &Path,
    config: &BatchConfig,
) -> Result<BatchResults, BatchError> {
    let start_time = Instant::now();

    crate::log_info!("Starting sequential batch validation",
        "directory" => dir_path.display()
    );

    let files = discover_data_files(dir_path, config)?;
    let mut results = BatchResults::new();
    results.files_discovered = files.len();

    for (file_id, file_path) in files.iter().enumerate() {
        if config.progress_reporting {
            eprintln!(
                "Validating file {} of {}: {}",
                file_id + 1,
                files.len(),
                file_path.display()
            );
        }

        match validate_one(file_path, file_id, &config.options) {
            Ok(result) => results.add_success(file_path.clone(), result),
            Err(error) => {
                results.add_failure(file_path.clone(), error);
                if config.fail_fast {
                    crate::log_warning!("Fail-fast mode enabled, stopping batch validation");
                    break;
                }
            }
        }
    }

    results.processing_duration = start_time.elapsed();
    log_batch_complete(&results, 1);
    Ok(results)
}

pub fn process_directory_parallel(
    dir_path: &Path,
    config: &BatchConfig,
) -> Result<BatchResults, BatchError> {
    let start_time = Instant::now();

    crate::log_info!("Starting parallel batch validation",
        "directory" => dir_path.display(),
        "max_threads" => config.max_threads
    );

    let files = discover_data_files(dir_path, config)?;
    let mut results = BatchResults::new();
    results.files_discovered = files.len();

    let threads = config.max_threads.max(1);
    let chunk_size = calculate_chunk_size(files.len(), threads);

    crate::log_debug!("Parallel processing configuration",
        "total_files" => files.len(),
        "chunk_size" => chunk_size,
        "threads" => threads
    );

    let options = Arc::new(config.options.clone());
    let mut offset = 0;
    for chunk in files.chunks(chunk_size) {
        results.merge(process_chunk_parallel(chunk, offset, threads, &options)?);
        offset += chunk.len();

        if config.fail_fast && results.failure_count() > 0 {
            crate::log_warning!("Fail-fast mode enabled, stopping batch validation");
            break;
        }
    }

    results.sort();
    results.processing_duration = start_time.elapsed();
    log_batch_complete(&results, threads);
    Ok(results)
}

/// Validate one chunk with up to `threads` workers; `offset` is the file id
/// of the chunk's first file
fn process_chunk_parallel(
    files: &[PathBuf],
    offset: usize,
    threads: usize,
    options: &Arc<ValidationOptions>,
) -> Result<BatchResults, BatchError> {
    let results = Arc::new(Mutex::new(BatchResults::new()));
    let files_per_thread = files.len().div_ceil(threads);
    let mut handles = Vec::new();

    for (thread_id, thread_files) in files.chunks(files_per_thread.max(1)).enumerate() {
        let thread_files = thread_files.to_vec();
        let first_id = offset + thread_id * files_per_thread;
        let results = Arc::clone(&results);
        let options = Arc::clone(options);

        handles.push(thread::spawn(move || {
            for (local_id, file_path) in thread_files.into_iter().enumerate() {
                let outcome = validate_one(&file_path, first_id + local_id, &options);
                let mut guard = results.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
                match outcome {
                    Ok(result) => guard.add_success(file_path, result),
                    Err(error) => guard.add_failure(file_path, error),
                }
            }
        }));
    }

    for handle in handles {
        handle.join().map_err(|_| BatchError::ThreadError {
            message: "Worker thread panicked during validation".to_string(),
        })?;
    }

    Arc::try_unwrap(results)
        .map_err(|_| BatchError::ThreadError {
            message: "Failed to extract results from worker threads".to_string(),
        })?
        .into_inner()
        .map_err(|_| BatchError::ThreadError {
            message: "Results lock poisoned".to_string(),
        })
}

fn calculate_chunk_size(file_count: usize, max_threads: usize) -> usize {
    const MIN_CHUNK_SIZE: usize = 1;
    const MAX_CHUNK_SIZE: usize = 50;

    file_count
        .div_ceil(max_threads.max(1))
        .clamp(MIN_CHUNK_SIZE, MAX_CHUNK_SIZE)
}

fn log_batch_complete(results: &BatchResults, threads: usize) {
    crate::log_success!(
        codes::success::BATCH_COMPLETE,
        "Batch validation completed",
        "files_processed" => results.files_processed,
        "successful" => results.success_count(),
        "failed" => results.failure_count(),
        "findings" => results.total_findings(),
        "threads_used" => threads,
        "duration_ms" => format!("{:.2}", results.processing_duration.as_secs_f64() * 1000.0)
    );
}

// ============================================================================
// PUBLIC API
// ============================================================================

pub fn process_directory(
    dir_path: &Path,
    options: ValidationOptions,
) -> Result<BatchResults, BatchError> {
    process_directory_with_config(dir_path, &BatchConfig::new(options))
}

pub fn process_directory_with_config(
    dir_path: &Path,
    config: &BatchConfig,
) -> Result<BatchResults, BatchError> {
    if config.max_threads <= 1 {
        process_directory_sequential(dir_path, config)
    } else {
        process_directory_parallel(dir_path, config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use std::fs;
    use tempfile::tempdir;

    const CLEAN: &str = "set YEAR := 2020;\nparam FixedCost :=\nPWRBIO 10 10 10\n";
    const DIRTY: &str = "set YEAR := 2020;\nparam FixedCost :=\nPWRBIO 10 500 10\n";

    fn config(threads: usize) -> BatchConfig {
        let options = ValidationOptions::builtin()
            .unwrap()
            .with_checks(vec![crate::checks::CheckId::Range]);
        BatchConfig::new(options).with_threads(threads)
    }

    fn populate(dir: &Path) {
        fs::write(dir.join("a.txt"), CLEAN).unwrap();
        fs::write(dir.join("b.dat"), DIRTY).unwrap();
        fs::write(dir.join("notes.md"), "not data").unwrap();
        fs::create_dir(dir.join("nested")).unwrap();
        fs::write(dir.join("nested").join("c.txt"), "param FixedCost :=\nPWRBIO 1\n").unwrap();
    }

    #[test]
    fn test_file_discovery() {
        let temp_dir = tempdir().unwrap();
        populate(temp_dir.path());

        let files = discover_data_files(temp_dir.path(), &config(1)).unwrap();
        assert_eq!(files.len(), 3);

        let flat = BatchConfig {
            recursive: false,
            ..config(1)
        };
        assert_eq!(discover_data_files(temp_dir.path(), &flat).unwrap().len(), 2);

        let capped = BatchConfig {
            max_files: Some(1),
            ..config(1)
        };
        assert_eq!(discover_data_files(temp_dir.path(), &capped).unwrap().len(), 1);
    }

    #[test]
    fn test_discovery_errors() {
        let temp_dir = tempdir().unwrap();
        assert_matches!(
            discover_data_files(temp_dir.path(), &config(1)),
            Err(BatchError::NoFilesFound { .. })
        );
        assert_matches!(
            discover_data_files(&temp_dir.path().join("missing"), &config(1)),
            Err(BatchError::DirectoryNotFound { .. })
        );
    }

    #[test]
    fn test_is_data_file() {
        let temp_dir = tempdir().unwrap();
        let temp_path = temp_dir.path();
        fs::write(temp_path.join("model.TXT"), "x").unwrap();
        fs::write(temp_path.join("model.csv"), "x").unwrap();

        assert!(is_data_file(&temp_path.join("model.TXT")));
        assert!(!is_data_file(&temp_path.join("model.csv")));
        assert!(!is_data_file(temp_path));
    }

    #[test]
    fn test_sequential_and_parallel_agree() {
        let temp_dir = tempdir().unwrap();
        populate(temp_dir.path());

        let sequential = process_directory_with_config(temp_dir.path(), &config(1)).unwrap();
        let parallel = process_directory_with_config(temp_dir.path(), &config(3)).unwrap();

        for results in [&sequential, &parallel] {
            assert_eq!(results.files_discovered, 3);
            assert_eq!(results.success_count(), 2);
            // nested/c.txt has data but no 'set YEAR'
            assert_eq!(results.failure_count(), 1);
            assert_eq!(results.total_findings(), 1);
            assert_eq!(results.files_with_findings(), 1);
        }

        let paths = |r: &BatchResults| -> Vec<PathBuf> {
            r.successful_files.iter().map(|(p, _)| p.clone()).collect()
        };
        assert_eq!(paths(&sequential), paths(&parallel));
    }

    #[test]
    fn test_fail_fast_stops_sequential_batch() {
        let temp_dir = tempdir().unwrap();
        fs::write(temp_dir.path().join("a.txt"), "param X :=\nA 1\n").unwrap();
        fs::write(temp_dir.path().join("b.txt"), CLEAN).unwrap();

        let config = BatchConfig {
            fail_fast: true,
            ..config(1)
        };
        let results = process_directory_with_config(temp_dir.path(), &config).unwrap();
        assert_eq!(results.files_processed, 1);
        assert_eq!(results.failure_count(), 1);
    }

    #[test]
    fn test_process_directory_defaults() {
        let temp_dir = tempdir().unwrap();
        fs::write(temp_dir.path().join("model.txt"), CLEAN).unwrap();

        let options = ValidationOptions::builtin().unwrap();
        let results = process_directory(temp_dir.path(), options).unwrap();
        assert_eq!(results.success_count(), 1);
        let (_, result) = &results.successful_files[0];
        assert_eq!(result.report.checks_run.len(), crate::checks::CheckId::ALL.len());
    }

    #[test]
    fn test_chunk_size_calculation() {
        assert_eq!(calculate_chunk_size(100, 4), 25);
        assert_eq!(calculate_chunk_size(10, 4), 3);
        assert_eq!(calculate_chunk_size(1, 4), 1);
        assert_eq!(calculate_chunk_size(200, 4), 50);
    }

    #[test]
    fn test_batch_config_new() {
        let config = BatchConfig::new(ValidationOptions::builtin().unwrap());
        assert!(config.max_threads >= 1);
        assert!(config.max_threads <= MAX_WORKER_THREADS);
        assert!(config.recursive);
        assert!(!config.fail_fast);
        assert!(config.max_files.is_none());
    }

    #[test]
    fn test_error_codes() {
        let error = BatchError::NoFilesFound {
            path: "x".to_string(),
        };
        assert_eq!(error.error_code(), codes::batch::DISCOVERY_FAILED);
    }
}

//! Engine boundary: text or file in, ordered report out
//!
//! Stages run strictly one way: intake -> record building -> checks ->
//! aggregation. File contents are dropped once records are built.

mod error;
mod result;
mod stats;
mod validation;

pub use error::PipelineError;
pub use result::PipelineResult;
pub use stats::PipelineStats;
pub use validation::validate_pipeline;

use crate::checks::{self, CheckContext, CheckId, Finding};
use crate::config::compile_time::checks::ABRUPT_CHANGE_THRESHOLD;
use crate::config::runtime::RuntimeConfig;
use crate::file_processor::{FileProcessingResult, FileProcessor};
use crate::logging;
use crate::records::{ParsedModel, RecordBuilder};
use crate::report::Report;
use crate::tables::Tables;
use std::path::PathBuf;
use std::time::Instant;

/// Name used for sources that did not come from a file
pub const IN_MEMORY_SOURCE: &str = "<memory>";

/// What to run and with which tables
#[derive(Debug, Clone)]
pub struct ValidationOptions {
    pub checks: Vec<CheckId>,
    pub abrupt_threshold: f64,
    pub parallel: bool,
    pub tables: Tables,
    pub processor: FileProcessor,
}

impl ValidationOptions {
    /// All checks over the built-in tables, sequential, lenient file intake
    pub fn builtin() -> Result<Self, PipelineError> {
        Ok(Self {
            checks: CheckId::ALL.to_vec(),
            abrupt_threshold: ABRUPT_CHANGE_THRESHOLD,
            parallel: false,
            tables: Tables::builtin()?,
            processor: FileProcessor::new(),
        })
    }

    /// Options from runtime preferences, loading the configured range table
    pub fn from_config(config: &RuntimeConfig) -> Result<Self, PipelineError> {
        let prefs = &config.checks;
        Ok(Self {
            checks: CheckId::ALL.to_vec(),
            abrupt_threshold: prefs.abrupt_change_threshold,
            parallel: prefs.parallel_checks,
            tables: Tables::from_preferences(prefs)?,
            processor: FileProcessor::from_preferences(&config.file_processor),
        })
    }

    /// Options from the `CLEWS_*` environment variables
    pub fn from_env() -> Result<Self, PipelineError> {
        Self::from_config(&RuntimeConfig::default())
    }

    pub fn with_checks(mut self, checks: Vec<CheckId>) -> Self {
        self.checks = checks;
        self
    }

    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.abrupt_threshold = threshold;
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn with_tables(mut self, tables: Tables) -> Self {
        self.tables = tables;
        self
    }

    pub fn with_processor(mut self, processor: FileProcessor) -> Self {
        self.processor = processor;
        self
    }

    fn context(&self) -> CheckContext {
        CheckContext::new(self.tables.clone()).with_threshold(self.abrupt_threshold)
    }
}

fn build_model(text: &str, stats: &mut PipelineStats) -> Result<ParsedModel, PipelineError> {
    let start = Instant::now();
    let mut builder = RecordBuilder::new();
    let model = builder.build(text)?;

    stats.parse_duration = start.elapsed();
    stats.lines = builder.classification_metrics().clone();
    stats.record_count = model.records.len();
    stats.key_block_count = model.key_blocks.len();
    Ok(model)
}

fn run_checks(
    name: &str,
    model: &ParsedModel,
    options: &ValidationOptions,
    mut stats: PipelineStats,
) -> PipelineResult {
    let start = Instant::now();
    let ctx = options.context();

    let findings = if options.parallel {
        checks::run_checks_parallel(model, &ctx, &options.checks)
    } else {
        checks::run_checks(model, &ctx, &options.checks)
    };

    stats.check_duration = start.elapsed();
    stats.finding_count = findings.len();

    let result = PipelineResult::new(
        Report::new(name, model, options.checks.clone(), findings),
        stats,
    );
    result.log_success();
    result
}

/// Validate source text already held in memory
pub fn validate_source(
    name: &str,
    text: &str,
    options: &ValidationOptions,
) -> Result<PipelineResult, PipelineError> {
    crate::log_info!("Starting validation",
        "source" => name,
        "checks" => options.checks.len(),
        "parallel" => options.parallel);

    let mut stats = PipelineStats::default();
    let model = build_model(text, &mut stats)?;
    Ok(run_checks(name, &model, options, stats))
}

/// Read a data file and validate it
pub fn validate_file(
    file_path: &str,
    options: &ValidationOptions,
) -> Result<PipelineResult, PipelineError> {
    logging::with_file_context(PathBuf::from(file_path), 0, || {
        validate_file_in_context(file_path, options)
    })
}

/// Like [`validate_file`] but without installing a file context; batch
/// workers install their own with a per-file id
pub(crate) fn validate_file_in_context(
    file_path: &str,
    options: &ValidationOptions,
) -> Result<PipelineResult, PipelineError> {
    crate::log_info!("Starting data file validation",
        "file" => file_path,
        "checks" => options.checks.len());

    let FileProcessingResult {
        source,
        metadata,
        processing_duration,
    } = options.processor.process_file(file_path)?;

    let mut stats = PipelineStats {
        file_size: Some(metadata.size),
        read_duration: processing_duration,
        ..PipelineStats::default()
    };
    let model = build_model(&source, &mut stats)?;
    drop(source);

    Ok(run_checks(file_path, &model, options, stats))
}

fn findings_for(text: &str, check: CheckId) -> Result<Vec<Finding>, PipelineError> {
    let options = ValidationOptions::from_env()?.with_checks(vec![check]);
    Ok(validate_source(IN_MEMORY_SOURCE, text, &options)?.report.findings)
}

pub fn check_zero_after_non_zero(text: &str) -> Result<Vec<Finding>, PipelineError> {
    findings_for(text, CheckId::ZeroAfterNonZero)
}

pub fn check_zero_in_activity_ratio(text: &str) -> Result<Vec<Finding>, PipelineError> {
    findings_for(text, CheckId::ZeroInActivityRatio)
}

pub fn check_ranges(text: &str) -> Result<Vec<Finding>, PipelineError> {
    findings_for(text, CheckId::Range)
}

pub fn check_abrupt_changes(text: &str) -> Result<Vec<Finding>, PipelineError> {
    findings_for(text, CheckId::AbruptChange)
}

pub fn check_duplicate_values(text: &str) -> Result<Vec<Finding>, PipelineError> {
    findings_for(text, CheckId::DuplicateValue)
}

pub fn check_essential_items(text: &str) -> Result<Vec<Finding>, PipelineError> {
    findings_for(text, CheckId::EssentialItems)
}

pub fn check_input_commodities(text: &str) -> Result<Vec<Finding>, PipelineError> {
    findings_for(text, CheckId::InputCommodity)
}

pub fn check_output_commodities(text: &str) -> Result<Vec<Finding>, PipelineError> {
    findings_for(text, CheckId::OutputCommodity)
}

/// Full catalog, findings tagged by check id
pub fn check_all(text: &str) -> Result<Vec<Finding>, PipelineError> {
    let options = ValidationOptions::from_env()?;
    Ok(validate_source(IN_MEMORY_SOURCE, text, &options)?.report.findings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::runtime::env_vars;
    use crate::file_processor::FileProcessorError;
    use crate::records::RecordError;
    use assert_matches::assert_matches;

    const MODEL: &str = "\
# demo model
set YEAR := 2020 2021 2022 2023;
set COMMODITY := BIO ELC001;
set TECHNOLOGY := PWRBIO;
param CapitalCost default 0 :=
[RE1,*,*]:
PWRBIO 100 8000 100 0
;
param InputActivityRatio default 0 :=
[RE1,PWRBIO,SOL,1,*]:
1 1 1 1
;
";

    #[test]
    fn test_validate_pipeline() {
        let _ = crate::logging::init_global_logging();
        assert!(validate_pipeline().is_ok());
    }

    #[test]
    fn test_pipeline_error_creation() {
        let error = PipelineError::pipeline_error("Test error");
        assert_matches!(error, PipelineError::Pipeline { ref message } if message == "Test error");
        assert_eq!(error.error_code().as_str(), "ERR001");
    }

    #[test]
    fn test_validate_source_report() {
        let options = ValidationOptions::builtin().unwrap();
        let result = validate_source("model.txt", MODEL, &options).unwrap();
        let report = &result.report;

        assert_eq!(report.source, "model.txt");
        assert_eq!(report.base_year, Some(2020));
        assert_eq!(report.record_count, 2);
        assert_eq!(result.stats.file_size, None);
        assert_eq!(result.stats.lines.total_lines, 12);
        assert!(report.findings_for(CheckId::Range).any(|f| f.line_number == 7));
        assert!(report.findings_for(CheckId::ZeroAfterNonZero).any(|f| f.line_number == 7));
        assert!(report.findings_for(CheckId::InputCommodity).any(|f| f.line_number == 10));
    }

    #[test]
    fn test_per_check_entries_are_scoped() {
        let ranges = check_ranges(MODEL).unwrap();
        assert_eq!(ranges.len(), 1);
        assert!(ranges.iter().all(|f| f.check == CheckId::Range));

        let input = check_input_commodities(MODEL).unwrap();
        assert_eq!(input.len(), 1);
        assert!(check_output_commodities(MODEL).unwrap().is_empty());
        assert!(check_duplicate_values(MODEL).unwrap().is_empty());
        assert_eq!(check_zero_after_non_zero(MODEL).unwrap().len(), 1);
        assert!(check_zero_in_activity_ratio(MODEL).unwrap().is_empty());
        assert!(!check_abrupt_changes(MODEL).unwrap().is_empty());
        assert!(!check_essential_items(MODEL).unwrap().is_empty());
    }

    #[test]
    fn test_check_all_is_idempotent() {
        let first = check_all(MODEL).unwrap();
        let second = check_all(MODEL).unwrap();
        assert_eq!(first, second);
        assert!(first.len() > 5);
    }

    #[test]
    fn test_custom_tables_and_processor() {
        let ranges = crate::tables::RangeTable::builtin()
            .apply_toml("[ranges]\nCapitalCost = { min = 0, max = 9000 }\n", "inline")
            .unwrap();
        let options = ValidationOptions::builtin()
            .unwrap()
            .with_checks(vec![CheckId::Range])
            .with_tables(Tables::builtin().unwrap().with_ranges(ranges))
            .with_processor(FileProcessor::default());

        let result = validate_source(IN_MEMORY_SOURCE, MODEL, &options).unwrap();
        assert!(result.report.is_clean());
        assert_eq!(result.report.checks_run, vec![CheckId::Range]);
    }

    #[test]
    fn test_structural_errors_abort() {
        let missing_year = check_all("param CapitalCost :=\nPWRBIO 1 2\n");
        assert_matches!(
            missing_year,
            Err(PipelineError::RecordBuilding(RecordError::MissingBaseYear { line: 2 }))
        );
        assert_matches!(
            check_all("* only a comment\n\n"),
            Err(PipelineError::RecordBuilding(RecordError::EmptyInput))
        );
        assert_matches!(
            check_all("set YEAR := 2147483647;\nparam CapitalCost :=\nX 1 2\n"),
            Err(PipelineError::RecordBuilding(RecordError::BaseYearOutOfRange { line: 1, .. }))
        );
    }

    #[test]
    fn test_validate_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.txt");
        std::fs::write(&path, MODEL).unwrap();
        let path = path.display().to_string();

        let options = ValidationOptions::builtin().unwrap().with_parallel(true);
        let result = validate_file(&path, &options).unwrap();
        assert_eq!(result.report.source, path);
        assert_eq!(result.stats.file_size, Some(MODEL.len() as u64));

        let sequential = validate_file(&path, &options.clone().with_parallel(false)).unwrap();
        assert_eq!(result.report.findings, sequential.report.findings);
    }

    #[test]
    fn test_validate_missing_file() {
        let options = ValidationOptions::builtin().unwrap();
        let result = validate_file("/nonexistent/model.txt", &options);
        assert_matches!(result, Err(PipelineError::FileProcessing(_)));
        assert!(result.unwrap_err().requires_halt());
    }

    fn write_csv_model(dir: &tempfile::TempDir) -> String {
        let path = dir.path().join("model.csv");
        std::fs::write(&path, MODEL).unwrap();
        path.display().to_string()
    }

    #[test]
    fn test_runtime_config_drives_file_intake() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv_model(&dir);

        let mut config = RuntimeConfig::default();
        config.file_processor.require_data_extension = false;
        let lenient = ValidationOptions::from_config(&config).unwrap();
        assert!(validate_file(&path, &lenient).is_ok());

        config.file_processor.require_data_extension = true;
        config.file_processor.enable_performance_logging = false;
        let strict = ValidationOptions::from_config(&config).unwrap();
        assert!(!strict.processor.enable_performance_logging);
        assert_matches!(
            validate_file(&path, &strict),
            Err(PipelineError::FileProcessing(FileProcessorError::InvalidExtension {
                extension: Some(ref ext)
            })) if ext == "csv"
        );
    }

    #[test]
    fn test_require_extension_from_env() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv_model(&dir);

        std::env::set_var(env_vars::REQUIRE_DATA_EXTENSION, "true");
        let options = ValidationOptions::from_env();
        std::env::remove_var(env_vars::REQUIRE_DATA_EXTENSION);

        let options = options.unwrap();
        assert!(options.processor.require_data_extension);
        assert_matches!(
            validate_file(&path, &options),
            Err(PipelineError::FileProcessing(FileProcessorError::InvalidExtension { .. }))
        );
    }

    #[test]
    fn test_builtin_options() {
        let options = ValidationOptions::builtin().unwrap();
        assert_eq!(options.checks, CheckId::ALL.to_vec());
        assert_eq!(options.abrupt_threshold, ABRUPT_CHANGE_THRESHOLD);
        assert!(!options.parallel);
        assert!(!options.processor.require_data_extension);
    }
}

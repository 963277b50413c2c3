// Internal modules
pub mod batch;
pub mod checks;
pub mod classify;
pub mod config;
pub mod file_processor;
#[macro_use]
pub mod logging;
pub mod pipeline;
pub mod records;
pub mod report;
pub mod tables;
pub mod utils;

// Re-export key types for library consumers
pub use batch::{BatchConfig, BatchError, BatchResults};
pub use checks::{CheckId, Finding, FindingDetail};
pub use pipeline::{
    check_abrupt_changes, check_all, check_duplicate_values, check_essential_items,
    check_input_commodities, check_output_commodities, check_ranges,
    check_zero_after_non_zero, check_zero_in_activity_ratio, validate_file, validate_source,
    PipelineError, PipelineResult, ValidationOptions,
};
pub use report::Report;

use crate::logging::codes;

/// Confirm every stage's codes have registry metadata before processing
pub fn validate_pipeline() -> Result<(), String> {
    crate::log_debug!("Validating pipeline configuration");

    crate::file_processor::init_file_processor_logging()?;
    crate::records::init_records_logging()?;
    crate::tables::init_tables_logging()?;
    crate::checks::init_checks_logging()?;
    codes::ensure_registered(
        "Pipeline",
        &[
            codes::system::INTERNAL_ERROR,
            codes::success::VALIDATION_COMPLETE,
            codes::batch::DISCOVERY_FAILED,
            codes::batch::FILE_FAILED,
            codes::success::BATCH_COMPLETE,
        ],
    )?;

    crate::log_success!(
        codes::success::SYSTEM_INITIALIZATION_COMPLETED,
        "Pipeline validation succeeded",
        "stages_validated" => 4,
        "file_processing" => true,
        "record_building" => true,
        "tables" => true,
        "checks" => true
    );

    Ok(())
}

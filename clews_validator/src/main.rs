use clap::{Parser, ValueEnum};
use clews_validator::checks::CheckId;
use clews_validator::config::runtime::{env_vars, RuntimeConfig};
use clews_validator::pipeline::{self, PipelineError, PipelineResult, ValidationOptions};
use clews_validator::report::{render_cargo_style, render_text};
use clews_validator::{batch, logging};
use std::env;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    /// Findings grouped by check
    Text,
    /// error[CODE] / warning[CODE] blocks with file:line locations
    Cargo,
    /// Full report as JSON
    Json,
}

#[derive(Parser, Debug)]
#[command(name = "clews-validate")]
#[command(about = "Validate CLEWs/OSeMOSYS model data files")]
#[command(version)]
struct Cli {
    /// Data file or directory of data files
    path: PathBuf,

    /// Run only this check (repeatable). Default: all checks
    #[arg(long = "check", value_name = "ID")]
    checks: Vec<CheckId>,

    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Relative change tolerated by the abrupt change check
    #[arg(long, value_name = "F")]
    threshold: Option<f64>,

    /// TOML range table extending the built-in bounds (replaces them when the file sets `replace = true`)
    #[arg(long, value_name = "FILE")]
    ranges: Option<String>,

    /// Worker threads for directory mode
    #[arg(long, value_name = "N")]
    threads: Option<usize>,

    /// Search subdirectories in directory mode
    #[arg(long, default_value_t = false)]
    recursive: bool,

    #[arg(long, value_name = "N")]
    max_files: Option<usize>,

    /// Stop a directory run at the first file that fails to validate
    #[arg(long, default_value_t = false)]
    fail_fast: bool,

    /// Run checks on separate threads
    #[arg(long, default_value_t = false)]
    parallel_checks: bool,

    /// Exit with status 2 when any finding is reported
    #[arg(long, default_value_t = false)]
    fail_on_findings: bool,

    /// Echo log events to stderr
    #[arg(long, short, default_value_t = false)]
    verbose: bool,
}

const EXIT_FINDINGS: u8 = 2;

fn main() -> ExitCode {
    let cli = Cli::parse();

    if cli.verbose {
        env::set_var(env_vars::LOGGING_ENABLE_CONSOLE, "true");
        env::set_var(env_vars::LOGGING_MIN_LEVEL, "debug");
    }

    if let Err(error) = logging::init_global_logging() {
        eprintln!("Error: failed to initialize logging: {}", error);
        return ExitCode::FAILURE;
    }
    if let Err(error) = pipeline::validate_pipeline() {
        eprintln!("Error: {}", error);
        return ExitCode::FAILURE;
    }

    let options = match build_options(&cli) {
        Ok(options) => options,
        Err(error) => {
            eprintln!("Error: {}", error);
            return ExitCode::FAILURE;
        }
    };

    if cli.path.is_dir() {
        run_directory(&cli, options)
    } else {
        run_single_file(&cli, &options)
    }
}

fn build_options(cli: &Cli) -> Result<ValidationOptions, PipelineError> {
    let mut config = RuntimeConfig::default();
    let prefs = &mut config.checks;
    if cli.ranges.is_some() {
        prefs.range_table_path = cli.ranges.clone();
    }
    if let Some(threshold) = cli.threshold {
        if !(threshold > 0.0 && threshold < 1.0) {
            return Err(PipelineError::pipeline_error(&format!(
                "--threshold must be between 0 and 1, got {}",
                threshold
            )));
        }
        prefs.abrupt_change_threshold = threshold;
    }
    prefs.parallel_checks |= cli.parallel_checks;

    let mut options = ValidationOptions::from_config(&config)?;
    if !cli.checks.is_empty() {
        let mut checks = cli.checks.clone();
        checks.sort();
        checks.dedup();
        options = options.with_checks(checks);
    }
    Ok(options)
}

fn render(result: &PipelineResult, format: OutputFormat) -> String {
    match format {
        OutputFormat::Text => render_text(&result.report),
        OutputFormat::Cargo => render_cargo_style(&result.report),
        OutputFormat::Json => result
            .report
            .to_json()
            .map(|json| json + "\n")
            .unwrap_or_else(|error| format!("{{\"error\": \"{}\"}}\n", error)),
    }
}

fn run_single_file(cli: &Cli, options: &ValidationOptions) -> ExitCode {
    let path = cli.path.to_string_lossy();

    match pipeline::validate_file(&path, options) {
        Ok(result) => {
            print!("{}", render(&result, cli.format));
            if cli.verbose {
                print_stats(&result);
            }
            if cli.fail_on_findings && !result.report.is_clean() {
                ExitCode::from(EXIT_FINDINGS)
            } else {
                ExitCode::SUCCESS
            }
        }
        Err(error) => {
            print_detailed_error(&error);
            logging::print_cargo_style_summary();
            ExitCode::FAILURE
        }
    }
}

fn run_directory(cli: &Cli, options: ValidationOptions) -> ExitCode {
    let mut config = batch::BatchConfig {
        recursive: cli.recursive,
        max_files: cli.max_files,
        fail_fast: cli.fail_fast,
        progress_reporting: cli.verbose,
        ..batch::BatchConfig::new(options)
    };
    if let Some(threads) = cli.threads {
        config = config.with_threads(threads);
    }

    match batch::process_directory_with_config(&cli.path, &config) {
        Ok(results) => {
            for (_, result) in &results.successful_files {
                print!("{}", render(result, cli.format));
                if cli.format != OutputFormat::Json {
                    println!();
                }
            }
            if cli.format != OutputFormat::Json {
                print_batch_results(&results);
            }
            if results.failure_count() > 0 {
                logging::print_cargo_style_summary();
                ExitCode::FAILURE
            } else if cli.fail_on_findings && results.total_findings() > 0 {
                ExitCode::from(EXIT_FINDINGS)
            } else {
                ExitCode::SUCCESS
            }
        }
        Err(error) => {
            eprintln!("Batch validation failed [{}]: {}", error.error_code(), error);
            logging::print_cargo_style_summary();
            ExitCode::FAILURE
        }
    }
}

fn print_stats(result: &PipelineResult) {
    let stats = &result.stats;
    eprintln!(
        "{} lines ({} data), {} records, {} key headers, {} findings in {:.2}ms",
        stats.lines.total_lines,
        stats.lines.data_rows,
        stats.record_count,
        stats.key_block_count,
        stats.finding_count,
        stats.total_duration().as_secs_f64() * 1000.0
    );
}

fn print_batch_results(results: &batch::BatchResults) {
    println!("Batch Validation Summary:");
    println!("  Files discovered: {}", results.files_discovered);
    println!("  Files processed: {}", results.files_processed);
    println!(
        "  Validated: {} ({:.1}%)",
        results.success_count(),
        results.success_rate() * 100.0
    );
    println!("  With findings: {}", results.files_with_findings());
    println!("  Failed: {}", results.failure_count());
    println!("  Total findings: {}", results.total_findings());
    println!(
        "  Total time: {:.2}s",
        results.processing_duration.as_secs_f64()
    );

    if results.failure_count() > 0 {
        println!("\nFailed Files:");
        for (file_path, error) in &results.failed_files {
            println!("  {}: {}", file_path.display(), get_error_summary(error));
        }
    }
}

fn get_error_summary(error: &PipelineError) -> String {
    match error {
        PipelineError::FileProcessing(_) => "File processing error".to_string(),
        PipelineError::RecordBuilding(err) => format!("Record building error: {}", err),
        PipelineError::Tables(_) => "Table loading error".to_string(),
        PipelineError::Pipeline { .. } => "Pipeline error".to_string(),
    }
}

fn print_detailed_error(error: &PipelineError) {
    match error {
        PipelineError::FileProcessing(file_err) => {
            eprintln!("File processing stage failed:");
            eprintln!("  {}", file_err);
        }
        PipelineError::RecordBuilding(record_err) => {
            eprintln!("Record building stage failed [{}]:", record_err.error_code());
            eprintln!("  {}", record_err);
        }
        PipelineError::Tables(table_err) => {
            eprintln!("Table loading failed:");
            eprintln!("  {}", table_err);
        }
        PipelineError::Pipeline { message } => {
            eprintln!("Pipeline error: {}", message);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_parse_cli_options() {
        let cli = Cli::try_parse_from([
            "clews-validate",
            "model.txt",
            "--check",
            "range",
            "--check",
            "abrupt-change",
            "--format",
            "cargo",
            "--threshold",
            "0.5",
            "--fail-on-findings",
        ])
        .unwrap();

        assert_eq!(cli.checks, vec![CheckId::Range, CheckId::AbruptChange]);
        assert_eq!(cli.format, OutputFormat::Cargo);
        assert_eq!(cli.threshold, Some(0.5));
        assert!(cli.fail_on_findings);
        assert!(!cli.recursive);
    }

    #[test]
    fn test_unknown_check_is_rejected() {
        let parsed = Cli::try_parse_from(["clews-validate", "model.txt", "--check", "bogus"]);
        assert!(parsed.is_err());
    }

    #[test]
    fn test_build_options_orders_checks() {
        let cli = Cli::try_parse_from([
            "clews-validate",
            "model.txt",
            "--check",
            "output_commodity",
            "--check",
            "range",
            "--check",
            "range",
        ])
        .unwrap();

        let options = build_options(&cli).unwrap();
        assert_eq!(options.checks, vec![CheckId::Range, CheckId::OutputCommodity]);
    }

    #[test]
    fn test_threshold_bounds() {
        let cli =
            Cli::try_parse_from(["clews-validate", "model.txt", "--threshold", "1.5"]).unwrap();
        assert!(build_options(&cli).is_err());
    }

    #[test]
    fn test_ranges_help_describes_merge() {
        let command = Cli::command();
        let help = command
            .get_arguments()
            .find(|arg| arg.get_id() == "ranges")
            .and_then(|arg| arg.get_help())
            .map(|help| help.to_string())
            .unwrap();
        assert!(help.contains("extending the built-in bounds"));
        assert!(help.contains("replace = true"));
    }

    #[test]
    fn test_get_error_summary() {
        let error = PipelineError::pipeline_error("test");
        assert_eq!(get_error_summary(&error), "Pipeline error");
    }
}

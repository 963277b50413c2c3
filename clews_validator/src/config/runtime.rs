// RUNTIME PREFERENCES (User Experience)

use crate::config::compile_time::checks::ABRUPT_CHANGE_THRESHOLD;
use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileProcessorPreferences {
    /// Whether to require a .txt/.dat extension on input files
    pub require_data_extension: bool,

    /// Whether to log read timings and file sizes
    pub enable_performance_logging: bool,
}

impl Default for FileProcessorPreferences {
    fn default() -> Self {
        Self {
            require_data_extension: env::var(env_vars::REQUIRE_DATA_EXTENSION)
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
            enable_performance_logging: env::var(env_vars::ENABLE_PERFORMANCE_LOGGING)
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(true),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckPreferences {
    /// Relative year-on-year change tolerated by the abrupt change check
    pub abrupt_change_threshold: f64,

    /// Run each check on its own thread
    pub parallel_checks: bool,

    /// Optional TOML file replacing or extending the built-in range table
    pub range_table_path: Option<String>,
}

impl Default for CheckPreferences {
    fn default() -> Self {
        Self {
            abrupt_change_threshold: env::var(env_vars::ABRUPT_CHANGE_THRESHOLD)
                .ok()
                .and_then(|v| v.parse::<f64>().ok())
                .filter(|t| *t > 0.0 && *t < 1.0)
                .unwrap_or(ABRUPT_CHANGE_THRESHOLD),
            parallel_checks: env::var(env_vars::PARALLEL_CHECKS)
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
            range_table_path: env::var(env_vars::RANGE_TABLE).ok().filter(|p| !p.is_empty()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingPreferences {
    /// Emit log events as JSON lines
    pub use_structured_logging: bool,

    /// Echo log events to the console
    pub enable_console_logging: bool,

    pub min_log_level: LogLevel,

    /// Append log events to this file in addition to the console
    pub log_file: Option<String>,

    /// Whether to print the cargo-style summary after processing
    pub enable_cargo_style_output: bool,

    /// Whether to include file context in log messages
    pub include_file_context: bool,
}

impl Default for LoggingPreferences {
    fn default() -> Self {
        Self {
            use_structured_logging: env::var(env_vars::LOGGING_USE_STRUCTURED)
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
            enable_console_logging: env::var(env_vars::LOGGING_ENABLE_CONSOLE)
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
            min_log_level: env::var(env_vars::LOGGING_MIN_LEVEL)
                .ok()
                .and_then(|v| parse_log_level(&v))
                .unwrap_or(LogLevel::Info),
            log_file: env::var(env_vars::LOGGING_FILE).ok().filter(|p| !p.is_empty()),
            enable_cargo_style_output: env::var(env_vars::LOGGING_CARGO_STYLE)
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(true),
            include_file_context: env::var(env_vars::LOGGING_INCLUDE_FILE_CONTEXT)
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(true),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LogLevel {
    Error = 0,
    Warning = 1,
    Info = 2,
    Debug = 3,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Error => "ERROR",
            LogLevel::Warning => "WARN",
            LogLevel::Info => "INFO",
            LogLevel::Debug => "DEBUG",
        }
    }

    pub fn to_events_log_level(&self) -> crate::logging::events::LogLevel {
        match self {
            LogLevel::Error => crate::logging::events::LogLevel::Error,
            LogLevel::Warning => crate::logging::events::LogLevel::Warning,
            LogLevel::Info => crate::logging::events::LogLevel::Info,
            LogLevel::Debug => crate::logging::events::LogLevel::Debug,
        }
    }
}

/// Parse log level from string (used for environment variables)
pub fn parse_log_level(level: &str) -> Option<LogLevel> {
    match level.to_lowercase().as_str() {
        "error" | "0" => Some(LogLevel::Error),
        "warning" | "warn" | "1" => Some(LogLevel::Warning),
        "info" | "2" => Some(LogLevel::Info),
        "debug" | "3" => Some(LogLevel::Debug),
        _ => None,
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RuntimeConfig {
    pub file_processor: FileProcessorPreferences,
    pub checks: CheckPreferences,
    pub logging: LoggingPreferences,
}

/// Environment variable names for configuration
pub mod env_vars {
    // File Processor
    pub const REQUIRE_DATA_EXTENSION: &str = "CLEWS_REQUIRE_DATA_EXTENSION";
    pub const ENABLE_PERFORMANCE_LOGGING: &str = "CLEWS_ENABLE_PERFORMANCE_LOGGING";

    // Checks
    pub const ABRUPT_CHANGE_THRESHOLD: &str = "CLEWS_ABRUPT_CHANGE_THRESHOLD";
    pub const PARALLEL_CHECKS: &str = "CLEWS_PARALLEL_CHECKS";
    pub const RANGE_TABLE: &str = "CLEWS_RANGE_TABLE";

    // Logging
    pub const LOGGING_USE_STRUCTURED: &str = "CLEWS_LOGGING_USE_STRUCTURED";
    pub const LOGGING_ENABLE_CONSOLE: &str = "CLEWS_LOGGING_ENABLE_CONSOLE";
    pub const LOGGING_MIN_LEVEL: &str = "CLEWS_LOGGING_MIN_LEVEL";
    pub const LOGGING_FILE: &str = "CLEWS_LOGGING_FILE";
    pub const LOGGING_CARGO_STYLE: &str = "CLEWS_LOGGING_CARGO_STYLE";
    pub const LOGGING_INCLUDE_FILE_CONTEXT: &str = "CLEWS_LOGGING_INCLUDE_FILE_CONTEXT";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level_parsing() {
        assert_eq!(parse_log_level("error"), Some(LogLevel::Error));
        assert_eq!(parse_log_level("ERROR"), Some(LogLevel::Error));
        assert_eq!(parse_log_level("0"), Some(LogLevel::Error));
        assert_eq!(parse_log_level("warn"), Some(LogLevel::Warning));
        assert_eq!(parse_log_level("1"), Some(LogLevel::Warning));
        assert_eq!(parse_log_level("info"), Some(LogLevel::Info));
        assert_eq!(parse_log_level("debug"), Some(LogLevel::Debug));
        assert_eq!(parse_log_level("invalid"), None);
    }

    #[test]
    fn test_default_threshold_within_bounds() {
        let prefs = CheckPreferences::default();
        assert!(prefs.abrupt_change_threshold > 0.0);
        assert!(prefs.abrupt_change_threshold < 1.0);
    }

    #[test]
    fn test_env_var_names_share_prefix() {
        for name in [
            env_vars::ABRUPT_CHANGE_THRESHOLD,
            env_vars::LOGGING_MIN_LEVEL,
            env_vars::RANGE_TABLE,
        ] {
            assert!(name.starts_with("CLEWS_"));
        }
    }
}

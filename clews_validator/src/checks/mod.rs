//! Rule engine: a fixed catalog of independent checks over a parsed model
//!
//! Each check is a pure function `(&ParsedModel, &CheckContext) -> Vec<Finding>`.
//! The engine only selects, runs and concatenates; check order affects report
//! order, never the findings themselves.

pub mod abrupt;
pub mod commodity;
pub mod duplicates;
pub mod essentials;
pub mod finding;
pub mod ranges;
pub mod zeros;

pub use finding::{Finding, FindingDetail};

use crate::config::compile_time::checks::{ABRUPT_CHANGE_THRESHOLD, MAX_FINDINGS_PER_CHECK};
use crate::logging;
use crate::logging::codes::{self, Code};
use crate::records::ParsedModel;
use crate::tables::{TableError, Tables};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Identifier of one check in the catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckId {
    ZeroAfterNonZero,
    ZeroInActivityRatio,
    Range,
    AbruptChange,
    DuplicateValue,
    EssentialItems,
    InputCommodity,
    OutputCommodity,
}

impl CheckId {
    /// Catalog order
    pub const ALL: [CheckId; 8] = [
        CheckId::ZeroAfterNonZero,
        CheckId::ZeroInActivityRatio,
        CheckId::Range,
        CheckId::AbruptChange,
        CheckId::DuplicateValue,
        CheckId::EssentialItems,
        CheckId::InputCommodity,
        CheckId::OutputCommodity,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CheckId::ZeroAfterNonZero => "zero_after_non_zero",
            CheckId::ZeroInActivityRatio => "zero_in_activity_ratio",
            CheckId::Range => "range",
            CheckId::AbruptChange => "abrupt_change",
            CheckId::DuplicateValue => "duplicate_value",
            CheckId::EssentialItems => "essential_items",
            CheckId::InputCommodity => "input_commodity",
            CheckId::OutputCommodity => "output_commodity",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            CheckId::ZeroAfterNonZero => "Zero after non-zero value",
            CheckId::ZeroInActivityRatio => "Zero in activity ratio",
            CheckId::Range => "Value out of range",
            CheckId::AbruptChange => "Abrupt year-on-year change",
            CheckId::DuplicateValue => "Duplicate demand value",
            CheckId::EssentialItems => "Missing essential items",
            CheckId::InputCommodity => "Input commodity mapping",
            CheckId::OutputCommodity => "Output commodity mapping",
        }
    }

    /// Primary finding code; essentials and commodity checks emit a second one
    pub fn code(&self) -> Code {
        match self {
            CheckId::ZeroAfterNonZero => codes::checks::ZERO_AFTER_NON_ZERO,
            CheckId::ZeroInActivityRatio => codes::checks::ZERO_IN_ACTIVITY_RATIO,
            CheckId::Range => codes::checks::VALUE_OUT_OF_RANGE,
            CheckId::AbruptChange => codes::checks::ABRUPT_CHANGE,
            CheckId::DuplicateValue => codes::checks::DUPLICATE_VALUE,
            CheckId::EssentialItems => codes::checks::MISSING_COMMODITY,
            CheckId::InputCommodity => codes::checks::INPUT_COMMODITY_MISMATCH,
            CheckId::OutputCommodity => codes::checks::OUTPUT_COMMODITY_MISMATCH,
        }
    }

    /// Position in [`CheckId::ALL`]
    pub fn catalog_index(&self) -> usize {
        CheckId::ALL
            .iter()
            .position(|id| id == self)
            .unwrap_or(CheckId::ALL.len())
    }
}

impl fmt::Display for CheckId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CheckId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase().replace('-', "_");
        CheckId::ALL
            .iter()
            .copied()
            .find(|id| id.as_str() == wanted)
            .ok_or_else(|| {
                let known: Vec<&str> = CheckId::ALL.iter().map(CheckId::as_str).collect();
                format!("Unknown check '{}' (expected one of: {})", s, known.join(", "))
            })
    }
}

/// Read-only configuration shared by every check in a run
#[derive(Debug, Clone)]
pub struct CheckContext {
    pub tables: Tables,
    pub abrupt_threshold: f64,
}

impl CheckContext {
    pub fn new(tables: Tables) -> Self {
        Self {
            tables,
            abrupt_threshold: ABRUPT_CHANGE_THRESHOLD,
        }
    }

    /// Context over the built-in tables
    pub fn builtin() -> Result<Self, TableError> {
        Ok(Self::new(Tables::builtin()?))
    }

    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.abrupt_threshold = threshold;
        self
    }
}

fn dispatch(check: CheckId, model: &ParsedModel, ctx: &CheckContext) -> Vec<Finding> {
    match check {
        CheckId::ZeroAfterNonZero => zeros::zero_after_non_zero(model, ctx),
        CheckId::ZeroInActivityRatio => zeros::zero_in_activity_ratio(model, ctx),
        CheckId::Range => ranges::out_of_range(model, ctx),
        CheckId::AbruptChange => abrupt::abrupt_changes(model, ctx),
        CheckId::DuplicateValue => duplicates::duplicate_values(model, ctx),
        CheckId::EssentialItems => essentials::missing_essentials(model, ctx),
        CheckId::InputCommodity => commodity::input_commodities(model, ctx),
        CheckId::OutputCommodity => commodity::output_commodities(model, ctx),
    }
}

/// Run one check, capping and logging its findings
pub fn run_check(check: CheckId, model: &ParsedModel, ctx: &CheckContext) -> Vec<Finding> {
    crate::log_debug!("Running check", "check" => check, "records" => model.records.len());

    let mut findings = dispatch(check, model, ctx);

    if findings.len() > MAX_FINDINGS_PER_CHECK {
        crate::log_warning!(
            code = check.code(),
            "Finding limit reached, remaining findings dropped",
            "check" => check,
            "found" => findings.len(),
            "limit" => MAX_FINDINGS_PER_CHECK
        );
        findings.truncate(MAX_FINDINGS_PER_CHECK);
    }

    if findings.is_empty() {
        crate::log_success!(codes::success::CHECK_PASSED, "Check passed", "check" => check);
    } else {
        crate::log_success!(
            codes::success::CHECK_COMPLETED_WITH_FINDINGS,
            "Check completed with findings",
            "check" => check,
            "findings" => findings.len()
        );
    }

    findings
}

/// Run the selected checks one after another, in selection order
pub fn run_checks(model: &ParsedModel, ctx: &CheckContext, selection: &[CheckId]) -> Vec<Finding> {
    selection
        .iter()
        .flat_map(|check| run_check(*check, model, ctx))
        .collect()
}

/// Run each selected check on its own scoped thread
///
/// Output is identical to [`run_checks`]: results are joined in selection order.
/// Workers log under the caller's file context.
pub fn run_checks_parallel(
    model: &ParsedModel,
    ctx: &CheckContext,
    selection: &[CheckId],
) -> Vec<Finding> {
    let file_context = logging::get_current_file_context();

    std::thread::scope(|scope| {
        let handles: Vec<_> = selection
            .iter()
            .map(|check| {
                let check = *check;
                let file_context = file_context.clone();
                let handle = scope.spawn(move || {
                    logging::with_captured_context(file_context, || run_check(check, model, ctx))
                });
                (check, handle)
            })
            .collect();

        handles
            .into_iter()
            .flat_map(|(check, handle)| {
                handle.join().unwrap_or_else(|_| {
                    crate::log_error!(
                        codes::system::INTERNAL_ERROR,
                        "Check thread panicked",
                        "check" => check
                    );
                    Vec::new()
                })
            })
            .collect()
    })
}

/// Check that every finding code has registry metadata
pub fn init_checks_logging() -> Result<(), String> {
    codes::ensure_registered(
        "Checks",
        &[
            codes::checks::ZERO_AFTER_NON_ZERO,
            codes::checks::ZERO_IN_ACTIVITY_RATIO,
            codes::checks::VALUE_OUT_OF_RANGE,
            codes::checks::ABRUPT_CHANGE,
            codes::checks::DUPLICATE_VALUE,
            codes::checks::MISSING_COMMODITY,
            codes::checks::MISSING_TECHNOLOGY,
            codes::checks::INPUT_COMMODITY_MISMATCH,
            codes::checks::OUTPUT_COMMODITY_MISMATCH,
            codes::checks::UNEXPECTED_TECHNOLOGY,
            codes::success::CHECK_PASSED,
            codes::success::CHECK_COMPLETED_WITH_FINDINGS,
        ],
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::build_records;

    const MODEL: &str = "\
set YEAR := 2020 2021 2022 2023;
set COMMODITY := BIO SOL;
set TECHNOLOGY := PWRBIO;
param CapitalCost default 0 :=
[RE1,*,*,*]:
PWRBIO 1 8000 100 100 40
;
param InputActivityRatio default 0 :=
[RE1,PWRBIO,SOL,1,*]:
2020 2021 2022 2023 :=
1 1 1 0
;
";

    #[test]
    fn test_check_id_round_trip_names() {
        for id in CheckId::ALL {
            assert_eq!(id.as_str().parse::<CheckId>(), Ok(id));
        }
        assert_eq!("abrupt-change".parse::<CheckId>(), Ok(CheckId::AbruptChange));
        assert!("bogus".parse::<CheckId>().is_err());
        assert_eq!(CheckId::Range.catalog_index(), 2);
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let model = build_records(MODEL).unwrap();
        let ctx = CheckContext::builtin().unwrap();

        let sequential = run_checks(&model, &ctx, &CheckId::ALL);
        let parallel = run_checks_parallel(&model, &ctx, &CheckId::ALL);

        assert!(!sequential.is_empty());
        assert_eq!(sequential, parallel);
    }

    #[test]
    fn test_parallel_keeps_file_context() {
        let model = build_records(MODEL).unwrap();
        let ctx = CheckContext::builtin().unwrap();
        let path = std::path::PathBuf::from("parallel.txt");

        let (findings, context) = logging::with_file_context(path.clone(), 4, || {
            let findings = run_checks_parallel(&model, &ctx, &CheckId::ALL);
            (findings, logging::get_current_file_context())
        });

        assert_eq!(findings, run_checks(&model, &ctx, &CheckId::ALL));
        assert_eq!(context.map(|c| c.file_path), Some(path));
    }

    #[test]
    fn test_runs_are_idempotent() {
        let model = build_records(MODEL).unwrap();
        let ctx = CheckContext::builtin().unwrap();
        assert_eq!(
            run_checks(&model, &ctx, &CheckId::ALL),
            run_checks(&model, &ctx, &CheckId::ALL)
        );
    }

    #[test]
    fn test_selection_limits_checks() {
        let model = build_records(MODEL).unwrap();
        let ctx = CheckContext::builtin().unwrap();
        let findings = run_checks(&model, &ctx, &[CheckId::Range]);
        assert!(findings.iter().all(|f| f.check == CheckId::Range));
        // 8000 capital cost and the zero input ratio
        assert_eq!(findings.len(), 2);
    }

    #[test]
    fn test_threshold_override() {
        let ctx = CheckContext::builtin().unwrap().with_threshold(0.5);
        assert_eq!(ctx.abrupt_threshold, 0.5);
    }

    #[test]
    fn test_init_logging() {
        assert!(init_checks_logging().is_ok());
    }
}

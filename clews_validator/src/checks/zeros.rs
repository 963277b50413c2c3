//! Zero-value checks
use super::{CheckContext, CheckId, Finding, FindingDetail};
use crate::logging::codes;
use crate::records::{ParsedModel, Record};

/// Index of the first zero that directly follows a non-zero value
fn first_drop_to_zero(record: &Record) -> Option<usize> {
    record
        .series
        .windows(2)
        .position(|pair| pair[0].value != 0.0 && pair[1].value == 0.0)
        .map(|index| index + 1)
}

/// Flag the first non-zero to zero transition in each series
pub fn zero_after_non_zero(model: &ParsedModel, ctx: &CheckContext) -> Vec<Finding> {
    model
        .records
        .iter()
        .filter(|record| !ctx.tables.is_zero_transition_exempt(&record.parameter))
        .filter_map(|record| {
            let index = first_drop_to_zero(record)?;
            let year = record.year_at(index)?;
            Some(Finding::new(
                record.line_number,
                CheckId::ZeroAfterNonZero,
                codes::checks::ZERO_AFTER_NON_ZERO,
                FindingDetail::ZeroAfterNonZero {
                    parameter: record.parameter.clone(),
                    technology: record.technology_label().map(str::to_string),
                    year,
                },
            ))
        })
        .collect()
}

/// Flag the first zero anywhere in an activity ratio series
pub fn zero_in_activity_ratio(model: &ParsedModel, ctx: &CheckContext) -> Vec<Finding> {
    model
        .records
        .iter()
        .filter(|record| ctx.tables.is_activity_ratio(&record.parameter))
        .filter_map(|record| {
            let point = record.series.iter().find(|point| point.value == 0.0)?;
            Some(Finding::new(
                record.line_number,
                CheckId::ZeroInActivityRatio,
                codes::checks::ZERO_IN_ACTIVITY_RATIO,
                FindingDetail::ZeroInActivityRatio {
                    parameter: record.parameter.clone(),
                    technology: record.technology_label().map(str::to_string),
                    mode: record.mode_label().map(str::to_string),
                    year: point.year,
                },
            ))
        })
        .collect()
}

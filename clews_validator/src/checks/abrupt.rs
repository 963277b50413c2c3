//! Year-on-year abrupt change check for volatile parameters
use super::{CheckContext, CheckId, Finding, FindingDetail};
use crate::logging::codes;
use crate::records::{ParsedModel, Record};

/// The first step of a series (index 0 to 1) is never compared
const FIRST_COMPARED_INDEX: usize = 2;

/// Indices flagged in one row
///
/// Every zero/non-zero switch is reported. The first ratio outside
/// `[1 - threshold, 1 + threshold]` is reported and ends the row.
fn abrupt_indices(values: &[f64], threshold: f64) -> Vec<usize> {
    let mut flagged = Vec::new();

    for i in FIRST_COMPARED_INDEX..values.len() {
        let (previous, current) = (values[i - 1], values[i]);

        if (previous == 0.0) != (current == 0.0) {
            flagged.push(i);
        } else if previous != 0.0 {
            let ratio = current / previous;
            if ratio < 1.0 - threshold || ratio > 1.0 + threshold {
                flagged.push(i);
                break;
            }
        }
    }

    flagged
}

fn finding_at(record: &Record, index: usize) -> Option<Finding> {
    let year = record.year_at(index)?;
    Some(Finding::new(
        record.line_number,
        CheckId::AbruptChange,
        codes::checks::ABRUPT_CHANGE,
        FindingDetail::AbruptChange {
            parameter: record.parameter.clone(),
            technology: record.technology_label().map(str::to_string),
            mode: record.mode_label().map(str::to_string),
            year,
            previous: record.series[index - 1].value,
            current: record.series[index].value,
        },
    ))
}

pub fn abrupt_changes(model: &ParsedModel, ctx: &CheckContext) -> Vec<Finding> {
    model
        .records
        .iter()
        .filter(|record| ctx.tables.is_volatile(&record.parameter))
        .flat_map(|record| {
            let values: Vec<f64> = record.values().collect();
            abrupt_indices(&values, ctx.abrupt_threshold)
                .into_iter()
                .filter_map(move |index| finding_at(record, index))
        })
        .collect()
}

//! Numeric range check
use super::{CheckContext, CheckId, Finding, FindingDetail};
use crate::classify::line::is_year_token;
use crate::logging::codes;
use crate::records::ParsedModel;

/// First out-of-range value per row, for parameters with a known range.
/// Tokens that read as model years are skipped.
pub fn out_of_range(model: &ParsedModel, ctx: &CheckContext) -> Vec<Finding> {
    let mut findings = Vec::new();

    for record in &model.records {
        let Some(range) = ctx.tables.ranges.get(&record.parameter) else {
            continue;
        };

        let violation = record
            .series
            .iter()
            .filter(|point| !is_year_token(&point.raw))
            .find_map(|point| range.violation(point.value).map(|dir| (point.value, dir)));

        if let Some((value, direction)) = violation {
            findings.push(Finding::new(
                record.line_number,
                CheckId::Range,
                codes::checks::VALUE_OUT_OF_RANGE,
                FindingDetail::OutOfRange {
                    parameter: record.parameter.clone(),
                    value,
                    direction,
                    min: range.min,
                    max: range.max,
                },
            ));
        }
    }

    findings
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::build_records;
    use crate::tables::{Direction, Range, RangeTable, Tables};
    use assert_matches::assert_matches;

    fn run(source: &str) -> Vec<Finding> {
        out_of_range(&build_records(source).unwrap(), &CheckContext::builtin().unwrap())
    }

    #[test]
    fn test_too_big_reported_with_value() {
        let findings = run("set YEAR := 2020;\nparam CapitalCost :=\nPWRBIO 100 8000 9000\n");
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].line_number, 3);
        assert_matches!(
            findings[0].detail,
            FindingDetail::OutOfRange { value, direction: Direction::TooBig, .. } if value == 8000.0
        );
    }

    #[test]
    fn test_in_range_row_is_clean() {
        let findings = run("set YEAR := 2020;\nparam CapitalCost :=\nPWRBIO 0 100 7000\n");
        assert!(findings.is_empty());
    }

    #[test]
    fn test_too_small_and_year_tokens() {
        let source = "\
set YEAR := 2020;
param VariableCost :=
PWRBIO -6 1
param OperationalLife :=
PWRBIO 2030 40
param TotalAnnualMaxCapacity :=
PWRBIO 1e9
";
        let findings = run(source);
        assert_eq!(findings.len(), 1);
        assert_matches!(
            findings[0].detail,
            FindingDetail::OutOfRange { direction: Direction::TooSmall, .. }
        );
    }

    #[test]
    fn test_custom_range_table() {
        let mut ranges = RangeTable::empty();
        ranges.insert("TotalAnnualMaxCapacity", Range::new(0.0, 10.0)).unwrap();
        let ctx = CheckContext::new(Tables::builtin().unwrap().with_ranges(ranges));

        let model = build_records("set YEAR := 2020;\nparam TotalAnnualMaxCapacity :=\nPWRBIO 11\n").unwrap();
        assert_eq!(out_of_range(&model, &ctx).len(), 1);
    }
}

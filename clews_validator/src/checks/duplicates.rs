//! Repeated demand value check
use super::{CheckContext, CheckId, Finding, FindingDetail};
use crate::logging::codes;
use crate::records::{ParsedModel, Record};

/// Commodity of a demand row: first inline key field, else the header field
fn row_commodity(record: &Record) -> Option<String> {
    record
        .key_fields
        .first()
        .or(record.commodity.as_ref())
        .cloned()
}

/// Every non-zero value that repeats an earlier value of the same row
pub fn duplicate_values(model: &ParsedModel, ctx: &CheckContext) -> Vec<Finding> {
    let mut findings = Vec::new();

    for record in &model.records {
        if !ctx.tables.watches_duplicates(&record.parameter) {
            continue;
        }

        let mut seen: Vec<f64> = Vec::with_capacity(record.series.len());
        for point in &record.series {
            if point.value != 0.0 && seen.contains(&point.value) {
                findings.push(Finding::new(
                    record.line_number,
                    CheckId::DuplicateValue,
                    codes::checks::DUPLICATE_VALUE,
                    FindingDetail::DuplicateValue {
                        parameter: record.parameter.clone(),
                        commodity: row_commodity(record),
                        value: point.value,
                        year: point.year,
                    },
                ));
            } else {
                seen.push(point.value);
            }
        }
    }

    findings
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::build_records;
    use assert_matches::assert_matches;

    fn run(source: &str) -> Vec<Finding> {
        duplicate_values(&build_records(source).unwrap(), &CheckContext::builtin().unwrap())
    }

    #[test]
    fn test_repeat_flagged_but_not_zero() {
        let findings = run(
            "set YEAR := 2020;\nparam SpecifiedAnnualDemand :=\n[RE1,*,*]:\nX 10 20 20 0 0 30\n",
        );
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].line_number, 4);
        assert_matches!(
            &findings[0].detail,
            FindingDetail::DuplicateValue { commodity: Some(c), value, year: 2022, .. }
                if c == "X" && *value == 20.0
        );
    }

    #[test]
    fn test_every_repeat_is_reported() {
        let findings = run("set YEAR := 2020;\nparam AccumulatedAnnualDemand :=\nX 5 5 5 6\n");
        let years: Vec<i32> = findings
            .iter()
            .filter_map(|f| match f.detail {
                FindingDetail::DuplicateValue { year, .. } => Some(year),
                _ => None,
            })
            .collect();
        assert_eq!(years, vec![2021, 2022]);
    }

    #[test]
    fn test_numeric_comparison_and_scope() {
        let source = "\
set YEAR := 2020;
param SpecifiedAnnualDemand :=
X 1.0 1 2
param CapitalCost :=
PWRBIO 5 5 5
";
        assert_eq!(run(source).len(), 1);
    }

    #[test]
    fn test_header_commodity_fallback() {
        let findings = run(
            "set YEAR := 2020;\nparam SpecifiedAnnualDemand :=\n[RE1,DEMTRA,TRABIO]:\n3 3\n",
        );
        assert_matches!(
            &findings[0].detail,
            FindingDetail::DuplicateValue { commodity: Some(c), .. } if c == "TRABIO"
        );
    }
}

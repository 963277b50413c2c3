//! Diagnostics aggregation
//!
//! Merges the findings of every check into one ordered, line-addressable
//! [`Report`]. The aggregator never reinterprets a finding; it only orders,
//! counts and formats.

pub mod render;

pub use render::{render_cargo_style, render_text};

use crate::checks::{CheckId, Finding};
use crate::logging::Severity;
use crate::records::ParsedModel;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

/// Findings of one validation run, ordered by catalog order then line
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub source: String,
    pub generated_at: DateTime<Utc>,
    pub base_year: Option<i32>,
    pub record_count: usize,
    pub checks_run: Vec<CheckId>,
    pub findings: Vec<Finding>,
}

/// Finding counts per check and per severity
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ReportSummary {
    pub total: usize,
    pub by_check: BTreeMap<CheckId, usize>,
    pub by_severity: BTreeMap<Severity, usize>,
}

impl Report {
    pub fn new(
        source: &str,
        model: &ParsedModel,
        checks_run: Vec<CheckId>,
        mut findings: Vec<Finding>,
    ) -> Self {
        // Stable: findings on the same line keep their check's emission order
        findings.sort_by_key(|finding| (finding.check.catalog_index(), finding.line_number));

        Self {
            source: source.to_string(),
            generated_at: Utc::now(),
            base_year: model.base_year,
            record_count: model.records.len(),
            checks_run,
            findings,
        }
    }

    pub fn is_clean(&self) -> bool {
        self.findings.is_empty()
    }

    pub fn summary(&self) -> ReportSummary {
        let mut summary = ReportSummary {
            total: self.findings.len(),
            ..ReportSummary::default()
        };
        for finding in &self.findings {
            *summary.by_check.entry(finding.check).or_insert(0) += 1;
            *summary.by_severity.entry(finding.severity).or_insert(0) += 1;
        }
        summary
    }

    /// Findings grouped by source line
    pub fn by_line(&self) -> BTreeMap<usize, Vec<&Finding>> {
        let mut lines: BTreeMap<usize, Vec<&Finding>> = BTreeMap::new();
        for finding in &self.findings {
            lines.entry(finding.line_number).or_default().push(finding);
        }
        lines
    }

    pub fn findings_for(&self, check: CheckId) -> impl Iterator<Item = &Finding> {
        self.findings.iter().filter(move |f| f.check == check)
    }

    pub fn count_at_least(&self, severity: Severity) -> usize {
        self.findings
            .iter()
            .filter(|f| f.severity <= severity)
            .count()
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checks::FindingDetail;
    use crate::logging::codes;

    fn finding(line: usize, check: CheckId) -> Finding {
        Finding::new(
            line,
            check,
            check.code(),
            FindingDetail::MissingItem {
                set: "COMMODITY".to_string(),
                code: format!("X{}", line),
            },
        )
    }

    fn report(findings: Vec<Finding>) -> Report {
        let model = ParsedModel {
            base_year: Some(2020),
            ..ParsedModel::default()
        };
        Report::new("model.txt", &model, CheckId::ALL.to_vec(), findings)
    }

    #[test]
    fn test_ordering_by_catalog_then_line() {
        let report = report(vec![
            finding(9, CheckId::Range),
            finding(3, CheckId::AbruptChange),
            finding(2, CheckId::Range),
            finding(5, CheckId::ZeroAfterNonZero),
        ]);

        let order: Vec<(CheckId, usize)> = report
            .findings
            .iter()
            .map(|f| (f.check, f.line_number))
            .collect();
        assert_eq!(
            order,
            vec![
                (CheckId::ZeroAfterNonZero, 5),
                (CheckId::Range, 2),
                (CheckId::Range, 9),
                (CheckId::AbruptChange, 3),
            ]
        );
    }

    #[test]
    fn test_summary_and_by_line() {
        let report = report(vec![
            finding(4, CheckId::Range),
            finding(4, CheckId::AbruptChange),
            finding(6, CheckId::Range),
        ]);

        let summary = report.summary();
        assert_eq!(summary.total, 3);
        assert_eq!(summary.by_check[&CheckId::Range], 2);
        assert_eq!(summary.by_severity[&Severity::High], 2);
        assert_eq!(summary.by_severity[&Severity::Low], 1);

        let lines = report.by_line();
        assert_eq!(lines[&4].len(), 2);
        assert_eq!(report.findings_for(CheckId::Range).count(), 2);
        assert_eq!(report.count_at_least(Severity::High), 2);
        assert!(!report.is_clean());
    }

    #[test]
    fn test_json_shape() {
        let report = report(vec![finding(4, CheckId::Range)]);
        let json: serde_json::Value = serde_json::from_str(&report.to_json().unwrap()).unwrap();

        assert_eq!(json["source"], "model.txt");
        assert_eq!(json["base_year"], 2020);
        assert_eq!(json["findings"][0]["check"], "range");
        assert_eq!(json["findings"][0]["code"], codes::checks::VALUE_OUT_OF_RANGE.as_str());
        assert_eq!(json["findings"][0]["severity"], "High");
    }
}

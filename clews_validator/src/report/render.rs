//! Human-readable report rendering
use super::Report;
use crate::logging::Severity;

/// Plain text, one heading per check run
pub fn render_text(report: &Report) -> String {
    let mut output = String::new();

    output.push_str(&format!("Validation report for {}\n", report.source));
    output.push_str(&format!(
        "Base year: {} | records: {} | checks: {}\n\n",
        report
            .base_year
            .map(|year| year.to_string())
            .unwrap_or_else(|| "none".to_string()),
        report.record_count,
        report.checks_run.len()
    ));

    if report.is_clean() {
        output.push_str("No issues found\n");
        return output;
    }

    for check in &report.checks_run {
        let findings: Vec<_> = report.findings_for(*check).collect();
        if findings.is_empty() {
            output.push_str(&format!("{} ({}): ok\n", check.title(), check));
            continue;
        }

        output.push_str(&format!(
            "{} ({}): {} finding{}\n",
            check.title(),
            check,
            findings.len(),
            if findings.len() == 1 { "" } else { "s" }
        ));
        for finding in findings {
            output.push_str(&format!("  {}\n", finding));
        }
    }

    output.push('\n');
    output.push_str(&summary_line(report));
    output
}

/// `warning[CODE]: message` blocks pointing at `file:line:1`
pub fn render_cargo_style(report: &Report) -> String {
    let mut output = String::new();

    for finding in &report.findings {
        let label = if finding.severity <= Severity::High {
            "error"
        } else {
            "warning"
        };
        output.push_str(&format!("{}[{}]: {}\n", label, finding.code, finding.detail));

        if finding.is_file_level() {
            output.push_str(&format!("  --> {}\n", report.source));
        } else {
            output.push_str(&format!("  --> {}:{}:1\n", report.source, finding.line_number));
        }
        output.push_str(&format!("  = help: {}\n\n", finding.help()));
    }

    output.push_str(&summary_line(report));
    output
}

fn summary_line(report: &Report) -> String {
    if report.is_clean() {
        return format!("{}: no issues found\n", report.source);
    }

    let summary = report.summary();
    let by_severity: Vec<String> = summary
        .by_severity
        .iter()
        .map(|(severity, count)| format!("{} {}", count, severity.as_str().to_lowercase()))
        .collect();

    format!(
        "{}: {} finding{} ({})\n",
        report.source,
        summary.total,
        if summary.total == 1 { "" } else { "s" },
        by_severity.join(", ")
    )
}

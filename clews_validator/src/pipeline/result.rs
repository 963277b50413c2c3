use super::stats::PipelineStats;
use crate::report::Report;

/// Report of one validation run plus stage timings
#[derive(Debug, Clone)]
pub struct PipelineResult {
    pub report: Report,
    pub stats: PipelineStats,
}

impl PipelineResult {
    pub fn new(report: Report, stats: PipelineStats) -> Self {
        Self { report, stats }
    }

    pub fn log_success(&self) {
        crate::log_success!(
            crate::logging::codes::success::VALIDATION_COMPLETE,
            "Validation complete",
            "source" => self.report.source,
            "records" => self.report.record_count,
            "findings" => self.report.findings.len(),
            "duration_ms" => format!("{:.2}", self.stats.total_duration().as_secs_f64() * 1000.0),
            "records_per_sec" => format!("{:.0}", self.stats.records_per_second())
        );
    }
}

use crate::classify::ClassificationMetrics;
use std::time::Duration;

/// Per-run processing statistics
#[derive(Debug, Clone, Default)]
pub struct PipelineStats {
    /// Bytes read from disk; `None` for in-memory sources
    pub file_size: Option<u64>,
    pub lines: ClassificationMetrics,
    pub record_count: usize,
    pub key_block_count: usize,
    pub finding_count: usize,
    pub read_duration: Duration,
    pub parse_duration: Duration,
    pub check_duration: Duration,
}

impl PipelineStats {
    pub fn total_duration(&self) -> Duration {
        self.read_duration + self.parse_duration + self.check_duration
    }

    pub fn records_per_second(&self) -> f64 {
        let seconds = self.total_duration().as_secs_f64();
        if seconds > 0.0 {
            self.record_count as f64 / seconds
        } else {
            0.0
        }
    }
}

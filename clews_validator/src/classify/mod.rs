//! Line classification for CLEWs/OSeMOSYS data files
//!
//! Turns raw text into a stream of [`ClassifiedLine`]s. Line numbers stay 1:1
//! with the physical file, including comments and blank lines.

pub mod classifier;
pub mod line;

pub use classifier::{classify_line, ClassificationMetrics, LineClassifier};
pub use line::{is_year_token, ClassifiedLine, LineKind, NumericToken};

/// Classify a whole source text with a fresh classifier
pub fn classify_source(source: &str) -> Vec<ClassifiedLine> {
    LineClassifier::new().classify_source(source)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_module_api() {
        let lines = classify_source("set YEAR := 2020;\nparam CapitalCost :=\n");
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[1].kind.name(), "param_declaration");
    }
}

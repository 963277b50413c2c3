//! Line classifier for the model data format
//!
//! Classification is total: every physical line maps to exactly one
//! [`LineKind`], and anything unrecognized falls through to `DataRow`.
use super::line::{ClassifiedLine, LineKind, NumericToken};
use crate::log_debug;
use regex::Regex;
use std::sync::OnceLock;

static FIRST_INTEGER: OnceLock<Regex> = OnceLock::new();

fn first_integer() -> &'static Regex {
    FIRST_INTEGER.get_or_init(|| Regex::new(r"\d+").expect("integer pattern is valid"))
}

/// Strip `:=`, `:` and `;` decorations from a declared name or member
fn strip_decorations(token: &str) -> &str {
    token.trim_end_matches(&[';', ':', '='][..])
}

/// Counts of each line kind from the last classified source
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassificationMetrics {
    pub total_lines: usize,
    pub comments: usize,
    pub blanks: usize,
    pub set_declarations: usize,
    pub param_declarations: usize,
    pub key_headers: usize,
    pub column_headers: usize,
    pub section_ends: usize,
    pub data_rows: usize,
}

impl ClassificationMetrics {
    fn record(&mut self, kind: &LineKind) {
        self.total_lines += 1;
        match kind {
            LineKind::Comment => self.comments += 1,
            LineKind::Blank => self.blanks += 1,
            LineKind::SetDeclaration { .. } => self.set_declarations += 1,
            LineKind::ParamDeclaration { .. } => self.param_declarations += 1,
            LineKind::KeyHeader { .. } => self.key_headers += 1,
            LineKind::ColumnHeader { .. } => self.column_headers += 1,
            LineKind::SectionEnd => self.section_ends += 1,
            LineKind::DataRow { .. } => self.data_rows += 1,
        }
    }
}

#[derive(Debug, Default)]
pub struct LineClassifier {
    metrics: ClassificationMetrics,
}

impl LineClassifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn metrics(&self) -> &ClassificationMetrics {
        &self.metrics
    }

    /// Classify every line of `source`, numbering from 1
    pub fn classify_source(&mut self, source: &str) -> Vec<ClassifiedLine> {
        self.metrics = ClassificationMetrics::default();

        let lines: Vec<ClassifiedLine> = source
            .lines()
            .enumerate()
            .map(|(index, line)| {
                let kind = classify_line(line);
                self.metrics.record(&kind);
                ClassifiedLine {
                    line_number: index + 1,
                    kind,
                }
            })
            .collect();

        log_debug!("Line classification complete",
            "lines" => self.metrics.total_lines,
            "data_rows" => self.metrics.data_rows,
            "key_headers" => self.metrics.key_headers,
            "params" => self.metrics.param_declarations);

        lines
    }
}

/// Classify one physical line (trailing newline already removed)
pub fn classify_line(line: &str) -> LineKind {
    let trimmed = line.trim();

    if trimmed.is_empty() {
        return LineKind::Blank;
    }
    if trimmed.starts_with('*') || trimmed.starts_with('#') {
        return LineKind::Comment;
    }
    if trimmed == ";" {
        return LineKind::SectionEnd;
    }
    if trimmed.starts_with('[') {
        return classify_key_header(trimmed);
    }

    let mut tokens = trimmed.split_whitespace();
    match tokens.next() {
        Some("set") => {
            if let Some(name) = tokens.next().map(strip_decorations).filter(|n| !n.is_empty()) {
                return classify_set(trimmed, name, tokens);
            }
        }
        Some("param") => {
            if let Some(name) = tokens.next().map(strip_decorations).filter(|n| !n.is_empty()) {
                return LineKind::ParamDeclaration {
                    name: name.to_string(),
                };
            }
        }
        _ => {}
    }

    if is_column_header(trimmed) {
        return LineKind::ColumnHeader {
            labels: trimmed
                .split_whitespace()
                .map(strip_decorations)
                .filter(|label| !label.is_empty())
                .map(str::to_string)
                .collect(),
        };
    }

    classify_data_row(trimmed)
}

fn classify_set<'a>(
    trimmed: &str,
    name: &str,
    rest: impl Iterator<Item = &'a str>,
) -> LineKind {
    let members = rest
        .map(strip_decorations)
        .filter(|member| !member.is_empty())
        .map(str::to_string)
        .collect();

    let base_year = if trimmed.starts_with("set YEAR") {
        first_integer()
            .find(trimmed)
            .and_then(|m| m.as_str().parse::<i32>().ok())
    } else {
        None
    };

    LineKind::SetDeclaration {
        name: name.to_string(),
        members,
        base_year,
        closed: trimmed.ends_with(';'),
    }
}

fn classify_key_header(trimmed: &str) -> LineKind {
    let inner = &trimmed[1..];
    let inner = match inner.find(']') {
        Some(end) => &inner[..end],
        None => inner,
    };

    LineKind::KeyHeader {
        fields: inner.split(',').map(|f| f.trim().to_string()).collect(),
    }
}

/// `: 2015 2016 :=` or `2015 2016 2017 :=` column label rows
fn is_column_header(trimmed: &str) -> bool {
    trimmed.starts_with(':') || trimmed.ends_with(":=")
}

fn classify_data_row(trimmed: &str) -> LineKind {
    let terminates = trimmed.ends_with(';');
    let mut key_fields = Vec::new();
    let mut values = Vec::new();

    for token in trimmed
        .split_whitespace()
        .map(|t| t.trim_end_matches(';'))
        .filter(|t| !t.is_empty())
    {
        match NumericToken::parse(token) {
            Some(numeric) => values.push(numeric),
            // Non-numeric tokens count as key fields only before the first value
            None if values.is_empty() => key_fields.push(token.to_string()),
            None => {}
        }
    }

    LineKind::DataRow {
        key_fields,
        values,
        terminates,
    }
}

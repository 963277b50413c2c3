//! Classified line types
use crate::config::compile_time::model::{MAX_MODEL_YEAR, MIN_MODEL_YEAR};
use serde::Serialize;

/// A numeric token with the text it was parsed from
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NumericToken {
    pub raw: String,
    pub value: f64,
}

impl NumericToken {
    pub fn parse(raw: &str) -> Option<Self> {
        let value = raw.parse::<f64>().ok().filter(|v| v.is_finite())?;
        Some(Self {
            raw: raw.to_string(),
            value,
        })
    }

    /// True when the token is a calendar year marker rather than a value
    pub fn is_year_token(&self) -> bool {
        is_year_token(&self.raw)
    }
}

/// An integer token within the model's calendar range
pub fn is_year_token(token: &str) -> bool {
    token
        .parse::<i64>()
        .map(|year| (MIN_MODEL_YEAR as i64..=MAX_MODEL_YEAR as i64).contains(&year))
        .unwrap_or(false)
}

/// The kind of a single physical line
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LineKind {
    /// `*` or `#` prefixed
    Comment,
    Blank,
    /// `set NAME := members...`; `closed` when the line carries the final `;`
    SetDeclaration {
        name: String,
        members: Vec<String>,
        base_year: Option<i32>,
        closed: bool,
    },
    ParamDeclaration {
        name: String,
    },
    /// `[f0,f1,f2,...]:` bracketed key
    KeyHeader {
        fields: Vec<String>,
    },
    /// Column labels of a tabular block, e.g. `2015 2016 2017 :=`
    ColumnHeader {
        labels: Vec<String>,
    },
    /// A line holding only `;`
    SectionEnd,
    DataRow {
        key_fields: Vec<String>,
        values: Vec<NumericToken>,
        terminates: bool,
    },
}

impl LineKind {
    /// Position 0 of a key header
    pub fn mode(&self) -> Option<&str> {
        self.header_field(0)
    }

    /// Position 1 of a key header
    pub fn technology(&self) -> Option<&str> {
        self.header_field(1)
    }

    /// Position 2 of a key header; absent when the header has fewer fields
    pub fn commodity(&self) -> Option<&str> {
        self.header_field(2)
    }

    fn header_field(&self, index: usize) -> Option<&str> {
        match self {
            LineKind::KeyHeader { fields } => fields.get(index).map(String::as_str),
            _ => None,
        }
    }

    /// Lines that carry no data
    pub fn is_ignorable(&self) -> bool {
        matches!(self, LineKind::Comment | LineKind::Blank)
    }

    pub fn name(&self) -> &'static str {
        match self {
            LineKind::Comment => "comment",
            LineKind::Blank => "blank",
            LineKind::SetDeclaration { .. } => "set_declaration",
            LineKind::ParamDeclaration { .. } => "param_declaration",
            LineKind::KeyHeader { .. } => "key_header",
            LineKind::ColumnHeader { .. } => "column_header",
            LineKind::SectionEnd => "section_end",
            LineKind::DataRow { .. } => "data_row",
        }
    }
}

/// A line tagged with its 1-based physical line number
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassifiedLine {
    pub line_number: usize,
    pub kind: LineKind,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_year_tokens() {
        assert!(is_year_token("2015"));
        assert!(is_year_token("2070"));
        assert!(!is_year_token("2014"));
        assert!(!is_year_token("2071"));
        assert!(!is_year_token("2020.0"));
        assert!(!is_year_token("PWRBIO"));
    }

    #[test]
    fn test_numeric_token_rejects_non_finite() {
        assert!(NumericToken::parse("inf").is_none());
        assert!(NumericToken::parse("NaN").is_none());
        assert_eq!(NumericToken::parse("-1.5e2").map(|t| t.value), Some(-150.0));
    }

    #[test]
    fn test_header_accessors() {
        let header = LineKind::KeyHeader {
            fields: vec!["RE1".into(), "PWRBIO".into()],
        };
        assert_eq!(header.mode(), Some("RE1"));
        assert_eq!(header.technology(), Some("PWRBIO"));
        assert_eq!(header.commodity(), None);
        assert_eq!(LineKind::Blank.technology(), None);
    }
}

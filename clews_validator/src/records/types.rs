//! Canonical record model shared by every check
use serde::Serialize;
use std::collections::BTreeMap;

/// One value of a series, aligned to its calendar year
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct YearValue {
    pub year: i32,
    pub value: f64,
    /// Token text as written in the file
    pub raw: String,
}

/// One parsed data row inside a `param` section
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Record {
    /// 1-based physical line number
    pub line_number: usize,
    pub parameter: String,
    pub mode: Option<String>,
    pub technology: Option<String>,
    pub commodity: Option<String>,
    /// Non-numeric tokens before the first value
    pub key_fields: Vec<String>,
    pub series: Vec<YearValue>,
}

impl Record {
    pub fn values(&self) -> impl Iterator<Item = f64> + '_ {
        self.series.iter().map(|point| point.value)
    }

    pub fn year_at(&self, index: usize) -> Option<i32> {
        self.series.get(index).map(|point| point.year)
    }

    /// Technology for reporting: header field unless it is a `*` wildcard,
    /// otherwise the first inline key field
    pub fn technology_label(&self) -> Option<&str> {
        concrete(self.technology.as_deref()).or_else(|| self.key_fields.first().map(String::as_str))
    }

    /// Mode for reporting: header field, otherwise the second inline key field
    pub fn mode_label(&self) -> Option<&str> {
        concrete(self.mode.as_deref()).or_else(|| self.key_fields.get(1).map(String::as_str))
    }
}

fn concrete(field: Option<&str>) -> Option<&str> {
    field.filter(|value| *value != "*" && !value.is_empty())
}

/// A bracketed key header seen inside a `param` section
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KeyBlock {
    pub line_number: usize,
    pub parameter: String,
    pub fields: Vec<String>,
}

impl KeyBlock {
    pub fn mode(&self) -> Option<&str> {
        self.fields.get(0).map(String::as_str)
    }

    pub fn technology(&self) -> Option<&str> {
        self.fields.get(1).map(String::as_str)
    }

    pub fn commodity(&self) -> Option<&str> {
        self.fields.get(2).map(String::as_str)
    }
}

/// A `set` declaration with all of its members
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeclaredSet {
    pub name: String,
    /// Line of the `set` keyword
    pub line_number: usize,
    pub members: Vec<String>,
}

impl DeclaredSet {
    pub fn contains(&self, code: &str) -> bool {
        self.members.iter().any(|member| member == code)
    }
}

/// Everything the record builder recovers from one file
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ParsedModel {
    pub base_year: Option<i32>,
    pub records: Vec<Record>,
    pub key_blocks: Vec<KeyBlock>,
    pub sets: BTreeMap<String, DeclaredSet>,
    pub line_count: usize,
}

impl ParsedModel {
    pub fn records_for<'a>(&'a self, parameter: &'a str) -> impl Iterator<Item = &'a Record> + 'a {
        self.records
            .iter()
            .filter(move |record| record.parameter == parameter)
    }

    pub fn set(&self, name: &str) -> Option<&DeclaredSet> {
        self.sets.get(name)
    }

    /// Distinct parameter names in file order
    pub fn parameters(&self) -> Vec<&str> {
        let mut seen: Vec<&str> = Vec::new();
        for record in &self.records {
            if !seen.contains(&record.parameter.as_str()) {
                seen.push(&record.parameter);
            }
        }
        seen
    }
}

//! Folds classified lines into records
//!
//! Section state (current parameter, current key header, base year) is scoped
//! to a single pass. Flat sections and keyed sections go through the same path,
//! so checks never need to know which layout a file used.
use super::error::RecordError;
use super::types::{DeclaredSet, KeyBlock, ParsedModel, Record, YearValue};
use crate::classify::{
    ClassificationMetrics, ClassifiedLine, LineClassifier, LineKind, NumericToken,
};
use crate::config::compile_time::model::{MAX_MODEL_YEAR, MIN_MODEL_YEAR};
use crate::logging::codes;
use crate::utils::SourceMap;
use crate::{log_debug, log_error, log_success};

/// Name of the set whose first member anchors every series
const YEAR_SET: &str = "YEAR";

#[derive(Debug, Default)]
struct SectionState {
    parameter: Option<String>,
    header: Option<Vec<String>>,
}

impl SectionState {
    fn reset(&mut self) {
        self.parameter = None;
        self.header = None;
    }

    fn header_field(&self, index: usize) -> Option<String> {
        self.header.as_ref().and_then(|fields| fields.get(index).cloned())
    }
}

/// A `set` declaration still waiting for its closing `;`
#[derive(Debug)]
struct OpenSet {
    name: String,
    /// Set when this is `set YEAR` and no year has been seen yet
    awaiting_year: Option<usize>,
}

#[derive(Debug, Default)]
pub struct RecordBuilder {
    classifier: LineClassifier,
    section: SectionState,
    open_set: Option<OpenSet>,
    model: ParsedModel,
}

impl RecordBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn classification_metrics(&self) -> &ClassificationMetrics {
        self.classifier.metrics()
    }

    /// Classify and build records from a whole source text
    pub fn build(&mut self, source: &str) -> Result<ParsedModel, RecordError> {
        let lines = self.classifier.classify_source(source);

        self.build_lines(&lines).map_err(|error| {
            let source_map = SourceMap::new(source);
            let span = error.line().and_then(|line| source_map.span_of_line(line));
            match span {
                Some(span) => {
                    log_error!(error.error_code(), &error.to_string(), span = span)
                }
                None => log_error!(error.error_code(), &error.to_string()),
            }
            error
        })
    }

    /// Build records from lines that were already classified
    pub fn build_lines(&mut self, lines: &[ClassifiedLine]) -> Result<ParsedModel, RecordError> {
        self.section.reset();
        self.open_set = None;
        self.model = ParsedModel {
            line_count: lines.len(),
            ..ParsedModel::default()
        };

        if lines.iter().all(|line| line.kind.is_ignorable()) {
            return Err(RecordError::EmptyInput);
        }

        for line in lines {
            self.fold(line)?;
        }
        self.close_set()?;

        let model = std::mem::take(&mut self.model);

        log_success!(
            codes::success::RECORD_BUILD_COMPLETE,
            "Record building complete",
            "records" => model.records.len(),
            "key_blocks" => model.key_blocks.len(),
            "sets" => model.sets.len(),
            "base_year" => model.base_year.map(|y| y.to_string()).unwrap_or_else(|| "none".to_string())
        );

        Ok(model)
    }

    fn fold(&mut self, line: &ClassifiedLine) -> Result<(), RecordError> {
        let line_number = line.line_number;

        match &line.kind {
            LineKind::Comment | LineKind::Blank => {}

            LineKind::SetDeclaration {
                name,
                members,
                base_year,
                closed,
            } => {
                self.close_set()?;
                self.section.reset();
                self.declare_set(name, line_number, members.iter().cloned());

                if let Some(year) = base_year {
                    self.model.base_year = Some(checked_base_year(*year, line_number)?);
                }

                let awaiting_year = if name == YEAR_SET && base_year.is_none() {
                    Some(line_number)
                } else {
                    None
                };

                if *closed {
                    if let Some(line) = awaiting_year {
                        return Err(RecordError::InvalidYearDeclaration { line });
                    }
                } else {
                    self.open_set = Some(OpenSet {
                        name: name.clone(),
                        awaiting_year,
                    });
                }
            }

            LineKind::ParamDeclaration { name } => {
                self.close_set()?;
                self.section.parameter = Some(name.clone());
                self.section.header = None;
                log_debug!("Entering parameter section", "parameter" => name, "line" => line_number);
            }

            LineKind::KeyHeader { fields } => {
                self.close_set()?;
                if let Some(parameter) = &self.section.parameter {
                    self.model.key_blocks.push(KeyBlock {
                        line_number,
                        parameter: parameter.clone(),
                        fields: fields.clone(),
                    });
                    self.section.header = Some(fields.clone());
                }
            }

            LineKind::ColumnHeader { .. } => {}

            LineKind::SectionEnd => {
                self.close_set()?;
                self.section.reset();
            }

            LineKind::DataRow {
                key_fields,
                values,
                terminates,
            } => {
                if self.open_set.is_some() {
                    self.extend_open_set(line_number, key_fields, values)?;
                    if *terminates {
                        self.close_set()?;
                    }
                    return Ok(());
                }

                if let Some(parameter) = self.section.parameter.clone() {
                    self.push_record(line_number, parameter, key_fields, values)?;
                    if *terminates {
                        self.section.reset();
                    }
                }
            }
        }

        Ok(())
    }

    fn push_record(
        &mut self,
        line_number: usize,
        parameter: String,
        key_fields: &[String],
        values: &[NumericToken],
    ) -> Result<(), RecordError> {
        let series = if values.is_empty() {
            Vec::new()
        } else {
            let base_year = self
                .model
                .base_year
                .ok_or(RecordError::MissingBaseYear { line: line_number })?;
            let mut series = Vec::with_capacity(values.len());
            for (offset, token) in values.iter().enumerate() {
                let year = i32::try_from(offset)
                    .ok()
                    .and_then(|offset| base_year.checked_add(offset))
                    .ok_or(RecordError::BaseYearOutOfRange {
                        line: line_number,
                        year: base_year,
                    })?;
                series.push(YearValue {
                    year,
                    value: token.value,
                    raw: token.raw.clone(),
                });
            }
            series
        };

        self.model.records.push(Record {
            line_number,
            parameter,
            mode: self.section.header_field(0),
            technology: self.section.header_field(1),
            commodity: self.section.header_field(2),
            key_fields: key_fields.to_vec(),
            series,
        });

        Ok(())
    }

    fn declare_set(
        &mut self,
        name: &str,
        line_number: usize,
        members: impl IntoIterator<Item = String>,
    ) {
        self.model
            .sets
            .entry(name.to_string())
            .or_insert_with(|| DeclaredSet {
                name: name.to_string(),
                line_number,
                members: Vec::new(),
            })
            .members
            .extend(members);
    }

    fn extend_open_set(
        &mut self,
        line_number: usize,
        key_fields: &[String],
        values: &[NumericToken],
    ) -> Result<(), RecordError> {
        let Some(open) = self.open_set.as_mut() else {
            return Ok(());
        };

        if open.awaiting_year.is_some() {
            if let Some(year) = values.iter().find_map(|v| v.raw.parse::<i32>().ok()) {
                self.model.base_year = Some(checked_base_year(year, line_number)?);
                open.awaiting_year = None;
            }
        }

        let name = open.name.clone();
        let members = key_fields
            .iter()
            .cloned()
            .chain(values.iter().map(|v| v.raw.clone()));
        if let Some(set) = self.model.sets.get_mut(&name) {
            set.members.extend(members);
        }
        Ok(())
    }

    fn close_set(&mut self) -> Result<(), RecordError> {
        match self.open_set.take() {
            Some(OpenSet {
                awaiting_year: Some(line),
                ..
            }) => Err(RecordError::InvalidYearDeclaration { line }),
            _ => Ok(()),
        }
    }
}

/// Base years outside the model's calendar would push series years past `i32`
fn checked_base_year(year: i32, line: usize) -> Result<i32, RecordError> {
    if (MIN_MODEL_YEAR..=MAX_MODEL_YEAR).contains(&year) {
        Ok(year)
    } else {
        Err(RecordError::BaseYearOutOfRange { line, year })
    }
}

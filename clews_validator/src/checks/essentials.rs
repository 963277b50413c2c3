//! Required commodity and technology vocabulary check
use super::{CheckContext, CheckId, Finding, FindingDetail};
use crate::logging::codes::{self, Code};
use crate::records::ParsedModel;
use crate::tables::catalog::{
    COMMODITY_SET, REQUIRED_COMMODITIES, REQUIRED_TECHNOLOGIES, TECHNOLOGY_SET,
};

fn missing_from(model: &ParsedModel, set_name: &str, required: &[&str], code: Code) -> Vec<Finding> {
    let declared = model.set(set_name);
    // An absent declaration is a file-level problem, reported at line 0
    let line_number = declared.map(|set| set.line_number).unwrap_or(0);

    required
        .iter()
        .filter(|item| !declared.is_some_and(|set| set.contains(item)))
        .map(|item| {
            Finding::new(
                line_number,
                CheckId::EssentialItems,
                code,
                FindingDetail::MissingItem {
                    set: set_name.to_string(),
                    code: item.to_string(),
                },
            )
        })
        .collect()
}

/// Required codes absent from `set COMMODITY` and `set TECHNOLOGY`
pub fn missing_essentials(model: &ParsedModel, _ctx: &CheckContext) -> Vec<Finding> {
    let mut findings = missing_from(
        model,
        COMMODITY_SET,
        REQUIRED_COMMODITIES,
        codes::checks::MISSING_COMMODITY,
    );
    findings.extend(missing_from(
        model,
        TECHNOLOGY_SET,
        REQUIRED_TECHNOLOGIES,
        codes::checks::MISSING_TECHNOLOGY,
    ));
    findings
}

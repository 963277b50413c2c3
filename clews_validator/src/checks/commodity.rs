//! Technology to commodity mapping checks for activity ratio key headers
use super::{CheckContext, CheckId, Finding, FindingDetail};
use crate::logging::codes::{self, Code};
use crate::records::{KeyBlock, ParsedModel};
use crate::tables::catalog::{INPUT_ACTIVITY_RATIO, OUTPUT_ACTIVITY_RATIO};
use crate::tables::{MappingOutcome, RuleTable};

fn concrete(field: Option<&str>) -> Option<&str> {
    field.filter(|value| !value.is_empty() && *value != "*")
}

fn check_blocks(
    model: &ParsedModel,
    parameter: &str,
    rules: &RuleTable,
    check: CheckId,
    mismatch_code: Code,
) -> Vec<Finding> {
    model
        .key_blocks
        .iter()
        .filter(|block| block.parameter == parameter)
        .filter_map(|block| check_block(block, rules, check, mismatch_code))
        .collect()
}

fn check_block(
    block: &KeyBlock,
    rules: &RuleTable,
    check: CheckId,
    mismatch_code: Code,
) -> Option<Finding> {
    let technology = concrete(block.technology())?;
    let commodity = concrete(block.commodity())?;

    let (code, detail) = match rules.evaluate(technology, commodity) {
        MappingOutcome::Accepted => return None,
        MappingOutcome::Mismatch(expected) => (
            mismatch_code,
            FindingDetail::CommodityMismatch {
                parameter: block.parameter.clone(),
                technology: technology.to_string(),
                commodity: commodity.to_string(),
                expected: expected.to_string(),
            },
        ),
        MappingOutcome::NoRule => (
            codes::checks::UNEXPECTED_TECHNOLOGY,
            FindingDetail::UnexpectedTechnology {
                parameter: block.parameter.clone(),
                technology: technology.to_string(),
                commodity: commodity.to_string(),
            },
        ),
    };

    Some(Finding::new(block.line_number, check, code, detail))
}

/// Input side: `InputActivityRatio` headers against the input rule table
pub fn input_commodities(model: &ParsedModel, ctx: &CheckContext) -> Vec<Finding> {
    check_blocks(
        model,
        INPUT_ACTIVITY_RATIO,
        &ctx.tables.input_rules,
        CheckId::InputCommodity,
        codes::checks::INPUT_COMMODITY_MISMATCH,
    )
}

/// Output side: `OutputActivityRatio` headers against the output rule table
pub fn output_commodities(model: &ParsedModel, ctx: &CheckContext) -> Vec<Finding> {
    check_blocks(
        model,
        OUTPUT_ACTIVITY_RATIO,
        &ctx.tables.output_rules,
        CheckId::OutputCommodity,
        codes::checks::OUTPUT_COMMODITY_MISMATCH,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::build_records;
    use assert_matches::assert_matches;

    const SOURCE: &str = "\
set YEAR := 2020;
param InputActivityRatio default 0 :=
[RE1,PWRBIO,SOL,1,*]:
1 1
[RE1,PWRBIO,BIO,1,*]:
1 1
[RE1,XYZ123,ELC001,1,*]:
1 1
[RE1,*,*,*,*]:
;
param OutputActivityRatio default 0 :=
[RE1,PWRBIO,ELC001,1,*]:
1 1
[RE1,MINPRC,WTREVT,1,*]:
1 1
;
";

    #[test]
    fn test_input_mismatch_and_unexpected_are_distinct() {
        let model = build_records(SOURCE).unwrap();
        let findings = input_commodities(&model, &CheckContext::builtin().unwrap());

        assert_eq!(findings.len(), 2);

        assert_eq!(findings[0].line_number, 3);
        assert_eq!(findings[0].code, codes::checks::INPUT_COMMODITY_MISMATCH);
        assert_matches!(
            &findings[0].detail,
            FindingDetail::CommodityMismatch { technology, commodity, expected, .. }
                if technology == "PWRBIO" && commodity == "SOL" && expected == "BIO"
        );

        assert_eq!(findings[1].line_number, 7);
        assert_eq!(findings[1].code, codes::checks::UNEXPECTED_TECHNOLOGY);
        assert_matches!(&findings[1].detail, FindingDetail::UnexpectedTechnology { .. });
        assert_ne!(findings[0].severity, findings[1].severity);
    }

    #[test]
    fn test_output_side() {
        let model = build_records(SOURCE).unwrap();
        let findings = output_commodities(&model, &CheckContext::builtin().unwrap());

        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].line_number, 14);
        assert_eq!(findings[0].check, CheckId::OutputCommodity);
        assert_eq!(findings[0].code, codes::checks::OUTPUT_COMMODITY_MISMATCH);
    }

    #[test]
    fn test_header_without_rows_is_still_checked() {
        let model = build_records(
            "set YEAR := 2020;\nparam InputActivityRatio :=\n[RE1,PWRCOA,BIO,1,*]:\n;\n",
        )
        .unwrap();
        assert_eq!(input_commodities(&model, &CheckContext::builtin().unwrap()).len(), 1);
    }
}

//! Built-in CLEWs reference data: parameter groups, required vocabulary and
//! the input/output commodity rule tables.
use super::rules::{Expectation, Rule, RuleTable};
use super::TableError;

pub const INPUT_ACTIVITY_RATIO: &str = "InputActivityRatio";
pub const OUTPUT_ACTIVITY_RATIO: &str = "OutputActivityRatio";

pub const ACTIVITY_RATIO_PARAMETERS: &[&str] = &[INPUT_ACTIVITY_RATIO, OUTPUT_ACTIVITY_RATIO];

/// Parameters checked for abrupt year-on-year changes
pub const VOLATILE_PARAMETERS: &[&str] = &[
    "CapitalCost",
    "FixedCost",
    "VariableCost",
    "CapacityFactors",
    "DiscountRate",
    "EmissionActivityRatio",
    "YearSplit",
    "SpecifiedAnnualDemand",
    "SpecifiedDemandProfile",
    INPUT_ACTIVITY_RATIO,
    OUTPUT_ACTIVITY_RATIO,
    "AccumulatedAnnualDemand",
    "TotalTechnologyAnnualActivityLowerLimit",
    "TotalTechnologyAnnualActivityUpperLimit",
];

/// Parameters checked for repeated values within a row
pub const DUPLICATE_WATCH_PARAMETERS: &[&str] =
    &["AccumulatedAnnualDemand", "SpecifiedAnnualDemand"];

/// Parameter name prefixes where a drop to zero is legitimate
pub const ZERO_TRANSITION_EXEMPT_PREFIXES: &[&str] = &[
    "ResidualCapacity",
    "TechnologyActivityByModeLowerLimit",
    "TechnologyActivityByModeUpperLimit",
    "TechnologyActivityIncreaseByModeLimit",
    "TechnologyActivityDecreaseByModeLimit",
    INPUT_ACTIVITY_RATIO,
    OUTPUT_ACTIVITY_RATIO,
];

pub const COMMODITY_SET: &str = "COMMODITY";
pub const TECHNOLOGY_SET: &str = "TECHNOLOGY";

pub const REQUIRED_COMMODITIES: &[&str] = &[
    "BIO", "ELC001", "ELC002", "LFOR", "LBLT", "LWAT", "LOTH", "WTRPRC", "AGRWAT", "WTREVT",
    "WTRGWT", "WTRSUR", "PUBWAT", "PWRWAT", "AGRDSL", "TRABIO", "PVR",
];

pub const REQUIRED_TECHNOLOGIES: &[&str] = &[
    "MINLND",
    "LNDFOR",
    "LNDBLT",
    "LNDWAT",
    "LNDOTH",
    "MINPRC",
    "DEMAGRSURWAT",
    "DEMAGRGWTWAT",
    "DEMPUBSURWAT",
    "DEMPUBGWTWAT",
    "DEMPWRSURWAT",
    "DEMPWRGWTWAT",
    "DEMAGRDSL",
    "DEMTRABIO",
];

const WATER_OUTFLOWS: &[&str] = &["WTREVT", "WTRGWT", "WTRSUR"];

fn crop_code(_technology: &str, commodity: &str) -> bool {
    commodity.starts_with("CRP") && commodity.len() == 6
}

fn imported_crop(technology: &str, commodity: &str) -> bool {
    commodity.starts_with("CRP") && technology.get(3..) == commodity.get(3..)
}

fn water_outflow_or_crop(_technology: &str, commodity: &str) -> bool {
    WATER_OUTFLOWS.contains(&commodity) || commodity.starts_with("CRP")
}

/// Commodities a technology may consume (`InputActivityRatio`)
pub fn input_rules() -> Result<RuleTable, TableError> {
    let mut table = RuleTable::new("input")
        .with(Rule::compound(
            "PWR",
            vec![
                ("BIO", Expectation::scalar("BIO")),
                ("TRN", Expectation::scalar("ELC001")),
                ("OHC", Expectation::one_of(&["OIL", "PWRWAT"])),
                ("SOL", Expectation::scalar("SOL")),
                ("PVR", Expectation::scalar("PVR")),
                ("HYD", Expectation::scalar("HYD")),
                ("COA", Expectation::one_of(&["COA", "PWRWAT"])),
                ("WND", Expectation::scalar("WND")),
            ],
            None,
        ))
        .with(Rule::glob(
            "LND*HR",
            Expectation::one_of(&["LND", "WTRPRC", "AGRDSL"]),
        )?)
        .with(Rule::glob(
            "LND*HI",
            Expectation::one_of(&["LND", "WTRPRC", "AGRWAT", "AGRDSL"]),
        )?)
        .with(Rule::exact(
            "DEMTRABIO",
            Expectation::predicate("a CRP commodity code of length 6", crop_code),
        ));

    for land in ["LNDFOR", "LNDBLT", "LNDWAT", "LNDOTH"] {
        table = table.with(Rule::exact(land, Expectation::one_of(&["LND", "WTRPRC"])));
    }
    for sector in ["AGR", "PUB", "PWR"] {
        table = table
            .with(Rule::exact(
                &format!("DEM{}SURWAT", sector),
                Expectation::one_of(&["ELC002", "WTRSUR"]),
            ))
            .with(Rule::exact(
                &format!("DEM{}GWTWAT", sector),
                Expectation::one_of(&["ELC002", "WTRGWT"]),
            ));
    }
    Ok(table)
}

/// Commodities a technology may produce (`OutputActivityRatio`)
pub fn output_rules() -> Result<RuleTable, TableError> {
    let land_use = |land: &str| {
        let mut codes = vec![land];
        codes.extend_from_slice(WATER_OUTFLOWS);
        Expectation::one_of(&codes)
    };

    Ok(RuleTable::new("output")
        .with(Rule::exact("MINSOL", Expectation::one_of(&["SOL", "PVR"])))
        .with(Rule::exact("MINPRC", Expectation::scalar("WTRPRC")))
        .with(Rule::exact("DEMAGRSURWAT", Expectation::scalar("AGRWAT")))
        .with(Rule::exact("DEMAGRGWTWAT", Expectation::scalar("AGRWAT")))
        .with(Rule::exact("DEMAGRDSL", Expectation::scalar("AGRDSL")))
        .with(Rule::exact("DEMTRABIO", Expectation::scalar("TRABIO")))
        .with(Rule::glob("DEMPUB*WAT", Expectation::scalar("PUBWAT"))?)
        .with(Rule::glob("DEMPWR*WAT", Expectation::scalar("PWRWAT"))?)
        .with(Rule::glob(
            "IMP???",
            Expectation::predicate("CRP followed by the technology suffix", imported_crop),
        )?)
        .with(Rule::glob(
            "LND*HR",
            Expectation::predicate(
                "one of WTREVT, WTRGWT, WTRSUR or a CRP commodity",
                water_outflow_or_crop,
            ),
        )?)
        .with(Rule::glob(
            "LND*HI",
            Expectation::predicate(
                "one of WTREVT, WTRGWT, WTRSUR or a CRP commodity",
                water_outflow_or_crop,
            ),
        )?)
        .with(Rule::compound(
            "MIN",
            vec![
                ("BIO", Expectation::scalar("BIO")),
                ("OIL", Expectation::scalar("OIL")),
                ("SOL", Expectation::scalar("SOL")),
                ("HYD", Expectation::scalar("HYD")),
                ("COA", Expectation::scalar("COA")),
                ("WND", Expectation::scalar("WND")),
                ("LND", Expectation::scalar("LND")),
                ("PRC", Expectation::scalar("WTRPRC")),
            ],
            None,
        ))
        .with(Rule::compound(
            "PWR",
            vec![
                ("BIO", Expectation::scalar("ELC001")),
                ("OHC", Expectation::scalar("ELC001")),
                ("SOL", Expectation::scalar("ELC001")),
                ("HYD", Expectation::scalar("ELC001")),
                ("COA", Expectation::scalar("ELC001")),
                ("WND", Expectation::scalar("ELC001")),
                ("TRN", Expectation::scalar("ELC002")),
                ("PVR", Expectation::scalar("ELC002")),
            ],
            None,
        ))
        .with(Rule::compound(
            "LND",
            vec![
                ("FOR", land_use("LFOR")),
                ("BLT", land_use("LBLT")),
                ("WAT", land_use("LWAT")),
                ("OTH", land_use("LOTH")),
            ],
            Some(Expectation::one_of(WATER_OUTFLOWS)),
        )))
}

use std::collections::BTreeMap;

use super::baseline::{
    Baseline, CapitalProject, Department, Projection, ReserveCategory, ReserveFund, RevenueStream,
    TransferProgram,
};
use super::types::Figure;

fn stream(key: &str, amount: f64, rate: Option<f64>) -> RevenueStream {
    RevenueStream {
        key: key.to_string(),
        label: key.replace('_', " "),
        amount: Figure::sourced(amount),
        rate,
    }
}

fn department(code: &str, gross: f64, income: f64, employee_costs: f64) -> Department {
    Department {
        code: code.to_string(),
        name: code.to_string(),
        gross_expenditure: Figure::sourced(gross),
        income: Figure::sourced(income),
        net_expenditure: gross - income,
        employee_costs: Figure::sourced(employee_costs),
    }
}

fn project(key: &str, dept: &str, amount: f64, rolling: bool) -> CapitalProject {
    CapitalProject {
        key: key.to_string(),
        label: key.replace('_', " "),
        department: dept.to_string(),
        annual_amount: Figure::sourced(amount),
        rolling,
    }
}

// Mirrors the shipped data/ documents: total revenue 1,389,024,000 and the
// concrete figures the engine tests assert against.
pub(crate) fn fixture_baseline() -> Baseline {
    Baseline {
        fiscal_year: "2025-26".to_string(),
        revenue_streams: vec![
            stream("income_tax_standard", 165_145_000.0, Some(0.10)),
            stream("income_tax_higher", 123_000_000.0, Some(0.21)),
            stream("corporate_tax", 23_500_000.0, Some(0.10)),
            stream("ni_employee", 96_400_000.0, Some(0.11)),
            stream("ni_employer", 148_700_000.0, Some(0.128)),
            stream("ni_self_employed", 11_900_000.0, Some(0.08)),
            stream("vat", 389_000_000.0, Some(0.20)),
            stream("customs_excise", 118_000_000.0, None),
            stream("duties_other", 70_000_000.0, None),
            stream("fees_and_charges", 150_000_000.0, None),
            stream("other_income", 93_379_000.0, None),
        ],
        departments: vec![
            department("HSC", 339_088_000.0, 41_000_000.0, 228_000_000.0),
            department("ESC", 148_500_000.0, 14_200_000.0, 98_400_000.0),
            department("INF", 112_400_000.0, 38_900_000.0, 48_600_000.0),
            department("HA", 82_600_000.0, 3_400_000.0, 54_200_000.0),
            department("TRE", 48_200_000.0, 71_500_000.0, 28_900_000.0),
            department("CO", 61_300_000.0, 6_800_000.0, 24_400_000.0),
            department("ENT", 33_400_000.0, 12_600_000.0, 9_100_000.0),
            department("EFA", 41_800_000.0, 9_300_000.0, 8_900_000.0),
            department("EXL", 14_200_000.0, 900_000.0, 4_200_000.0),
            department("SB", 21_700_000.0, 5_200_000.0, 2_540_000.0),
        ],
        transfers: vec![
            TransferProgram {
                key: "state_pension".to_string(),
                label: "State pension".to_string(),
                annual_cost: Figure::sourced(240_000_000.0),
                recipients: 20_000,
                average_award: 12_000.0,
                new_entrants_per_year: Some(800),
            },
            TransferProgram {
                key: "pension_supplement".to_string(),
                label: "Pension supplement".to_string(),
                annual_cost: Figure::sourced(48_000_000.0),
                recipients: 16_000,
                average_award: 3_000.0,
                new_entrants_per_year: None,
            },
            TransferProgram {
                key: "income_support".to_string(),
                label: "Income support".to_string(),
                annual_cost: Figure::sourced(78_000_000.0),
                recipients: 6_500,
                average_award: 12_000.0,
                new_entrants_per_year: None,
            },
            TransferProgram {
                key: "child_benefit".to_string(),
                label: "Child benefit".to_string(),
                annual_cost: Figure::sourced(12_600_000.0),
                recipients: 9_000,
                average_award: 1_400.0,
                new_entrants_per_year: None,
            },
            TransferProgram {
                key: "winter_bonus".to_string(),
                label: "Winter bonus".to_string(),
                annual_cost: Figure::sourced(914_000.0),
                recipients: 4_570,
                average_award: 200.0,
                new_entrants_per_year: None,
            },
            TransferProgram {
                key: "disability_benefits".to_string(),
                label: "Disability benefits".to_string(),
                annual_cost: Figure::sourced(31_000_000.0),
                recipients: 3_900,
                average_award: 7_949.0,
                new_entrants_per_year: None,
            },
            TransferProgram {
                key: "jobseekers_allowance".to_string(),
                label: "Jobseekers allowance".to_string(),
                annual_cost: Figure::sourced(4_100_000.0),
                recipients: 820,
                average_award: 5_000.0,
                new_entrants_per_year: None,
            },
        ],
        reserves: vec![
            ReserveFund {
                key: "general_reserve".to_string(),
                label: "General reserve".to_string(),
                balance: Figure::sourced(520_000_000.0),
                category: ReserveCategory::General,
            },
            ReserveFund {
                key: "ni_fund".to_string(),
                label: "National Insurance fund".to_string(),
                balance: Figure::sourced(850_000_000.0),
                category: ReserveCategory::NiFund,
            },
        ],
        capital_projects: vec![
            project("secondary_school_refit", "ESC", 8_400_000.0, false),
            project("airport_runway_resurfacing", "INF", 6_200_000.0, false),
            project("hospital_theatre_upgrade", "HSC", 5_100_000.0, false),
            project("sea_defences", "INF", 4_800_000.0, true),
            project("housing_development", "INF", 9_500_000.0, false),
            project("it_infrastructure", "CO", 3_600_000.0, true),
            project("prison_wing_refurbishment", "HA", 2_900_000.0, false),
            project("waste_facility", "EFA", 3_000_000.0, false),
        ],
        projections: vec![Projection {
            key: "pillar_two_tax".to_string(),
            label: "OECD Pillar Two top-up tax".to_string(),
            amounts: BTreeMap::from([
                ("2026-27".to_string(), 10_000_000.0),
                ("2027-28".to_string(), 25_000_000.0),
                ("2028-29".to_string(), 35_000_000.0),
            ]),
        }],
        deferral_cap: 20_000_000.0,
    }
}

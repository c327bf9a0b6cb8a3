use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::error::BudgetError;

use super::baseline::Baseline;

// Documented parameter bounds. Out-of-range values clamp to these; they are
// never surfaced as errors.
pub const INCOME_TAX_STANDARD_RATE_MAX: f64 = 0.30;
pub const INCOME_TAX_HIGHER_RATE_MAX: f64 = 0.40;
pub const CORPORATE_TAX_RATE_MAX: f64 = 0.30;
pub const NI_RATE_MAX: f64 = 0.25;
pub const VAT_RATE_MAX: f64 = 0.30;
pub const DEPARTMENT_ADJUSTMENT_LIMIT_PERCENT: f64 = 20.0;
pub const PAY_ADJUSTMENT_MIN_PERCENT: f64 = -5.0;
pub const PAY_ADJUSTMENT_MAX_PERCENT: f64 = 10.0;
pub const EFFICIENCY_MAX_PERCENT: f64 = 10.0;
pub const PENSION_AGE_INCREASE_MAX_YEARS: u32 = 3;

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Provenance {
    #[default]
    Source,
    Estimate,
    Derived,
    UserInput,
}

// A baseline monetary fact. The stored value is a non-negative amount in
// whole pounds; signs are applied by the calculation layer.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Figure {
    pub value: f64,
    #[serde(default)]
    pub provenance: Provenance,
}

impl Figure {
    pub fn sourced(value: f64) -> Self {
        Figure {
            value,
            provenance: Provenance::Source,
        }
    }

    pub fn estimated(value: f64) -> Self {
        Figure {
            value,
            provenance: Provenance::Estimate,
        }
    }
}

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WinterBonusReform {
    #[default]
    Universal,
    BenefitsRecipientsOnly,
    MeansTested(MeansTestTier),
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MeansTestTier {
    At50k,
    At75k,
    At100k,
}

impl MeansTestTier {
    // Estimated share of current claimants excluded at each income threshold.
    pub fn affected_fraction(self) -> f64 {
        match self {
            MeansTestTier::At50k => 0.25,
            MeansTestTier::At75k => 0.15,
            MeansTestTier::At100k => 0.08,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PolicyParams {
    pub income_tax_standard_rate: f64,
    pub income_tax_higher_rate: f64,
    pub corporate_tax_rate: f64,
    pub ni_employee_rate: f64,
    pub ni_employer_rate: f64,
    pub ni_self_employed_rate: f64,
    pub vat_rate: f64,
    pub behavioral_response: bool,
    pub winter_bonus_reform: WinterBonusReform,
    pub child_benefit_means_test: Option<MeansTestTier>,
    pub child_benefit_reduction_fraction: f64,
    pub pension_age_increase_years: u32,
    pub pay_adjustment_percent: f64,
    pub efficiency_percent: f64,
    pub department_adjustments: BTreeMap<String, f64>,
    pub capital_deferrals: BTreeSet<String>,
}

impl PolicyParams {
    // The no-op parameter set: every rate equals its baseline value, every
    // adjustment is zero. Computing with it must reproduce the baseline
    // balance exactly.
    pub fn default_for(baseline: &Baseline) -> Result<Self, BudgetError> {
        Ok(PolicyParams {
            income_tax_standard_rate: baseline.stream_rate("income_tax_standard")?,
            income_tax_higher_rate: baseline.stream_rate("income_tax_higher")?,
            corporate_tax_rate: baseline.stream_rate("corporate_tax")?,
            ni_employee_rate: baseline.stream_rate("ni_employee")?,
            ni_employer_rate: baseline.stream_rate("ni_employer")?,
            ni_self_employed_rate: baseline.stream_rate("ni_self_employed")?,
            vat_rate: baseline.stream_rate("vat")?,
            behavioral_response: true,
            winter_bonus_reform: WinterBonusReform::Universal,
            child_benefit_means_test: None,
            child_benefit_reduction_fraction: 1.0,
            pension_age_increase_years: 0,
            pay_adjustment_percent: 0.0,
            efficiency_percent: 0.0,
            department_adjustments: BTreeMap::new(),
            capital_deferrals: BTreeSet::new(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculationResult {
    pub revenue: f64,
    pub expenditure: f64,
    pub balance: f64,
    pub warnings: Vec<String>,
    // Keys of baseline figures with Estimate provenance that contributed to
    // this result. A caller must not present the result as authoritative
    // while this is non-empty without explicit user acknowledgment.
    pub estimate_figures: Vec<String>,
}

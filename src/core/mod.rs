mod baseline;
mod deltas;
mod engine;
#[cfg(test)]
pub(crate) mod testutil;
mod types;

pub use baseline::{
    Baseline, CapitalProject, Department, Projection, ReserveCategory, ReserveFund, RevenueStream,
    TransferProgram, implied_taxable_base,
};
pub use deltas::{
    BehavioralProfile, behavioral_multiplier, behavioral_profile, benefit_reform_saving,
    capital_deferral_total, department_adjustment_delta, pension_age_saving, rate_change_delta,
};
pub use engine::compute;
pub use types::{
    CORPORATE_TAX_RATE_MAX, CalculationResult, DEPARTMENT_ADJUSTMENT_LIMIT_PERCENT,
    EFFICIENCY_MAX_PERCENT, Figure, INCOME_TAX_HIGHER_RATE_MAX, INCOME_TAX_STANDARD_RATE_MAX,
    MeansTestTier, NI_RATE_MAX, PAY_ADJUSTMENT_MAX_PERCENT, PAY_ADJUSTMENT_MIN_PERCENT,
    PENSION_AGE_INCREASE_MAX_YEARS, PolicyParams, Provenance, VAT_RATE_MAX, WinterBonusReform,
};

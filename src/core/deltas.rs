use std::collections::BTreeSet;

use crate::error::BudgetError;

use super::baseline::Baseline;

// Laffer-style dampening: above `threshold` the naive rate delta is scaled
// by a linearly decaying multiplier with a floor. Kept as a distinct stage
// so a no-behavioral-response scenario can switch it off.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BehavioralProfile {
    pub threshold: f64,
    pub decay: f64,
    pub floor: f64,
}

pub fn behavioral_profile(stream_key: &str) -> Option<BehavioralProfile> {
    match stream_key {
        "income_tax_standard" => Some(BehavioralProfile {
            threshold: 0.12,
            decay: 5.0,
            floor: 0.4,
        }),
        "income_tax_higher" => Some(BehavioralProfile {
            threshold: 0.25,
            decay: 4.0,
            floor: 0.4,
        }),
        "corporate_tax" => Some(BehavioralProfile {
            threshold: 0.15,
            decay: 6.0,
            floor: 0.3,
        }),
        "ni_employee" => Some(BehavioralProfile {
            threshold: 0.14,
            decay: 5.0,
            floor: 0.5,
        }),
        "ni_employer" => Some(BehavioralProfile {
            threshold: 0.15,
            decay: 5.0,
            floor: 0.5,
        }),
        "ni_self_employed" => Some(BehavioralProfile {
            threshold: 0.12,
            decay: 5.0,
            floor: 0.5,
        }),
        "vat" => Some(BehavioralProfile {
            threshold: 0.25,
            decay: 4.0,
            floor: 0.5,
        }),
        _ => None,
    }
}

pub fn behavioral_multiplier(profile: BehavioralProfile, new_rate: f64) -> f64 {
    if new_rate <= profile.threshold {
        return 1.0;
    }
    (1.0 - (new_rate - profile.threshold) * profile.decay).max(profile.floor)
}

// delta = implied base x (new - current), base held constant. The only
// numerically sound projection of a rate change absent an explicit
// behavioral stage.
pub fn rate_change_delta(implied_base: f64, current_rate: f64, new_rate: f64) -> f64 {
    implied_base * (new_rate - current_rate)
}

// An expenditure reduction, never a revenue increase. Fractions clamp to
// [0, 1]; a negative cost cannot occur in a validated baseline.
pub fn benefit_reform_saving(
    annual_cost: f64,
    affected_fraction: f64,
    reduction_fraction: f64,
) -> f64 {
    annual_cost * affected_fraction.clamp(0.0, 1.0) * reduction_fraction.clamp(0.0, 1.0)
}

// Scales only the named department's own baseline net. The caller resolves
// the department; percent clamps to the documented limit.
pub fn department_adjustment_delta(net_expenditure: f64, percent: f64, limit: f64) -> f64 {
    let clamped = percent.clamp(-limit, limit);
    net_expenditure * clamped / 100.0
}

// Sum of the selected projects' annual amounts. A selection that would
// exceed the cap is rejected whole, never silently truncated.
pub fn capital_deferral_total(
    baseline: &Baseline,
    selected: &BTreeSet<String>,
) -> Result<f64, BudgetError> {
    let mut total = 0.0;
    for key in selected {
        total += baseline.capital_project(key)?.annual_amount.value;
    }
    if total > baseline.deferral_cap {
        return Err(BudgetError::CapExceeded {
            requested: total,
            cap: baseline.deferral_cap,
        });
    }
    Ok(total)
}

// savings = new entrants x average award x years of increase, from actual
// baseline recipient figures.
pub fn pension_age_saving(
    baseline: &Baseline,
    years_of_increase: u32,
    max_years: u32,
) -> Result<f64, BudgetError> {
    if years_of_increase == 0 {
        return Ok(0.0);
    }
    let pension = baseline.transfer("state_pension")?;
    let new_entrants = pension
        .new_entrants_per_year
        .ok_or_else(|| BudgetError::missing("transfers.new_entrants_per_year", "state_pension"))?;
    let years = years_of_increase.min(max_years) as f64;
    Ok(new_entrants as f64 * pension.average_award * years)
}

use crate::error::BudgetError;

use super::baseline::Baseline;
use super::deltas::{
    behavioral_multiplier, behavioral_profile, benefit_reform_saving, capital_deferral_total,
    department_adjustment_delta, pension_age_saving, rate_change_delta,
};
use super::types::{
    CORPORATE_TAX_RATE_MAX, CalculationResult, DEPARTMENT_ADJUSTMENT_LIMIT_PERCENT,
    EFFICIENCY_MAX_PERCENT, INCOME_TAX_HIGHER_RATE_MAX, INCOME_TAX_STANDARD_RATE_MAX, NI_RATE_MAX,
    PAY_ADJUSTMENT_MAX_PERCENT, PAY_ADJUSTMENT_MIN_PERCENT, PENSION_AGE_INCREASE_MAX_YEARS,
    PolicyParams, VAT_RATE_MAX, WinterBonusReform,
};

// Advisory thresholds; breaching one appends a warning string and never
// changes the numbers.
const INCOME_TAX_STANDARD_WARN_RATE: f64 = 0.12;
const INCOME_TAX_HIGHER_WARN_RATE: f64 = 0.25;
const CORPORATE_TAX_WARN_RATE: f64 = 0.15;

struct RateLever {
    stream_key: &'static str,
    proposed_rate: f64,
    max_rate: f64,
}

fn rate_levers(params: &PolicyParams) -> [RateLever; 7] {
    [
        RateLever {
            stream_key: "income_tax_standard",
            proposed_rate: params.income_tax_standard_rate,
            max_rate: INCOME_TAX_STANDARD_RATE_MAX,
        },
        RateLever {
            stream_key: "income_tax_higher",
            proposed_rate: params.income_tax_higher_rate,
            max_rate: INCOME_TAX_HIGHER_RATE_MAX,
        },
        RateLever {
            stream_key: "corporate_tax",
            proposed_rate: params.corporate_tax_rate,
            max_rate: CORPORATE_TAX_RATE_MAX,
        },
        RateLever {
            stream_key: "ni_employee",
            proposed_rate: params.ni_employee_rate,
            max_rate: NI_RATE_MAX,
        },
        RateLever {
            stream_key: "ni_employer",
            proposed_rate: params.ni_employer_rate,
            max_rate: NI_RATE_MAX,
        },
        RateLever {
            stream_key: "ni_self_employed",
            proposed_rate: params.ni_self_employed_rate,
            max_rate: NI_RATE_MAX,
        },
        RateLever {
            stream_key: "vat",
            proposed_rate: params.vat_rate,
            max_rate: VAT_RATE_MAX,
        },
    ]
}

// Pure function of (baseline, params): starts from the baseline totals,
// applies each independent lever's delta with the correct sign, and never
// mutates the baseline. Savings reduce expenditure; only tax deltas touch
// revenue.
pub fn compute(
    baseline: &Baseline,
    params: &PolicyParams,
) -> Result<CalculationResult, BudgetError> {
    let mut revenue = baseline.total_revenue();
    let mut expenditure = baseline.total_expenditure();
    let mut vat_changed = false;

    for lever in rate_levers(params) {
        let current_rate = baseline.stream_rate(lever.stream_key)?;
        let new_rate = lever.proposed_rate.clamp(0.0, lever.max_rate);
        if new_rate == current_rate {
            continue;
        }
        if lever.stream_key == "vat" {
            vat_changed = true;
        }

        let base = baseline.implied_taxable_base(lever.stream_key)?;
        let mut delta = rate_change_delta(base, current_rate, new_rate);
        if params.behavioral_response {
            if let Some(profile) = behavioral_profile(lever.stream_key) {
                delta *= behavioral_multiplier(profile, new_rate);
            }
        }
        revenue += delta;
    }

    match params.winter_bonus_reform {
        WinterBonusReform::Universal => {}
        WinterBonusReform::BenefitsRecipientsOnly => {
            let cost = baseline.transfer("winter_bonus")?.annual_cost.value;
            expenditure -= benefit_reform_saving(cost, 0.5, 1.0);
        }
        WinterBonusReform::MeansTested(tier) => {
            let cost = baseline.transfer("winter_bonus")?.annual_cost.value;
            expenditure -= benefit_reform_saving(cost, tier.affected_fraction(), 1.0);
        }
    }

    if let Some(tier) = params.child_benefit_means_test {
        let cost = baseline.transfer("child_benefit")?.annual_cost.value;
        expenditure -= benefit_reform_saving(
            cost,
            tier.affected_fraction(),
            params.child_benefit_reduction_fraction,
        );
    }

    expenditure -= pension_age_saving(
        baseline,
        params.pension_age_increase_years,
        PENSION_AGE_INCREASE_MAX_YEARS,
    )?;

    if params.pay_adjustment_percent != 0.0 {
        let pct = params
            .pay_adjustment_percent
            .clamp(PAY_ADJUSTMENT_MIN_PERCENT, PAY_ADJUSTMENT_MAX_PERCENT);
        expenditure += baseline.employee_cost_total() * pct / 100.0;
    }

    if params.efficiency_percent != 0.0 {
        let pct = params.efficiency_percent.clamp(0.0, EFFICIENCY_MAX_PERCENT);
        expenditure -= baseline.department_total() * pct / 100.0;
    }

    for (code, percent) in &params.department_adjustments {
        let dept = baseline.department(code)?;
        expenditure += department_adjustment_delta(
            dept.net_expenditure,
            *percent,
            DEPARTMENT_ADJUSTMENT_LIMIT_PERCENT,
        );
    }

    expenditure -= capital_deferral_total(baseline, &params.capital_deferrals)?;

    Ok(CalculationResult {
        revenue,
        expenditure,
        balance: revenue - expenditure,
        warnings: evaluate_warnings(params, vat_changed),
        estimate_figures: baseline.estimate_keys(),
    })
}

fn evaluate_warnings(params: &PolicyParams, vat_changed: bool) -> Vec<String> {
    let mut warnings = Vec::new();

    if vat_changed {
        warnings.push(
            "VAT rate change affects receipts shared under the revenue-sharing agreement"
                .to_string(),
        );
    }

    if params.income_tax_standard_rate > INCOME_TAX_STANDARD_WARN_RATE {
        warnings.push(format!(
            "Standard income tax rate of {:.1}% is above the {:.0}% competitiveness threshold",
            params.income_tax_standard_rate * 100.0,
            INCOME_TAX_STANDARD_WARN_RATE * 100.0
        ));
    }

    if params.income_tax_higher_rate > INCOME_TAX_HIGHER_WARN_RATE {
        warnings.push(format!(
            "Higher income tax rate of {:.1}% is above the {:.0}% competitiveness threshold",
            params.income_tax_higher_rate * 100.0,
            INCOME_TAX_HIGHER_WARN_RATE * 100.0
        ));
    }

    if params.corporate_tax_rate > CORPORATE_TAX_WARN_RATE {
        warnings.push(format!(
            "Banking and corporate tax rate of {:.1}% risks relocation of the sector ({:.0}% threshold)",
            params.corporate_tax_rate * 100.0,
            CORPORATE_TAX_WARN_RATE * 100.0
        ));
    }

    if !params.behavioral_response {
        warnings.push(
            "Behavioral response disabled: rate deltas assume a fully static taxable base"
                .to_string(),
        );
    }

    warnings
}

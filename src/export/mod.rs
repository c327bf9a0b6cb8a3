use std::fmt::Write;

use crate::core::{CalculationResult, PolicyParams, WinterBonusReform};

// Pure formatting over an already-computed result; no calculation logic
// lives here.

fn csv_escape(value: &str) -> String {
    if value.contains([',', '"', '\n']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

fn format_money(value: f64) -> String {
    let negative = value < 0.0;
    let whole = value.abs().round() as i64;
    let digits = whole.to_string();
    let mut grouped = String::new();
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if negative {
        format!("-£{grouped}")
    } else {
        format!("£{grouped}")
    }
}

pub fn to_csv(result: &CalculationResult, params: &PolicyParams) -> String {
    let mut out = String::from("section,key,value\n");
    let mut row = |section: &str, key: &str, value: String| {
        out.push_str(section);
        out.push(',');
        out.push_str(&csv_escape(key));
        out.push(',');
        out.push_str(&csv_escape(&value));
        out.push('\n');
    };

    row("result", "revenue", format!("{:.0}", result.revenue));
    row("result", "expenditure", format!("{:.0}", result.expenditure));
    row("result", "balance", format!("{:.0}", result.balance));
    for warning in &result.warnings {
        row("result", "warning", warning.clone());
    }
    for key in &result.estimate_figures {
        row("result", "estimate_figure", key.clone());
    }

    for (key, rate) in [
        ("income_tax_standard_rate", params.income_tax_standard_rate),
        ("income_tax_higher_rate", params.income_tax_higher_rate),
        ("corporate_tax_rate", params.corporate_tax_rate),
        ("ni_employee_rate", params.ni_employee_rate),
        ("ni_employer_rate", params.ni_employer_rate),
        ("ni_self_employed_rate", params.ni_self_employed_rate),
        ("vat_rate", params.vat_rate),
    ] {
        row("params", key, format!("{:.2}%", rate * 100.0));
    }
    row(
        "params",
        "behavioral_response",
        params.behavioral_response.to_string(),
    );
    row(
        "params",
        "winter_bonus_reform",
        format!("{:?}", params.winter_bonus_reform),
    );
    if let Some(tier) = params.child_benefit_means_test {
        row("params", "child_benefit_means_test", format!("{tier:?}"));
        row(
            "params",
            "child_benefit_reduction_fraction",
            format!("{:.2}", params.child_benefit_reduction_fraction),
        );
    }
    if params.pension_age_increase_years > 0 {
        row(
            "params",
            "pension_age_increase_years",
            params.pension_age_increase_years.to_string(),
        );
    }
    if params.pay_adjustment_percent != 0.0 {
        row(
            "params",
            "pay_adjustment_percent",
            format!("{:.1}", params.pay_adjustment_percent),
        );
    }
    if params.efficiency_percent != 0.0 {
        row(
            "params",
            "efficiency_percent",
            format!("{:.1}", params.efficiency_percent),
        );
    }
    for (code, percent) in &params.department_adjustments {
        row("params", &format!("department_adjustment/{code}"), format!("{percent:.1}"));
    }
    for key in &params.capital_deferrals {
        row("params", "capital_deferral", key.clone());
    }

    out
}

pub fn to_report_text(result: &CalculationResult, params: &PolicyParams) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "BUDGET SCENARIO REPORT");
    let _ = writeln!(out, "======================");
    let _ = writeln!(out);
    let _ = writeln!(out, "Revenue:     {}", format_money(result.revenue));
    let _ = writeln!(out, "Expenditure: {}", format_money(result.expenditure));
    let _ = writeln!(out, "Balance:     {}", format_money(result.balance));
    let _ = writeln!(out);

    let _ = writeln!(out, "Tax rates");
    for (label, rate) in [
        ("Income tax (standard)", params.income_tax_standard_rate),
        ("Income tax (higher)", params.income_tax_higher_rate),
        ("Corporate / banking tax", params.corporate_tax_rate),
        ("NI (employee)", params.ni_employee_rate),
        ("NI (employer)", params.ni_employer_rate),
        ("NI (self-employed)", params.ni_self_employed_rate),
        ("VAT", params.vat_rate),
    ] {
        let _ = writeln!(out, "  {label}: {:.2}%", rate * 100.0);
    }

    if params.winter_bonus_reform != WinterBonusReform::Universal
        || params.child_benefit_means_test.is_some()
        || params.pension_age_increase_years > 0
    {
        let _ = writeln!(out);
        let _ = writeln!(out, "Benefit reforms");
        if params.winter_bonus_reform != WinterBonusReform::Universal {
            let _ = writeln!(out, "  Winter bonus: {:?}", params.winter_bonus_reform);
        }
        if let Some(tier) = params.child_benefit_means_test {
            let _ = writeln!(
                out,
                "  Child benefit means test: {tier:?} withdrawing {:.0}% of the award",
                params.child_benefit_reduction_fraction * 100.0
            );
        }
        if params.pension_age_increase_years > 0 {
            let _ = writeln!(
                out,
                "  Pension age increase: {} year(s)",
                params.pension_age_increase_years
            );
        }
    }

    if !params.department_adjustments.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "Department adjustments");
        for (code, percent) in &params.department_adjustments {
            let _ = writeln!(out, "  {code}: {percent:+.1}%");
        }
    }

    if !params.capital_deferrals.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "Capital deferrals");
        for key in &params.capital_deferrals {
            let _ = writeln!(out, "  {key}");
        }
    }

    if !result.warnings.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "Warnings");
        for warning in &result.warnings {
            let _ = writeln!(out, "  ! {warning}");
        }
    }

    if !result.estimate_figures.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(
            out,
            "Figures marked as estimates contributed to this result:"
        );
        for key in &result.estimate_figures {
            let _ = writeln!(out, "  ~ {key}");
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{PolicyParams, compute};
    use crate::core::testutil::fixture_baseline;

    fn sample() -> (PolicyParams, CalculationResult) {
        let baseline = fixture_baseline();
        let mut params = PolicyParams::default_for(&baseline).unwrap();
        params.income_tax_standard_rate = 0.11;
        params.behavioral_response = false;
        params.department_adjustments.insert("HSC".to_string(), 10.0);
        params.capital_deferrals.insert("sea_defences".to_string());
        let result = compute(&baseline, &params).unwrap();
        (params, result)
    }

    #[test]
    fn csv_echoes_the_engine_numbers_verbatim() {
        let (params, result) = sample();
        let csv = to_csv(&result, &params);
        assert!(csv.contains(&format!("result,revenue,{:.0}\n", result.revenue)));
        assert!(csv.contains(&format!("result,balance,{:.0}\n", result.balance)));
        assert!(csv.contains("params,income_tax_standard_rate,11.00%"));
        assert!(csv.contains("params,department_adjustment/HSC,10.0"));
        assert!(csv.contains("params,capital_deferral,sea_defences"));
    }

    #[test]
    fn csv_quotes_fields_containing_commas() {
        let (params, mut result) = sample();
        result.warnings = vec!["one, two".to_string()];
        let csv = to_csv(&result, &params);
        assert!(csv.contains("result,warning,\"one, two\""));
    }

    #[test]
    fn report_formats_money_with_grouping() {
        assert_eq!(format_money(1_389_024_000.0), "£1,389,024,000");
        assert_eq!(format_money(-23_300_000.0), "-£23,300,000");
        assert_eq!(format_money(914.0), "£914");
    }

    #[test]
    fn report_lists_active_levers_and_warnings() {
        let (mut params, result) = sample();
        params.pension_age_increase_years = 2;
        let text = to_report_text(&result, &params);
        assert!(text.contains("Revenue:"));
        assert!(text.contains("HSC: +10.0%"));
        assert!(text.contains("sea_defences"));
        assert!(text.contains("Pension age increase: 2 year(s)"));
        assert!(text.contains("Behavioral response disabled"));
    }
}

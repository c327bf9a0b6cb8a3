use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::BudgetError;

use super::types::{Figure, Provenance};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RevenueStream {
    pub key: String,
    pub label: String,
    pub amount: Figure,
    // Nominal rate for rate-based streams; absent for lump streams such as
    // customs & excise, which carry no rate lever.
    pub rate: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Department {
    pub code: String,
    pub name: String,
    pub gross_expenditure: Figure,
    pub income: Figure,
    // Signed: a revenue-collecting department can net negative.
    pub net_expenditure: f64,
    pub employee_costs: Figure,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferProgram {
    pub key: String,
    pub label: String,
    pub annual_cost: Figure,
    pub recipients: u32,
    pub average_award: f64,
    pub new_entrants_per_year: Option<u32>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReserveFund {
    pub key: String,
    pub label: String,
    pub balance: Figure,
    pub category: ReserveCategory,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReserveCategory {
    General,
    NiFund,
    Earmarked,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CapitalProject {
    pub key: String,
    pub label: String,
    pub department: String,
    pub annual_amount: Figure,
    pub rolling: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Projection {
    pub key: String,
    pub label: String,
    // Fiscal year label -> projected amount.
    pub amounts: BTreeMap<String, f64>,
}

// Immutable snapshot of one fiscal year, built from validated source
// documents. Every accessor that can miss returns MissingBaselineData
// rather than a silent zero, and every total is derived from exactly one
// component list.
#[derive(Debug, Clone)]
pub struct Baseline {
    pub fiscal_year: String,
    pub revenue_streams: Vec<RevenueStream>,
    pub departments: Vec<Department>,
    pub transfers: Vec<TransferProgram>,
    pub reserves: Vec<ReserveFund>,
    pub capital_projects: Vec<CapitalProject>,
    pub projections: Vec<Projection>,
    pub deferral_cap: f64,
}

pub fn implied_taxable_base(revenue: f64, rate: f64) -> f64 {
    revenue / rate
}

impl Baseline {
    pub fn revenue_stream(&self, key: &str) -> Result<&RevenueStream, BudgetError> {
        self.revenue_streams
            .iter()
            .find(|s| s.key == key)
            .ok_or_else(|| BudgetError::missing("revenue_streams", key))
    }

    pub fn stream_rate(&self, key: &str) -> Result<f64, BudgetError> {
        let stream = self.revenue_stream(key)?;
        match stream.rate {
            Some(rate) if rate > 0.0 => Ok(rate),
            _ => Err(BudgetError::missing("revenue_streams.rate", key)),
        }
    }

    // base = revenue / rate, holding the base constant across a rate change.
    pub fn implied_taxable_base(&self, key: &str) -> Result<f64, BudgetError> {
        let stream = self.revenue_stream(key)?;
        let rate = self.stream_rate(key)?;
        Ok(implied_taxable_base(stream.amount.value, rate))
    }

    pub fn department(&self, code: &str) -> Result<&Department, BudgetError> {
        self.departments
            .iter()
            .find(|d| d.code == code)
            .ok_or_else(|| BudgetError::missing("departments", code))
    }

    pub fn transfer(&self, key: &str) -> Result<&TransferProgram, BudgetError> {
        self.transfers
            .iter()
            .find(|t| t.key == key)
            .ok_or_else(|| BudgetError::missing("transfers", key))
    }

    pub fn capital_project(&self, key: &str) -> Result<&CapitalProject, BudgetError> {
        self.capital_projects
            .iter()
            .find(|p| p.key == key)
            .ok_or_else(|| BudgetError::missing("capital_programme", key))
    }

    pub fn total_revenue(&self) -> f64 {
        self.revenue_streams.iter().map(|s| s.amount.value).sum()
    }

    // Signed sum over declared departments, negative nets included once.
    pub fn department_total(&self) -> f64 {
        self.departments.iter().map(|d| d.net_expenditure).sum()
    }

    // Single source for the employee-cost concept: the per-department
    // figures, never a restated constant.
    pub fn employee_cost_total(&self) -> f64 {
        self.departments
            .iter()
            .map(|d| d.employee_costs.value)
            .sum()
    }

    pub fn transfer_total(&self) -> f64 {
        self.transfers.iter().map(|t| t.annual_cost.value).sum()
    }

    pub fn capital_total(&self) -> f64 {
        self.capital_projects
            .iter()
            .map(|p| p.annual_amount.value)
            .sum()
    }

    pub fn total_expenditure(&self) -> f64 {
        self.department_total() + self.transfer_total() + self.capital_total()
    }

    pub fn reserve_total(&self) -> f64 {
        self.reserves.iter().map(|r| r.balance.value).sum()
    }

    // Keys of every figure tagged Estimate, in a stable order.
    pub fn estimate_keys(&self) -> Vec<String> {
        let mut keys = Vec::new();
        for stream in &self.revenue_streams {
            if stream.amount.provenance == Provenance::Estimate {
                keys.push(format!("revenue_streams/{}", stream.key));
            }
        }
        for dept in &self.departments {
            for (field, figure) in [
                ("gross", dept.gross_expenditure),
                ("income", dept.income),
                ("employee_costs", dept.employee_costs),
            ] {
                if figure.provenance == Provenance::Estimate {
                    keys.push(format!("departments/{}/{field}", dept.code));
                }
            }
        }
        for transfer in &self.transfers {
            if transfer.annual_cost.provenance == Provenance::Estimate {
                keys.push(format!("transfers/{}", transfer.key));
            }
        }
        for project in &self.capital_projects {
            if project.annual_amount.provenance == Provenance::Estimate {
                keys.push(format!("capital_programme/{}", project.key));
            }
        }
        keys
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_baseline() -> Baseline {
        Baseline {
            fiscal_year: "2025-26".to_string(),
            revenue_streams: vec![
                RevenueStream {
                    key: "income_tax_standard".to_string(),
                    label: "Income tax (standard rate)".to_string(),
                    amount: Figure::sourced(165_145_000.0),
                    rate: Some(0.10),
                },
                RevenueStream {
                    key: "customs_excise".to_string(),
                    label: "Customs & excise".to_string(),
                    amount: Figure::sourced(118_000_000.0),
                    rate: None,
                },
            ],
            departments: vec![
                Department {
                    code: "HSC".to_string(),
                    name: "Health & Social Care".to_string(),
                    gross_expenditure: Figure::sourced(339_088_000.0),
                    income: Figure::sourced(41_000_000.0),
                    net_expenditure: 298_088_000.0,
                    employee_costs: Figure::sourced(228_000_000.0),
                },
                Department {
                    code: "TRE".to_string(),
                    name: "Treasury".to_string(),
                    gross_expenditure: Figure::sourced(48_200_000.0),
                    income: Figure::sourced(71_500_000.0),
                    net_expenditure: -23_300_000.0,
                    employee_costs: Figure::sourced(28_900_000.0),
                },
            ],
            transfers: vec![TransferProgram {
                key: "winter_bonus".to_string(),
                label: "Winter bonus".to_string(),
                annual_cost: Figure::sourced(914_000.0),
                recipients: 4_570,
                average_award: 200.0,
                new_entrants_per_year: None,
            }],
            reserves: Vec::new(),
            capital_projects: vec![CapitalProject {
                key: "sea_defences".to_string(),
                label: "Sea defences".to_string(),
                department: "INF".to_string(),
                annual_amount: Figure::sourced(4_800_000.0),
                rolling: true,
            }],
            projections: Vec::new(),
            deferral_cap: 20_000_000.0,
        }
    }

    #[test]
    fn implied_base_recovers_revenue_over_rate() {
        let baseline = small_baseline();
        let base = baseline.implied_taxable_base("income_tax_standard").unwrap();
        assert!((base - 1_651_450_000.0).abs() < 1e-6);
    }

    #[test]
    fn missing_stream_is_an_error_not_a_zero() {
        let baseline = small_baseline();
        let err = baseline.revenue_stream("lottery_duty").unwrap_err();
        assert!(matches!(
            err,
            BudgetError::MissingBaselineData { category: "revenue_streams", .. }
        ));
    }

    #[test]
    fn rateless_stream_has_no_implied_base() {
        let baseline = small_baseline();
        assert!(baseline.implied_taxable_base("customs_excise").is_err());
    }

    #[test]
    fn department_total_keeps_negative_nets_signed() {
        let baseline = small_baseline();
        let expected = 298_088_000.0 - 23_300_000.0;
        assert!((baseline.department_total() - expected).abs() < 1e-6);
    }

    #[test]
    fn totals_are_sums_of_their_components() {
        let baseline = small_baseline();
        assert!((baseline.total_revenue() - 283_145_000.0).abs() < 1e-6);
        let expenditure =
            baseline.department_total() + baseline.transfer_total() + baseline.capital_total();
        assert!((baseline.total_expenditure() - expenditure).abs() < 1e-9);
    }

    #[test]
    fn estimate_keys_surface_tagged_figures() {
        let mut baseline = small_baseline();
        assert!(baseline.estimate_keys().is_empty());
        baseline.revenue_streams[1].amount = Figure::estimated(118_000_000.0);
        assert_eq!(
            baseline.estimate_keys(),
            vec!["revenue_streams/customs_excise".to_string()]
        );
    }
}

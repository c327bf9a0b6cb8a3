use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;

use serde::Deserialize;
use tracing::info;

use crate::core::{
    Baseline, CapitalProject, Department, Figure, Projection, Provenance, ReserveCategory,
    ReserveFund, RevenueStream, TransferProgram,
};
use crate::error::BudgetError;

// Declared grand totals must match component sums within a pound.
const SUMMARY_TOLERANCE: f64 = 1.0;

#[derive(Debug, Deserialize)]
pub struct RevenueDocument {
    pub summary: RevenueSummary,
    pub streams: Vec<RevenueStreamRecord>,
}

#[derive(Debug, Deserialize)]
pub struct RevenueSummary {
    pub fiscal_year: String,
    pub total_revenue: f64,
}

#[derive(Debug, Deserialize)]
pub struct RevenueStreamRecord {
    pub key: String,
    pub label: String,
    pub amount: f64,
    #[serde(default)]
    pub rate: Option<f64>,
    #[serde(default)]
    pub provenance: Provenance,
}

#[derive(Debug, Deserialize)]
pub struct DepartmentsDocument {
    pub summary: DepartmentsSummary,
    pub departments: Vec<DepartmentRecord>,
}

#[derive(Debug, Deserialize)]
pub struct DepartmentsSummary {
    pub total_net_expenditure: f64,
    pub total_employee_costs: f64,
}

#[derive(Debug, Deserialize)]
pub struct DepartmentRecord {
    pub code: String,
    pub name: String,
    pub gross_expenditure: f64,
    pub income: f64,
    pub net_expenditure: f64,
    pub employee_costs: f64,
    #[serde(default)]
    pub provenance: Provenance,
}

#[derive(Debug, Deserialize)]
pub struct TransfersDocument {
    pub summary: TransfersSummary,
    pub programs: Vec<TransferRecord>,
}

#[derive(Debug, Deserialize)]
pub struct TransfersSummary {
    pub total_transfer_cost: f64,
}

#[derive(Debug, Deserialize)]
pub struct TransferRecord {
    pub key: String,
    pub label: String,
    pub annual_cost: f64,
    pub recipients: u32,
    pub average_award: f64,
    #[serde(default)]
    pub new_entrants_per_year: Option<u32>,
    // A saving claimed elsewhere in the source material; cannot exceed the
    // program's own cost.
    #[serde(default)]
    pub documented_max_saving: Option<f64>,
    #[serde(default)]
    pub provenance: Provenance,
}

#[derive(Debug, Deserialize)]
pub struct ReservesDocument {
    pub summary: ReservesSummary,
    pub funds: Vec<ReserveRecord>,
}

#[derive(Debug, Deserialize)]
pub struct ReservesSummary {
    pub total_balance: f64,
}

#[derive(Debug, Deserialize)]
pub struct ReserveRecord {
    pub key: String,
    pub label: String,
    pub balance: f64,
    pub category: ReserveCategory,
    #[serde(default)]
    pub provenance: Provenance,
}

#[derive(Debug, Deserialize)]
pub struct CapitalDocument {
    pub summary: CapitalSummary,
    pub projects: Vec<CapitalProjectRecord>,
}

#[derive(Debug, Deserialize)]
pub struct CapitalSummary {
    pub total_annual_amount: f64,
    pub deferral_cap: f64,
}

#[derive(Debug, Deserialize)]
pub struct CapitalProjectRecord {
    pub key: String,
    pub label: String,
    pub department: String,
    pub annual_amount: f64,
    #[serde(default)]
    pub rolling: bool,
    #[serde(default)]
    pub provenance: Provenance,
}

#[derive(Debug, Deserialize)]
pub struct ProjectionsDocument {
    pub summary: ProjectionsSummary,
    pub items: Vec<ProjectionRecord>,
}

#[derive(Debug, Deserialize)]
pub struct ProjectionsSummary {
    pub totals_by_year: BTreeMap<String, f64>,
}

#[derive(Debug, Deserialize)]
pub struct ProjectionRecord {
    pub key: String,
    pub label: String,
    pub amounts: BTreeMap<String, f64>,
}

#[derive(Debug)]
pub struct SourceDocuments {
    pub revenue: RevenueDocument,
    pub departments: DepartmentsDocument,
    pub transfers: TransfersDocument,
    pub reserves: ReservesDocument,
    pub capital: CapitalDocument,
    pub projections: ProjectionsDocument,
}

fn read_document<T: for<'de> Deserialize<'de>>(dir: &Path, name: &str) -> Result<T, BudgetError> {
    let path = dir.join(name);
    let raw = fs::read_to_string(&path)?;
    serde_json::from_str(&raw).map_err(|e| BudgetError::inconsistent(name, e.to_string()))
}

impl SourceDocuments {
    pub fn load_dir(dir: &Path) -> Result<Self, BudgetError> {
        Ok(SourceDocuments {
            revenue: read_document(dir, "revenue_streams.json")?,
            departments: read_document(dir, "departments.json")?,
            transfers: read_document(dir, "transfers.json")?,
            reserves: read_document(dir, "reserves.json")?,
            capital: read_document(dir, "capital_programme.json")?,
            projections: read_document(dir, "projections.json")?,
        })
    }
}

fn check_total(document: &str, declared: f64, summed: f64) -> Result<(), BudgetError> {
    if (declared - summed).abs() > SUMMARY_TOLERANCE {
        return Err(BudgetError::inconsistent(
            document,
            format!("declared total {declared:.0} disagrees with component sum {summed:.0}"),
        ));
    }
    Ok(())
}

fn check_unique_keys<'a, I>(document: &str, keys: I) -> Result<(), BudgetError>
where
    I: Iterator<Item = &'a str>,
{
    let mut seen = BTreeSet::new();
    for key in keys {
        if !seen.insert(key) {
            return Err(BudgetError::inconsistent(
                document,
                format!("duplicate key '{key}' would be double counted"),
            ));
        }
    }
    Ok(())
}

fn check_non_negative(document: &str, key: &str, value: f64) -> Result<(), BudgetError> {
    if !value.is_finite() || value < 0.0 {
        return Err(BudgetError::inconsistent(
            document,
            format!("'{key}' must be a non-negative amount, got {value}"),
        ));
    }
    Ok(())
}

// Validate every document against its own declared summary, then assemble
// the immutable baseline. Any disagreement is fatal here; nothing downstream
// may ever see a possibly-wrong total.
pub fn build_baseline(docs: SourceDocuments) -> Result<Baseline, BudgetError> {
    let revenue_doc = "revenue_streams.json";
    check_unique_keys(revenue_doc, docs.revenue.streams.iter().map(|s| s.key.as_str()))?;
    let mut stream_sum = 0.0;
    for record in &docs.revenue.streams {
        check_non_negative(revenue_doc, &record.key, record.amount)?;
        if let Some(rate) = record.rate {
            if !(rate > 0.0 && rate <= 1.0) {
                return Err(BudgetError::inconsistent(
                    revenue_doc,
                    format!("'{}' rate must be in (0, 1], got {rate}", record.key),
                ));
            }
        }
        stream_sum += record.amount;
    }
    check_total(revenue_doc, docs.revenue.summary.total_revenue, stream_sum)?;

    let departments_doc = "departments.json";
    check_unique_keys(
        departments_doc,
        docs.departments.departments.iter().map(|d| d.code.as_str()),
    )?;
    let mut net_sum = 0.0;
    let mut employee_sum = 0.0;
    for record in &docs.departments.departments {
        check_non_negative(departments_doc, &record.code, record.gross_expenditure)?;
        check_non_negative(departments_doc, &record.code, record.income)?;
        check_non_negative(departments_doc, &record.code, record.employee_costs)?;
        let derived_net = record.gross_expenditure - record.income;
        if (derived_net - record.net_expenditure).abs() > SUMMARY_TOLERANCE {
            return Err(BudgetError::inconsistent(
                departments_doc,
                format!(
                    "department '{}': net {:.0} is not gross {:.0} minus income {:.0}",
                    record.code, record.net_expenditure, record.gross_expenditure, record.income
                ),
            ));
        }
        if record.employee_costs > record.gross_expenditure {
            return Err(BudgetError::inconsistent(
                departments_doc,
                format!(
                    "department '{}': employee costs exceed gross expenditure",
                    record.code
                ),
            ));
        }
        net_sum += record.net_expenditure;
        employee_sum += record.employee_costs;
    }
    check_total(
        departments_doc,
        docs.departments.summary.total_net_expenditure,
        net_sum,
    )?;
    check_total(
        departments_doc,
        docs.departments.summary.total_employee_costs,
        employee_sum,
    )?;

    let transfers_doc = "transfers.json";
    check_unique_keys(
        transfers_doc,
        docs.transfers.programs.iter().map(|p| p.key.as_str()),
    )?;
    let mut transfer_sum = 0.0;
    for record in &docs.transfers.programs {
        check_non_negative(transfers_doc, &record.key, record.annual_cost)?;
        // A documented saving larger than the whole program is arithmetically
        // impossible; refuse to ship a calculator for it.
        if let Some(claimed) = record.documented_max_saving {
            if claimed > record.annual_cost + SUMMARY_TOLERANCE {
                return Err(BudgetError::inconsistent(
                    transfers_doc,
                    format!(
                        "program '{}': documented saving {claimed:.0} exceeds the program cost {:.0}",
                        record.key, record.annual_cost
                    ),
                ));
            }
        }
        transfer_sum += record.annual_cost;
    }
    check_total(
        transfers_doc,
        docs.transfers.summary.total_transfer_cost,
        transfer_sum,
    )?;

    let reserves_doc = "reserves.json";
    check_unique_keys(reserves_doc, docs.reserves.funds.iter().map(|f| f.key.as_str()))?;
    let mut reserve_sum = 0.0;
    for record in &docs.reserves.funds {
        check_non_negative(reserves_doc, &record.key, record.balance)?;
        reserve_sum += record.balance;
    }
    check_total(reserves_doc, docs.reserves.summary.total_balance, reserve_sum)?;

    let capital_doc = "capital_programme.json";
    check_unique_keys(capital_doc, docs.capital.projects.iter().map(|p| p.key.as_str()))?;
    let mut capital_sum = 0.0;
    for record in &docs.capital.projects {
        check_non_negative(capital_doc, &record.key, record.annual_amount)?;
        capital_sum += record.annual_amount;
    }
    check_total(
        capital_doc,
        docs.capital.summary.total_annual_amount,
        capital_sum,
    )?;
    check_non_negative(capital_doc, "deferral_cap", docs.capital.summary.deferral_cap)?;

    let projections_doc = "projections.json";
    check_unique_keys(
        projections_doc,
        docs.projections.items.iter().map(|i| i.key.as_str()),
    )?;
    for (year, declared) in &docs.projections.summary.totals_by_year {
        let summed: f64 = docs
            .projections
            .items
            .iter()
            .filter_map(|item| item.amounts.get(year))
            .sum();
        check_total(projections_doc, *declared, summed)
            .map_err(|_| BudgetError::inconsistent(projections_doc, format!("year {year} total disagrees with item sum")))?;
    }

    let baseline = Baseline {
        fiscal_year: docs.revenue.summary.fiscal_year,
        revenue_streams: docs
            .revenue
            .streams
            .into_iter()
            .map(|r| RevenueStream {
                key: r.key,
                label: r.label,
                amount: Figure {
                    value: r.amount,
                    provenance: r.provenance,
                },
                rate: r.rate,
            })
            .collect(),
        departments: docs
            .departments
            .departments
            .into_iter()
            .map(|d| Department {
                code: d.code,
                name: d.name,
                gross_expenditure: Figure {
                    value: d.gross_expenditure,
                    provenance: d.provenance,
                },
                income: Figure {
                    value: d.income,
                    provenance: d.provenance,
                },
                net_expenditure: d.net_expenditure,
                employee_costs: Figure {
                    value: d.employee_costs,
                    provenance: d.provenance,
                },
            })
            .collect(),
        transfers: docs
            .transfers
            .programs
            .into_iter()
            .map(|t| TransferProgram {
                key: t.key,
                label: t.label,
                annual_cost: Figure {
                    value: t.annual_cost,
                    provenance: t.provenance,
                },
                recipients: t.recipients,
                average_award: t.average_award,
                new_entrants_per_year: t.new_entrants_per_year,
            })
            .collect(),
        reserves: docs
            .reserves
            .funds
            .into_iter()
            .map(|f| ReserveFund {
                key: f.key,
                label: f.label,
                balance: Figure {
                    value: f.balance,
                    provenance: f.provenance,
                },
                category: f.category,
            })
            .collect(),
        capital_projects: docs
            .capital
            .projects
            .into_iter()
            .map(|p| CapitalProject {
                key: p.key,
                label: p.label,
                department: p.department,
                annual_amount: Figure {
                    value: p.annual_amount,
                    provenance: p.provenance,
                },
                rolling: p.rolling,
            })
            .collect(),
        projections: docs
            .projections
            .items
            .into_iter()
            .map(|i| Projection {
                key: i.key,
                label: i.label,
                amounts: i.amounts,
            })
            .collect(),
        deferral_cap: docs.capital.summary.deferral_cap,
    };

    info!(
        fiscal_year = %baseline.fiscal_year,
        total_revenue = baseline.total_revenue(),
        total_expenditure = baseline.total_expenditure(),
        "baseline validated"
    );
    Ok(baseline)
}

pub fn load_baseline(dir: &Path) -> Result<Baseline, BudgetError> {
    build_baseline(SourceDocuments::load_dir(dir)?)
}

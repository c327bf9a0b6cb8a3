use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::{
    Router,
    extract::{Json, Path, Query, State},
    http::{StatusCode, header},
    response::{Html, IntoResponse, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;
use tracing::info;
use uuid::Uuid;

use crate::core::{
    Baseline, CalculationResult, MeansTestTier, PolicyParams, WinterBonusReform, compute,
};
use crate::error::BudgetError;
use crate::export::{to_csv, to_report_text};
use crate::scenario::ScenarioStore;

const INDEX_HTML: &str = include_str!("../../web/index.html");

#[derive(Copy, Clone, Debug, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case")]
enum ApiWinterBonus {
    Universal,
    #[serde(alias = "benefitsRecipientsOnly", alias = "benefits_recipients_only")]
    BenefitsRecipientsOnly,
    #[serde(rename = "means-tested-50k", alias = "meansTested50k")]
    MeansTested50k,
    #[serde(rename = "means-tested-75k", alias = "meansTested75k")]
    MeansTested75k,
    #[serde(rename = "means-tested-100k", alias = "meansTested100k")]
    MeansTested100k,
}

impl From<ApiWinterBonus> for WinterBonusReform {
    fn from(value: ApiWinterBonus) -> Self {
        match value {
            ApiWinterBonus::Universal => WinterBonusReform::Universal,
            ApiWinterBonus::BenefitsRecipientsOnly => WinterBonusReform::BenefitsRecipientsOnly,
            ApiWinterBonus::MeansTested50k => {
                WinterBonusReform::MeansTested(MeansTestTier::At50k)
            }
            ApiWinterBonus::MeansTested75k => {
                WinterBonusReform::MeansTested(MeansTestTier::At75k)
            }
            ApiWinterBonus::MeansTested100k => {
                WinterBonusReform::MeansTested(MeansTestTier::At100k)
            }
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Deserialize)]
enum ApiMeansTestTier {
    #[serde(rename = "50k", alias = "at50k")]
    At50k,
    #[serde(rename = "75k", alias = "at75k")]
    At75k,
    #[serde(rename = "100k", alias = "at100k")]
    At100k,
}

impl From<ApiMeansTestTier> for MeansTestTier {
    fn from(value: ApiMeansTestTier) -> Self {
        match value {
            ApiMeansTestTier::At50k => MeansTestTier::At50k,
            ApiMeansTestTier::At75k => MeansTestTier::At75k,
            ApiMeansTestTier::At100k => MeansTestTier::At100k,
        }
    }
}

// Every lever is optional; anything absent stays at its baseline default.
// Rates arrive in percent, e.g. 11.5 for 11.5%.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct ComputePayload {
    income_tax_standard_rate: Option<f64>,
    income_tax_higher_rate: Option<f64>,
    corporate_tax_rate: Option<f64>,
    ni_employee_rate: Option<f64>,
    ni_employer_rate: Option<f64>,
    ni_self_employed_rate: Option<f64>,
    vat_rate: Option<f64>,
    behavioral_response: Option<bool>,
    winter_bonus: Option<ApiWinterBonus>,
    child_benefit_threshold: Option<ApiMeansTestTier>,
    child_benefit_reduction: Option<f64>,
    pension_age_increase_years: Option<u32>,
    pay_adjustment: Option<f64>,
    efficiency: Option<f64>,
    department_adjustments: Option<BTreeMap<String, f64>>,
    capital_deferrals: Option<Vec<String>>,
}

fn build_params(
    baseline: &Baseline,
    payload: ComputePayload,
) -> Result<PolicyParams, BudgetError> {
    let mut params = PolicyParams::default_for(baseline)?;

    if let Some(v) = payload.income_tax_standard_rate {
        params.income_tax_standard_rate = v / 100.0;
    }
    if let Some(v) = payload.income_tax_higher_rate {
        params.income_tax_higher_rate = v / 100.0;
    }
    if let Some(v) = payload.corporate_tax_rate {
        params.corporate_tax_rate = v / 100.0;
    }
    if let Some(v) = payload.ni_employee_rate {
        params.ni_employee_rate = v / 100.0;
    }
    if let Some(v) = payload.ni_employer_rate {
        params.ni_employer_rate = v / 100.0;
    }
    if let Some(v) = payload.ni_self_employed_rate {
        params.ni_self_employed_rate = v / 100.0;
    }
    if let Some(v) = payload.vat_rate {
        params.vat_rate = v / 100.0;
    }
    if let Some(v) = payload.behavioral_response {
        params.behavioral_response = v;
    }
    if let Some(v) = payload.winter_bonus {
        params.winter_bonus_reform = v.into();
    }
    if let Some(v) = payload.child_benefit_threshold {
        params.child_benefit_means_test = Some(v.into());
    }
    if let Some(v) = payload.child_benefit_reduction {
        params.child_benefit_reduction_fraction = v / 100.0;
    }
    if let Some(v) = payload.pension_age_increase_years {
        params.pension_age_increase_years = v;
    }
    if let Some(v) = payload.pay_adjustment {
        params.pay_adjustment_percent = v;
    }
    if let Some(v) = payload.efficiency {
        params.efficiency_percent = v;
    }
    if let Some(v) = payload.department_adjustments {
        // Unknown codes surface as MissingBaselineData from compute; check
        // here so the rejection happens before anything is saved.
        for code in v.keys() {
            baseline.department(code)?;
        }
        params.department_adjustments = v;
    }
    if let Some(v) = payload.capital_deferrals {
        for key in &v {
            baseline.capital_project(key)?;
        }
        params.capital_deferrals = v.into_iter().collect();
        // Reject an over-cap selection at the boundary rather than letting
        // a saved scenario carry it.
        crate::core::capital_deferral_total(baseline, &params.capital_deferrals)?;
    }

    Ok(params)
}

#[derive(Clone)]
pub struct AppState {
    baseline: Arc<Baseline>,
    store: Arc<Mutex<Box<dyn ScenarioStore>>>,
}

impl AppState {
    pub fn new(baseline: Baseline, store: Box<dyn ScenarioStore>) -> Self {
        AppState {
            baseline: Arc::new(baseline),
            store: Arc::new(Mutex::new(store)),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct BaselineResponse<'a> {
    fiscal_year: &'a str,
    total_revenue: f64,
    total_expenditure: f64,
    balance: f64,
    deferral_cap: f64,
    revenue_streams: &'a [crate::core::RevenueStream],
    departments: &'a [crate::core::Department],
    transfers: &'a [crate::core::TransferProgram],
    capital_projects: &'a [crate::core::CapitalProject],
    reserves: &'a [crate::core::ReserveFund],
    projections: &'a [crate::core::Projection],
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ComputeResponse {
    fiscal_year: String,
    result: CalculationResult,
    applied_params: PolicyParams,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SaveScenarioPayload {
    name: String,
    #[serde(default)]
    params: ComputePayload,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SaveScenarioResponse {
    id: Uuid,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index_handler))
        .route("/index.html", get(index_handler))
        .route("/api/baseline", get(baseline_handler))
        .route(
            "/api/compute",
            get(compute_get_handler).post(compute_post_handler),
        )
        .route(
            "/api/scenarios",
            get(list_scenarios_handler).post(save_scenario_handler),
        )
        .route(
            "/api/scenarios/:id",
            get(load_scenario_handler).delete(delete_scenario_handler),
        )
        .route("/api/export/csv", post(export_csv_handler))
        .route("/api/export/report", post(export_report_handler))
        .fallback(not_found_handler)
        .with_state(state)
}

pub async fn run_http_server(port: u16, state: AppState) -> std::io::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let app = router(state);

    let listener = TcpListener::bind(addr).await?;
    info!(%addr, "budget explorer listening");
    axum::serve(listener, app).await
}

async fn index_handler() -> impl IntoResponse {
    with_cache_control(Html(INDEX_HTML))
}

async fn not_found_handler() -> Response {
    error_response(StatusCode::NOT_FOUND, "Not found")
}

async fn baseline_handler(State(state): State<AppState>) -> Response {
    let baseline = &state.baseline;
    let response = BaselineResponse {
        fiscal_year: &baseline.fiscal_year,
        total_revenue: baseline.total_revenue(),
        total_expenditure: baseline.total_expenditure(),
        balance: baseline.total_revenue() - baseline.total_expenditure(),
        deferral_cap: baseline.deferral_cap,
        revenue_streams: &baseline.revenue_streams,
        departments: &baseline.departments,
        transfers: &baseline.transfers,
        capital_projects: &baseline.capital_projects,
        reserves: &baseline.reserves,
        projections: &baseline.projections,
    };
    json_response(StatusCode::OK, response)
}

async fn compute_get_handler(
    State(state): State<AppState>,
    Query(payload): Query<ComputePayload>,
) -> Response {
    compute_response(&state, payload)
}

async fn compute_post_handler(
    State(state): State<AppState>,
    Json(payload): Json<ComputePayload>,
) -> Response {
    compute_response(&state, payload)
}

fn compute_response(state: &AppState, payload: ComputePayload) -> Response {
    match computed(state, payload) {
        Ok((params, result)) => json_response(
            StatusCode::OK,
            ComputeResponse {
                fiscal_year: state.baseline.fiscal_year.clone(),
                result,
                applied_params: params,
            },
        ),
        Err(e) => budget_error_response(e),
    }
}

fn computed(
    state: &AppState,
    payload: ComputePayload,
) -> Result<(PolicyParams, CalculationResult), BudgetError> {
    let params = build_params(&state.baseline, payload)?;
    let result = compute(&state.baseline, &params)?;
    Ok((params, result))
}

async fn list_scenarios_handler(State(state): State<AppState>) -> Response {
    let store = state.store.lock().expect("scenario store lock");
    match store.list() {
        Ok(summaries) => json_response(StatusCode::OK, summaries),
        Err(e) => budget_error_response(e),
    }
}

async fn save_scenario_handler(
    State(state): State<AppState>,
    Json(payload): Json<SaveScenarioPayload>,
) -> Response {
    if payload.name.trim().is_empty() {
        return error_response(StatusCode::BAD_REQUEST, "Scenario name must not be empty");
    }
    let (params, result) = match computed(&state, payload.params) {
        Ok(pair) => pair,
        Err(e) => return budget_error_response(e),
    };
    let mut store = state.store.lock().expect("scenario store lock");
    match store.save(payload.name.trim(), &params, &result) {
        Ok(id) => json_response(StatusCode::CREATED, SaveScenarioResponse { id }),
        Err(e) => budget_error_response(e),
    }
}

async fn load_scenario_handler(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Response {
    let store = state.store.lock().expect("scenario store lock");
    match store.load(id) {
        Ok(scenario) => json_response(StatusCode::OK, scenario),
        Err(e) => budget_error_response(e),
    }
}

async fn delete_scenario_handler(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Response {
    let mut store = state.store.lock().expect("scenario store lock");
    match store.delete(id) {
        Ok(true) => StatusCode::NO_CONTENT.into_response(),
        Ok(false) => error_response(StatusCode::NOT_FOUND, "Scenario not found"),
        Err(e) => budget_error_response(e),
    }
}

async fn export_csv_handler(
    State(state): State<AppState>,
    Json(payload): Json<ComputePayload>,
) -> Response {
    match computed(&state, payload) {
        Ok((params, result)) => text_response("text/csv; charset=utf-8", to_csv(&result, &params)),
        Err(e) => budget_error_response(e),
    }
}

async fn export_report_handler(
    State(state): State<AppState>,
    Json(payload): Json<ComputePayload>,
) -> Response {
    match computed(&state, payload) {
        Ok((params, result)) => {
            text_response("text/plain; charset=utf-8", to_report_text(&result, &params))
        }
        Err(e) => budget_error_response(e),
    }
}

fn budget_error_response(e: BudgetError) -> Response {
    let status = match &e {
        BudgetError::MissingBaselineData { .. } => StatusCode::BAD_REQUEST,
        BudgetError::CapExceeded { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        BudgetError::ScenarioNotFound { .. } => StatusCode::NOT_FOUND,
        BudgetError::DataConsistency { .. } | BudgetError::Io(_) | BudgetError::Json(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    error_response(status, &e.to_string())
}

fn with_cache_control<R: IntoResponse>(response: R) -> Response {
    let mut response = response.into_response();
    response.headers_mut().insert(
        header::CACHE_CONTROL,
        "no-store".parse().expect("valid header"),
    );
    response
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    with_cache_control((status, Json(body)))
}

fn text_response(content_type: &'static str, body: String) -> Response {
    with_cache_control(([(header::CONTENT_TYPE, content_type)], body))
}

fn error_response(status: StatusCode, msg: &str) -> Response {
    json_response(
        status,
        ErrorResponse {
            error: msg.to_string(),
        },
    )
}

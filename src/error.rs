use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum BudgetError {
    #[error("missing baseline data: {category}/{key}")]
    MissingBaselineData { category: &'static str, key: String },

    #[error("data consistency failure in {document}: {detail}")]
    DataConsistency { document: String, detail: String },

    #[error("capital deferral selection of {requested:.0} exceeds the {cap:.0} cap")]
    CapExceeded { requested: f64, cap: f64 },

    #[error("scenario {id} not found")]
    ScenarioNotFound { id: Uuid },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl BudgetError {
    pub fn missing(category: &'static str, key: impl Into<String>) -> Self {
        BudgetError::MissingBaselineData {
            category,
            key: key.into(),
        }
    }

    pub fn inconsistent(document: impl Into<String>, detail: impl Into<String>) -> Self {
        BudgetError::DataConsistency {
            document: document.into(),
            detail: detail.into(),
        }
    }
}

//! Scenario persistence port.
//!
//! The calculation core never touches storage; anything that wants to keep
//! a scenario goes through [`ScenarioStore`]. Two implementations: a
//! file-backed store (one JSON blob per scenario) and an in-memory store
//! for tests.

use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::core::{CalculationResult, PolicyParams};
use crate::error::BudgetError;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scenario {
    pub id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub params: PolicyParams,
    pub result: CalculationResult,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioSummary {
    pub id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

/// Narrow persistence contract for saved scenarios.
///
/// Implementations store the full parameter set together with the result it
/// produced, so a loaded scenario can be displayed without recomputation.
pub trait ScenarioStore: Send {
    /// Persist a snapshot and return its new id.
    fn save(
        &mut self,
        name: &str,
        params: &PolicyParams,
        result: &CalculationResult,
    ) -> Result<Uuid, BudgetError>;

    /// Fetch a scenario. `ScenarioNotFound` if the id is unknown.
    fn load(&self, id: Uuid) -> Result<Scenario, BudgetError>;

    /// All saved scenarios, newest first.
    fn list(&self) -> Result<Vec<ScenarioSummary>, BudgetError>;

    /// Remove a scenario. Returns whether anything was deleted.
    fn delete(&mut self, id: Uuid) -> Result<bool, BudgetError>;
}

pub struct FileScenarioStore {
    dir: PathBuf,
}

impl FileScenarioStore {
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self, BudgetError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(FileScenarioStore { dir })
    }

    fn path_for(&self, id: Uuid) -> PathBuf {
        self.dir.join(format!("{id}.json"))
    }

    fn read_all(&self) -> Result<Vec<Scenario>, BudgetError> {
        let mut scenarios = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path.extension().is_none_or(|ext| ext != "json") {
                continue;
            }
            let raw = fs::read_to_string(&path)?;
            scenarios.push(serde_json::from_str::<Scenario>(&raw)?);
        }
        scenarios.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(scenarios)
    }
}

impl ScenarioStore for FileScenarioStore {
    fn save(
        &mut self,
        name: &str,
        params: &PolicyParams,
        result: &CalculationResult,
    ) -> Result<Uuid, BudgetError> {
        let scenario = Scenario {
            id: Uuid::new_v4(),
            name: name.to_string(),
            created_at: Utc::now(),
            params: params.clone(),
            result: result.clone(),
        };
        let raw = serde_json::to_string_pretty(&scenario)?;
        fs::write(self.path_for(scenario.id), raw)?;
        debug!(id = %scenario.id, name, "scenario saved");
        Ok(scenario.id)
    }

    fn load(&self, id: Uuid) -> Result<Scenario, BudgetError> {
        match fs::read_to_string(self.path_for(id)) {
            Ok(raw) => Ok(serde_json::from_str(&raw)?),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                Err(BudgetError::ScenarioNotFound { id })
            }
            Err(e) => Err(e.into()),
        }
    }

    fn list(&self) -> Result<Vec<ScenarioSummary>, BudgetError> {
        Ok(self
            .read_all()?
            .into_iter()
            .map(|s| ScenarioSummary {
                id: s.id,
                name: s.name,
                created_at: s.created_at,
            })
            .collect())
    }

    fn delete(&mut self, id: Uuid) -> Result<bool, BudgetError> {
        match fs::remove_file(self.path_for(id)) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}

#[derive(Default)]
pub struct MemoryScenarioStore {
    scenarios: BTreeMap<Uuid, Scenario>,
}

impl MemoryScenarioStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ScenarioStore for MemoryScenarioStore {
    fn save(
        &mut self,
        name: &str,
        params: &PolicyParams,
        result: &CalculationResult,
    ) -> Result<Uuid, BudgetError> {
        let scenario = Scenario {
            id: Uuid::new_v4(),
            name: name.to_string(),
            created_at: Utc::now(),
            params: params.clone(),
            result: result.clone(),
        };
        let id = scenario.id;
        self.scenarios.insert(id, scenario);
        Ok(id)
    }

    fn load(&self, id: Uuid) -> Result<Scenario, BudgetError> {
        self.scenarios
            .get(&id)
            .cloned()
            .ok_or(BudgetError::ScenarioNotFound { id })
    }

    fn list(&self) -> Result<Vec<ScenarioSummary>, BudgetError> {
        let mut summaries: Vec<ScenarioSummary> = self
            .scenarios
            .values()
            .map(|s| ScenarioSummary {
                id: s.id,
                name: s.name.clone(),
                created_at: s.created_at,
            })
            .collect();
        summaries.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(summaries)
    }

    fn delete(&mut self, id: Uuid) -> Result<bool, BudgetError> {
        Ok(self.scenarios.remove(&id).is_some())
    }
}

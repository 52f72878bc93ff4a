use crate::core::workbook::{self, SheetBounds};
use crate::domain::model::{Scenario, ScenarioTable, SectorRow};
use crate::domain::ports::{ScenarioSources, Storage};
use crate::utils::error::{ForecastError, Result};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{OnceCell, RwLock};

/// Parsed scenario tables, filled lazily and kept for the life of the store.
/// Failed loads are never cached.
#[derive(Debug, Default)]
pub struct ScenarioCache {
    tables: RwLock<HashMap<Scenario, Arc<ScenarioTable>>>,
    sectors: OnceCell<Vec<String>>,
}

impl ScenarioCache {
    pub fn new() -> Self {
        Self::default()
    }

    async fn get(&self, scenario: Scenario) -> Option<Arc<ScenarioTable>> {
        self.tables.read().await.get(&scenario).cloned()
    }

    async fn put(&self, table: ScenarioTable) -> Arc<ScenarioTable> {
        let mut tables = self.tables.write().await;
        // 另一個呼叫可能已先寫入，保留第一份
        tables
            .entry(table.scenario)
            .or_insert_with(|| Arc::new(table))
            .clone()
    }
}

pub struct ScenarioStore<S: Storage, C: ScenarioSources> {
    storage: S,
    sources: C,
    cache: ScenarioCache,
}

impl<S: Storage, C: ScenarioSources> ScenarioStore<S, C> {
    pub fn new(storage: S, sources: C) -> Self {
        Self {
            storage,
            sources,
            cache: ScenarioCache::new(),
        }
    }

    /// Sector names from the Base table, rows in sheet order.
    pub async fn list_sectors(&self) -> Result<Vec<String>> {
        let sectors = self
            .cache
            .sectors
            .get_or_try_init(|| async {
                let table = self.table(Scenario::Base).await?;
                Ok::<_, ForecastError>(table.sector_names())
            })
            .await?;
        Ok(sectors.clone())
    }

    pub async fn table(&self, scenario: Scenario) -> Result<Arc<ScenarioTable>> {
        if let Some(table) = self.cache.get(scenario).await {
            tracing::debug!("Using cached {} scenario table", scenario);
            return Ok(table);
        }

        let table = self.load_table(scenario).await?;
        Ok(self.cache.put(table).await)
    }

    /// 找出情境表中第一個名稱完全相符的行
    pub async fn lookup_sector_row(&self, scenario: Scenario, sector: &str) -> Result<SectorRow> {
        let table = self.table(scenario).await?;
        table
            .find(sector)
            .cloned()
            .ok_or_else(|| ForecastError::SectorNotFound {
                scenario,
                sector: sector.to_string(),
            })
    }

    pub async fn cached_scenarios(&self) -> Vec<Scenario> {
        let tables = self.cache.tables.read().await;
        Scenario::ALL
            .into_iter()
            .filter(|scenario| tables.contains_key(scenario))
            .collect()
    }

    async fn load_table(&self, scenario: Scenario) -> Result<ScenarioTable> {
        let path = self.sources.scenario_file(scenario);
        tracing::info!("📥 Loading {} scenario from {}", scenario, path);

        let bytes = self
            .storage
            .read_file(path)
            .await
            .map_err(|e| ForecastError::data_unavailable(scenario, e.to_string()))?;

        let layout = self.sources.layout();
        let sheet = workbook::decode(path, bytes, SheetBounds::from(layout))
            .map_err(|e| ForecastError::data_unavailable(scenario, e.to_string()))?;

        workbook::build_table(scenario, &sheet, layout)
    }
}

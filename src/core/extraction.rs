use crate::core::store::ScenarioStore;
use crate::domain::model::{ForecastRequest, ForecastResult, ForecastType, ScenarioSelector};
use crate::domain::ports::{ForecastProvider, ScenarioSources, Storage};
use crate::utils::error::{ForecastError, Result};
use async_trait::async_trait;

pub struct ExtractionService<S: Storage, C: ScenarioSources> {
    store: ScenarioStore<S, C>,
}

impl<S: Storage, C: ScenarioSources> ExtractionService<S, C> {
    pub fn new(store: ScenarioStore<S, C>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &ScenarioStore<S, C> {
        &self.store
    }

    pub async fn extract_request(&self, request: &ForecastRequest) -> Result<ForecastResult> {
        self.extract_series(request.forecast_type, request.selector, &request.sectors)
            .await
    }

    async fn extract_series(
        &self,
        forecast_type: ForecastType,
        selector: ScenarioSelector,
        sectors: &[String],
    ) -> Result<ForecastResult> {
        let scenarios = selector.resolve();
        let mut result = ForecastResult::new(forecast_type);
        let mut available = Vec::with_capacity(scenarios.len());
        let mut last_error = None;

        // 一個情境檔案失敗不影響其他情境
        for scenario in &scenarios {
            match self.store.table(*scenario).await {
                Ok(_) => available.push(*scenario),
                Err(e) => {
                    tracing::warn!("⚠️ Skipping {} scenario: {}", scenario, e);
                    result.mark_unavailable(*scenario, e.to_string());
                    last_error = Some(e);
                }
            }
        }

        if available.is_empty() {
            return Err(last_error.unwrap_or_else(|| ForecastError::ValidationError {
                message: "No scenario selected".to_string(),
            }));
        }

        for sector in sectors {
            for scenario in &available {
                match self.store.lookup_sector_row(*scenario, sector).await {
                    Ok(row) => result.insert(sector, *scenario, row.series(forecast_type)),
                    Err(e) if e.is_recoverable() => {
                        tracing::debug!("{}", e);
                    }
                    Err(e) => return Err(e),
                }
            }
        }

        tracing::debug!(
            "Extracted {} for {} of {} sectors ({})",
            forecast_type,
            result.sectors.len(),
            sectors.len(),
            selector
        );

        Ok(result)
    }
}

#[async_trait]
impl<S: Storage, C: ScenarioSources> ForecastProvider for ExtractionService<S, C> {
    async fn list_sectors(&self) -> Result<Vec<String>> {
        self.store.list_sectors().await
    }

    async fn extract(
        &self,
        forecast_type: ForecastType,
        selector: ScenarioSelector,
        sectors: &[String],
    ) -> Result<ForecastResult> {
        self.extract_series(forecast_type, selector, sectors).await
    }
}

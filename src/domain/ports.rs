use crate::domain::model::{ForecastResult, ForecastType, Scenario, ScenarioSelector, SheetLayout};
use crate::utils::error::Result;
use async_trait::async_trait;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

/// Where each scenario workbook lives and how its sheet is laid out.
pub trait ScenarioSources: Send + Sync {
    fn scenario_file(&self, scenario: Scenario) -> &str;
    fn layout(&self) -> &SheetLayout;
}

/// The two entry points the UI layer calls.
#[async_trait]
pub trait ForecastProvider: Send + Sync {
    async fn list_sectors(&self) -> Result<Vec<String>>;
    async fn extract(
        &self,
        forecast_type: ForecastType,
        selector: ScenarioSelector,
        sectors: &[String],
    ) -> Result<ForecastResult>;
}

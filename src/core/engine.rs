use crate::domain::model::{ForecastRequest, ForecastResult};
use crate::domain::ports::ForecastProvider;
use crate::utils::error::Result;
use crate::utils::monitor::SystemMonitor;
use crate::utils::validation::Validate;

/// Drives one dashboard interaction: validate the selection, extract, report.
pub struct ForecastEngine<P: ForecastProvider> {
    provider: P,
    monitor: SystemMonitor,
}

impl<P: ForecastProvider> ForecastEngine<P> {
    pub fn new(provider: P) -> Self {
        Self::new_with_monitoring(provider, false)
    }

    pub fn new_with_monitoring(provider: P, monitor_enabled: bool) -> Self {
        Self {
            provider,
            monitor: SystemMonitor::new(monitor_enabled),
        }
    }

    /// 取得儀表板的產業選單
    pub async fn sectors(&self) -> Result<Vec<String>> {
        let sectors = self.provider.list_sectors().await?;
        tracing::info!("Found {} sectors in Base scenario", sectors.len());
        self.monitor.log_stats("Sector listing");
        Ok(sectors)
    }

    pub async fn run(&self, request: &ForecastRequest) -> Result<ForecastResult> {
        request.validate()?;

        tracing::info!(
            "🔎 Extracting {} ({}) for {}",
            request.forecast_type,
            request.selector,
            request.sectors.join(", ")
        );

        let result = self
            .provider
            .extract(request.forecast_type, request.selector, &request.sectors)
            .await?;

        for missing in &request.sectors {
            if result.scenarios_for(missing).is_empty() {
                tracing::warn!("No {} data for sector '{}'", request.forecast_type, missing);
            }
        }
        for unavailable in &result.unavailable {
            tracing::warn!(
                "{} scenario left out: {}",
                unavailable.scenario,
                unavailable.reason
            );
        }

        tracing::info!(
            "✅ Extracted {} sector(s) across {} scenario(s)",
            result.sectors.len(),
            request.selector.resolve().len() - result.unavailable.len()
        );
        self.monitor.log_stats("Extraction");
        self.monitor.log_final_stats();

        Ok(result)
    }
}

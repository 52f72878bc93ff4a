pub mod config;
pub mod core;
pub mod domain;
pub mod render;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use config::{storage::LocalStorage, toml_config::TomlConfig, ScenarioFiles};
pub use self::core::{engine::ForecastEngine, extraction::ExtractionService, store::ScenarioStore};
pub use domain::model::{
    CellValue, ForecastRequest, ForecastResult, ForecastSeries, ForecastType, Scenario,
    ScenarioSelector, SheetLayout,
};
pub use utils::error::{ForecastError, Result};

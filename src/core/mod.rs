pub mod engine;
pub mod extraction;
pub mod store;
pub mod workbook;

pub use crate::domain::model::{ForecastRequest, ForecastResult, Scenario, ScenarioTable};
pub use crate::domain::ports::{ForecastProvider, ScenarioSources, Storage};
pub use crate::utils::error::Result;

pub mod storage;
pub mod toml_config;

use crate::core::workbook::SUPPORTED_EXTENSIONS;
use crate::domain::model::Scenario;
use crate::utils::error::Result;
use crate::utils::validation::{validate_file_extensions, validate_path};
use serde::{Deserialize, Serialize};

#[cfg(feature = "cli")]
use crate::core::ScenarioSources;
#[cfg(feature = "cli")]
use crate::domain::model::{ForecastType, ScenarioSelector, SheetLayout};
#[cfg(feature = "cli")]
use crate::render::OutputFormat;
#[cfg(feature = "cli")]
use clap::{Parser, Subcommand};

/// One workbook per scenario, relative to the data directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioFiles {
    pub base: String,
    pub high: String,
    pub low: String,
}

impl Default for ScenarioFiles {
    fn default() -> Self {
        Self {
            base: "BaseScenario.xlsx".to_string(),
            high: "HighScenario.xlsx".to_string(),
            low: "LowScenario.xlsx".to_string(),
        }
    }
}

impl ScenarioFiles {
    pub fn get(&self, scenario: Scenario) -> &str {
        match scenario {
            Scenario::Base => &self.base,
            Scenario::High => &self.high,
            Scenario::Low => &self.low,
        }
    }

    pub fn validate_files(&self, field_prefix: &str) -> Result<()> {
        for scenario in Scenario::ALL {
            let field = format!("{}.{}", field_prefix, scenario.as_str().to_ascii_lowercase());
            let file = self.get(scenario);
            validate_path(&field, file)?;
            validate_file_extensions(&field, &[file], &SUPPORTED_EXTENSIONS)?;
        }
        Ok(())
    }
}

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Parser)]
#[command(name = "sector-forecast")]
#[command(about = "Rent growth and return forecasts by real-estate sector and scenario")]
pub struct CliConfig {
    #[command(subcommand)]
    pub command: Command,

    /// Directory holding the scenario workbooks
    #[arg(long, global = true, default_value = ".")]
    pub data_dir: String,

    #[arg(long, global = true, default_value = "BaseScenario.xlsx")]
    pub base_file: String,

    #[arg(long, global = true, default_value = "HighScenario.xlsx")]
    pub high_file: String,

    #[arg(long, global = true, default_value = "LowScenario.xlsx")]
    pub low_file: String,

    /// TOML configuration; replaces the file and directory flags when given
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    #[arg(long, global = true, value_enum, default_value = "text")]
    pub format: OutputFormat,

    /// Write the rendered result here instead of stdout (relative to --data-dir)
    #[arg(short, long, global = true)]
    pub output: Option<String>,

    #[arg(short, long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, global = true, help = "Emit logs as JSON")]
    pub json_logs: bool,

    #[arg(long, global = true, help = "Log CPU and memory usage per phase")]
    pub monitor: bool,

    #[arg(skip)]
    pub layout: SheetLayout,

    #[arg(skip)]
    files: Option<ScenarioFiles>,
}

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// List the sectors available in the Base scenario
    Sectors,
    /// Extract a forecast for up to three sectors
    Extract {
        /// "rent-growth" or "return-forecast"
        #[arg(long)]
        forecast: ForecastType,

        /// Base, High, Low or All
        #[arg(long, default_value = "All")]
        scenario: ScenarioSelector,

        /// Sector name, repeat for more (max 3)
        #[arg(long = "sector", required = true)]
        sectors: Vec<String>,
    },
}

#[cfg(feature = "cli")]
impl CliConfig {
    pub fn scenario_files(&self) -> ScenarioFiles {
        self.files.clone().unwrap_or_else(|| ScenarioFiles {
            base: self.base_file.clone(),
            high: self.high_file.clone(),
            low: self.low_file.clone(),
        })
    }

    /// 以 TOML 設定覆蓋檔案位置與版面
    pub fn apply_toml(&mut self, toml: &toml_config::TomlConfig) {
        self.data_dir = toml.source.data_dir.clone();
        self.files = Some(toml.scenarios.clone());
        self.layout = toml.layout.clone().unwrap_or_default();
        if toml.monitoring_enabled() {
            self.monitor = true;
        }
    }
}

#[cfg(feature = "cli")]
impl ScenarioSources for CliConfig {
    fn scenario_file(&self, scenario: Scenario) -> &str {
        match &self.files {
            Some(files) => files.get(scenario),
            None => match scenario {
                Scenario::Base => &self.base_file,
                Scenario::High => &self.high_file,
                Scenario::Low => &self.low_file,
            },
        }
    }

    fn layout(&self) -> &SheetLayout {
        &self.layout
    }
}

#[cfg(feature = "cli")]
impl crate::utils::validation::Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validate_path("data_dir", &self.data_dir)?;
        self.scenario_files().validate_files("files")?;
        crate::utils::validation::Validate::validate(&self.layout)
    }
}

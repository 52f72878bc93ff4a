use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One of the three economic forecast cases shipped as separate workbooks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Scenario {
    Base,
    High,
    Low,
}

impl Scenario {
    /// Iteration order used whenever "All" is selected.
    pub const ALL: [Scenario; 3] = [Scenario::Base, Scenario::High, Scenario::Low];

    pub fn as_str(&self) -> &'static str {
        match self {
            Scenario::Base => "Base",
            Scenario::High => "High",
            Scenario::Low => "Low",
        }
    }
}

impl fmt::Display for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Scenario {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "base" => Ok(Scenario::Base),
            "high" => Ok(Scenario::High),
            "low" => Ok(Scenario::Low),
            other => Err(format!("unknown scenario '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScenarioSelector {
    Single(Scenario),
    All,
}

impl ScenarioSelector {
    /// 將選擇器展開為有序的情境清單
    pub fn resolve(&self) -> Vec<Scenario> {
        match self {
            ScenarioSelector::Single(scenario) => vec![*scenario],
            ScenarioSelector::All => Scenario::ALL.to_vec(),
        }
    }
}

impl fmt::Display for ScenarioSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScenarioSelector::Single(scenario) => scenario.fmt(f),
            ScenarioSelector::All => f.write_str("All"),
        }
    }
}

impl FromStr for ScenarioSelector {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("all") {
            return Ok(ScenarioSelector::All);
        }
        s.parse().map(ScenarioSelector::Single)
    }
}

impl From<Scenario> for ScenarioSelector {
    fn from(scenario: Scenario) -> Self {
        ScenarioSelector::Single(scenario)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ForecastType {
    RentGrowth,
    ReturnForecast,
}

impl ForecastType {
    pub fn label(&self) -> &'static str {
        match self {
            ForecastType::RentGrowth => "Rent Growth",
            ForecastType::ReturnForecast => "Return Forecast",
        }
    }
}

impl fmt::Display for ForecastType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ForecastType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .chars()
            .filter(|c| !matches!(c, ' ' | '-' | '_'))
            .collect::<String>()
            .to_ascii_lowercase();
        match normalized.as_str() {
            "rentgrowth" => Ok(ForecastType::RentGrowth),
            "returnforecast" => Ok(ForecastType::ReturnForecast),
            _ => Err(format!("unknown forecast type '{}'", s)),
        }
    }
}

/// Literal contents of a spreadsheet cell. Values pass through untouched, so a
/// placeholder such as "n/a" stays text rather than being dropped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(untagged)]
pub enum CellValue {
    Number(f64),
    Bool(bool),
    Text(String),
    #[default]
    Empty,
}

impl CellValue {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Number(n) => write!(f, "{}", n),
            CellValue::Bool(b) => write!(f, "{}", if *b { "TRUE" } else { "FALSE" }),
            CellValue::Text(s) => f.write_str(s),
            CellValue::Empty => Ok(()),
        }
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        CellValue::Number(value)
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::Text(value.to_string())
    }
}

pub const RENT_GROWTH_YEARS: usize = 6;

/// Fixed physical layout of a scenario sheet, 0-indexed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SheetLayout {
    pub first_sector_row: u32,
    pub last_sector_row: u32,
    pub sector_name_col: u32,
    /// First of six consecutive rent growth columns (N..S).
    pub rent_growth_start_col: u32,
    /// Unlevered 6-year return (W).
    pub unlevered_return_col: u32,
    /// Net levered fund-level return (AF).
    pub levered_return_col: u32,
}

impl Default for SheetLayout {
    fn default() -> Self {
        Self {
            first_sector_row: 2,
            last_sector_row: 20,
            sector_name_col: 2,
            rent_growth_start_col: 13,
            unlevered_return_col: 22,
            levered_return_col: 31,
        }
    }
}

impl SheetLayout {
    pub fn rent_growth_cols(&self) -> std::ops::RangeInclusive<u32> {
        self.rent_growth_start_col..=self.rent_growth_start_col + RENT_GROWTH_YEARS as u32 - 1
    }

    /// Highest column any lookup touches; decoding keeps nothing past it.
    pub fn max_col(&self) -> u32 {
        [
            self.sector_name_col,
            *self.rent_growth_cols().end(),
            self.unlevered_return_col,
            self.levered_return_col,
        ]
        .into_iter()
        .max()
        .unwrap_or(0)
    }
}

/// One sector row, extracted at load time so nothing downstream indexes by column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectorRow {
    pub row_index: u32,
    pub name: String,
    pub rent_growth: [CellValue; RENT_GROWTH_YEARS],
    pub unlevered_return: CellValue,
    pub levered_return: CellValue,
}

impl SectorRow {
    pub fn series(&self, forecast_type: ForecastType) -> ForecastSeries {
        match forecast_type {
            ForecastType::RentGrowth => ForecastSeries::RentGrowth {
                years: self.rent_growth.clone(),
            },
            ForecastType::ReturnForecast => ForecastSeries::ReturnForecast {
                unlevered: self.unlevered_return.clone(),
                levered: self.levered_return.clone(),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioTable {
    pub scenario: Scenario,
    pub rows: Vec<SectorRow>,
}

impl ScenarioTable {
    pub fn sector_names(&self) -> Vec<String> {
        self.rows.iter().map(|row| row.name.clone()).collect()
    }

    /// 以完全相符的名稱搜尋第一個符合的行
    pub fn find(&self, sector: &str) -> Option<&SectorRow> {
        self.rows.iter().find(|row| row.name == sector)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ForecastSeries {
    RentGrowth {
        years: [CellValue; RENT_GROWTH_YEARS],
    },
    ReturnForecast {
        unlevered: CellValue,
        levered: CellValue,
    },
}

impl ForecastSeries {
    /// Six values for rent growth, `[unlevered, levered]` for returns.
    pub fn values(&self) -> Vec<CellValue> {
        match self {
            ForecastSeries::RentGrowth { years } => years.to_vec(),
            ForecastSeries::ReturnForecast { unlevered, levered } => {
                vec![unlevered.clone(), levered.clone()]
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastRequest {
    pub forecast_type: ForecastType,
    pub selector: ScenarioSelector,
    pub sectors: Vec<String>,
}

pub const MAX_SECTORS: usize = 3;

impl ForecastRequest {
    /// Duplicate sector names are dropped, keeping the first occurrence.
    pub fn new<I, S>(forecast_type: ForecastType, selector: ScenarioSelector, sectors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut unique: Vec<String> = Vec::new();
        for sector in sectors {
            let sector = sector.into();
            if !unique.contains(&sector) {
                unique.push(sector);
            }
        }
        Self {
            forecast_type,
            selector,
            sectors: unique,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioSeries {
    pub scenario: Scenario,
    pub series: ForecastSeries,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectorForecast {
    pub sector: String,
    pub scenarios: Vec<ScenarioSeries>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnavailableScenario {
    pub scenario: Scenario,
    pub reason: String,
}

/// Sector -> scenario -> series, kept in insertion order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastResult {
    pub forecast_type: ForecastType,
    pub sectors: Vec<SectorForecast>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub unavailable: Vec<UnavailableScenario>,
}

impl ForecastResult {
    pub fn new(forecast_type: ForecastType) -> Self {
        Self {
            forecast_type,
            sectors: Vec::new(),
            unavailable: Vec::new(),
        }
    }

    pub fn insert(&mut self, sector: &str, scenario: Scenario, series: ForecastSeries) {
        let index = match self.sectors.iter().position(|s| s.sector == sector) {
            Some(index) => index,
            None => {
                self.sectors.push(SectorForecast {
                    sector: sector.to_string(),
                    scenarios: Vec::new(),
                });
                self.sectors.len() - 1
            }
        };
        let entry = &mut self.sectors[index];
        match entry.scenarios.iter_mut().find(|s| s.scenario == scenario) {
            Some(existing) => existing.series = series,
            None => entry.scenarios.push(ScenarioSeries { scenario, series }),
        }
    }

    pub fn mark_unavailable(&mut self, scenario: Scenario, reason: impl Into<String>) {
        self.unavailable.push(UnavailableScenario {
            scenario,
            reason: reason.into(),
        });
    }

    pub fn get(&self, sector: &str, scenario: Scenario) -> Option<&ForecastSeries> {
        self.scenarios_for(sector)
            .iter()
            .find(|s| s.scenario == scenario)
            .map(|s| &s.series)
    }

    /// Empty when the sector matched in no scenario.
    pub fn scenarios_for(&self, sector: &str) -> &[ScenarioSeries] {
        self.sectors
            .iter()
            .find(|s| s.sector == sector)
            .map(|s| s.scenarios.as_slice())
            .unwrap_or(&[])
    }

    pub fn sector_names(&self) -> Vec<&str> {
        self.sectors.iter().map(|s| s.sector.as_str()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.sectors.is_empty()
    }
}

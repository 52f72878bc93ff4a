//! Plain output for a [`ForecastResult`]. Charting is left to the dashboard
//! front end; this module only produces text, JSON or CSV.

use crate::domain::model::{CellValue, ForecastResult, ForecastType, RENT_GROWTH_YEARS};
use crate::utils::error::{ForecastError, Result};
use std::fmt::Write as _;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
    Csv,
}

pub fn year_labels() -> Vec<String> {
    (1..=RENT_GROWTH_YEARS).map(|year| format!("Year {}", year)).collect()
}

pub fn render(result: &ForecastResult, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Text => Ok(render_text(result)),
        OutputFormat::Json => Ok(serde_json::to_string_pretty(result)?),
        OutputFormat::Csv => render_csv(result),
    }
}

pub fn render_sectors(sectors: &[String], format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(sectors)?),
        OutputFormat::Text | OutputFormat::Csv => {
            let mut out = String::new();
            for sector in sectors {
                out.push_str(sector);
                out.push('\n');
            }
            Ok(out)
        }
    }
}

fn cell_text(cell: &CellValue) -> String {
    match cell {
        CellValue::Number(n) => format!("{:.2}", n),
        CellValue::Empty => "-".to_string(),
        other => other.to_string(),
    }
}

fn render_text(result: &ForecastResult) -> String {
    let mut out = String::new();
    let title = match result.forecast_type {
        ForecastType::RentGrowth => "Rent Growth Forecasts",
        ForecastType::ReturnForecast => "6-Year Returns (Unlevered and Levered)",
    };
    let _ = writeln!(out, "{}", title);

    if result.is_empty() {
        let _ = writeln!(out, "\nNo matching sectors.");
    }

    for sector in &result.sectors {
        let _ = writeln!(out, "\n{} - {}", sector.sector, result.forecast_type);

        let header: Vec<String> = match result.forecast_type {
            ForecastType::RentGrowth => year_labels(),
            ForecastType::ReturnForecast => vec!["Unlevered".to_string(), "Levered".to_string()],
        };
        let _ = write!(out, "  {:<10}", "Scenario");
        for label in &header {
            let _ = write!(out, "{:>11}", label);
        }
        out.push('\n');

        for entry in &sector.scenarios {
            let _ = write!(out, "  {:<10}", entry.scenario.as_str());
            for value in entry.series.values() {
                let _ = write!(out, "{:>11}", cell_text(&value));
            }
            out.push('\n');
        }
    }

    for unavailable in &result.unavailable {
        let _ = writeln!(
            out,
            "\n! {} scenario unavailable: {}",
            unavailable.scenario, unavailable.reason
        );
    }

    out
}

fn render_csv(result: &ForecastResult) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    let mut header = vec!["sector".to_string(), "scenario".to_string()];
    match result.forecast_type {
        ForecastType::RentGrowth => header.extend(year_labels()),
        ForecastType::ReturnForecast => {
            header.extend(["unlevered".to_string(), "levered".to_string()])
        }
    }
    writer.write_record(&header)?;

    for sector in &result.sectors {
        for entry in &sector.scenarios {
            let mut record = vec![sector.sector.clone(), entry.scenario.to_string()];
            record.extend(entry.series.values().iter().map(CellValue::to_string));
            writer.write_record(&record)?;
        }
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| ForecastError::IoError(e.into_error()))?;
    String::from_utf8(bytes)
        .map_err(|e| ForecastError::IoError(std::io::Error::new(std::io::ErrorKind::InvalidData, e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{ForecastSeries, Scenario};

    fn returns() -> ForecastResult {
        let mut result = ForecastResult::new(ForecastType::ReturnForecast);
        result.insert(
            "Office",
            Scenario::Base,
            ForecastSeries::ReturnForecast {
                unlevered: CellValue::Number(6.25),
                levered: CellValue::Text("n/a".to_string()),
            },
        );
        result.mark_unavailable(Scenario::Low, "file missing");
        result
    }

    #[test]
    fn test_text_output_lists_scenarios_and_gaps() {
        let text = render(&returns(), OutputFormat::Text).unwrap();
        assert!(text.contains("6-Year Returns (Unlevered and Levered)"));
        assert!(text.contains("Office - Return Forecast"));
        assert!(text.contains("6.25"));
        assert!(text.contains("n/a"));
        assert!(text.contains("Low scenario unavailable: file missing"));
    }

    #[test]
    fn test_csv_output() {
        let csv = render(&returns(), OutputFormat::Csv).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], "sector,scenario,unlevered,levered");
        assert_eq!(lines[1], "Office,Base,6.25,n/a");
        assert_eq!(lines.len(), 2);
    }

    #[test]
    fn test_rent_growth_text_has_year_columns() {
        let mut result = ForecastResult::new(ForecastType::RentGrowth);
        result.insert(
            "Industrial",
            Scenario::High,
            ForecastSeries::RentGrowth {
                years: std::array::from_fn(|i| CellValue::Number(i as f64)),
            },
        );
        let text = render(&result, OutputFormat::Text).unwrap();
        assert!(text.contains("Year 1"));
        assert!(text.contains("Year 6"));
        assert!(text.contains("High"));
        assert!(text.contains("5.00"));
    }
}

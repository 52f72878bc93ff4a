use anyhow::Result;
use sector_forecast::core::ForecastProvider;
use sector_forecast::render::{render, OutputFormat};
use sector_forecast::{
    CellValue, ExtractionService, ForecastError, ForecastType, LocalStorage, Scenario,
    ScenarioSelector, ScenarioStore, TomlConfig,
};
use std::path::Path;
use tempfile::TempDir;

/// CSV exports of the scenario sheets, one line per spreadsheet row.
fn write_csv(path: &Path, width: usize, rows: &[(usize, &str, Vec<(usize, &str)>)]) -> Result<()> {
    let mut lines = Vec::new();
    let height = rows.iter().map(|(row, _, _)| *row).max().unwrap_or(0) + 1;
    for line in 0..height {
        let mut cells = vec![String::new(); width];
        if let Some((_, name, values)) = rows.iter().find(|(row, _, _)| *row == line) {
            cells[2] = name.to_string();
            for (col, value) in values {
                cells[*col] = value.to_string();
            }
        } else {
            cells[0] = format!("row {}", line);
        }
        lines.push(cells.join(","));
    }
    std::fs::write(path, lines.join("\n"))?;
    Ok(())
}

fn service(dir: &Path, extra: &str) -> Result<ExtractionService<LocalStorage, TomlConfig>> {
    let content = format!(
        r#"
[source]
data_dir = "{}"

[scenarios]
base = "base.csv"
high = "high.csv"
low = "low.csv"
{}
"#,
        dir.to_str().unwrap().replace('\\', "/"),
        extra
    );
    let config = TomlConfig::from_toml_str(&content)?;
    let storage = LocalStorage::new(config.data_dir().to_string());
    Ok(ExtractionService::new(ScenarioStore::new(storage, config)))
}

#[tokio::test]
async fn test_csv_scenarios_with_default_layout() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let dir = temp_dir.path();
    let office = vec![(13, "1.5"), (14, "1.6"), (15, "1.7"), (16, "1.8"), (17, "1.9"), (18, "2.0"), (22, "7.1"), (31, "9.4")];

    write_csv(&dir.join("base.csv"), 32, &[(2, "Office", office.clone()), (4, "Retail", vec![(22, "5")])])?;
    write_csv(&dir.join("high.csv"), 32, &[(2, "Office", office.clone())])?;
    write_csv(&dir.join("low.csv"), 32, &[(3, "Office", vec![(22, "TBD")])])?;

    let service = service(dir, "")?;
    assert_eq!(service.list_sectors().await?, vec!["Office", "Retail"]);

    let result = service
        .extract(ForecastType::ReturnForecast, ScenarioSelector::All, &["Office".to_string()])
        .await?;
    assert_eq!(result.scenarios_for("Office").len(), 3);
    let low = result.get("Office", Scenario::Low).unwrap().values();
    assert_eq!(low[0], CellValue::Text("TBD".to_string()));
    assert_eq!(low[1], CellValue::Empty);

    let csv = render(&result, OutputFormat::Csv)?;
    assert!(csv.contains("Office,Base,7.1,9.4"));
    assert!(csv.contains("Office,Low,TBD,"));
    Ok(())
}

#[tokio::test]
async fn test_layout_override_moves_columns() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let dir = temp_dir.path();
    let values = vec![(3, "0.5"), (4, "0.6"), (5, "0.7"), (6, "0.8"), (7, "0.9"), (8, "1.0"), (9, "4.0"), (10, "6.0")];
    for name in ["base.csv", "high.csv", "low.csv"] {
        write_csv(&dir.join(name), 11, &[(1, "Logistics", values.clone())])?;
    }

    let layout = r#"
[layout]
first_sector_row = 1
last_sector_row = 5
rent_growth_start_col = 3
unlevered_return_col = 9
levered_return_col = 10
"#;
    let service = service(dir, layout)?;

    let result = service
        .extract(
            ForecastType::RentGrowth,
            ScenarioSelector::Single(Scenario::High),
            &["Logistics".to_string()],
        )
        .await?;
    let years = result.get("Logistics", Scenario::High).unwrap().values();
    assert_eq!(years.first(), Some(&CellValue::Number(0.5)));
    assert_eq!(years.last(), Some(&CellValue::Number(1.0)));
    Ok(())
}

#[tokio::test]
async fn test_base_sheet_without_name_column_is_unavailable() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let dir = temp_dir.path();
    std::fs::write(dir.join("base.csv"), "title,x\nheader,x\nOffice,x\n")?;

    let service = service(dir, "")?;
    let err = service.list_sectors().await.unwrap_err();
    assert!(matches!(
        err,
        ForecastError::DataUnavailable {
            scenario: Scenario::Base,
            ..
        }
    ));
    Ok(())
}

#[tokio::test]
async fn test_export_trimmed_after_last_filled_column() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let dir = temp_dir.path();
    // 匯出工具會丟掉尾端的空欄，只剩到無槓桿報酬欄
    write_csv(&dir.join("base.csv"), 23, &[(2, "Office", vec![(13, "1.5"), (22, "7.1")])])?;

    let service = service(dir, "")?;
    assert_eq!(service.list_sectors().await?, vec!["Office"]);

    let result = service
        .extract(
            ForecastType::ReturnForecast,
            ScenarioSelector::Single(Scenario::Base),
            &["Office".to_string()],
        )
        .await?;
    let values = result.get("Office", Scenario::Base).unwrap().values();
    assert_eq!(values[0], CellValue::Number(7.1));
    assert_eq!(values[1], CellValue::Empty);
    Ok(())
}

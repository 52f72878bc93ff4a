use crate::domain::model::{CellValue, Scenario, ScenarioTable, SectorRow, SheetLayout};
use crate::utils::error::{ForecastError, Result};
use calamine::{open_workbook_auto_from_rs, Data, DataRef, Reader, Sheets, Xlsx};
use std::io::{Cursor, Read, Seek};
use std::path::Path;

pub const SPREADSHEET_EXTENSIONS: [&str; 5] = ["xlsx", "xlsm", "xlsb", "xls", "ods"];
pub const SUPPORTED_EXTENSIONS: [&str; 6] = ["xlsx", "xlsm", "xlsb", "xls", "ods", "csv"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkbookFormat {
    Spreadsheet,
    Csv,
}

impl WorkbookFormat {
    pub fn from_path(path: &str) -> Option<Self> {
        let extension = Path::new(path)
            .extension()
            .and_then(|ext| ext.to_str())?
            .to_ascii_lowercase();
        if extension == "csv" {
            Some(WorkbookFormat::Csv)
        } else if SPREADSHEET_EXTENSIONS.contains(&extension.as_str()) {
            Some(WorkbookFormat::Spreadsheet)
        } else {
            None
        }
    }
}

/// First worksheet of a scenario file as an absolute, row-major grid, clipped
/// to the rows and columns the layout reads.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawSheet {
    rows: Vec<Vec<CellValue>>,
}

impl RawSheet {
    pub fn new(rows: Vec<Vec<CellValue>>) -> Self {
        Self { rows }
    }

    pub fn height(&self) -> usize {
        self.rows.len()
    }

    pub fn width(&self) -> usize {
        self.rows.iter().map(Vec::len).max().unwrap_or(0)
    }

    pub fn cell(&self, row: u32, col: u32) -> CellValue {
        self.rows
            .get(row as usize)
            .and_then(|r| r.get(col as usize))
            .cloned()
            .unwrap_or_default()
    }

    fn set(&mut self, row: u32, col: u32, value: CellValue) {
        let (row, col) = (row as usize, col as usize);
        if self.rows.len() <= row {
            self.rows.resize_with(row + 1, Vec::new);
        }
        let cells = &mut self.rows[row];
        if cells.len() <= col {
            cells.resize_with(col + 1, CellValue::default);
        }
        cells[col] = value;
    }
}

/// Last row and column (inclusive) that decoding keeps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SheetBounds {
    pub last_row: u32,
    pub last_col: u32,
}

impl From<&SheetLayout> for SheetBounds {
    fn from(layout: &SheetLayout) -> Self {
        Self {
            last_row: layout.last_sector_row,
            last_col: layout.max_col(),
        }
    }
}

pub fn decode(path: &str, bytes: Vec<u8>, bounds: SheetBounds) -> Result<RawSheet> {
    match WorkbookFormat::from_path(path) {
        Some(WorkbookFormat::Spreadsheet) => decode_spreadsheet(bytes, bounds),
        Some(WorkbookFormat::Csv) => decode_csv(&bytes, bounds),
        None => Err(ForecastError::ValidationError {
            message: format!(
                "Unsupported scenario file '{}'. Allowed extensions: {}",
                path,
                SUPPORTED_EXTENSIONS.join(", ")
            ),
        }),
    }
}

fn decode_spreadsheet(bytes: Vec<u8>, bounds: SheetBounds) -> Result<RawSheet> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes))?;

    // xlsx 逐格串流，遠處的零星儲存格不會展開成整張表
    if let Sheets::Xlsx(xlsx) = &mut workbook {
        return decode_xlsx_cells(xlsx, bounds);
    }

    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| ForecastError::ValidationError {
            message: "Workbook contains no sheets".to_string(),
        })??;

    // range 從第一個非空儲存格開始，這裡改用絕對座標
    let Some((end_row, end_col)) = range.end() else {
        return Ok(RawSheet::default());
    };
    let Some((start_row, start_col)) = range.start() else {
        return Ok(RawSheet::default());
    };

    let mut sheet = RawSheet::default();
    for row in start_row..=end_row.min(bounds.last_row) {
        for col in start_col..=end_col.min(bounds.last_col) {
            if let Some(data) = range.get_value((row, col)) {
                sheet.set(row, col, cell_from_data(data));
            }
        }
    }

    Ok(sheet)
}

fn decode_xlsx_cells<RS: Read + Seek>(xlsx: &mut Xlsx<RS>, bounds: SheetBounds) -> Result<RawSheet> {
    let sheet_name = xlsx
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| ForecastError::ValidationError {
            message: "Workbook contains no sheets".to_string(),
        })?;

    let mut cells = xlsx
        .worksheet_cells_reader(&sheet_name)
        .map_err(calamine::Error::Xlsx)?;

    let mut sheet = RawSheet::default();
    while let Some(cell) = cells.next_cell().map_err(calamine::Error::Xlsx)? {
        let (row, col) = cell.get_position();
        // 儲存格依列排序，超過最後一列即可停止
        if row > bounds.last_row {
            break;
        }
        if col <= bounds.last_col {
            sheet.set(row, col, cell_from_data_ref(cell.get_value()));
        }
    }

    Ok(sheet)
}

fn cell_from_data(data: &Data) -> CellValue {
    match data {
        Data::Empty => CellValue::Empty,
        Data::String(s) => CellValue::Text(s.clone()),
        Data::Float(n) => CellValue::Number(*n),
        Data::Int(n) => CellValue::Number(*n as f64),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::Error(e) => CellValue::Text(e.to_string()),
        Data::DateTime(dt) => CellValue::Number(dt.as_f64()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => CellValue::Text(s.clone()),
    }
}

fn cell_from_data_ref(data: &DataRef<'_>) -> CellValue {
    match data {
        DataRef::Empty => CellValue::Empty,
        DataRef::String(s) => CellValue::Text(s.clone()),
        DataRef::SharedString(s) => CellValue::Text(s.to_string()),
        DataRef::Float(n) => CellValue::Number(*n),
        DataRef::Int(n) => CellValue::Number(*n as f64),
        DataRef::Bool(b) => CellValue::Bool(*b),
        DataRef::Error(e) => CellValue::Text(e.to_string()),
        DataRef::DateTime(dt) => CellValue::Number(dt.as_f64()),
        DataRef::DateTimeIso(s) | DataRef::DurationIso(s) => CellValue::Text(s.clone()),
    }
}

fn decode_csv(bytes: &[u8], bounds: SheetBounds) -> Result<RawSheet> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(bytes);

    let keep_cols = bounds.last_col as usize + 1;
    let mut rows = Vec::new();
    for record in reader.records().take(bounds.last_row as usize + 1) {
        let record = record?;
        rows.push(record.iter().take(keep_cols).map(cell_from_text).collect());
    }

    Ok(RawSheet::new(rows))
}

fn cell_from_text(raw: &str) -> CellValue {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return CellValue::Empty;
    }
    match trimmed.parse::<f64>() {
        Ok(n) => CellValue::Number(n),
        Err(_) => CellValue::Text(raw.to_string()),
    }
}

/// 依固定欄位偏移量建立情境表。只要求產業名稱欄存在，缺少的預測欄讀為空值。
pub fn build_table(scenario: Scenario, sheet: &RawSheet, layout: &SheetLayout) -> Result<ScenarioTable> {
    let min_height = layout.first_sector_row as usize + 1;
    let min_width = layout.sector_name_col as usize + 1;
    if sheet.height() < min_height || sheet.width() < min_width {
        return Err(ForecastError::data_unavailable(
            scenario,
            format!(
                "sheet is {}x{}, expected at least {} rows and {} columns",
                sheet.height(),
                sheet.width(),
                min_height,
                min_width
            ),
        ));
    }

    let mut rows = Vec::new();
    for row_index in layout.first_sector_row..=layout.last_sector_row {
        let name = match sheet.cell(row_index, layout.sector_name_col) {
            CellValue::Text(s) if !s.trim().is_empty() => s,
            CellValue::Number(n) => n.to_string(),
            _ => continue,
        };

        let rent_growth = std::array::from_fn(|i| {
            sheet.cell(row_index, layout.rent_growth_start_col + i as u32)
        });

        rows.push(SectorRow {
            row_index,
            name,
            rent_growth,
            unlevered_return: sheet.cell(row_index, layout.unlevered_return_col),
            levered_return: sheet.cell(row_index, layout.levered_return_col),
        });
    }

    tracing::debug!(
        "Parsed {} sector rows from {} scenario sheet",
        rows.len(),
        scenario
    );

    Ok(ScenarioTable { scenario, rows })
}

#[cfg(test)]
mod tests {
    use super::*;
    use calamine::CellErrorType;

    fn csv_sheet(rows: &[&str]) -> RawSheet {
        decode_csv(rows.join("\n").as_bytes(), SheetBounds::from(&SheetLayout::default())).unwrap()
    }

    fn sector_line(name: &str, base: f64) -> String {
        let mut cells = vec![String::new(); 32];
        cells[2] = name.to_string();
        for (i, cell) in cells[13..=18].iter_mut().enumerate() {
            *cell = format!("{}", base + i as f64);
        }
        cells[22] = format!("{}", base * 2.0);
        cells[31] = format!("{}", base * 3.0);
        cells.join(",")
    }

    #[test]
    fn test_format_from_extension() {
        assert_eq!(WorkbookFormat::from_path("BaseScenario.xlsx"), Some(WorkbookFormat::Spreadsheet));
        assert_eq!(WorkbookFormat::from_path("low.CSV"), Some(WorkbookFormat::Csv));
        assert_eq!(WorkbookFormat::from_path("notes.txt"), None);
        assert!(decode("notes.txt", Vec::new(), SheetBounds::from(&SheetLayout::default())).is_err());
    }

    #[test]
    fn test_csv_cells_keep_placeholders() {
        let sheet = csv_sheet(&["1.5,n/a,,-2,   , 4 "]);
        assert_eq!(sheet.cell(0, 0), CellValue::Number(1.5));
        assert_eq!(sheet.cell(0, 4), CellValue::Empty);
        assert_eq!(sheet.cell(0, 5), CellValue::Number(4.0));
        assert_eq!(sheet.cell(0, 1), CellValue::Text("n/a".to_string()));
        assert_eq!(sheet.cell(0, 2), CellValue::Empty);
        assert_eq!(sheet.cell(0, 3), CellValue::Number(-2.0));
        assert_eq!(sheet.cell(5, 5), CellValue::Empty);
    }

    #[test]
    fn test_build_table_reads_fixed_offsets() {
        let office = sector_line("Office", 1.0);
        let retail = sector_line("Retail", 10.0);
        let sheet = csv_sheet(&["title", "header", &office, ",,", &retail]);

        let table = build_table(Scenario::Base, &sheet, &SheetLayout::default()).unwrap();
        assert_eq!(table.sector_names(), vec!["Office", "Retail"]);

        let retail = table.find("Retail").unwrap();
        assert_eq!(retail.row_index, 4);
        assert_eq!(retail.rent_growth[0], CellValue::Number(10.0));
        assert_eq!(retail.rent_growth[5], CellValue::Number(15.0));
        assert_eq!(retail.unlevered_return, CellValue::Number(20.0));
        assert_eq!(retail.levered_return, CellValue::Number(30.0));
    }

    #[test]
    fn test_rows_past_last_sector_row_are_ignored() {
        let mut lines = vec!["title".to_string(), "header".to_string()];
        for i in 0..25 {
            lines.push(sector_line(&format!("Sector {}", i), i as f64));
        }
        let refs: Vec<&str> = lines.iter().map(String::as_str).collect();
        let table = build_table(Scenario::High, &csv_sheet(&refs), &SheetLayout::default()).unwrap();
        assert_eq!(table.rows.len(), 19);
        assert_eq!(table.rows.last().unwrap().name, "Sector 18");
    }

    #[test]
    fn test_sheet_without_name_column_is_unavailable() {
        let sheet = csv_sheet(&["a,b", "a,b", "a,b"]);
        let err = build_table(Scenario::Low, &sheet, &SheetLayout::default()).unwrap_err();
        assert!(matches!(
            err,
            ForecastError::DataUnavailable {
                scenario: Scenario::Low,
                ..
            }
        ));

        let short = csv_sheet(&["title", "a,b,Office"]);
        assert!(build_table(Scenario::Low, &short, &SheetLayout::default()).is_err());
    }

    #[test]
    fn test_missing_forecast_columns_read_as_empty() {
        let mut cells = vec![String::new(); 19];
        cells[2] = "Office".to_string();
        cells[13] = "2.5".to_string();
        let office = cells.join(",");
        let sheet = csv_sheet(&["title", "header", &office, ",,Retail"]);

        let table = build_table(Scenario::Base, &sheet, &SheetLayout::default()).unwrap();
        assert_eq!(table.sector_names(), vec!["Office", "Retail"]);

        let office = table.find("Office").unwrap();
        assert_eq!(office.rent_growth[0], CellValue::Number(2.5));
        assert_eq!(office.unlevered_return, CellValue::Empty);
        assert_eq!(office.levered_return, CellValue::Empty);
    }

    #[test]
    fn test_error_cells_keep_excel_literal() {
        assert_eq!(
            cell_from_data(&Data::Error(CellErrorType::Div0)),
            CellValue::Text("#DIV/0!".to_string())
        );
        assert_eq!(
            cell_from_data(&Data::Error(CellErrorType::NA)),
            CellValue::Text("#N/A".to_string())
        );
        assert_eq!(
            cell_from_data_ref(&DataRef::Error(CellErrorType::Ref)),
            CellValue::Text("#REF!".to_string())
        );
    }

    #[test]
    fn test_csv_decoding_is_clipped_to_layout() {
        let mut lines: Vec<String> = (0..40).map(|i| format!("{},x", i)).collect();
        lines[5] = format!("{},far", vec!["1"; 60].join(","));
        let refs: Vec<&str> = lines.iter().map(String::as_str).collect();
        let sheet = csv_sheet(&refs);

        assert_eq!(sheet.height(), 21);
        assert_eq!(sheet.width(), 32);
        assert_eq!(sheet.cell(30, 0), CellValue::Empty);
    }
}

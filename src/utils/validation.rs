use crate::domain::model::{ForecastRequest, SheetLayout, MAX_SECTORS};
use crate::utils::error::{ForecastError, Result};
use std::collections::HashSet;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(ForecastError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path cannot be empty".to_string(),
        });
    }

    if path.contains('\0') {
        return Err(ForecastError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path contains null bytes".to_string(),
        });
    }

    Ok(())
}

pub fn validate_file_extensions(field_name: &str, files: &[&str], allowed_extensions: &[&str]) -> Result<()> {
    let allowed_set: HashSet<&str> = allowed_extensions.iter().copied().collect();

    for file in files {
        match std::path::Path::new(file)
            .extension()
            .and_then(|ext| ext.to_str())
        {
            Some(extension) if allowed_set.contains(extension.to_ascii_lowercase().as_str()) => {}
            Some(extension) => {
                return Err(ForecastError::InvalidConfigValueError {
                    field: field_name.to_string(),
                    value: file.to_string(),
                    reason: format!(
                        "Unsupported file extension: {}. Allowed extensions: {}",
                        extension,
                        allowed_extensions.join(", ")
                    ),
                });
            }
            None => {
                return Err(ForecastError::InvalidConfigValueError {
                    field: field_name.to_string(),
                    value: file.to_string(),
                    reason: "File has no extension or invalid filename".to_string(),
                });
            }
        }
    }

    Ok(())
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(ForecastError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value cannot be empty or whitespace-only".to_string(),
        });
    }
    Ok(())
}

pub fn validate_range<T: PartialOrd + std::fmt::Display + Copy>(
    field_name: &str,
    value: T,
    min: T,
    max: T,
) -> Result<()> {
    if value < min || value > max {
        return Err(ForecastError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be between {} and {}", min, max),
        });
    }
    Ok(())
}

impl Validate for ForecastRequest {
    fn validate(&self) -> Result<()> {
        if self.sectors.is_empty() {
            return Err(ForecastError::ValidationError {
                message: "Select at least one sector".to_string(),
            });
        }
        if self.sectors.len() > MAX_SECTORS {
            return Err(ForecastError::ValidationError {
                message: format!(
                    "Select up to {} sectors ({} given)",
                    MAX_SECTORS,
                    self.sectors.len()
                ),
            });
        }
        for sector in &self.sectors {
            validate_non_empty_string("sectors", sector)?;
        }
        Ok(())
    }
}

impl Validate for SheetLayout {
    fn validate(&self) -> Result<()> {
        if self.last_sector_row < self.first_sector_row {
            return Err(ForecastError::ConfigValidationError {
                field: "layout.last_sector_row".to_string(),
                message: format!(
                    "last sector row {} comes before first sector row {}",
                    self.last_sector_row, self.first_sector_row
                ),
            });
        }
        // Excel 工作表上限
        validate_range("layout.last_sector_row", self.last_sector_row, 0, 1_048_575)?;
        validate_range("layout.max_col", self.max_col(), 0, 16_383)?;

        let rent_growth = self.rent_growth_cols();
        if rent_growth.contains(&self.sector_name_col) {
            return Err(ForecastError::ConfigValidationError {
                field: "layout.sector_name_col".to_string(),
                message: "sector name column overlaps the rent growth columns".to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{ForecastType, ScenarioSelector};

    #[test]
    fn test_validate_file_extensions() {
        assert!(validate_file_extensions("scenarios.base", &["Base.xlsx", "low.CSV"], &["xlsx", "csv"]).is_ok());
        assert!(validate_file_extensions("scenarios.base", &["base.txt"], &["xlsx", "csv"]).is_err());
        assert!(validate_file_extensions("scenarios.base", &["base"], &["xlsx"]).is_err());
    }

    #[test]
    fn test_request_sector_count() {
        let ok = ForecastRequest::new(ForecastType::RentGrowth, ScenarioSelector::All, ["Office"]);
        assert!(ok.validate().is_ok());

        let none = ForecastRequest::new(ForecastType::RentGrowth, ScenarioSelector::All, Vec::<String>::new());
        assert!(none.validate().is_err());

        let many = ForecastRequest::new(
            ForecastType::ReturnForecast,
            ScenarioSelector::All,
            ["Office", "Retail", "Industrial", "Hotel"],
        );
        assert!(many.validate().is_err());

        let blank = ForecastRequest::new(ForecastType::ReturnForecast, ScenarioSelector::All, ["  "]);
        assert!(blank.validate().is_err());
    }

    #[test]
    fn test_layout_validation() {
        assert!(SheetLayout::default().validate().is_ok());

        let inverted = SheetLayout {
            first_sector_row: 10,
            last_sector_row: 2,
            ..SheetLayout::default()
        };
        assert!(inverted.validate().is_err());

        let overlapping = SheetLayout {
            sector_name_col: 14,
            ..SheetLayout::default()
        };
        assert!(overlapping.validate().is_err());
    }
}

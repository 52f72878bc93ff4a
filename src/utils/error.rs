use crate::domain::model::Scenario;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ForecastError {
    #[error("Scenario data unavailable for {scenario}: {reason}")]
    DataUnavailable { scenario: Scenario, reason: String },

    #[error("Sector '{sector}' not found in {scenario} scenario")]
    SectorNotFound { scenario: Scenario, sector: String },

    #[error("Spreadsheet error: {0}")]
    SpreadsheetError(#[from] calamine::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error in '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Validation error: {message}")]
    ValidationError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Data,
    Lookup,
    Io,
    Configuration,
    Validation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl ForecastError {
    pub fn data_unavailable(scenario: Scenario, reason: impl Into<String>) -> Self {
        Self::DataUnavailable {
            scenario,
            reason: reason.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::DataUnavailable { .. } | Self::SpreadsheetError(_) | Self::CsvError(_) => {
                ErrorCategory::Data
            }
            Self::SectorNotFound { .. } => ErrorCategory::Lookup,
            Self::IoError(_) | Self::SerializationError(_) => ErrorCategory::Io,
            Self::ConfigValidationError { .. }
            | Self::InvalidConfigValueError { .. } => ErrorCategory::Configuration,
            Self::ValidationError { .. } => ErrorCategory::Validation,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            // 稀疏結果是正常的，不需要通知 UI
            Self::SectorNotFound { .. } => ErrorSeverity::Low,
            Self::DataUnavailable { .. } => ErrorSeverity::Medium,
            Self::SpreadsheetError(_) | Self::CsvError(_) | Self::ValidationError { .. } => {
                ErrorSeverity::High
            }
            Self::ConfigValidationError { .. }
            | Self::InvalidConfigValueError { .. } => ErrorSeverity::High,
            Self::IoError(_) | Self::SerializationError(_) => ErrorSeverity::Critical,
        }
    }

    /// 是否可以跳過此錯誤繼續處理
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::SectorNotFound { .. } | Self::DataUnavailable { .. }
        )
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            Self::DataUnavailable { scenario, .. } => format!(
                "Check that the {} scenario workbook exists and keeps sector names in column C",
                scenario
            ),
            Self::SectorNotFound { .. } => {
                "Pick a sector from the `sectors` listing".to_string()
            }
            Self::SpreadsheetError(_) => {
                "Re-save the workbook as .xlsx and make sure the first sheet holds the forecast table".to_string()
            }
            Self::CsvError(_) => "Check the CSV export for broken quoting".to_string(),
            Self::IoError(_) => "Check file permissions and the --data-dir setting".to_string(),
            Self::SerializationError(_) => "Try a different --format".to_string(),
            Self::ConfigValidationError { field, .. }
            | Self::InvalidConfigValueError { field, .. } => {
                format!("Fix the '{}' setting in your configuration", field)
            }
            Self::ValidationError { .. } => {
                "Select a forecast type, a scenario and one to three sectors".to_string()
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            Self::DataUnavailable { scenario, .. } => {
                format!("The {} scenario could not be read", scenario)
            }
            Self::SectorNotFound { scenario, sector } => {
                format!("{} has no {} forecast", sector, scenario)
            }
            Self::ValidationError { message } => message.clone(),
            Self::ConfigValidationError { field, message } => {
                format!("Invalid configuration ({}): {}", field, message)
            }
            Self::InvalidConfigValueError { field, reason, .. } => {
                format!("Invalid configuration ({}): {}", field, reason)
            }
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ForecastError>;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AdvisorError {
    #[error("Spreadsheet error: {0}")]
    SpreadsheetError(#[from] calamine::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value for '{field}': '{value}' ({reason})")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration field: {field}")]
    MissingConfigError { field: String },

    #[error("Data processing error: {message}")]
    ProcessingError { message: String },

    #[error("Validation error: {message}")]
    ValidationError { message: String },

    #[error("No records found for volume type '{volume_type}'")]
    EmptyResult { volume_type: String },

    #[error("No valve size meets a target release of {target} MCF")]
    NoRecommendation { target: f64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    DataSource,
    Processing,
    Query,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    /// Warning only, the run still counts as successful.
    Low,
    /// Worth retrying with different inputs.
    Medium,
    /// Processing failed.
    High,
    /// System-level failure (file unreadable, corrupt workbook).
    Critical,
}

impl AdvisorError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            AdvisorError::ConfigError { .. }
            | AdvisorError::InvalidConfigValueError { .. }
            | AdvisorError::MissingConfigError { .. }
            | AdvisorError::ValidationError { .. } => ErrorCategory::Configuration,
            AdvisorError::SpreadsheetError(_)
            | AdvisorError::CsvError(_)
            | AdvisorError::IoError(_) => ErrorCategory::DataSource,
            AdvisorError::SerializationError(_) | AdvisorError::ProcessingError { .. } => {
                ErrorCategory::Processing
            }
            AdvisorError::EmptyResult { .. } | AdvisorError::NoRecommendation { .. } => {
                ErrorCategory::Query
            }
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            AdvisorError::EmptyResult { .. } | AdvisorError::NoRecommendation { .. } => {
                ErrorSeverity::Low
            }
            AdvisorError::ConfigError { .. }
            | AdvisorError::InvalidConfigValueError { .. }
            | AdvisorError::MissingConfigError { .. }
            | AdvisorError::ValidationError { .. } => ErrorSeverity::Medium,
            AdvisorError::ProcessingError { .. } | AdvisorError::SerializationError(_) => {
                ErrorSeverity::High
            }
            AdvisorError::SpreadsheetError(_)
            | AdvisorError::CsvError(_)
            | AdvisorError::IoError(_) => ErrorSeverity::Critical,
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            AdvisorError::SpreadsheetError(e) => format!("Could not read the workbook: {}", e),
            AdvisorError::CsvError(e) => format!("Could not read the CSV file: {}", e),
            AdvisorError::IoError(e) => format!("Could not open the input file: {}", e),
            AdvisorError::EmptyResult { volume_type } => {
                format!("No test data exists for volume type '{}'.", volume_type)
            }
            AdvisorError::NoRecommendation { target } => format!(
                "No suitable valve size found for a target release of {} MCF.",
                target
            ),
            other => other.to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            AdvisorError::SpreadsheetError(_) => {
                "Check that the file is a valid workbook and the sheet name matches"
            }
            AdvisorError::CsvError(_) => "Check the CSV delimiter and header row offset",
            AdvisorError::IoError(_) => "Check that the input path exists and is readable",
            AdvisorError::SerializationError(_) => "Re-export the source data and try again",
            AdvisorError::ConfigError { .. }
            | AdvisorError::InvalidConfigValueError { .. }
            | AdvisorError::MissingConfigError { .. }
            | AdvisorError::ValidationError { .. } => "Run with --help to see the expected values",
            AdvisorError::ProcessingError { .. } => {
                "Check the sheet name, header row and column names against the source file"
            }
            AdvisorError::EmptyResult { .. } => "Use --list-types to see the available volume types",
            AdvisorError::NoRecommendation { .. } => {
                "Lower the target release or pick another volume type"
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, AdvisorError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_misses_are_warnings_not_failures() {
        let e = AdvisorError::NoRecommendation { target: 12.5 };
        assert_eq!(e.severity(), ErrorSeverity::Low);
        assert_eq!(e.category(), ErrorCategory::Query);

        let e = AdvisorError::EmptyResult {
            volume_type: "Tank".into(),
        };
        assert_eq!(e.severity(), ErrorSeverity::Low);
    }

    #[test]
    fn io_failures_are_critical() {
        let e = AdvisorError::from(std::io::Error::new(std::io::ErrorKind::NotFound, "gone"));
        assert_eq!(e.severity(), ErrorSeverity::Critical);
        assert_eq!(e.category(), ErrorCategory::DataSource);
    }
}

use thiserror::Error;

#[derive(Error, Debug)]
pub enum EtlError {
    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Zip operation failed: {0}")]
    ZipError(#[from] zip::result::ZipError),

    #[error("Chart rendering failed: {message}")]
    ChartError { message: String },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration validation failed for '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration field: {field}")]
    MissingConfigError { field: String },

    #[error("Dataset is missing required columns: {}", .columns.join(", "))]
    MissingColumnsError { columns: Vec<String> },

    #[error("Data processing error: {message}")]
    ProcessingError { message: String },

    #[error("Storage operation failed: {message}")]
    StorageError { message: String },
}

/// 錯誤分類，用於記錄與統計
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Data,
    Configuration,
    Storage,
    System,
}

/// 錯誤嚴重程度，決定 CLI 退出碼
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl EtlError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            EtlError::HttpError(_) => ErrorCategory::Network,
            EtlError::CsvError(_)
            | EtlError::SerializationError(_)
            | EtlError::MissingColumnsError { .. }
            | EtlError::ProcessingError { .. } => ErrorCategory::Data,
            EtlError::ConfigError { .. }
            | EtlError::ConfigValidationError { .. }
            | EtlError::InvalidConfigValueError { .. }
            | EtlError::MissingConfigError { .. } => ErrorCategory::Configuration,
            EtlError::IoError(_) | EtlError::StorageError { .. } => ErrorCategory::Storage,
            EtlError::ZipError(_) | EtlError::ChartError { .. } => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            // 網路與儲存層問題通常重試即可恢復
            EtlError::HttpError(_) | EtlError::IoError(_) | EtlError::StorageError { .. } => {
                ErrorSeverity::Medium
            }
            EtlError::CsvError(_)
            | EtlError::SerializationError(_)
            | EtlError::ZipError(_)
            | EtlError::ChartError { .. }
            | EtlError::MissingColumnsError { .. }
            | EtlError::ProcessingError { .. } => ErrorSeverity::High,
            EtlError::ConfigError { .. }
            | EtlError::ConfigValidationError { .. }
            | EtlError::InvalidConfigValueError { .. }
            | EtlError::MissingConfigError { .. } => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            EtlError::HttpError(_) => {
                "Check the network connection and the source URL, then retry".to_string()
            }
            EtlError::IoError(_) => {
                "Check that the file exists and the process has permission to access it"
                    .to_string()
            }
            EtlError::CsvError(_) => {
                "Check that the dataset is valid CSV with a header row".to_string()
            }
            EtlError::MissingColumnsError { columns } => format!(
                "Add the missing columns to the dataset or point at the right file: {}",
                columns.join(", ")
            ),
            EtlError::ProcessingError { .. } => {
                "Inspect the dataset contents; the analysis needs at least one usable row per numeric column".to_string()
            }
            EtlError::ChartError { .. } => {
                "Re-run with --no-charts to skip chart rendering".to_string()
            }
            EtlError::ConfigError { .. }
            | EtlError::ConfigValidationError { .. }
            | EtlError::InvalidConfigValueError { .. }
            | EtlError::MissingConfigError { .. } => {
                "Fix the configuration value and run again".to_string()
            }
            EtlError::StorageError { .. } => {
                "Check the storage account settings and that the service is reachable".to_string()
            }
            EtlError::SerializationError(_) | EtlError::ZipError(_) => {
                "Re-run the pipeline; if the error persists check the output directory".to_string()
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            EtlError::MissingColumnsError { columns } => format!(
                "The dataset does not look like the expected recipe CSV (missing: {})",
                columns.join(", ")
            ),
            EtlError::IoError(e) if e.kind() == std::io::ErrorKind::NotFound => {
                "Could not find the input file. Put the dataset at the configured path or pass --csv-source".to_string()
            }
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, EtlError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_errors_are_critical() {
        let err = EtlError::InvalidConfigValueError {
            field: "top_recipes".to_string(),
            value: "0".to_string(),
            reason: "must be at least 1".to_string(),
        };
        assert_eq!(err.severity(), ErrorSeverity::Critical);
        assert_eq!(err.category(), ErrorCategory::Configuration);
    }

    #[test]
    fn test_missing_columns_message_lists_columns() {
        let err = EtlError::MissingColumnsError {
            columns: vec!["Carbs(g)".to_string(), "Protein(g)".to_string()],
        };
        let msg = err.to_string();
        assert!(msg.contains("Carbs(g)"));
        assert!(msg.contains("Protein(g)"));
        assert_eq!(err.severity(), ErrorSeverity::High);
    }

    #[test]
    fn test_not_found_gets_friendly_message() {
        let err = EtlError::IoError(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "data/All_Diets.csv",
        ));
        assert!(err.user_friendly_message().contains("--csv-source"));
        assert_eq!(err.severity(), ErrorSeverity::Medium);
    }
}

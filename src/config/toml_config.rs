use crate::core::ConfigProvider;
use crate::domain::model::FillStrategy;
use crate::utils::error::{EtlError, Result};
use crate::utils::validation::Validate;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    pub pipeline: PipelineConfig,
    pub source: SourceConfig,
    pub extract: ExtractConfig,
    pub transform: TransformConfig,
    pub load: LoadConfig,
    pub monitoring: Option<MonitoringConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    pub name: String,
    pub description: String,
    pub version: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// "path" 或 "url"
    pub r#type: String,
    pub location: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractConfig {
    pub max_records: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransformConfig {
    /// "mean" | "zero" | "drop"
    pub fill_missing: Option<FillStrategy>,
    pub top_recipes: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoadConfig {
    pub output_path: String,
    pub output_formats: Vec<String>,
    pub charts: Option<bool>,
    pub compression: Option<CompressionConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompressionConfig {
    pub enabled: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitoringConfig {
    pub enabled: bool,
    pub system_stats: Option<bool>,
}

const VALID_FORMATS: [&str; 3] = ["csv", "json", "txt"];

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(EtlError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        // 處理環境變數替換
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| EtlError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${CSV_PATH})
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| EtlError::ConfigError {
            message: format!("env substitution pattern failed: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    /// 驗證配置的合理性
    pub fn validate_config(&self) -> Result<()> {
        match self.source.r#type.as_str() {
            "url" => crate::utils::validation::validate_url("source.location", &self.source.location)?,
            "path" => {
                crate::utils::validation::validate_path("source.location", &self.source.location)?;
                crate::utils::validation::validate_extension(
                    "source.location",
                    &self.source.location,
                    &["csv"],
                )?;
            }
            other => {
                return Err(EtlError::InvalidConfigValueError {
                    field: "source.type".to_string(),
                    value: other.to_string(),
                    reason: "Supported source types: path, url".to_string(),
                })
            }
        }

        crate::utils::validation::validate_path("load.output_path", &self.load.output_path)?;

        if let Some(top) = self.transform.top_recipes {
            crate::utils::validation::validate_positive_number(
                "transform.top_recipes",
                top,
                1,
            )?;
        }

        if let Some(max) = self.extract.max_records {
            crate::utils::validation::validate_positive_number("extract.max_records", max, 1)?;
        }

        // 驗證輸出格式
        for format in &self.load.output_formats {
            if !VALID_FORMATS.contains(&format.as_str()) {
                return Err(EtlError::InvalidConfigValueError {
                    field: "load.output_formats".to_string(),
                    value: format.clone(),
                    reason: format!(
                        "Unsupported format. Valid formats: {}",
                        VALID_FORMATS.join(", ")
                    ),
                });
            }
        }

        Ok(())
    }

    /// 取得監控設定
    pub fn monitoring_enabled(&self) -> bool {
        self.monitoring.as_ref().map(|m| m.enabled).unwrap_or(false)
    }
}

impl ConfigProvider for TomlConfig {
    fn csv_source(&self) -> &str {
        &self.source.location
    }

    fn output_path(&self) -> &str {
        &self.load.output_path
    }

    fn top_recipes(&self) -> usize {
        self.transform.top_recipes.unwrap_or(5)
    }

    fn charts_enabled(&self) -> bool {
        self.load.charts.unwrap_or(true)
    }

    fn archive_enabled(&self) -> bool {
        self.load
            .compression
            .as_ref()
            .map(|c| c.enabled)
            .unwrap_or(false)
    }

    fn fill_strategy(&self) -> FillStrategy {
        self.transform.fill_missing.unwrap_or_default()
    }

    fn max_records(&self) -> Option<usize> {
        self.extract.max_records
    }

    fn output_formats(&self) -> Vec<String> {
        self.load.output_formats.clone()
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_basic_toml_config() {
        let toml_content = r#"
[pipeline]
name = "diet-analysis"
description = "Diet dataset analysis"
version = "1.0.0"

[source]
type = "path"
location = "data/All_Diets.csv"

[extract]
max_records = 100

[transform]
fill_missing = "drop"
top_recipes = 3

[load]
output_path = "./test-output"
output_formats = ["csv", "json"]
charts = false
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();

        assert_eq!(config.pipeline.name, "diet-analysis");
        assert_eq!(config.csv_source(), "data/All_Diets.csv");
        assert_eq!(config.top_recipes(), 3);
        assert_eq!(config.fill_strategy(), FillStrategy::Drop);
        assert_eq!(config.max_records(), Some(100));
        assert!(!config.charts_enabled());
        assert!(!config.archive_enabled());
    }

    #[test]
    fn test_defaults_when_sections_are_sparse() {
        let toml_content = r#"
[pipeline]
name = "defaults"
description = "test"
version = "1.0"

[source]
type = "path"
location = "data/All_Diets.csv"

[extract]

[transform]

[load]
output_path = "./output"
output_formats = ["csv", "json", "txt"]
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();

        assert_eq!(config.top_recipes(), 5);
        assert_eq!(config.fill_strategy(), FillStrategy::Mean);
        assert_eq!(config.max_records(), None);
        assert!(config.charts_enabled());
        assert!(!config.monitoring_enabled());
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("TEST_DIET_CSV", "data/from_env.csv");

        let toml_content = r#"
[pipeline]
name = "test"
description = "test"
version = "1.0"

[source]
type = "path"
location = "${TEST_DIET_CSV}"

[extract]

[transform]

[load]
output_path = "./output"
output_formats = ["csv"]
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.source.location, "data/from_env.csv");

        std::env::remove_var("TEST_DIET_CSV");
    }

    #[test]
    fn test_config_validation_rejects_bad_source_type() {
        let toml_content = r#"
[pipeline]
name = "test"
description = "test"
version = "1.0"

[source]
type = "ftp"
location = "ftp://example.com/data.csv"

[extract]

[transform]

[load]
output_path = "./output"
output_formats = ["csv"]
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_rejects_unknown_format() {
        let toml_content = r#"
[pipeline]
name = "test"
description = "test"
version = "1.0"

[source]
type = "path"
location = "data/All_Diets.csv"

[extract]

[transform]

[load]
output_path = "./output"
output_formats = ["csv", "parquet"]
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_rejects_invalid_url() {
        let toml_content = r#"
[pipeline]
name = "test"
description = "test"
version = "1.0"

[source]
type = "url"
location = "not-a-url"

[extract]

[transform]

[load]
output_path = "./output"
output_formats = ["csv"]
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();

        let toml_content = r#"
[pipeline]
name = "file-test"
description = "File test"
version = "1.0"

[source]
type = "path"
location = "data/All_Diets.csv"

[extract]

[transform]

[load]
output_path = "./output"
output_formats = ["csv"]
"#;

        temp_file.write_all(toml_content.as_bytes()).unwrap();

        let config = TomlConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.pipeline.name, "file-test");
    }
}

pub mod cli;
pub mod toml_config;

#[cfg(feature = "azure")]
pub mod azure;

#[cfg(feature = "cli")]
use crate::core::ConfigProvider;
#[cfg(feature = "cli")]
use crate::utils::error::Result;
#[cfg(feature = "cli")]
use crate::utils::validation::{self, Validate};
#[cfg(feature = "cli")]
use clap::Parser;
#[cfg(feature = "cli")]
use serde::{Deserialize, Serialize};

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Serialize, Deserialize, Parser)]
#[command(name = "diet-etl")]
#[command(about = "A small ETL tool for recipe dataset analysis")]
pub struct CliConfig {
    /// CSV dataset path or http(s) URL
    #[arg(long, default_value = "data/All_Diets.csv")]
    pub csv_source: String,

    #[arg(long, default_value = "./outputs")]
    pub output_path: String,

    /// How many top-protein recipes to keep per diet type
    #[arg(long, default_value = "5")]
    pub top_recipes: usize,

    /// Skip chart rendering
    #[arg(long)]
    pub no_charts: bool,

    /// Bundle all outputs into analysis_output.zip
    #[arg(long)]
    pub archive: bool,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Enable system monitoring")]
    pub monitor: bool,

    /// Emit logs as JSON
    #[arg(long)]
    pub log_json: bool,
}

#[cfg(feature = "cli")]
impl ConfigProvider for CliConfig {
    fn csv_source(&self) -> &str {
        &self.csv_source
    }

    fn output_path(&self) -> &str {
        &self.output_path
    }

    fn top_recipes(&self) -> usize {
        self.top_recipes
    }

    fn charts_enabled(&self) -> bool {
        !self.no_charts
    }

    fn archive_enabled(&self) -> bool {
        self.archive
    }
}

#[cfg(feature = "cli")]
impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        if self.csv_source.starts_with("http://") || self.csv_source.starts_with("https://") {
            validation::validate_url("csv_source", &self.csv_source)?;
        } else {
            validation::validate_path("csv_source", &self.csv_source)?;
            validation::validate_extension("csv_source", &self.csv_source, &["csv"])?;
        }

        validation::validate_path("output_path", &self.output_path)?;
        validation::validate_positive_number("top_recipes", self.top_recipes, 1)?;
        validation::validate_range("top_recipes", self.top_recipes, 1, 100)?;

        Ok(())
    }
}

#[cfg(all(test, feature = "cli"))]
mod tests {
    use super::*;

    fn base_config() -> CliConfig {
        CliConfig {
            csv_source: "data/All_Diets.csv".to_string(),
            output_path: "./outputs".to_string(),
            top_recipes: 5,
            no_charts: false,
            archive: false,
            verbose: false,
            monitor: false,
            log_json: false,
        }
    }

    #[test]
    fn test_default_config_is_valid() {
        assert!(base_config().validate().is_ok());
    }

    #[test]
    fn test_url_source_is_valid() {
        let mut config = base_config();
        config.csv_source = "https://example.com/All_Diets.csv".to_string();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_rejects_non_csv_source() {
        let mut config = base_config();
        config.csv_source = "data/All_Diets.parquet".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_zero_top_recipes() {
        let mut config = base_config();
        config.top_recipes = 0;
        assert!(config.validate().is_err());
    }
}

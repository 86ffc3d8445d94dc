pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;
pub use config::cli::LocalStorage;
pub use config::toml_config::TomlConfig;

#[cfg(feature = "azure")]
pub use config::azure::{AzureConfig, BlobStorage};

pub use core::{etl::EtlEngine, pipeline::AnalysisPipeline};
pub use utils::error::{EtlError, Result};

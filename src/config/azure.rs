use crate::core::Storage;
use crate::utils::error::{EtlError, Result};
use crate::utils::validation::{validate_non_empty_string, Validate};
use azure_storage::prelude::*;
use azure_storage_blobs::prelude::*;
use std::env;

#[derive(Debug, Clone)]
pub struct AzureConfig {
    pub account: String,
    pub access_key: String,
    pub container: String,
    pub prefix: String,
    pub use_emulator: bool,
}

impl AzureConfig {
    pub fn from_env() -> Result<Self> {
        let use_emulator = env::var("AZURE_STORAGE_USE_EMULATOR")
            .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
            .unwrap_or(false);

        let (account, access_key) = if use_emulator {
            // Azurite 內建開發帳號
            ("devstoreaccount1".to_string(), String::new())
        } else {
            (
                env::var("AZURE_STORAGE_ACCOUNT").map_err(|_| EtlError::MissingConfigError {
                    field: "AZURE_STORAGE_ACCOUNT".to_string(),
                })?,
                env::var("AZURE_STORAGE_ACCESS_KEY").map_err(|_| {
                    EtlError::MissingConfigError {
                        field: "AZURE_STORAGE_ACCESS_KEY".to_string(),
                    }
                })?,
            )
        };

        Ok(Self {
            account,
            access_key,
            container: env::var("AZURE_STORAGE_CONTAINER")
                .unwrap_or_else(|_| "datasets".to_string()),
            prefix: env::var("AZURE_STORAGE_PREFIX").unwrap_or_default(),
            use_emulator,
        })
    }

    pub fn container_client(&self) -> ContainerClient {
        if self.use_emulator {
            ClientBuilder::emulator().container_client(&self.container)
        } else {
            let credentials =
                StorageCredentials::access_key(self.account.clone(), self.access_key.clone());
            ClientBuilder::new(self.account.clone(), credentials).container_client(&self.container)
        }
    }
}

impl Validate for AzureConfig {
    fn validate(&self) -> Result<()> {
        validate_container_name("container", &self.container)?;

        if !self.use_emulator {
            validate_non_empty_string("account", &self.account)?;
            validate_non_empty_string("access_key", &self.access_key)?;
        }

        tracing::info!("✅ Azure storage configuration validation passed");
        Ok(())
    }
}

fn validate_container_name(field_name: &str, container_name: &str) -> Result<()> {
    if container_name.is_empty() {
        return Err(EtlError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: container_name.to_string(),
            reason: "Container name cannot be empty".to_string(),
        });
    }

    if container_name.len() < 3 || container_name.len() > 63 {
        return Err(EtlError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: container_name.to_string(),
            reason: "Container name must be between 3 and 63 characters".to_string(),
        });
    }

    if !container_name
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
    {
        return Err(EtlError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: container_name.to_string(),
            reason: "Container name can only contain lowercase letters, numbers, and hyphens"
                .to_string(),
        });
    }

    if container_name.starts_with('-') || container_name.ends_with('-') {
        return Err(EtlError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: container_name.to_string(),
            reason: "Container name cannot start or end with a hyphen".to_string(),
        });
    }

    Ok(())
}

fn storage_err(e: azure_core::Error) -> EtlError {
    EtlError::StorageError {
        message: e.to_string(),
    }
}

#[derive(Clone)]
pub struct BlobStorage {
    container: ContainerClient,
    prefix: String,
}

impl BlobStorage {
    pub fn new(container: ContainerClient, prefix: String) -> Self {
        Self { container, prefix }
    }

    /// 容器不存在時建立；已存在視為正常
    pub async fn ensure_container(&self) -> Result<()> {
        match self.container.create().await {
            Ok(_) => {
                tracing::info!("Created container");
                Ok(())
            }
            Err(e) => {
                let already_exists = e
                    .as_http_error()
                    .map(|http| http.status() == azure_core::StatusCode::Conflict)
                    .unwrap_or(false);
                if already_exists {
                    tracing::debug!("Container already exists");
                    Ok(())
                } else {
                    Err(storage_err(e))
                }
            }
        }
    }

    fn blob_name(&self, path: &str) -> String {
        if self.prefix.is_empty() {
            path.to_string()
        } else {
            format!("{}/{}", self.prefix.trim_end_matches('/'), path)
        }
    }
}

impl Storage for BlobStorage {
    async fn read_file(&self, path: &str) -> Result<Vec<u8>> {
        let blob = self.container.blob_client(self.blob_name(path));
        let data = blob.get_content().await.map_err(storage_err)?;
        Ok(data)
    }

    async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
        let blob = self.container.blob_client(self.blob_name(path));
        blob.put_block_blob(data.to_vec())
            .await
            .map_err(storage_err)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_container_name() {
        assert!(validate_container_name("container", "datasets").is_ok());
        assert!(validate_container_name("container", "my-data-1").is_ok());
        assert!(validate_container_name("container", "").is_err());
        assert!(validate_container_name("container", "ab").is_err());
        assert!(validate_container_name("container", "Datasets").is_err());
        assert!(validate_container_name("container", "-datasets").is_err());
        assert!(validate_container_name("container", "datasets-").is_err());
    }

    #[test]
    fn test_emulator_config_needs_no_credentials() {
        let config = AzureConfig {
            account: "devstoreaccount1".to_string(),
            access_key: String::new(),
            container: "datasets".to_string(),
            prefix: String::new(),
            use_emulator: true,
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_real_account_requires_credentials() {
        let config = AzureConfig {
            account: String::new(),
            access_key: String::new(),
            container: "datasets".to_string(),
            prefix: String::new(),
            use_emulator: false,
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_blob_name_respects_prefix() {
        let config = AzureConfig {
            account: "devstoreaccount1".to_string(),
            access_key: String::new(),
            container: "datasets".to_string(),
            prefix: "etl-output/".to_string(),
            use_emulator: true,
        };
        let storage = BlobStorage::new(config.container_client(), config.prefix.clone());
        assert_eq!(storage.blob_name("All_Diets.csv"), "etl-output/All_Diets.csv");

        let bare = BlobStorage::new(config.container_client(), String::new());
        assert_eq!(bare.blob_name("All_Diets.csv"), "All_Diets.csv");
    }
}

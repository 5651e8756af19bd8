//! Credentials and dashboard settings.
//!
//! The credential file path is read once, at startup, from
//! `WAREHOUSE_CREDENTIALS`. Nothing here is re-read during a run.

use crate::error::{InsightsError, InsightsResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const CREDENTIALS_ENV: &str = "WAREHOUSE_CREDENTIALS";

pub const DEFAULT_TITLE: &str = "Transaction Analysis Dashboard";
pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 8050;

/// Service-account style handle to the analytical warehouse.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WarehouseCredentials {
    pub project_id: String,
    #[serde(default)]
    pub client_email: Option<String>,
    pub warehouse_path: PathBuf,
}

impl WarehouseCredentials {
    /// Resolve the credential file from `WAREHOUSE_CREDENTIALS` and load it.
    pub fn from_env() -> InsightsResult<Self> {
        let path = std::env::var_os(CREDENTIALS_ENV).ok_or(InsightsError::MissingCredentials {
            var: CREDENTIALS_ENV,
        })?;
        Self::load(Path::new(&path))
    }

    /// Load a credential file. A relative `warehouse_path` is resolved
    /// against the directory containing the credential file.
    pub fn load(path: &Path) -> InsightsResult<Self> {
        let content =
            std::fs::read_to_string(path).map_err(|e| InsightsError::CredentialFile {
                path: path.display().to_string(),
                reason: e.to_string(),
            })?;
        let mut creds: WarehouseCredentials =
            serde_json::from_str(&content).map_err(|e| InsightsError::CredentialFile {
                path: path.display().to_string(),
                reason: e.to_string(),
            })?;

        if creds.warehouse_path.is_relative() {
            if let Some(dir) = path.parent() {
                creds.warehouse_path = dir.join(&creds.warehouse_path);
            }
        }
        Ok(creds)
    }

    pub fn save(&self, path: &Path) -> InsightsResult<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardConfig {
    #[serde(default = "default_title")]
    pub title: String,
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_title() -> String {
    DEFAULT_TITLE.into()
}

fn default_host() -> String {
    DEFAULT_HOST.into()
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            title: default_title(),
            host: default_host(),
            port: default_port(),
        }
    }
}

impl DashboardConfig {
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Cannot read {path}: {e}"))?;
        let config: DashboardConfig = serde_json::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Cannot parse {path}: {e}"))?;
        Ok(config)
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dashboard_config_fills_missing_fields() {
        let config: DashboardConfig = serde_json::from_str(r#"{ "port": 9000 }"#).unwrap();
        assert_eq!(config.port, 9000);
        assert_eq!(config.host, DEFAULT_HOST);
        assert_eq!(config.title, DEFAULT_TITLE);
        assert_eq!(config.bind_addr(), "127.0.0.1:9000");
    }

    #[test]
    fn relative_warehouse_path_resolves_next_to_credentials() {
        let dir = std::env::temp_dir().join(format!("creds-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        let file = dir.join("service-account.json");
        std::fs::write(
            &file,
            r#"{ "project_id": "demo", "warehouse_path": "warehouse.db" }"#,
        )
        .unwrap();

        let creds = WarehouseCredentials::load(&file).unwrap();
        assert_eq!(creds.project_id, "demo");
        assert_eq!(creds.client_email, None);
        assert_eq!(creds.warehouse_path, dir.join("warehouse.db"));

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn missing_credential_file_is_an_error() {
        let err = WarehouseCredentials::load(Path::new("/nonexistent/creds.json")).unwrap_err();
        assert!(matches!(err, InsightsError::CredentialFile { .. }));
    }
}

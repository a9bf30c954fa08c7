use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::config::connections::ConnectionConfig;
use crate::config::env_vars::expand_env_vars;
use crate::constants::{
    AWS_DEFAULT_CONN_ID, ENV_OBJECT_STORAGE_AVAILABLE, ENV_REMOTE_TARGET_PATH,
    ENV_REMOTE_TARGET_PATH_CONN_ID, LOCAL_DEFAULT_CONN_ID, MIN_OBJECT_STORAGE_VERSION,
};

fn default_true() -> bool {
    true
}

fn default_host_version() -> String {
    MIN_OBJECT_STORAGE_VERSION.to_string()
}

/// Process configuration consumed by the remote target resolver and the
/// connection registry.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct PublisherSettings {
    /// Root URI for generic remote publication, e.g. `s3://bucket/dbt`
    #[serde(default)]
    pub remote_target_path: Option<String>,
    /// Explicit connection id; derived from the root's scheme when unset
    #[serde(default)]
    pub remote_target_path_conn_id: Option<String>,
    /// Whether the host provides the object storage abstraction
    #[serde(default = "default_true")]
    pub object_storage_available: bool,
    /// Host version reported in capability errors
    #[serde(default = "default_host_version")]
    pub host_version: String,
    #[serde(default)]
    pub connections: BTreeMap<String, ConnectionConfig>,
}

impl Default for PublisherSettings {
    fn default() -> Self {
        Self {
            remote_target_path: None,
            remote_target_path_conn_id: None,
            object_storage_available: true,
            host_version: default_host_version(),
            connections: BTreeMap::new(),
        }
    }
}

impl PublisherSettings {
    /// Settings with only a remote root configured.
    pub fn with_remote_target(root: &str) -> Self {
        Self {
            remote_target_path: Some(root.to_string()),
            ..Self::default()
        }
    }

    /// Load settings from a YAML file
    pub fn from_yaml_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .context(format!("Failed to read settings file: {}", path.display()))?;

        let mut settings: PublisherSettings =
            serde_yaml::from_str(&content).context("Failed to parse YAML settings")?;
        settings.expand_environment_variables();

        debug!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    /// Save settings to a YAML file
    pub fn save_to_yaml_file(&self, path: &Path) -> Result<()> {
        let yaml = serde_yaml::to_string(self).context("Failed to serialize settings to YAML")?;

        fs::write(path, yaml)
            .context(format!("Failed to write settings to {}", path.display()))?;

        info!("Saved settings to {}", path.display());
        Ok(())
    }

    /// Expand `$VAR` references in the remote root and connection paths.
    pub fn expand_environment_variables(&mut self) {
        if let Some(root) = &self.remote_target_path {
            self.remote_target_path = Some(expand_env_vars(root));
        }
        for connection in self.connections.values_mut() {
            connection.expand_paths();
        }
    }

    /// Apply `PUBLISHER_*` environment overrides.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|name| std::env::var(name).ok());
    }

    fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(root) = lookup(ENV_REMOTE_TARGET_PATH) {
            debug!("Remote target path overridden by {}", ENV_REMOTE_TARGET_PATH);
            self.remote_target_path = Some(expand_env_vars(&root)).filter(|r| !r.is_empty());
        }

        if let Some(conn_id) = lookup(ENV_REMOTE_TARGET_PATH_CONN_ID) {
            self.remote_target_path_conn_id = Some(conn_id).filter(|c| !c.is_empty());
        }

        if let Some(flag) = lookup(ENV_OBJECT_STORAGE_AVAILABLE) {
            match flag.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" => self.object_storage_available = true,
                "0" | "false" | "no" => self.object_storage_available = false,
                other => warn!("Ignoring invalid {} value: {}", ENV_OBJECT_STORAGE_AVAILABLE, other),
            }
        }
    }

    /// Configured settings for a connection id, if any.
    pub fn connection(&self, conn_id: &str) -> Option<&ConnectionConfig> {
        self.connections.get(conn_id)
    }

    /// Write a starter settings file listing the default connections.
    pub fn create_default_config_file(path: &Path) -> Result<()> {
        let mut settings = PublisherSettings::default();
        settings.connections.insert(
            AWS_DEFAULT_CONN_ID.to_string(),
            ConnectionConfig::Aws {
                region: Some("us-east-1".to_string()),
                profile: None,
                endpoint: None,
            },
        );
        settings.connections.insert(
            LOCAL_DEFAULT_CONN_ID.to_string(),
            ConnectionConfig::Local { base_dir: None },
        );
        settings.save_to_yaml_file(path)
    }
}

/// Load settings from `path` when given, otherwise use defaults; environment
/// overrides are applied in both cases.
///
/// A path that is given but does not exist is an error.
pub fn load_or_default(path: Option<&Path>) -> Result<PublisherSettings> {
    let mut settings = match path {
        Some(path) => PublisherSettings::from_yaml_file(path)?,
        None => {
            debug!("No settings file given, using defaults");
            PublisherSettings::default()
        }
    };

    settings.apply_env_overrides();
    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let settings = PublisherSettings::default();
        assert!(settings.remote_target_path.is_none());
        assert!(settings.object_storage_available);
        assert_eq!(settings.host_version, "2.8");

        let settings: PublisherSettings = serde_yaml::from_str("{}").unwrap();
        assert_eq!(settings, PublisherSettings::default());
    }

    #[test]
    fn test_yaml_round_trip_through_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("publisher.yaml");

        PublisherSettings::create_default_config_file(&path).unwrap();
        let loaded = PublisherSettings::from_yaml_file(&path).unwrap();

        assert!(loaded.connection("aws_default").is_some());
        assert_eq!(
            loaded.connection("local_default"),
            Some(&ConnectionConfig::Local { base_dir: None })
        );
    }

    #[test]
    fn test_from_yaml_expands_variables() {
        std::env::set_var("SETTINGS_TEST_BUCKET", "analytics");
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("publisher.yaml");
        fs::write(
            &path,
            r#"
remote_target_path: s3://${SETTINGS_TEST_BUCKET}/dbt
object_storage_available: false
host_version: "2.7.3"
connections:
  analytics:
    type: aws
    region: eu-west-1
"#,
        )
        .unwrap();

        let settings = PublisherSettings::from_yaml_file(&path).unwrap();
        assert_eq!(settings.remote_target_path.as_deref(), Some("s3://analytics/dbt"));
        assert!(!settings.object_storage_available);
        assert_eq!(settings.host_version, "2.7.3");
        assert_eq!(settings.connection("analytics").unwrap().provider_name(), "aws");
        std::env::remove_var("SETTINGS_TEST_BUCKET");
    }

    #[test]
    fn test_overrides() {
        let env: HashMap<&str, &str> = [
            (ENV_REMOTE_TARGET_PATH, "gs://bucket/artifacts"),
            (ENV_REMOTE_TARGET_PATH_CONN_ID, "my_gcs"),
            (ENV_OBJECT_STORAGE_AVAILABLE, "False"),
        ]
        .into_iter()
        .collect();

        let mut settings = PublisherSettings::with_remote_target("s3://other");
        settings.apply_overrides(|name| env.get(name).map(|v| v.to_string()));

        assert_eq!(settings.remote_target_path.as_deref(), Some("gs://bucket/artifacts"));
        assert_eq!(settings.remote_target_path_conn_id.as_deref(), Some("my_gcs"));
        assert!(!settings.object_storage_available);
    }

    #[test]
    fn test_empty_override_clears_root() {
        let mut settings = PublisherSettings::with_remote_target("s3://bucket");
        settings.apply_overrides(|name| (name == ENV_REMOTE_TARGET_PATH).then(String::new));
        assert!(settings.remote_target_path.is_none());
    }

    #[test]
    fn test_invalid_flag_is_ignored() {
        let mut settings = PublisherSettings::default();
        settings.apply_overrides(|name| (name == ENV_OBJECT_STORAGE_AVAILABLE).then(|| "maybe".to_string()));
        assert!(settings.object_storage_available);
    }

    #[test]
    fn test_load_missing_file_fails() {
        let temp_dir = TempDir::new().unwrap();
        assert!(load_or_default(Some(&temp_dir.path().join("absent.yaml"))).is_err());
    }
}

use std::collections::BTreeMap;

use anyhow::{anyhow, bail, Result};
use log::debug;

use crate::cloud::backend::{parse_location, uri_scheme, Connector, StorageBackend};
use crate::cloud::client::resolve_region;
use crate::cloud::local::LocalBackend;
use crate::cloud::object_store_backend::{AzureSettings, GcsSettings, ObjectStoreBackend};
use crate::cloud::s3::S3Backend;
use crate::config::{ConnectionConfig, PublisherSettings};

const AZURE_SCHEMES: &[&str] = &["az", "abfs", "abfss", "azure", "adl"];

/// [`Connector`] backed by the connections listed in the settings file.
///
/// The well-known default ids (`aws_default`, `google_cloud_default`,
/// `wasb_default`, `local_default`) work without an entry and take their
/// credentials from the provider's environment.
#[derive(Debug, Clone, Default)]
pub struct ConnectionRegistry {
    connections: BTreeMap<String, ConnectionConfig>,
}

impl ConnectionRegistry {
    pub fn new(connections: BTreeMap<String, ConnectionConfig>) -> Self {
        Self { connections }
    }

    pub fn from_settings(settings: &PublisherSettings) -> Self {
        Self::new(settings.connections.clone())
    }

    /// Settings for `conn_id`, falling back to environment defaults for the
    /// well-known ids.
    pub fn connection_config(&self, conn_id: &str) -> Result<ConnectionConfig> {
        self.connections
            .get(conn_id)
            .cloned()
            .or_else(|| ConnectionConfig::default_for(conn_id))
            .ok_or_else(|| anyhow!("The conn_id `{}` isn't defined", conn_id))
    }
}

impl Connector for ConnectionRegistry {
    fn connect(&self, conn_id: &str, location: &str) -> Result<Box<dyn StorageBackend>> {
        let config = self.connection_config(conn_id)?;
        let scheme = uri_scheme(location).unwrap_or_default();
        debug!(
            "Connecting {} connection `{}` to {}",
            config.provider_name(),
            conn_id,
            location
        );

        let backend: Box<dyn StorageBackend> = match config {
            ConnectionConfig::Aws {
                region,
                profile,
                endpoint,
            } => {
                let bucket = match parse_location(location) {
                    Some(parsed) if scheme == "s3" && !parsed.authority.is_empty() => parsed.authority,
                    _ => bail!("Connection `{}` expects an s3://bucket location, got {}", conn_id, location),
                };
                let region = resolve_region(region.as_deref(), endpoint.as_deref());
                Box::new(S3Backend::new(bucket, region, profile.as_deref())?)
            }
            ConnectionConfig::GoogleCloud { service_account_path } => {
                let location = match scheme.as_str() {
                    "gs" => location.to_string(),
                    // object_store only understands the gs:// spelling
                    "gcs" => format!("gs://{}", location.split_once("://").map_or("", |(_, rest)| rest)),
                    _ => bail!("Connection `{}` expects a gs://bucket location, got {}", conn_id, location),
                };
                let settings = GcsSettings { service_account_path };
                Box::new(ObjectStoreBackend::google_cloud(&location, &settings)?)
            }
            ConnectionConfig::Azure { account, access_key } => {
                if !AZURE_SCHEMES.contains(&scheme.as_str()) {
                    bail!("Connection `{}` expects an az://container location, got {}", conn_id, location);
                }
                let settings = AzureSettings { account, access_key };
                Box::new(ObjectStoreBackend::azure(location, &settings)?)
            }
            ConnectionConfig::Local { base_dir } => match (scheme.as_str(), base_dir) {
                ("file", _) => Box::new(LocalBackend::from_location(location)?),
                ("", Some(base_dir)) => Box::new(LocalBackend::new(base_dir)),
                ("", None) => Box::new(LocalBackend::new(".")),
                (other, _) => bail!("Connection `{}` cannot serve {} locations", conn_id, other),
            },
        };

        Ok(backend)
    }
}

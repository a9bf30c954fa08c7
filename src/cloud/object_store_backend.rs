use std::fs;
use std::path::Path as LocalPath;

use anyhow::{anyhow, bail, Context, Result};
use log::{debug, info};
use object_store::azure::MicrosoftAzureBuilder;
use object_store::gcp::GoogleCloudStorageBuilder;
use object_store::path::Path;
use object_store::{ObjectStore, PutMode, PutOptions, PutPayload};
use tokio::runtime::Runtime;

use crate::cloud::backend::{object_key, parse_location, StorageBackend};
use crate::cloud::block_on_runtime;

/// Backend for Google Cloud Storage and Azure Blob Storage built on the
/// `object_store` crate.
pub struct ObjectStoreBackend {
    root: String,
    authority: String,
    store: Box<dyn ObjectStore>,
    runtime: Runtime,
}

/// Settings for a Google Cloud Storage connection.
#[derive(Debug, Clone, Default)]
pub struct GcsSettings {
    pub service_account_path: Option<String>,
}

/// Settings for an Azure Blob Storage connection.
#[derive(Debug, Clone, Default)]
pub struct AzureSettings {
    pub account: Option<String>,
    pub access_key: Option<String>,
}

impl ObjectStoreBackend {
    /// Open a Google Cloud Storage bucket, e.g. `gs://bucket`.
    pub fn google_cloud(location: &str, settings: &GcsSettings) -> Result<Self> {
        let root = store_root(location)?;
        let mut builder = GoogleCloudStorageBuilder::from_env().with_url(root.as_str());
        if let Some(path) = &settings.service_account_path {
            builder = builder.with_service_account_path(path);
        }

        let store = builder
            .build()
            .context(format!("Failed to create Google Cloud Storage client for {}", root))?;
        Self::with_store(root, Box::new(store))
    }

    /// Open an Azure container, e.g. `az://container` or
    /// `abfs://container@account.dfs.core.windows.net`.
    pub fn azure(location: &str, settings: &AzureSettings) -> Result<Self> {
        let root = store_root(location)?;
        let mut builder = MicrosoftAzureBuilder::from_env().with_url(root.as_str());
        if let Some(account) = &settings.account {
            builder = builder.with_account(account);
        }
        if let Some(access_key) = &settings.access_key {
            builder = builder.with_access_key(access_key);
        }

        let store = builder
            .build()
            .context(format!("Failed to create Azure Blob Storage client for {}", root))?;
        Self::with_store(root, Box::new(store))
    }

    /// Wrap an already configured store serving `root`.
    pub fn with_store(root: String, store: Box<dyn ObjectStore>) -> Result<Self> {
        let authority = parse_location(&root)
            .map(|parsed| parsed.authority.to_string())
            .ok_or_else(|| anyhow!("Expected a URI with a scheme, got {}", root))?;

        Ok(Self {
            root,
            authority,
            store,
            runtime: block_on_runtime()?,
        })
    }

    pub fn root(&self) -> &str {
        &self.root
    }

    fn object_path(&self, destination_key: &str) -> Result<Path> {
        if let Some(parsed) = parse_location(destination_key) {
            if parsed.authority != self.authority {
                bail!("Destination {} is outside of {}", destination_key, self.root);
            }
        }
        Ok(Path::from(object_key(destination_key)))
    }
}

/// `scheme://authority` part of a location.
fn store_root(location: &str) -> Result<String> {
    let parsed = parse_location(location)
        .ok_or_else(|| anyhow!("Expected a URI with a scheme, got {}", location))?;
    Ok(format!("{}://{}", parsed.scheme, parsed.authority))
}

impl StorageBackend for ObjectStoreBackend {
    fn upload_file(&self, local_path: &LocalPath, destination_key: &str, overwrite: bool) -> Result<u64> {
        let location = self.object_path(destination_key)?;
        let contents = fs::read(local_path)
            .context(format!("Failed to read {} for upload", local_path.display()))?;
        let size = contents.len() as u64;

        debug!(
            "Starting upload of {} ({} bytes) to {}/{}",
            local_path.display(),
            size,
            self.root,
            location
        );

        let options = if overwrite {
            PutOptions::default()
        } else {
            PutOptions::from(PutMode::Create)
        };

        self.runtime
            .block_on(self.store.put_opts(&location, PutPayload::from(contents), options))
            .map_err(|e| anyhow!("Failed to upload {} to {}/{}: {}", local_path.display(), self.root, location, e))?;

        Ok(size)
    }

    fn object_exists(&self, path: &str) -> Result<bool> {
        let location = self.object_path(path)?;
        if location.as_ref().is_empty() {
            return Ok(true);
        }

        self.runtime.block_on(async {
            match self.store.head(&location).await {
                Ok(_) => return Ok(true),
                Err(object_store::Error::NotFound { .. }) => {}
                Err(e) => return Err(anyhow!("Failed to check {}/{}: {}", self.root, location, e)),
            }

            let listing = self
                .store
                .list_with_delimiter(Some(&location))
                .await
                .context(format!("Failed to list {}/{}", self.root, location))?;
            Ok(!listing.objects.is_empty() || !listing.common_prefixes.is_empty())
        })
    }

    fn ensure_directory(&self, path: &str) -> Result<()> {
        // Object stores have no directories; prefixes appear with the first object
        info!("Using {}/{} as destination prefix", self.root, self.object_path(path)?);
        Ok(())
    }
}

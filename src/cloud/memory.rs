use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;
use std::sync::Mutex;

use anyhow::{anyhow, bail, Context, Result};

use crate::cloud::backend::StorageBackend;

/// In-process backend that records uploads by destination key.
///
/// Keys are stored exactly as given, so callers can assert on full
/// destination URIs. An optional failure pattern makes every upload whose
/// key contains it fail, which simulates a transport error mid-publication.
#[derive(Default)]
pub struct MemoryBackend {
    objects: Mutex<BTreeMap<String, Vec<u8>>>,
    directories: Mutex<BTreeSet<String>>,
    fail_on: Option<String>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail uploads whose key contains `pattern`.
    pub fn failing_on(pattern: &str) -> Self {
        Self {
            fail_on: Some(pattern.to_string()),
            ..Self::default()
        }
    }

    /// Snapshot of the stored keys.
    pub fn keys(&self) -> BTreeSet<String> {
        self.objects
            .lock()
            .map(|objects| objects.keys().cloned().collect())
            .unwrap_or_default()
    }

    pub fn get(&self, key: &str) -> Option<Vec<u8>> {
        self.objects.lock().ok()?.get(key).cloned()
    }

    pub fn len(&self) -> usize {
        self.objects.lock().map(|objects| objects.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Directories created through [`StorageBackend::ensure_directory`].
    pub fn directories(&self) -> BTreeSet<String> {
        self.directories
            .lock()
            .map(|directories| directories.clone())
            .unwrap_or_default()
    }
}

impl StorageBackend for MemoryBackend {
    fn upload_file(&self, local_path: &Path, destination_key: &str, overwrite: bool) -> Result<u64> {
        if let Some(pattern) = &self.fail_on {
            if destination_key.contains(pattern.as_str()) {
                bail!("Simulated transport failure for {}", destination_key);
            }
        }

        let contents = fs::read(local_path)
            .context(format!("Failed to read {} for upload", local_path.display()))?;
        let size = contents.len() as u64;

        let mut objects = self.objects.lock().map_err(|_| anyhow!("Memory backend lock poisoned"))?;
        if !overwrite && objects.contains_key(destination_key) {
            bail!("Destination {} already exists", destination_key);
        }
        objects.insert(destination_key.to_string(), contents);

        Ok(size)
    }

    fn object_exists(&self, path: &str) -> Result<bool> {
        let prefix = format!("{}/", path.trim_end_matches('/'));
        let objects = self.objects.lock().map_err(|_| anyhow!("Memory backend lock poisoned"))?;
        let directories = self.directories.lock().map_err(|_| anyhow!("Memory backend lock poisoned"))?;

        Ok(objects.contains_key(path)
            || directories.contains(path)
            || objects.keys().any(|key| key.starts_with(&prefix)))
    }

    fn ensure_directory(&self, path: &str) -> Result<()> {
        self.directories
            .lock()
            .map_err(|_| anyhow!("Memory backend lock poisoned"))?
            .insert(path.to_string());
        Ok(())
    }
}

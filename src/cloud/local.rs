use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use log::debug;

use crate::cloud::backend::{parse_location, StorageBackend};

/// Filesystem backend serving `file://` locations.
///
/// Keys are `file:///absolute/path` URIs, absolute paths, or paths relative
/// to the backend's base directory.
pub struct LocalBackend {
    base_dir: PathBuf,
}

impl LocalBackend {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self { base_dir: base_dir.into() }
    }

    /// Backend rooted at the filesystem root, for `file://` URIs.
    pub fn from_location(location: &str) -> Result<Self> {
        match parse_location(location) {
            Some(parsed) if parsed.scheme.eq_ignore_ascii_case("file") => Ok(Self::new("/")),
            Some(parsed) => bail!("Local backend cannot serve {} locations", parsed.scheme),
            None => Ok(Self::new(location)),
        }
    }

    fn resolve(&self, key: &str) -> Result<PathBuf> {
        match parse_location(key) {
            Some(parsed) if parsed.scheme.eq_ignore_ascii_case("file") => {
                Ok(Path::new("/").join(parsed.path))
            }
            Some(parsed) => bail!("Local backend cannot serve {} locations", parsed.scheme),
            None if Path::new(key).is_absolute() => Ok(PathBuf::from(key)),
            None => Ok(self.base_dir.join(key)),
        }
    }
}

impl StorageBackend for LocalBackend {
    fn upload_file(&self, local_path: &Path, destination_key: &str, overwrite: bool) -> Result<u64> {
        let destination = self.resolve(destination_key)?;
        if !overwrite && destination.exists() {
            bail!("Destination {} already exists", destination.display());
        }

        if let Some(parent) = destination.parent() {
            fs::create_dir_all(parent)
                .context(format!("Failed to create directory {}", parent.display()))?;
        }

        let written = fs::copy(local_path, &destination).context(format!(
            "Failed to copy {} to {}",
            local_path.display(),
            destination.display()
        ))?;

        debug!("Copied {} to {} ({} bytes)", local_path.display(), destination.display(), written);
        Ok(written)
    }

    fn object_exists(&self, path: &str) -> Result<bool> {
        Ok(self.resolve(path)?.exists())
    }

    fn ensure_directory(&self, path: &str) -> Result<()> {
        let directory = self.resolve(path)?;
        fs::create_dir_all(&directory)
            .context(format!("Failed to create directory {}", directory.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_upload_creates_parents() {
        let source = TempDir::new().unwrap();
        let destination = TempDir::new().unwrap();
        let file_path = source.path().join("q.sql");
        fs::write(&file_path, "select 1").unwrap();

        let backend = LocalBackend::new(destination.path());
        let written = backend.upload_file(&file_path, "d1/r1/t1/1/q.sql", true).unwrap();

        assert_eq!(written, 8);
        assert!(destination.path().join("d1/r1/t1/1/q.sql").exists());
        assert!(backend.object_exists("d1/r1").unwrap());
    }

    #[test]
    fn test_file_uri_keys() {
        let source = TempDir::new().unwrap();
        let destination = TempDir::new().unwrap();
        let file_path = source.path().join("a.txt");
        fs::write(&file_path, "a").unwrap();

        let key = format!("file://{}/out/a.txt", destination.path().display());
        let backend = LocalBackend::from_location("file:///").unwrap();
        backend.upload_file(&file_path, &key, true).unwrap();

        assert!(destination.path().join("out/a.txt").exists());
        assert!(backend.object_exists(&key).unwrap());
    }

    #[test]
    fn test_overwrite_flag() {
        let source = TempDir::new().unwrap();
        let destination = TempDir::new().unwrap();
        let file_path = source.path().join("a.txt");
        fs::write(&file_path, "a").unwrap();

        let backend = LocalBackend::new(destination.path());
        backend.upload_file(&file_path, "a.txt", false).unwrap();
        assert!(backend.upload_file(&file_path, "a.txt", false).is_err());

        fs::write(&file_path, "updated").unwrap();
        backend.upload_file(&file_path, "a.txt", true).unwrap();
        assert_eq!(fs::read_to_string(destination.path().join("a.txt")).unwrap(), "updated");
    }

    #[test]
    fn test_ensure_directory_is_idempotent() {
        let destination = TempDir::new().unwrap();
        let backend = LocalBackend::new(destination.path());

        backend.ensure_directory("artifacts/nested").unwrap();
        backend.ensure_directory("artifacts/nested").unwrap();
        assert!(destination.path().join("artifacts/nested").is_dir());
    }

    #[test]
    fn test_absolute_keys_ignore_base_dir() {
        let source = TempDir::new().unwrap();
        let destination = TempDir::new().unwrap();
        let file_path = source.path().join("a.txt");
        fs::write(&file_path, "a").unwrap();

        let key = format!("{}/out/a.txt", destination.path().display());
        let backend = LocalBackend::new(".");
        backend.upload_file(&file_path, &key, true).unwrap();

        assert!(destination.path().join("out/a.txt").exists());
        assert!(backend.object_exists(&key).unwrap());
    }

    #[test]
    fn test_rejects_foreign_scheme() {
        assert!(LocalBackend::from_location("s3://bucket").is_err());
        let backend = LocalBackend::new("/tmp");
        assert!(backend.object_exists("gs://bucket/a").is_err());
    }
}

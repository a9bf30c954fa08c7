//! Artifact publication.
//!
//! Every publisher variant walks a local output tree and uploads each file
//! through a [`StorageBackend`], one file at a time. Variants only differ in
//! how they reach the backend and how they key the files:
//!
//! - [`remote::publish_remote`]: generic object storage, keyed by
//!   [`destination::build`] under the configured remote root
//! - [`named::publish_named`]: AWS S3, Google Cloud Storage and Azure Blob
//!   Storage buckets with their own layouts
//! - [`docs::publish_docs`]: the generated documentation files
//!
//! Uploads always overwrite. The first failure aborts the walk and is
//! returned unchanged; files uploaded before it stay in the remote store.

use std::path::Path;

use log::{debug, info, warn};
use walkdir::WalkDir;

use crate::cloud::backend::StorageBackend;
use crate::errors::{PublishError, Result};
use crate::models::{ArtifactFile, DestinationKey, PublishSummary};

pub mod destination;
pub mod docs;
pub mod named;
pub mod remote;
pub mod resolver;

pub use docs::publish_docs;
pub use named::{publish_named, BackendParams, NamedBackend};
pub use remote::publish_remote;
pub use resolver::{RemoteTarget, RemoteTargetResolver};

/// Regular files below `source_root`, relative paths `/`-separated.
///
/// A missing `source_root` yields no files. Symbolic links to files are
/// included; linked directories are not descended.
pub fn collect_artifacts(source_root: &Path) -> Result<Vec<ArtifactFile>> {
    if !source_root.exists() {
        warn!("Output directory {} does not exist, nothing to publish", source_root.display());
        return Ok(Vec::new());
    }

    let mut artifacts = Vec::new();
    for entry in WalkDir::new(source_root).sort_by_file_name() {
        let entry = entry.map_err(|e| PublishError::Io {
            path: e.path().unwrap_or(source_root).to_path_buf(),
            source: e.into(),
        })?;

        let path = entry.path();
        if !path.is_file() {
            continue;
        }

        let relative = path.strip_prefix(source_root).map_err(|_| {
            PublishError::InvalidArgument(format!(
                "{} is not below {}",
                path.display(),
                source_root.display()
            ))
        })?;

        let relative_path = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");

        artifacts.push(ArtifactFile {
            local_path: path.to_path_buf(),
            relative_path,
        });
    }

    debug!("Found {} files under {}", artifacts.len(), source_root.display());
    Ok(artifacts)
}

/// Upload `files` in order, keying each with `key_for`.
pub fn publish_files<B, F>(backend: &B, files: &[ArtifactFile], key_for: F) -> Result<PublishSummary>
where
    B: StorageBackend + ?Sized,
    F: Fn(&ArtifactFile) -> Result<DestinationKey>,
{
    let mut summary = PublishSummary::default();

    for file in files {
        let key = key_for(file)?;
        debug!("Uploading {} to {}", file.local_path.display(), key);

        let written = backend.upload_file(&file.local_path, key.as_str(), true)?;
        summary.bytes_uploaded += written;
        summary.uploaded.push(key);
    }

    Ok(summary)
}

/// Walk `source_root` and upload every file found.
pub fn publish_tree<B, F>(backend: &B, source_root: &Path, key_for: F) -> Result<PublishSummary>
where
    B: StorageBackend + ?Sized,
    F: Fn(&ArtifactFile) -> Result<DestinationKey>,
{
    let files = collect_artifacts(source_root)?;
    let summary = publish_files(backend, &files, key_for)?;

    info!(
        "Published {} files ({} bytes) from {}",
        summary.file_count(),
        summary.bytes_uploaded,
        source_root.display()
    );
    Ok(summary)
}

use std::path::Path;

use log::{debug, info};

use crate::cloud::backend::Connector;
use crate::constants::REQUIRED_DOCS_FILES;
use crate::errors::{PublishError, Result};
use crate::models::{ArtifactFile, DestinationKey, PublishSummary};
use crate::publish::named::{BackendParams, NamedBackend};
use crate::publish::publish_files;

/// Upload the generated documentation site to a named backend bucket.
///
/// Every file in [`REQUIRED_DOCS_FILES`] must exist under
/// `project_dir/target_subpath`; otherwise nothing is uploaded. Keys are
/// `{folder_dir}/{file}`, or just `{file}` without a folder.
pub fn publish_docs(
    connector: &dyn Connector,
    backend: NamedBackend,
    project_dir: &Path,
    target_subpath: &str,
    params: &BackendParams,
    folder_dir: Option<&str>,
) -> Result<PublishSummary> {
    params.validate()?;
    let docs_dir = project_dir.join(target_subpath.trim_matches('/'));

    let files = REQUIRED_DOCS_FILES
        .iter()
        .map(|name| {
            let local_path = docs_dir.join(name);
            if local_path.is_file() {
                Ok(ArtifactFile {
                    local_path,
                    relative_path: name.to_string(),
                })
            } else {
                Err(PublishError::MissingDocsArtifact(local_path))
            }
        })
        .collect::<Result<Vec<_>>>()?;

    let location = backend.location(&params.bucket);
    let prefix = folder_dir
        .map(|folder| folder.trim_matches('/'))
        .filter(|folder| !folder.is_empty());
    debug!("Docs prefix for {}: {:?}", location, prefix);

    let storage = connector.connect(params.conn_id_for(backend), &location)?;
    let summary = publish_files(&storage, &files, |file| {
        let key = match prefix {
            Some(folder) => format!("{}/{}/{}", location, folder, file.relative_path),
            None => format!("{}/{}", location, file.relative_path),
        };
        Ok(DestinationKey::new(key))
    })?;

    info!("Published docs from {} to {} ({} files)", docs_dir.display(), location, summary.file_count());
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{add_docs_files, create_project_tree, MemoryConnector};
    use std::fs;

    #[test]
    fn test_publish_docs_with_folder() {
        let (_guard, project_dir) = create_project_tree().unwrap();
        add_docs_files(&project_dir).unwrap();
        let connector = MemoryConnector::new();

        let summary = publish_docs(
            &connector,
            NamedBackend::AwsS3,
            &project_dir,
            "target",
            &BackendParams::new("docs"),
            Some("/jaffle_shop/"),
        )
        .unwrap();

        assert_eq!(summary.file_count(), 3);
        let keys = connector.backend.keys();
        assert!(keys.contains("s3://docs/jaffle_shop/index.html"));
        assert!(keys.contains("s3://docs/jaffle_shop/manifest.json"));
        assert!(keys.contains("s3://docs/jaffle_shop/catalog.json"));
    }

    #[test]
    fn test_publish_docs_without_folder() {
        let (_guard, project_dir) = create_project_tree().unwrap();
        add_docs_files(&project_dir).unwrap();
        let connector = MemoryConnector::new();

        publish_docs(
            &connector,
            NamedBackend::AzureBlob,
            &project_dir,
            "target",
            &BackendParams::new("web"),
            None,
        )
        .unwrap();

        assert!(connector.backend.keys().contains("az://web/index.html"));
        assert_eq!(connector.calls()[0].0, "wasb_default");
    }

    #[test]
    fn test_missing_docs_file_uploads_nothing() {
        let (_guard, project_dir) = create_project_tree().unwrap();
        add_docs_files(&project_dir).unwrap();
        fs::remove_file(project_dir.join("target/catalog.json")).unwrap();
        let connector = MemoryConnector::new();

        let err = publish_docs(
            &connector,
            NamedBackend::GoogleCloudStorage,
            &project_dir,
            "target",
            &BackendParams::new("docs"),
            None,
        )
        .unwrap_err();

        match err {
            PublishError::MissingDocsArtifact(path) => assert!(path.ends_with("target/catalog.json")),
            other => panic!("unexpected error: {}", other),
        }
        assert!(connector.backend.is_empty());
        assert!(connector.calls().is_empty());
    }
}

use std::fmt;
use std::path::Path;

use log::info;
use serde::{Deserialize, Serialize};

use crate::cloud::backend::Connector;
use crate::constants::{AWS_DEFAULT_CONN_ID, GOOGLE_CLOUD_DEFAULT_CONN_ID, WASB_DEFAULT_CONN_ID};
use crate::errors::{PublishError, Result};
use crate::models::{DestinationKey, ExecutionContext, PublishSummary};
use crate::publish::publish_tree;

/// Storage integrations addressed directly by bucket or container name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NamedBackend {
    AwsS3,
    GoogleCloudStorage,
    AzureBlob,
}

impl NamedBackend {
    /// Connection used when the caller names none.
    pub fn default_conn_id(self) -> &'static str {
        match self {
            NamedBackend::AwsS3 => AWS_DEFAULT_CONN_ID,
            NamedBackend::GoogleCloudStorage => GOOGLE_CLOUD_DEFAULT_CONN_ID,
            NamedBackend::AzureBlob => WASB_DEFAULT_CONN_ID,
        }
    }

    pub fn scheme(self) -> &'static str {
        match self {
            NamedBackend::AwsS3 => "s3",
            NamedBackend::GoogleCloudStorage => "gs",
            NamedBackend::AzureBlob => "az",
        }
    }

    /// Location handed to the connector, e.g. `s3://bucket`.
    pub fn location(self, bucket: &str) -> String {
        format!("{}://{}", self.scheme(), bucket)
    }

    /// Object key of a file inside the bucket.
    ///
    /// `project_relative` is the file's path relative to the project
    /// directory (it starts with the source subpath). S3 and Azure prefix it
    /// with the run identity; GCS keys it by project directory name.
    pub fn object_key(
        self,
        project_name: &str,
        project_relative: &str,
        context: &ExecutionContext,
    ) -> Result<String> {
        match self {
            NamedBackend::AwsS3 | NamedBackend::AzureBlob => {
                Ok(format!("{}/{}", context.run_identifier()?, project_relative))
            }
            NamedBackend::GoogleCloudStorage => Ok(format!("{}/{}", project_name, project_relative)),
        }
    }
}

impl fmt::Display for NamedBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            NamedBackend::AwsS3 => "AWS S3",
            NamedBackend::GoogleCloudStorage => "Google Cloud Storage",
            NamedBackend::AzureBlob => "Azure Blob Storage",
        };
        f.write_str(name)
    }
}

/// Bucket (or container) and optional connection id of a named backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackendParams {
    pub bucket: String,
    #[serde(default)]
    pub conn_id: Option<String>,
}

impl BackendParams {
    pub fn new(bucket: &str) -> Self {
        Self {
            bucket: bucket.to_string(),
            conn_id: None,
        }
    }

    pub fn with_conn_id(mut self, conn_id: &str) -> Self {
        self.conn_id = Some(conn_id.to_string());
        self
    }

    pub(crate) fn conn_id_for(&self, backend: NamedBackend) -> &str {
        self.conn_id.as_deref().unwrap_or(backend.default_conn_id())
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if self.bucket.is_empty() || self.bucket.contains('/') {
            return Err(PublishError::InvalidArgument(format!(
                "invalid bucket name: {:?}",
                self.bucket
            )));
        }
        Ok(())
    }
}

/// Upload `project_dir/subpath` to a named backend bucket.
pub fn publish_named(
    connector: &dyn Connector,
    backend: NamedBackend,
    project_dir: &Path,
    subpath: &str,
    params: &BackendParams,
    context: &ExecutionContext,
) -> Result<PublishSummary> {
    params.validate()?;
    let subpath = subpath.trim_matches('/');
    if subpath.is_empty() {
        return Err(PublishError::InvalidArgument("source subpath is empty".to_string()));
    }

    let project_name = project_dir
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .ok_or_else(|| {
            PublishError::InvalidArgument(format!(
                "project directory {} has no name",
                project_dir.display()
            ))
        })?;

    // Fail on a bad context before connecting
    if backend != NamedBackend::GoogleCloudStorage {
        context.run_identifier()?;
    }

    let location = backend.location(&params.bucket);
    let conn_id = params.conn_id_for(backend);
    info!("Publishing {}/{} to {} via {}", project_dir.display(), subpath, location, conn_id);

    let storage = connector.connect(conn_id, &location)?;
    publish_tree(&storage, &project_dir.join(subpath), |file| {
        let project_relative = format!("{}/{}", subpath, file.relative_path);
        let key = backend.object_key(&project_name, &project_relative, context)?;
        Ok(DestinationKey::new(format!("{}/{}", location, key)))
    })
}

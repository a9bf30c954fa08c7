use std::path::Path;

use log::info;

use crate::cloud::backend::Connector;
use crate::config::PublisherSettings;
use crate::errors::{PublishError, Result};
use crate::models::{ExecutionContext, PublishSummary};
use crate::publish::destination;
use crate::publish::publish_tree;
use crate::publish::resolver::RemoteTargetResolver;

/// Upload `project_dir/subpath` below the configured remote target path.
///
/// Fails with `NotConfigured` when no remote target can be resolved.
pub fn publish_remote(
    settings: &PublisherSettings,
    connector: &dyn Connector,
    project_dir: &Path,
    subpath: &str,
    context: &ExecutionContext,
) -> Result<PublishSummary> {
    let subpath = subpath.trim_matches('/');
    if subpath.is_empty() {
        return Err(PublishError::InvalidArgument("source subpath is empty".to_string()));
    }
    context.run_identifier()?;

    let target = RemoteTargetResolver::new(settings, connector).resolve_required()?;
    info!(
        "Publishing {}/{} to {} via {}",
        project_dir.display(),
        subpath,
        target.root,
        target.conn_id
    );

    let source_root = project_dir.join(subpath);
    publish_tree(&target.backend, &source_root, |file| {
        destination::build(&target.root, context, subpath, &file.relative_path)
    })
}

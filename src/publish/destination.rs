//! Destination keys for generic remote publication.

use crate::cloud::backend::parse_location;
use crate::errors::{PublishError, Result};
use crate::models::{DestinationKey, ExecutionContext};

/// Canonical key of one artifact:
/// `{root}/{dag}/{run}/{task}/{attempt}/{subpath}/{relative_path}`.
///
/// The function is pure. Trailing separators on `root`, surrounding
/// separators on `subpath` and leading separators on `relative_path` are
/// dropped; any empty component is rejected so a malformed key is never
/// produced. A URI root needs a bucket or a path after `scheme://`.
pub fn build(
    root: &str,
    context: &ExecutionContext,
    subpath: &str,
    relative_path: &str,
) -> Result<DestinationKey> {
    if let Some(location) = parse_location(root) {
        if location.authority.is_empty() && location.path.trim_matches('/').is_empty() {
            return Err(PublishError::InvalidArgument(format!(
                "remote root {} has neither a bucket nor a path",
                root
            )));
        }
    }
    let root = root.trim_end_matches('/');
    if root.is_empty() {
        return Err(PublishError::InvalidArgument("remote root is empty".to_string()));
    }

    let subpath = subpath.trim_matches('/');
    if subpath.is_empty() {
        return Err(PublishError::InvalidArgument("source subpath is empty".to_string()));
    }

    let relative_path = relative_path.trim_start_matches('/');
    if relative_path.is_empty() {
        return Err(PublishError::InvalidArgument("relative path is empty".to_string()));
    }

    Ok(DestinationKey::new(format!(
        "{}/{}/{}/{}",
        root,
        context.run_identifier()?,
        subpath,
        relative_path
    )))
}

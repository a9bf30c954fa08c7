use std::fmt;

use log::{debug, info};

use crate::cloud::backend::{uri_scheme, Connector, StorageBackend};
use crate::config::PublisherSettings;
use crate::constants::default_conn_id_for_scheme;
use crate::errors::{PublishError, Result};

/// A resolved remote destination and the backend connected to it.
pub struct RemoteTarget {
    pub root: String,
    pub conn_id: String,
    pub backend: Box<dyn StorageBackend>,
}

impl fmt::Debug for RemoteTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RemoteTarget")
            .field("root", &self.root)
            .field("conn_id", &self.conn_id)
            .finish_non_exhaustive()
    }
}

/// Decides whether a remote target is configured and which connection
/// reaches it.
///
/// Nothing is cached: every call to [`resolve`](Self::resolve) reads the
/// settings and connects again.
pub struct RemoteTargetResolver<'a> {
    settings: &'a PublisherSettings,
    connector: &'a dyn Connector,
}

impl<'a> RemoteTargetResolver<'a> {
    pub fn new(settings: &'a PublisherSettings, connector: &'a dyn Connector) -> Self {
        Self { settings, connector }
    }

    /// Connection id for the configured root, explicit or derived from its
    /// URI scheme.
    pub fn connection_id(&self) -> Option<(&'a str, String)> {
        let root = self.settings.remote_target_path.as_deref()?;

        let conn_id = match self.settings.remote_target_path_conn_id.as_deref() {
            Some(conn_id) => conn_id.to_string(),
            None => {
                let scheme = uri_scheme(root)?;
                match default_conn_id_for_scheme(&scheme) {
                    Some(conn_id) => conn_id.to_string(),
                    None => {
                        debug!("No default connection for scheme `{}` of {}", scheme, root);
                        return None;
                    }
                }
            }
        };

        Some((root, conn_id))
    }

    /// Resolve the remote target, creating the root directory when it does
    /// not exist yet.
    ///
    /// Returns `Ok(None)` when no root is configured or no connection id can
    /// be derived for it.
    pub fn resolve(&self) -> Result<Option<RemoteTarget>> {
        let (root, conn_id) = match self.connection_id() {
            Some(resolved) => resolved,
            None => return Ok(None),
        };

        if !self.settings.object_storage_available {
            return Err(PublishError::CapabilityUnavailable {
                target: root.to_string(),
                host_version: self.settings.host_version.clone(),
            });
        }

        let backend = self.connector.connect(&conn_id, root)?;
        if !backend.object_exists(root)? {
            info!("Creating remote target path {}", root);
            backend.ensure_directory(root)?;
        }

        Ok(Some(RemoteTarget {
            root: root.to_string(),
            conn_id,
            backend,
        }))
    }

    /// Like [`resolve`](Self::resolve), for callers that explicitly asked for
    /// a remote upload.
    pub fn resolve_required(&self) -> Result<RemoteTarget> {
        self.resolve()?.ok_or(PublishError::NotConfigured)
    }
}

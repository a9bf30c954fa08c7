use serde::{Deserialize, Serialize};

use crate::config::env_vars::expand_env_vars;
use crate::constants::{
    AWS_DEFAULT_CONN_ID, GOOGLE_CLOUD_DEFAULT_CONN_ID, LOCAL_DEFAULT_CONN_ID, WASB_DEFAULT_CONN_ID,
};

/// Settings for one named connection.
///
/// Fields left unset are taken from the provider's usual environment
/// variables when the backend is built.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ConnectionConfig {
    Aws {
        region: Option<String>,
        profile: Option<String>,
        /// Endpoint of an S3-compatible service
        endpoint: Option<String>,
    },
    GoogleCloud {
        service_account_path: Option<String>,
    },
    Azure {
        account: Option<String>,
        access_key: Option<String>,
    },
    Local {
        base_dir: Option<String>,
    },
}

impl ConnectionConfig {
    /// Environment-derived connection for the well-known default ids.
    pub fn default_for(conn_id: &str) -> Option<Self> {
        match conn_id {
            AWS_DEFAULT_CONN_ID => Some(ConnectionConfig::Aws {
                region: None,
                profile: None,
                endpoint: None,
            }),
            GOOGLE_CLOUD_DEFAULT_CONN_ID => Some(ConnectionConfig::GoogleCloud {
                service_account_path: None,
            }),
            WASB_DEFAULT_CONN_ID => Some(ConnectionConfig::Azure {
                account: None,
                access_key: None,
            }),
            LOCAL_DEFAULT_CONN_ID => Some(ConnectionConfig::Local { base_dir: None }),
            _ => None,
        }
    }

    /// Expand `$VAR` and `${VAR}` references in path-like fields.
    pub fn expand_paths(&mut self) {
        match self {
            ConnectionConfig::GoogleCloud {
                service_account_path: Some(path),
            } => *path = expand_env_vars(path),
            ConnectionConfig::Local { base_dir: Some(dir) } => *dir = expand_env_vars(dir),
            _ => {}
        }
    }

    pub fn provider_name(&self) -> &'static str {
        match self {
            ConnectionConfig::Aws { .. } => "aws",
            ConnectionConfig::GoogleCloud { .. } => "google_cloud",
            ConnectionConfig::Azure { .. } => "azure",
            ConnectionConfig::Local { .. } => "local",
        }
    }
}

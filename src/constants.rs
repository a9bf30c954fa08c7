//! Global constants for the artifact publisher.
//!
//! This module centralizes all hardcoded values to improve maintainability
//! and make configuration changes easier.

// Build tool output layout
/// Default sub-path of the project directory that holds build output
pub const DEFAULT_TARGET_PATH: &str = "target";

/// Default location of the build tool log, relative to the project directory
pub const DEFAULT_LOG_PATH: &str = "logs/dbt.log";

/// Default key used when pushing extracted log data to the exchange
pub const DEFAULT_EXCHANGE_KEY: &str = "dbt_logs";

/// JSON key whose array value is extracted from the log
pub const SHOW_KEY: &str = "show";

// Connection ids
/// Default connection id for AWS S3
pub const AWS_DEFAULT_CONN_ID: &str = "aws_default";

/// Default connection id for Google Cloud Storage
pub const GOOGLE_CLOUD_DEFAULT_CONN_ID: &str = "google_cloud_default";

/// Default connection id for Azure Blob Storage
pub const WASB_DEFAULT_CONN_ID: &str = "wasb_default";

/// Default connection id for the local filesystem
pub const LOCAL_DEFAULT_CONN_ID: &str = "local_default";

/// URI scheme to default connection id mapping used when no explicit
/// connection id is configured for the remote target path.
pub const SCHEME_DEFAULT_CONN_IDS: &[(&str, &str)] = &[
    ("s3", AWS_DEFAULT_CONN_ID),
    ("gs", GOOGLE_CLOUD_DEFAULT_CONN_ID),
    ("gcs", GOOGLE_CLOUD_DEFAULT_CONN_ID),
    ("abfs", WASB_DEFAULT_CONN_ID),
    ("az", WASB_DEFAULT_CONN_ID),
    ("file", LOCAL_DEFAULT_CONN_ID),
];

/// Minimum host version that ships the object storage abstraction
pub const MIN_OBJECT_STORAGE_VERSION: &str = "2.8";

// Generated documentation
/// Files a docs build must produce before they can be published
pub const REQUIRED_DOCS_FILES: &[&str] = &["index.html", "manifest.json", "catalog.json"];

// Cloud storage constants
/// S3 upload chunk size (8MB, S3 minimum is 5MB)
pub const S3_UPLOAD_CHUNK_SIZE: usize = 8 * 1024 * 1024;

/// Large file threshold for multipart uploads (50MB)
pub const LARGE_FILE_THRESHOLD: u64 = 50 * 1024 * 1024;

// Environment overrides
/// Overrides `remote_target_path` from the settings file
pub const ENV_REMOTE_TARGET_PATH: &str = "PUBLISHER_REMOTE_TARGET_PATH";

/// Overrides `remote_target_path_conn_id` from the settings file
pub const ENV_REMOTE_TARGET_PATH_CONN_ID: &str = "PUBLISHER_REMOTE_TARGET_PATH_CONN_ID";

/// Overrides `object_storage_available` from the settings file
pub const ENV_OBJECT_STORAGE_AVAILABLE: &str = "PUBLISHER_OBJECT_STORAGE_AVAILABLE";

// Default file names
pub const DEFAULT_SETTINGS_NAME: &str = "publisher.yaml";

/// Look up the default connection id for a URI scheme.
pub fn default_conn_id_for_scheme(scheme: &str) -> Option<&'static str> {
    SCHEME_DEFAULT_CONN_IDS
        .iter()
        .find(|(s, _)| *s == scheme)
        .map(|(_, conn_id)| *conn_id)
}

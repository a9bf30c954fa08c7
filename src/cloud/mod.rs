//! Storage backends for artifact publication.
//!
//! Every integration implements the synchronous [`StorageBackend`] capability
//! trait (upload, existence check, directory creation). Publishers only ever
//! see that trait; credentials and client construction stay behind the
//! [`Connector`] seam, implemented for configured connections by
//! [`registry::ConnectionRegistry`].
//!
//! ## Supported Providers
//!
//! - **Amazon S3**: `rusoto_s3`, with multipart uploads for large files
//! - **Google Cloud Storage** and **Azure Blob Storage**: the `object_store` crate
//! - **Local filesystem**: `file://` locations
//! - **In-memory**: for embedding and tests
//!
//! The SDKs are async; each backend owns a current-thread Tokio runtime and
//! blocks on it so a publication stays a plain sequential call.

/// Capability trait, connector seam and location parsing
pub mod backend;

/// HTTP client utilities for the S3 API
pub mod client;

/// Amazon S3 integration
pub mod s3;

/// Google Cloud Storage and Azure Blob Storage via `object_store`
pub mod object_store_backend;

/// Local filesystem backend
pub mod local;

/// In-memory backend
pub mod memory;

/// Connection id to backend resolution
pub mod registry;

pub use backend::{object_key, parse_location, uri_scheme, Connector, Location, StorageBackend};
pub use local::LocalBackend;
pub use memory::MemoryBackend;
pub use registry::ConnectionRegistry;

use anyhow::{Context, Result};
use tokio::runtime::{Builder, Runtime};

/// Runtime used by a backend to drive its async SDK from synchronous calls.
pub(crate) fn block_on_runtime() -> Result<Runtime> {
    Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to create Tokio runtime")
}

//! # artifact_publisher
//!
//! Post-execution artifact publishing for data-transformation pipelines.
//!
//! ## Overview
//!
//! After a build step has written its output tree (compiled queries, run
//! results, generated documentation) and its log, this crate uploads the
//! files to object storage under keys scoped to the run that produced them,
//! and extracts the `show` JSON array embedded in the log so later pipeline
//! steps can use it.
//!
//! ## Features
//!
//! - **Attempt-scoped keys**: `{root}/{dag}/{run}/{task}/{attempt}/...`, so
//!   concurrent attempts never collide and a retried attempt overwrites
//! - **Several backends**: AWS S3, Google Cloud Storage, Azure Blob Storage,
//!   local filesystem and in-memory, behind one capability trait
//! - **Remote target resolution**: root URI and connection id from settings,
//!   with the connection derived from the URI scheme when unset
//! - **Log extraction**: the first `"show": [...]` array of a log file
//!
//! ## Usage
//!
//! ```no_run
//! use std::path::Path;
//! use artifact_publisher::cloud::ConnectionRegistry;
//! use artifact_publisher::config::PublisherSettings;
//! use artifact_publisher::models::ExecutionContext;
//! use artifact_publisher::publish::publish_remote;
//!
//! # fn main() -> anyhow::Result<()> {
//! let settings = PublisherSettings::with_remote_target("s3://analytics/dbt");
//! let registry = ConnectionRegistry::from_settings(&settings);
//! let context = ExecutionContext::new("jaffle_shop", "scheduled__2024-01-01", "run", 1);
//!
//! let summary = publish_remote(&settings, &registry, Path::new("/opt/dbt/jaffle_shop"), "target", &context)?;
//! println!("Uploaded {} files", summary.file_count());
//! # Ok(())
//! # }
//! ```
//!
//! ## Module Organization
//!
//! - [`cli`]: Command-line interface definitions
//! - [`models`]: Execution context, artifact files and destination keys
//! - [`publish`]: Remote target resolution, key building and publishers
//! - [`logs`]: Log extraction and the data-exchange sink
//! - [`cloud`]: Storage backends and the connection registry
//! - [`config`]: Settings file, connections and environment expansion
//! - [`errors`]: The publishing error taxonomy
//! - [`constants`]: Application-wide constants

/// Command-line interface definitions and argument parsing
pub mod cli;

/// Core data models used throughout the crate
pub mod models;

/// Artifact publication to remote storage
pub mod publish;

/// Log extraction and data exchange
pub mod logs;

/// Storage backends (S3, GCS, Azure, local, in-memory)
pub mod cloud;

/// Settings and connection configuration
pub mod config;

/// Error types
pub mod errors;

/// Application constants and configuration values
pub mod constants;

/// Test utilities and helpers
#[cfg(test)]
pub mod test_utils;

pub use errors::{PublishError, Result};

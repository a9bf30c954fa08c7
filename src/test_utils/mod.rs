//! Test utilities for the artifact publisher
//!
//! Shared fixtures for unit tests: project trees on disk and a connector
//! that serves one in-memory backend.

#![cfg(test)]

use std::fs;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use anyhow::Result;
use tempfile::TempDir;

use crate::cloud::backend::{Connector, StorageBackend};
use crate::cloud::memory::MemoryBackend;

/// Creates `<tmp>/jaffle_shop` with a build output tree under `target/`.
///
/// Returns the temporary directory guard and the project directory.
pub fn create_project_tree() -> Result<(TempDir, PathBuf)> {
    let temp_dir = TempDir::new()?;
    let project_dir = temp_dir.path().join("jaffle_shop");
    let target = project_dir.join("target");

    fs::create_dir_all(target.join("run"))?;
    fs::create_dir_all(target.join("compiled"))?;
    fs::write(target.join("run/results.json"), br#"{"results": []}"#)?;
    fs::write(target.join("compiled/q.sql"), b"select 1")?;

    Ok((temp_dir, project_dir))
}

/// Adds the generated documentation files to a project tree.
pub fn add_docs_files(project_dir: &std::path::Path) -> Result<()> {
    let target = project_dir.join("target");
    fs::write(target.join("index.html"), b"<html></html>")?;
    fs::write(target.join("manifest.json"), b"{}")?;
    fs::write(target.join("catalog.json"), b"{}")?;
    Ok(())
}

/// Connector handing out one shared [`MemoryBackend`], recording every
/// `(conn_id, location)` it was asked for.
#[derive(Default)]
pub struct MemoryConnector {
    pub backend: Arc<MemoryBackend>,
    pub calls: Mutex<Vec<(String, String)>>,
}

impl MemoryConnector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<(String, String)> {
        self.calls.lock().unwrap().clone()
    }
}

impl Connector for MemoryConnector {
    fn connect(&self, conn_id: &str, location: &str) -> Result<Box<dyn StorageBackend>> {
        self.calls
            .lock()
            .unwrap()
            .push((conn_id.to_string(), location.to_string()));
        Ok(Box::new(Arc::clone(&self.backend)))
    }
}

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::errors::{PublishError, Result};

/// Identity of the run that triggered a publication.
///
/// The attempt number is read from `try_number`, falling back to the legacy
/// `_try_number` counter when the primary one is absent or zero. Older
/// orchestrator releases only populate the legacy field.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ExecutionContext {
    pub dag_id: String,
    pub run_id: String,
    pub task_id: String,
    #[serde(default)]
    pub try_number: Option<u32>,
    #[serde(default, rename = "_try_number")]
    pub legacy_try_number: Option<u32>,
}

impl ExecutionContext {
    pub fn new(dag_id: &str, run_id: &str, task_id: &str, attempt_number: u32) -> Self {
        Self {
            dag_id: dag_id.to_string(),
            run_id: run_id.to_string(),
            task_id: task_id.to_string(),
            try_number: Some(attempt_number),
            legacy_try_number: None,
        }
    }

    /// Resolve the attempt number of this task instance.
    pub fn attempt_number(&self) -> Result<u32> {
        self.try_number
            .filter(|n| *n > 0)
            .or(self.legacy_try_number.filter(|n| *n > 0))
            .ok_or_else(|| {
                PublishError::InvalidArgument(format!(
                    "no positive attempt number for task {} in run {}",
                    self.task_id, self.run_id
                ))
            })
    }

    /// The `{dag}/{run}/{task}/{attempt}` prefix shared by every key of this attempt.
    pub fn run_identifier(&self) -> Result<String> {
        for (name, value) in [
            ("dag_id", &self.dag_id),
            ("run_id", &self.run_id),
            ("task_id", &self.task_id),
        ] {
            if value.is_empty() {
                return Err(PublishError::InvalidArgument(format!("{} is empty", name)));
            }
            if value.contains('/') {
                return Err(PublishError::InvalidArgument(format!(
                    "{} must not contain '/': {}",
                    name, value
                )));
            }
        }

        Ok(format!(
            "{}/{}/{}/{}",
            self.dag_id,
            self.run_id,
            self.task_id,
            self.attempt_number()?
        ))
    }
}

/// A local file discovered under the output root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactFile {
    pub local_path: PathBuf,
    /// Path relative to the output root, always `/`-separated
    pub relative_path: String,
}

/// Fully qualified remote location of one artifact.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct DestinationKey(String);

impl DestinationKey {
    pub(crate) fn new(key: String) -> Self {
        Self(key)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DestinationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Outcome of a successful publication call.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PublishSummary {
    pub uploaded: Vec<DestinationKey>,
    pub bytes_uploaded: u64,
}

impl PublishSummary {
    pub fn file_count(&self) -> usize {
        self.uploaded.len()
    }
}

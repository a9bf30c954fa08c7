use anyhow::{anyhow, Context, Result};
use clap::{Args as ClapArgs, Parser, Subcommand, ValueEnum};
use std::fs;
use std::path::PathBuf;

use crate::constants::{DEFAULT_EXCHANGE_KEY, DEFAULT_LOG_PATH, DEFAULT_SETTINGS_NAME, DEFAULT_TARGET_PATH};
use crate::models::ExecutionContext;
use crate::publish::NamedBackend;

/// Command-line arguments for the artifact publisher.
///
/// Each subcommand maps to one publishing operation so the binary can be
/// called as the post-build step of a pipeline task.
#[derive(Parser, Debug)]
#[clap(name = "artifact-publisher", about = "Publish build artifacts to object storage")]
pub struct Args {
    /// Path to the publisher settings YAML file
    #[clap(short = 'c', long, global = true)]
    pub config: Option<PathBuf>,

    /// Verbose logging
    #[clap(short, long, global = true)]
    pub verbose: bool,

    #[clap(subcommand)]
    pub command: Commands,
}

/// Named storage backends selectable on the command line.
#[derive(Clone, Copy, Debug, ValueEnum, PartialEq, Eq)]
pub enum BackendKind {
    /// Amazon S3
    S3,
    /// Google Cloud Storage
    Gcs,
    /// Azure Blob Storage
    Azure,
}

impl From<BackendKind> for NamedBackend {
    fn from(kind: BackendKind) -> Self {
        match kind {
            BackendKind::S3 => NamedBackend::AwsS3,
            BackendKind::Gcs => NamedBackend::GoogleCloudStorage,
            BackendKind::Azure => NamedBackend::AzureBlob,
        }
    }
}

impl std::fmt::Display for BackendKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BackendKind::S3 => write!(f, "s3"),
            BackendKind::Gcs => write!(f, "gcs"),
            BackendKind::Azure => write!(f, "azure"),
        }
    }
}

/// Identity of the run being published.
///
/// Either a JSON context file or the individual fields.
#[derive(ClapArgs, Debug, Clone, PartialEq, Eq)]
pub struct ContextOpts {
    /// JSON file with dag_id, run_id, task_id and try_number (or _try_number)
    #[clap(long, conflicts_with_all = &["dag_id", "run_id", "task_id", "attempt"])]
    pub context_file: Option<PathBuf>,

    #[clap(long, required_unless_present = "context_file")]
    pub dag_id: Option<String>,

    #[clap(long, required_unless_present = "context_file")]
    pub run_id: Option<String>,

    #[clap(long, required_unless_present = "context_file")]
    pub task_id: Option<String>,

    /// Attempt number of the task instance
    #[clap(long, required_unless_present = "context_file")]
    pub attempt: Option<u32>,
}

impl ContextOpts {
    /// Build the execution context from the context file or the fields.
    pub fn to_context(&self) -> Result<ExecutionContext> {
        if let Some(path) = &self.context_file {
            let content = fs::read_to_string(path)
                .context(format!("Failed to read context file: {}", path.display()))?;
            return serde_json::from_str(&content)
                .context(format!("Failed to parse context file: {}", path.display()));
        }

        match (&self.dag_id, &self.run_id, &self.task_id, self.attempt) {
            (Some(dag_id), Some(run_id), Some(task_id), Some(attempt)) => {
                Ok(ExecutionContext::new(dag_id, run_id, task_id, attempt))
            }
            _ => Err(anyhow!(
                "Either --context-file or all of --dag-id, --run-id, --task-id and --attempt are required"
            )),
        }
    }
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Upload the build output to a named backend bucket
    Upload {
        #[clap(long, value_enum)]
        backend: BackendKind,

        /// Bucket or container name
        #[clap(long)]
        bucket: String,

        /// Connection id (defaults to the backend's default connection)
        #[clap(long)]
        conn_id: Option<String>,

        #[clap(long)]
        project_dir: PathBuf,

        #[clap(long, default_value = DEFAULT_TARGET_PATH)]
        source_subpath: String,

        #[clap(flatten)]
        context: ContextOpts,
    },

    /// Upload the build output below the configured remote target path
    UploadRemote {
        #[clap(long)]
        project_dir: PathBuf,

        #[clap(long, default_value = DEFAULT_TARGET_PATH)]
        source_subpath: String,

        #[clap(flatten)]
        context: ContextOpts,
    },

    /// Extract the `show` array from the build log and print it as a JSON line
    PublishLog {
        #[clap(long)]
        project_dir: PathBuf,

        /// Log file path relative to the project directory
        #[clap(long, default_value = DEFAULT_LOG_PATH)]
        log_path: String,

        /// Exchange key the values are published under
        #[clap(long, default_value = DEFAULT_EXCHANGE_KEY)]
        key: String,
    },

    /// Upload the generated documentation site
    UploadDocs {
        #[clap(long, value_enum)]
        backend: BackendKind,

        #[clap(long)]
        bucket: String,

        #[clap(long)]
        conn_id: Option<String>,

        /// Folder inside the bucket to upload into
        #[clap(long)]
        folder_dir: Option<String>,

        #[clap(long)]
        project_dir: PathBuf,

        #[clap(long, default_value = DEFAULT_TARGET_PATH)]
        target_subpath: String,
    },

    /// Create a default settings file
    InitConfig {
        /// Path to output settings file
        #[clap(default_value = DEFAULT_SETTINGS_NAME)]
        path: PathBuf,
    },
}

use std::io;
use std::path::Path;

use anyhow::{Context, Result};
use clap::Parser;
use log::{info, LevelFilter};
use simplelog::{ColorChoice, Config, TermLogger, TerminalMode};

use artifact_publisher::cli::{Args, Commands};
use artifact_publisher::cloud::ConnectionRegistry;
use artifact_publisher::config::{load_or_default, PublisherSettings};
use artifact_publisher::logs::{publish_log, JsonLinesExchange};
use artifact_publisher::models::PublishSummary;
use artifact_publisher::publish::{publish_docs, publish_named, publish_remote, BackendParams};

fn main() -> Result<()> {
    // Parse arguments
    let args = Args::parse();

    // Initialize logging
    initialize_logging(args.verbose)?;

    run_command(&args.command, args.config.as_deref())
}

/// Initialize logging based on verbosity level.
///
/// Log lines go to stderr; stdout carries exchange records only.
fn initialize_logging(verbose: bool) -> Result<()> {
    let log_level = if verbose { LevelFilter::Debug } else { LevelFilter::Info };
    TermLogger::init(
        log_level,
        Config::default(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    )
    .context("Failed to initialize logger")?;
    Ok(())
}

/// Load settings and build the connection registry from them.
fn load_connections(config_path: Option<&Path>) -> Result<(PublisherSettings, ConnectionRegistry)> {
    let settings = load_or_default(config_path)?;
    let registry = ConnectionRegistry::from_settings(&settings);
    Ok((settings, registry))
}

fn run_command(command: &Commands, config_path: Option<&Path>) -> Result<()> {
    match command {
        Commands::Upload {
            backend,
            bucket,
            conn_id,
            project_dir,
            source_subpath,
            context,
        } => {
            let context = context.to_context()?;
            let (_, registry) = load_connections(config_path)?;
            let params = backend_params(bucket, conn_id.as_deref());
            let summary = publish_named(&registry, (*backend).into(), project_dir, source_subpath, &params, &context)?;
            report(&summary, project_dir);
        }
        Commands::UploadRemote {
            project_dir,
            source_subpath,
            context,
        } => {
            let context = context.to_context()?;
            let (settings, registry) = load_connections(config_path)?;
            let summary = publish_remote(&settings, &registry, project_dir, source_subpath, &context)?;
            report(&summary, project_dir);
        }
        Commands::PublishLog {
            project_dir,
            log_path,
            key,
        } => {
            let exchange = JsonLinesExchange::new(io::stdout());
            publish_log(project_dir, log_path, key, &exchange)?;
        }
        Commands::UploadDocs {
            backend,
            bucket,
            conn_id,
            folder_dir,
            project_dir,
            target_subpath,
        } => {
            let (_, registry) = load_connections(config_path)?;
            let params = backend_params(bucket, conn_id.as_deref());
            let summary = publish_docs(
                &registry,
                (*backend).into(),
                project_dir,
                target_subpath,
                &params,
                folder_dir.as_deref(),
            )?;
            report(&summary, project_dir);
        }
        Commands::InitConfig { path } => {
            info!("Creating default settings file at {}", path.display());
            PublisherSettings::create_default_config_file(path)?;
        }
    }

    Ok(())
}

fn backend_params(bucket: &str, conn_id: Option<&str>) -> BackendParams {
    let params = BackendParams::new(bucket);
    match conn_id {
        Some(conn_id) => params.with_conn_id(conn_id),
        None => params,
    }
}

fn report(summary: &PublishSummary, project_dir: &Path) {
    info!(
        "Uploaded {} files ({} bytes) from {}",
        summary.file_count(),
        summary.bytes_uploaded,
        project_dir.display()
    );
}

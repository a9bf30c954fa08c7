use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use log::{debug, info, warn};
use regex::Regex;
use serde_json::Value;

use crate::constants::SHOW_KEY;
use crate::errors::{PublishError, Result};
use crate::logs::exchange::DataExchange;

// The array runs to the first `]`, or to the end of the text when unclosed.
// A `]` inside a nested value ends the match early.
const SHOW_PATTERN: &str = r#""show"\s*:\s*(\[[^\]]*(?:\]|$))"#;

/// Extract the JSON array stored under `"show"` in free-form log text.
///
/// Only the first occurrence is used. Fails with [`PublishError::Extraction`]
/// when there is none, and with [`PublishError::MalformedPayload`] when the
/// captured fragment is not valid JSON.
pub fn extract(log_text: &str) -> Result<Vec<Value>> {
    let show_regex = compile_pattern(SHOW_PATTERN)?;
    let fragment = show_regex
        .captures(log_text)
        .and_then(|captures| captures.get(1))
        .ok_or(PublishError::Extraction)?
        .as_str();

    let wrapped = format!("{{\"{}\": {}}}", SHOW_KEY, fragment);
    let mut parsed: serde_json::Map<String, Value> =
        serde_json::from_str(&wrapped).map_err(PublishError::MalformedPayload)?;

    match parsed.remove(SHOW_KEY) {
        Some(Value::Array(values)) => Ok(values),
        _ => Ok(Vec::new()),
    }
}

fn compile_pattern(pattern: &str) -> Result<Regex> {
    Regex::new(pattern)
        .map_err(|e| PublishError::InvalidArgument(format!("invalid pattern {}: {}", pattern, e)))
}

/// Log text to extract from, or a placeholder describing why the log could
/// not be read.
fn read_log_content(log_path: &Path) -> String {
    match fs::read_to_string(log_path) {
        Ok(content) => content,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            warn!("Log file {} not found", log_path.display());
            format!("Log file not found: {}", log_path.display())
        }
        Err(e) => {
            warn!("Failed to read log file {}: {}", log_path.display(), e);
            format!("Error reading log file {}: {}", log_path.display(), e)
        }
    }
}

/// Read `project_dir/log_relative_path`, extract its `show` array and push
/// it under `exchange_key`.
///
/// A missing or unreadable log is replaced by placeholder text, which then
/// goes through extraction like any other content. Extraction failures
/// propagate.
pub fn publish_log(
    project_dir: &Path,
    log_relative_path: &str,
    exchange_key: &str,
    exchange: &dyn DataExchange,
) -> Result<Vec<Value>> {
    let log_path = project_dir.join(log_relative_path);
    let content = read_log_content(&log_path);
    debug!("Read {} bytes of log content from {}", content.len(), log_path.display());

    let values = extract(&content)?;
    exchange.push(exchange_key, Value::Array(values.clone()))?;

    info!("Pushed {} values from {} under `{}`", values.len(), log_path.display(), exchange_key);
    Ok(values)
}

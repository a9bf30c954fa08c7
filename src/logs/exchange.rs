use std::collections::BTreeMap;
use std::io::Write;
use std::sync::Mutex;

use anyhow::{anyhow, Context, Result};
use serde::Serialize;
use serde_json::Value;

/// Key/value channel visible to downstream steps of the same run.
pub trait DataExchange {
    fn push(&self, key: &str, value: Value) -> Result<()>;
}

/// In-process exchange that keeps the last value pushed per key.
#[derive(Debug, Default)]
pub struct MemoryExchange {
    values: Mutex<BTreeMap<String, Value>>,
}

impl MemoryExchange {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<Value> {
        self.values.lock().ok()?.get(key).cloned()
    }

    pub fn keys(&self) -> Vec<String> {
        self.values
            .lock()
            .map(|values| values.keys().cloned().collect())
            .unwrap_or_default()
    }
}

impl DataExchange for MemoryExchange {
    fn push(&self, key: &str, value: Value) -> Result<()> {
        self.values
            .lock()
            .map_err(|_| anyhow!("Exchange lock poisoned"))?
            .insert(key.to_string(), value);
        Ok(())
    }
}

#[derive(Serialize)]
struct ExchangeRecord<'a> {
    key: &'a str,
    value: &'a Value,
}

/// Exchange writing one `{"key": .., "value": ..}` JSON line per push.
pub struct JsonLinesExchange<W: Write> {
    writer: Mutex<W>,
}

impl<W: Write> JsonLinesExchange<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }

    pub fn into_inner(self) -> Result<W> {
        self.writer
            .into_inner()
            .map_err(|_| anyhow!("Exchange lock poisoned"))
    }
}

impl<W: Write> DataExchange for JsonLinesExchange<W> {
    fn push(&self, key: &str, value: Value) -> Result<()> {
        let line = serde_json::to_string(&ExchangeRecord { key, value: &value })
            .context("Failed to serialize exchange record")?;

        let mut writer = self.writer.lock().map_err(|_| anyhow!("Exchange lock poisoned"))?;
        writeln!(writer, "{}", line).context("Failed to write exchange record")?;
        writer.flush().context("Failed to flush exchange record")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_memory_exchange_keeps_last_value() {
        let exchange = MemoryExchange::new();
        exchange.push("dbt_logs", json!([1])).unwrap();
        exchange.push("dbt_logs", json!([2])).unwrap();

        assert_eq!(exchange.get("dbt_logs"), Some(json!([2])));
        assert_eq!(exchange.keys(), vec!["dbt_logs".to_string()]);
        assert!(exchange.get("other").is_none());
    }

    #[test]
    fn test_json_lines_exchange() {
        let exchange = JsonLinesExchange::new(Vec::new());
        exchange.push("dbt_logs", json!([{"id": 1}])).unwrap();
        exchange.push("models", json!(["a"])).unwrap();

        let output = String::from_utf8(exchange.into_inner().unwrap()).unwrap();
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], r#"{"key":"dbt_logs","value":[{"id":1}]}"#);
        assert_eq!(lines[1], r#"{"key":"models","value":["a"]}"#);
    }
}

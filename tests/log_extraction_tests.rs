//! Integration tests for log extraction and the data exchange.

use std::fs;

use serde_json::{json, Value};
use tempfile::TempDir;

use artifact_publisher::logs::{extract, publish_log, JsonLinesExchange, MemoryExchange};
use artifact_publisher::PublishError;

const DBT_LOG: &str = r#"
============================== 2024-01-01 10:00:00.000000 | 5f4b ==============================
10:00:00.000000 [info ] [MainThread]: Running with dbt=1.7.4
10:00:01.000000 [debug] [MainThread]: Command `dbt show` succeeded at 10:00:01.000000
{"node": "model.jaffle_shop.customers", "show": [{"customer_id": 1, "first_name": "Michael"}, {"customer_id": 2, "first_name": "Shawn"}]}
10:00:01.100000 [debug] [MainThread]: Flushing usage events
"#;

#[test]
fn test_extract_from_build_log() {
    let values = extract(DBT_LOG).unwrap();
    assert_eq!(
        values,
        vec![
            json!({"customer_id": 1, "first_name": "Michael"}),
            json!({"customer_id": 2, "first_name": "Shawn"}),
        ]
    );
}

#[test]
fn test_extract_documented_cases() {
    assert_eq!(extract(r#"..."show": [1,2,3]..."#).unwrap(), vec![json!(1), json!(2), json!(3)]);
    assert!(matches!(extract("no show key here"), Err(PublishError::Extraction)));
    assert!(matches!(extract(r#""show": [1,2,"#), Err(PublishError::MalformedPayload(_))));
}

#[test]
fn test_error_messages() {
    assert_eq!(
        extract("nothing").unwrap_err().to_string(),
        "Could not find 'show' JSON array in string."
    );
    assert!(extract(r#""show": [1,"#)
        .unwrap_err()
        .to_string()
        .starts_with("JSON decoding failed: "));
}

#[test]
fn test_publish_log_to_json_lines() {
    let project = TempDir::new().unwrap();
    fs::create_dir_all(project.path().join("logs")).unwrap();
    fs::write(project.path().join("logs/dbt.log"), DBT_LOG).unwrap();

    let exchange = JsonLinesExchange::new(Vec::new());
    publish_log(project.path(), "logs/dbt.log", "customers", &exchange).unwrap();

    let output = String::from_utf8(exchange.into_inner().unwrap()).unwrap();
    let record: Value = serde_json::from_str(output.trim()).unwrap();
    assert_eq!(record["key"], "customers");
    assert_eq!(record["value"].as_array().unwrap().len(), 2);
}

#[test]
fn test_publish_log_custom_path() {
    let project = TempDir::new().unwrap();
    fs::write(project.path().join("show.log"), r#"{"show": ["a", "b"]}"#).unwrap();

    let exchange = MemoryExchange::new();
    let values = publish_log(project.path(), "show.log", "dbt_logs", &exchange).unwrap();
    assert_eq!(values, vec![json!("a"), json!("b")]);
    assert_eq!(exchange.get("dbt_logs"), Some(json!(["a", "b"])));
}

#[test]
fn test_missing_log_fails_extraction_not_read() {
    let project = TempDir::new().unwrap();
    let exchange = MemoryExchange::new();

    // The placeholder text has no `show` array, so extraction is what fails
    let err = publish_log(project.path(), "logs/dbt.log", "dbt_logs", &exchange).unwrap_err();
    assert!(matches!(err, PublishError::Extraction));
    assert!(exchange.keys().is_empty());
}

//! End-to-end checks against the bundled sample catalog.

use std::path::Path;

use mcp_component_search::{
    compatibility::IssueKind,
    provider::JsonFileSource,
    query::{KeywordSearchEngine, SearchQuery},
    server::{McpServer, ServerConfig},
    AlternativesResolver, CatalogHandle, CatalogStore, CompatibilityAnalyzer, VoltageRange,
    DEFAULT_CATALOG_PATH,
};
use serde_json::{json, Value};

async fn bundled() -> CatalogStore {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join(DEFAULT_CATALOG_PATH);
    CatalogStore::load(&JsonFileSource::new(path))
        .await
        .expect("bundled catalog should load")
}

fn mpns(results: &[&mcp_component_search::Component]) -> Vec<String> {
    results.iter().map(|c| c.mpn.clone()).collect()
}

#[tokio::test]
async fn bundled_catalog_loads() {
    let store = bundled().await;

    assert_eq!(store.len(), 21);
    assert!(store.by_mpn("esp32-s3-wroom-1-n8r2").is_some());
    assert_eq!(
        store.categories(),
        vec![
            "Antenna",
            "Capacitor",
            "Display",
            "Interface IC",
            "Memory",
            "Microcontroller",
            "Resistor",
            "Sensor",
            "Voltage Regulator"
        ]
    );
}

#[tokio::test]
async fn keyword_search_ranks_and_bounds() {
    let store = bundled().await;
    let engine = KeywordSearchEngine::new(&store);

    let results = engine.search(&SearchQuery::new("wifi", None));
    let hits: Vec<_> = results.iter().map(|r| r.component.mpn.as_str()).collect();
    assert_eq!(
        hits,
        vec![
            "ESP32-S3-WROOM-1-N8R2",
            "ESP32-C3-MINI-1-N4",
            "ESP32-WROOM-32E-N8",
            "2.4GHZ-PCB-ANT-3DBI"
        ]
    );
    assert!(results.windows(2).all(|w| w[0].score >= w[1].score));

    let results = engine.search(&SearchQuery::new("temperature sensor", Some(3)));
    let hits: Vec<_> = results.iter().map(|r| r.component.mpn.as_str()).collect();
    assert_eq!(hits, vec!["BME280", "BMP280", "SHT31-DIS-B"]);

    assert!(engine.search(&SearchQuery::new("flux capacitor", None)).is_empty());
    assert_eq!(engine.search_by_category("regulator", 10).len(), 2);
}

#[tokio::test]
async fn microcontroller_and_sensor_are_compatible() {
    let store = bundled().await;
    let report = CompatibilityAnalyzer::new(&store).check(&["ESP32-S3-WROOM-1-N8R2", "BME280"]);

    assert!(report.compatible);
    assert!(report.issues.is_empty());
    assert_eq!(report.voltage_range, Some(VoltageRange::new(3.0, 3.6)));
    assert!(report.available_interfaces.contains(&"I2C".to_string()));
}

#[tokio::test]
async fn five_volt_part_breaks_the_supply_window() {
    let store = bundled().await;
    let report = CompatibilityAnalyzer::new(&store).check(&[
        "ESP32-S3-WROOM-1-N8R2",
        "HC-SR04",
        "NOPE-1",
    ]);

    assert!(!report.compatible);
    assert_eq!(report.components, vec!["ESP32-S3-WROOM-1-N8R2", "HC-SR04"]);
    assert_eq!(report.issues_of(IssueKind::Voltage).count(), 1);
}

#[tokio::test]
async fn alternatives_skip_parts_missing_from_the_catalog() {
    let store = bundled().await;
    let resolver = AlternativesResolver::new(&store);

    assert_eq!(
        mpns(&resolver.alternatives_for("ESP32-S3-WROOM-1-N8R2")),
        vec!["ESP32-C3-MINI-1-N4", "ESP32-WROOM-32E-N8"]
    );
    assert_eq!(mpns(&resolver.alternatives_for("MPU-6050")), vec!["LSM6DSOXTR"]);
    assert!(resolver.alternatives_for("ATMEGA328P-AU").is_empty());
}

#[tokio::test]
async fn mcp_round_trip_over_bundled_catalog() {
    let server = McpServer::new(ServerConfig::default(), CatalogHandle::new(bundled().await));

    let response = server
        .handle_line(
            r#"{"jsonrpc":"2.0","id":9,"method":"tools/call","params":{"name":"suggest_alternatives","arguments":{"mpn":"bme280"}}}"#,
        )
        .expect("request has an id");
    let response = serde_json::to_value(response).unwrap();
    let text = response["result"]["content"][0]["text"].as_str().unwrap();
    let payload: Value = serde_json::from_str(text).unwrap();

    assert_eq!(payload["found"], json!(true));
    assert_eq!(payload["original"]["manufacturer"], json!("Bosch Sensortec"));
    assert_eq!(payload["alternatives"].as_array().unwrap().len(), 2);
    assert_eq!(payload["alternatives"][0]["currency"], json!("USD"));
}

//! Validates contract fixtures and live serializations against frozen JSON
//! schemas.

use jsonschema::JSONSchema;
use safe_echo_core::{Alert, AlertStatus, AlertType, RiskLevel, Verdict};
use serde_json::Value;
use time::macros::datetime;

fn load_json(path: &str) -> Value {
    let raw = std::fs::read_to_string(path).expect("json file should be readable");
    serde_json::from_str(&raw).expect("json file should be valid")
}

fn compile_validator(schema_path: &str) -> JSONSchema {
    let schema = load_json(schema_path);
    JSONSchema::compile(&schema).expect("schema should compile")
}

#[test]
fn alert_record_fixture_matches_schema() {
    let validator = compile_validator(concat!(
        env!("CARGO_MANIFEST_DIR"),
        "/../../contracts/alert-record.schema.json"
    ));
    let fixture = load_json(concat!(
        env!("CARGO_MANIFEST_DIR"),
        "/../../contracts/fixtures/alert-record.valid.json"
    ));
    assert!(
        validator.is_valid(&fixture),
        "alert record fixture should validate against schema"
    );
}

#[test]
fn verdict_fixture_matches_schema() {
    let validator = compile_validator(concat!(
        env!("CARGO_MANIFEST_DIR"),
        "/../../contracts/verdict.schema.json"
    ));
    let fixture = load_json(concat!(
        env!("CARGO_MANIFEST_DIR"),
        "/../../contracts/fixtures/verdict.valid.json"
    ));
    assert!(
        validator.is_valid(&fixture),
        "verdict fixture should validate against schema"
    );
}

#[test]
fn serialized_alert_matches_schema() {
    let validator = compile_validator(concat!(
        env!("CARGO_MANIFEST_DIR"),
        "/../../contracts/alert-record.schema.json"
    ));

    let alert = Alert::new(
        AlertType::AudioCall,
        RiskLevel::High,
        AlertStatus::Blocked,
        "Scam content detected in audio: AI warning: this text matches known scam patterns.",
        datetime!(2026-08-29 09:30:00 UTC),
    )
    .expect("alert should build");
    let value = serde_json::to_value(&alert).expect("alert should serialize");

    assert!(
        validator.is_valid(&value),
        "live alert serialization should validate against schema"
    );
}

#[test]
fn serialized_verdict_matches_schema() {
    let validator = compile_validator(concat!(
        env!("CARGO_MANIFEST_DIR"),
        "/../../contracts/verdict.schema.json"
    ));

    let scam = Verdict::scam("Keyword alert: contains suspicious word 'otp'.", 85)
        .expect("verdict should build");
    let safe = Verdict::safe("Message seems safe.", 95);

    for verdict in [scam, safe] {
        let value = serde_json::to_value(&verdict).expect("verdict should serialize");
        assert!(
            validator.is_valid(&value),
            "live verdict serialization should validate against schema"
        );
    }
}

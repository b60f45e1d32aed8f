#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use apipulse_client::config;
use apipulse_core::error::ApiPulseError;

const CLIENT_ID: &str = "3c2f34b1-5b92-47f8-9f0a-6d1e2c3b4a5d";

#[test]
fn ok_minimal_config_applies_defaults() {
    let ok = format!(
        r#"
client_id: "{CLIENT_ID}"
env: "prod"
"#
    );
    let cfg = config::load_from_str(&ok).expect("must parse");
    assert_eq!(cfg.sync_interval_ms, 60_000);
    assert_eq!(cfg.initial_sync_interval_ms, 10_000);
    assert_eq!(cfg.drain_timeout_ms, 5_000);
    assert_eq!(cfg.max_send_attempts, 3);
    assert_eq!(cfg.validation_error_cap, 500);
    assert_eq!(cfg.server_error_cap, 500);
}

#[test]
fn deny_unknown_fields() {
    let bad = format!(
        r#"
client_id: "{CLIENT_ID}"
env: "prod"
sync_intervall_ms: 1000
"#
    );
    let err = config::load_from_str(&bad).expect_err("must fail");
    assert!(matches!(err, ApiPulseError::InvalidConfig(_)));
}

#[test]
fn reject_malformed_client_id() {
    let bad = r#"
client_id: "not-a-uuid"
env: "prod"
"#;
    let err = config::load_from_str(bad).expect_err("must fail");
    assert!(matches!(err, ApiPulseError::InvalidClientId(_)));
}

#[test]
fn reject_bad_env() {
    let bad = format!(
        r#"
client_id: "{CLIENT_ID}"
env: "pro d"
"#
    );
    let err = config::load_from_str(&bad).expect_err("must fail");
    assert!(matches!(err, ApiPulseError::InvalidEnv(_)));

    let too_long = format!(
        r#"
client_id: "{CLIENT_ID}"
env: "{}"
"#,
        "e".repeat(33)
    );
    let err = config::load_from_str(&too_long).expect_err("must fail");
    assert!(matches!(err, ApiPulseError::InvalidEnv(_)));
}

#[test]
fn reject_zero_intervals() {
    let bad = format!(
        r#"
client_id: "{CLIENT_ID}"
env: "prod"
sync_interval_ms: 0
"#
    );
    let err = config::load_from_str(&bad).expect_err("must fail");
    assert!(matches!(err, ApiPulseError::InvalidConfig(_)));
}

#[test]
fn programmatic_config_validates() {
    let cfg = config::ClientConfig::new(CLIENT_ID, "dev-1");
    assert!(cfg.validate().is_ok());

    let mut cfg = config::ClientConfig::new(CLIENT_ID, "dev");
    cfg.validation_error_cap = 0;
    assert!(cfg.validate().is_err());
}

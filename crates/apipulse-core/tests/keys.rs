//! Key normalization and truncation tests.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use apipulse_core::keys::{Consumer, RequestKey, ServerErrorKey, ValidationErrorKey};

#[test]
fn request_key_uppercases_method() {
    let a = RequestKey::new(None, "get", "/items", 200);
    let b = RequestKey::new(None, "GET", "/items", 200);
    assert_eq!(a, b);
    assert_eq!(a.method, "GET");
}

#[test]
fn request_key_distinguishes_consumer() {
    let a = RequestKey::new(Some("key-1".into()), "GET", "/items", 200);
    let b = RequestKey::new(Some("key-2".into()), "GET", "/items", 200);
    let c = RequestKey::new(None, "GET", "/items", 200);
    assert_ne!(a, b);
    assert_ne!(a, c);
}

#[test]
fn validation_error_key_owns_location_path() {
    let key = ValidationErrorKey::new(None, "post", "/items", &["body", "name"], "field required", "missing");
    assert_eq!(key.method, "POST");
    assert_eq!(key.loc, vec!["body".to_string(), "name".to_string()]);
}

#[test]
fn server_error_msg_truncated_at_cap() {
    let long_msg = "x".repeat(5000);
    let key = ServerErrorKey::new(None, "GET", "/items", "db::Error", &long_msg, "trace");
    assert_eq!(key.msg.chars().count(), 2048);
    assert!(key.msg.ends_with("... (truncated)"));
}

#[test]
fn server_error_short_msg_untouched() {
    let key = ServerErrorKey::new(None, "GET", "/items", "db::Error", "  boom  ", "trace");
    assert_eq!(key.msg, "boom");
}

#[test]
fn server_error_stacktrace_keeps_most_recent_frames() {
    let lines: Vec<String> = (0..10_000).map(|i| format!("frame {i}: some::module::path")).collect();
    let trace = lines.join("\n");
    let key = ServerErrorKey::new(None, "GET", "/items", "db::Error", "boom", &trace);
    assert!(key.stacktrace.len() <= 65536);
    assert!(key.stacktrace.starts_with("... (truncated) ..."));
    // The last frame survives; the first is cut.
    assert!(key.stacktrace.ends_with("frame 9999: some::module::path"));
    assert!(!key.stacktrace.contains("frame 0:"));
}

#[test]
fn consumer_requires_nonempty_identifier() {
    assert!(Consumer::new("   ", None, None).is_none());
    assert!(Consumer::from_identifier("").is_none());
}

#[test]
fn consumer_fields_trimmed_and_capped() {
    let long = "a".repeat(200);
    let c = Consumer::new(&long, Some("  Name  "), Some(&long)).unwrap();
    assert_eq!(c.identifier.chars().count(), 128);
    assert_eq!(c.name.as_deref(), Some("Name"));
    assert_eq!(c.group.as_deref().map(|g| g.chars().count()), Some(64));
}

#[test]
fn consumer_blank_name_becomes_none() {
    let c = Consumer::new("key-1", Some("   "), None).unwrap();
    assert!(c.name.is_none());
}

use std::collections::HashMap;

use relay::{StartMode, TeardownPolicy};

use super::*;

fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let vars: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |key| vars.get(key).cloned()
}

#[test]
fn defaults_match_relay_defaults() {
    let settings = Settings::default();
    assert_eq!(settings.relay_capacity, 64);
    assert_eq!(settings.teardown, TeardownPolicy::DeliverPending);
    assert_eq!(settings.log_filter, "info");

    let relay = settings.relay_config();
    assert_eq!(relay.capacity, 64);
    assert_eq!(relay.start_mode, StartMode::Immediate);
}

#[test]
fn file_values_override_defaults() {
    let mut settings = Settings::default();
    apply_file(
        &mut settings,
        r#"
relay_capacity = 8
teardown = "discard_pending"
"#,
    )
    .expect("valid file");

    assert_eq!(settings.relay_capacity, 8);
    assert_eq!(settings.teardown, TeardownPolicy::DiscardPending);
    assert_eq!(settings.log_filter, "info");
}

#[test]
fn unknown_file_keys_are_rejected() {
    let mut settings = Settings::default();
    assert!(apply_file(&mut settings, "relay_capacty = 8").is_err());
}

#[test]
fn env_overrides_file_and_prefers_app_log_filter() {
    let mut settings = Settings::default();
    apply_file(&mut settings, "relay_capacity = 8\nlog_filter = \"warn\"").expect("valid file");
    apply_env(
        &mut settings,
        env(&[
            ("APP__RELAY_CAPACITY", " 16 "),
            ("APP__TEARDOWN", "discard"),
            ("RUST_LOG", "debug"),
            ("APP__LOG_FILTER", "relay=trace"),
        ]),
    )
    .expect("valid env");

    assert_eq!(settings.relay_capacity, 16);
    assert_eq!(settings.teardown, TeardownPolicy::DiscardPending);
    assert_eq!(settings.log_filter, "relay=trace");
}

#[test]
fn rust_log_applies_without_app_filter() {
    let mut settings = Settings::default();
    apply_env(&mut settings, env(&[("RUST_LOG", "debug")])).expect("valid env");
    assert_eq!(settings.log_filter, "debug");
}

#[test]
fn malformed_env_values_are_errors() {
    let mut settings = Settings::default();
    assert!(apply_env(&mut settings, env(&[("APP__RELAY_CAPACITY", "many")])).is_err());
    assert!(apply_env(&mut settings, env(&[("APP__TEARDOWN", "later")])).is_err());
}

#[test]
fn missing_explicit_file_is_an_error() {
    let err = load_settings(Some(std::path::Path::new("/nonexistent/console.toml")))
        .expect_err("missing file");
    assert!(err.to_string().contains("failed to read config file"));
}

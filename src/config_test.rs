use std::collections::HashMap;

use super::*;

fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs.iter().map(|(k, v)| ((*k).to_string(), (*v).to_string())).collect();
    move |key| map.get(key).cloned()
}

#[test]
fn defaults_when_unset() {
    let cfg = AppConfig::from_lookup(lookup_from(&[])).unwrap();
    assert_eq!(cfg, AppConfig::default());
    assert_eq!(cfg.port, 3000);
    assert_eq!(cfg.side2_export_basename, "survey_data");
}

#[test]
fn overrides_are_parsed() {
    let cfg = AppConfig::from_lookup(lookup_from(&[
        ("PORT", "8080"),
        ("SIDE2_EXPORT_BASENAME", "class_a"),
        ("SIDE1_EXPORT_BASENAME", " scans "),
        ("MAX_UPLOAD_BYTES", "1024"),
        ("MAX_OCCURRENCES", "12"),
        ("SCAN_MAX_TOKENS", "2048"),
    ]))
    .unwrap();
    assert_eq!(cfg.port, 8080);
    assert_eq!(cfg.side2_export_basename, "class_a");
    assert_eq!(cfg.side1_export_basename, "scans");
    assert_eq!(cfg.max_upload_bytes, 1024);
    assert_eq!(cfg.max_occurrences, 12);
    assert_eq!(cfg.scan_max_tokens, 2048);
}

#[test]
fn blank_values_fall_back_to_defaults() {
    let cfg = AppConfig::from_lookup(lookup_from(&[("PORT", "  "), ("SIDE2_EXPORT_BASENAME", "")])).unwrap();
    assert_eq!(cfg.port, DEFAULT_PORT);
    assert_eq!(cfg.side2_export_basename, DEFAULT_SIDE2_EXPORT_BASENAME);
}

#[test]
fn invalid_port_errors() {
    let err = AppConfig::from_lookup(lookup_from(&[("PORT", "http")])).unwrap_err();
    assert!(err.to_string().contains("PORT"));
}

#[test]
fn invalid_scan_max_tokens_errors() {
    let err = AppConfig::from_lookup(lookup_from(&[("SCAN_MAX_TOKENS", "-5")])).unwrap_err();
    assert!(matches!(err, ConfigError::Invalid { key: "SCAN_MAX_TOKENS", .. }));
}

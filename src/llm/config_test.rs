use std::collections::HashMap;

use super::*;

fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs.iter().map(|(k, v)| ((*k).to_string(), (*v).to_string())).collect();
    move |key| map.get(key).cloned()
}

#[test]
fn defaults_to_gemini() {
    let cfg = LlmConfig::from_lookup(lookup_from(&[("API_KEY", "k")])).unwrap();
    assert_eq!(cfg.provider, LlmProviderKind::Gemini);
    assert_eq!(cfg.api_key, "k");
    assert_eq!(cfg.model, "gemini-2.5-flash");
    assert_eq!(cfg.base_url, DEFAULT_GEMINI_BASE_URL);
    assert_eq!(cfg.timeouts.request_secs, DEFAULT_LLM_REQUEST_TIMEOUT_SECS);
    assert_eq!(cfg.timeouts.connect_secs, DEFAULT_LLM_CONNECT_TIMEOUT_SECS);
}

#[test]
fn anthropic_provider_defaults() {
    let cfg = LlmConfig::from_lookup(lookup_from(&[("LLM_PROVIDER", "anthropic"), ("API_KEY", "k")])).unwrap();
    assert_eq!(cfg.provider, LlmProviderKind::Anthropic);
    assert_eq!(cfg.model, "claude-sonnet-4-5-20250929");
    assert_eq!(cfg.base_url, DEFAULT_ANTHROPIC_BASE_URL);
}

#[test]
fn openai_provider_with_overrides() {
    let cfg = LlmConfig::from_lookup(lookup_from(&[
        ("LLM_PROVIDER", "openai"),
        ("LLM_API_KEY_ENV", "OPENAI_API_KEY"),
        ("OPENAI_API_KEY", "sk-test"),
        ("LLM_MODEL", "gpt-4o-mini"),
        ("LLM_BASE_URL", "http://localhost:8080/v1/"),
        ("LLM_REQUEST_TIMEOUT_SECS", "30"),
        ("LLM_CONNECT_TIMEOUT_SECS", "nope"),
    ]))
    .unwrap();
    assert_eq!(cfg.provider, LlmProviderKind::OpenAi);
    assert_eq!(cfg.api_key, "sk-test");
    assert_eq!(cfg.model, "gpt-4o-mini");
    assert_eq!(cfg.base_url, "http://localhost:8080/v1");
    assert_eq!(cfg.timeouts.request_secs, 30);
    assert_eq!(cfg.timeouts.connect_secs, DEFAULT_LLM_CONNECT_TIMEOUT_SECS);
}

#[test]
fn unknown_provider_errors() {
    let err = LlmConfig::from_lookup(lookup_from(&[("LLM_PROVIDER", "mystery"), ("API_KEY", "k")])).unwrap_err();
    assert!(matches!(err, LlmError::ConfigParse(msg) if msg.contains("mystery")));
}

#[test]
fn missing_key_names_the_variable() {
    let err = LlmConfig::from_lookup(lookup_from(&[("LLM_API_KEY_ENV", "GEMINI_KEY")])).unwrap_err();
    assert!(matches!(err, LlmError::MissingApiKey { var } if var == "GEMINI_KEY"));
}

#[test]
fn blank_key_counts_as_missing() {
    let err = LlmConfig::from_lookup(lookup_from(&[("API_KEY", "   ")])).unwrap_err();
    assert!(matches!(err, LlmError::MissingApiKey { var } if var == DEFAULT_API_KEY_ENV));
}

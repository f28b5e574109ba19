use std::fs;
use std::sync::Arc;

use llmbridge::cli::{load_factory, provider_entries};
use llmbridge::{BridgeConfig, BridgeError, ProviderRegistry, Timeouts};
use tempfile::tempdir;

#[test]
fn config_file_resolves_environment_credentials() {
    std::env::set_var("LLMBRIDGE_TEST_DEEPSEEK_KEY", "sk-from-env");
    let dir = tempdir().expect("temp dir");
    let path = dir.path().join("bridge.json");
    fs::write(
        &path,
        r#"{
            "default_provider": "deepseek",
            "timeout_ms": 5000,
            "providers": {
                "deepseek": {
                    "api_key": "${LLMBRIDGE_TEST_DEEPSEEK_KEY}",
                    "default_model": "deepseek-reasoner",
                    "parameters": { "temperature": 0.3 }
                },
                "openai": { "api_key": "sk-inline", "api_url": "https://proxy.example.com/v1" }
            }
        }"#,
    )
    .expect("write config");

    let config = BridgeConfig::from_path(&path).unwrap();
    assert_eq!(config.default_provider, "deepseek");
    assert_eq!(config.timeouts(), Timeouts::from_millis(5_000, 300_000));
    let deepseek = config.provider("deepseek").unwrap();
    assert_eq!(deepseek.api_key, "sk-from-env");
    assert_eq!(deepseek.model(), Some("deepseek-reasoner"));
    assert_eq!(config.configured_providers(), vec!["deepseek", "openai"]);
}

#[test]
fn unset_environment_credential_is_configuration_error() {
    std::env::remove_var("LLMBRIDGE_TEST_MISSING_KEY");
    let err = BridgeConfig::from_json_str(
        r#"{ "providers": { "openai": { "api_key": "${LLMBRIDGE_TEST_MISSING_KEY}" } } }"#,
    )
    .unwrap_err();
    match err {
        BridgeError::Configuration(message) => {
            assert!(message.contains("LLMBRIDGE_TEST_MISSING_KEY"))
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn missing_file_is_reported() {
    let dir = tempdir().expect("temp dir");
    assert!(BridgeConfig::from_path(dir.path().join("absent.json")).is_err());
}

#[test]
fn loaded_factory_builds_configured_services() {
    let dir = tempdir().expect("temp dir");
    let path = dir.path().join("bridge.json");
    fs::write(
        &path,
        r#"{ "default_provider": "SiliconFlow", "providers": { "SiliconFlow": { "api_key": "sk-sf" } } }"#,
    )
    .expect("write config");

    let factory = load_factory(&path).unwrap();
    let service = factory.get_default_service().unwrap();
    assert_eq!(service.provider_name(), "siliconflow");
    assert!(Arc::ptr_eq(&service, &factory.get_service("siliconflow").unwrap()));
}

#[test]
fn provider_entries_follow_priority() {
    let entries = provider_entries(&ProviderRegistry::default());
    let names: Vec<_> = entries.iter().map(|entry| entry.name.as_str()).collect();
    assert_eq!(names, vec!["openai", "deepseek", "doubao", "siliconflow"]);
    assert_eq!(entries[2].priority, 30);
    assert!(entries[3]
        .models
        .as_ref()
        .unwrap()
        .contains(&"Qwen/Qwen2.5-7B-Instruct".to_string()));
}

//! Integration tests for model resolution
//!
//! Covers explicit-config precedence, fallback walking, the Ollama base URL
//! override and caller-driven exclusion after a run-time failure.

use modelroute::config::{Config, OLLAMA_BASE_URL_ENV, OPENAI_API_KEY_ENV};
use modelroute::error::AppError;
use modelroute::providers::{DEFAULT_OLLAMA_BASE_URL, ModelConfig, Provider, ProviderSet, Task};
use modelroute::resolver::ModelResolver;
use std::collections::HashMap;

fn env_from(pairs: &[(&str, &str)]) -> HashMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

fn resolver_with_env(toml: &str, pairs: &[(&str, &str)]) -> ModelResolver {
    let env = env_from(pairs);
    let config: Config = toml.parse().expect("test config should parse");
    let config = config.apply_env(|name| env.get(name).cloned());
    config.validate().expect("config should stay valid after env overlay");
    ModelResolver::new(&config).expect("resolver should build")
}

#[test]
fn test_ollama_uses_default_base_url_when_override_unset() {
    let resolver = resolver_with_env("", &[]);
    let config = resolver.resolve(Task::Planner, None).unwrap();

    assert_eq!(config.provider, Provider::Ollama);
    assert_eq!(config.base_url.as_deref(), Some(DEFAULT_OLLAMA_BASE_URL));
    assert_eq!(resolver.ollama_base_url(), "http://localhost:11434");
}

#[test]
fn test_ollama_uses_custom_base_url_from_override() {
    let resolver = resolver_with_env("", &[(OLLAMA_BASE_URL_ENV, "http://custom-ollama:11434")]);
    let config = resolver.resolve(Task::Reviewer, None).unwrap();

    assert_eq!(config.provider, Provider::Ollama);
    assert_eq!(config.model_name, "llama3.2:latest");
    assert_eq!(config.base_url.as_deref(), Some("http://custom-ollama:11434"));
}

#[test]
fn test_configured_ollama_override_uses_custom_base_url() {
    let resolver = resolver_with_env(
        "[tasks]\nplanner = \"ollama:qwen2.5:14b\"\n",
        &[(OLLAMA_BASE_URL_ENV, "http://gpu-box:11434")],
    );
    let config = resolver.resolve_configured(Task::Planner).unwrap();

    assert_eq!(config.provider, Provider::Ollama);
    assert_eq!(config.model_name, "qwen2.5:14b");
    assert_eq!(config.base_url.as_deref(), Some("http://gpu-box:11434"));
    assert_eq!(config.api_key.as_deref(), Some(""));
}

#[test]
fn test_configured_hosted_override_carries_key_from_env() {
    let resolver = resolver_with_env(
        "[tasks]\nreviewer = \"openai:o3\"\n",
        &[(OPENAI_API_KEY_ENV, "sk-real")],
    );
    let config = resolver.resolve_configured(Task::Reviewer).unwrap();

    assert_eq!(config.provider, Provider::OpenAi);
    assert_eq!(config.model_name, "o3");
    assert_eq!(config.api_key.as_deref(), Some("sk-real"));
}

#[test]
fn test_explicit_config_for_excluded_provider_is_skipped() {
    let resolver = resolver_with_env("", &[(OPENAI_API_KEY_ENV, "sk-openai")]);
    let explicit = ModelConfig::new(Provider::OpenAi, "o3").with_api_key("sk-openai");
    let excluded: ProviderSet = [Provider::OpenAi].into_iter().collect();

    let config = resolver
        .resolve_excluding(Task::Planner, Some(&explicit), &excluded)
        .unwrap();
    assert_eq!(config.provider, Provider::Ollama);
}

#[test]
fn test_ollama_accepts_missing_api_key() {
    let resolver = resolver_with_env("", &[]);
    let config = resolver.resolve(Task::Summarizer, None).unwrap();
    assert_eq!(config.api_key.as_deref(), Some(""));
}

#[test]
fn test_hosted_key_from_env_takes_priority_over_ollama() {
    let resolver = resolver_with_env("", &[(OPENAI_API_KEY_ENV, "sk-test")]);
    let config = resolver.resolve(Task::Programmer, None).unwrap();

    assert_eq!(config.provider, Provider::OpenAi);
    assert_eq!(config.model_name, "gpt-4.1");
    assert_eq!(config.api_key.as_deref(), Some("sk-test"));
}

#[test]
fn test_empty_hosted_key_is_not_usable() {
    let resolver = resolver_with_env(
        r#"
[providers.openai]
api_key = ""
"#,
        &[],
    );
    let config = resolver.resolve(Task::Router, None).unwrap();
    assert_eq!(config.provider, Provider::Ollama);
}

#[test]
fn test_explicit_config_wins_over_defaults() {
    let resolver = resolver_with_env("", &[(OPENAI_API_KEY_ENV, "sk-test")]);
    let explicit = ModelConfig::new(Provider::Anthropic, "claude-opus-4-0")
        .with_api_key("sk-explicit")
        .with_base_url("https://proxy.internal");

    let config = resolver.resolve(Task::Planner, Some(&explicit)).unwrap();
    assert_eq!(config, explicit);
}

#[test]
fn test_every_task_resolves_with_only_ollama() {
    let resolver = resolver_with_env("", &[]);
    for task in Task::ALL {
        let config = resolver.resolve(task, None).unwrap();
        assert_eq!(config.provider, Provider::Ollama);
        assert!(!config.model_name.is_empty());
    }
}

#[test]
fn test_caller_can_exclude_failed_provider() {
    let resolver = resolver_with_env(
        r#"
[providers.anthropic]
api_key = "sk-ant"
"#,
        &[(OPENAI_API_KEY_ENV, "sk-openai")],
    );

    let first = resolver.resolve(Task::Planner, None).unwrap();
    assert_eq!(first.provider, Provider::OpenAi);

    let mut excluded = ProviderSet::new();
    excluded.insert(first.provider);
    let second = resolver
        .resolve_excluding(Task::Planner, None, &excluded)
        .unwrap();
    assert_eq!(second.provider, Provider::Anthropic);
    assert_eq!(second.model_name, "claude-sonnet-4-0");
}

#[test]
fn test_no_usable_provider_is_fatal() {
    let resolver = resolver_with_env(
        r#"
[providers.ollama]
enabled = false
"#,
        &[],
    );
    let err = resolver.resolve(Task::Router, None).unwrap_err();
    assert!(matches!(err, AppError::NoUsableProvider { .. }));
}

#[test]
fn test_concurrent_resolutions_are_independent() {
    let resolver = std::sync::Arc::new(resolver_with_env("", &[]));
    let handles: Vec<_> = Task::ALL
        .into_iter()
        .map(|task| {
            let resolver = resolver.clone();
            std::thread::spawn(move || (task, resolver.resolve(task, None).unwrap()))
        })
        .collect();

    for handle in handles {
        let (task, config) = handle.join().unwrap();
        assert_eq!(
            config,
            resolver.resolve(task, None).unwrap(),
            "resolution for {} should not depend on other tasks",
            task
        );
    }
}

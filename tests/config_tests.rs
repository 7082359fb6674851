//! Tests for configuration loading from the process environment.

use std::sync::{Mutex, OnceLock};

use examus::config::{ExamusConfig, CONFIG_FILE_NAME};
use examus::error::ExamusError;
use examus::types::FramingMode;

static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

const CONFIG_ENV_VARS: [&str; 7] = [
    "EXAMUS_BASE_URL",
    "OLLAMA_BASE_URL",
    "EXAMUS_MODEL",
    "EXAMUS_TEMPERATURE",
    "EXAMUS_MAX_TOKENS",
    "EXAMUS_FRAMING",
    "EXAMUS_DATA_DIR",
];

struct EnvGuard {
    saved: Vec<(String, Option<String>)>,
}

impl EnvGuard {
    fn capture(keys: &[&str]) -> Self {
        let saved = keys
            .iter()
            .map(|key| ((*key).to_string(), std::env::var(key).ok()))
            .collect();
        for key in keys {
            std::env::remove_var(key);
        }
        Self { saved }
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        for (key, value) in &self.saved {
            match value {
                Some(v) => std::env::set_var(key, v),
                None => std::env::remove_var(key),
            }
        }
    }
}

fn env_lock_guard() -> std::sync::MutexGuard<'static, ()> {
    ENV_LOCK
        .get_or_init(|| Mutex::new(()))
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[test]
fn from_env_reads_examus_variables() {
    let _lock = env_lock_guard();
    let _guard = EnvGuard::capture(&CONFIG_ENV_VARS);
    let dir = tempfile::tempdir().unwrap();

    std::env::set_var("EXAMUS_DATA_DIR", dir.path());
    std::env::set_var("EXAMUS_BASE_URL", "http://tutor-box:11434");
    std::env::set_var("EXAMUS_MODEL", "llama3.2");
    std::env::set_var("EXAMUS_TEMPERATURE", "0.5");
    std::env::set_var("EXAMUS_MAX_TOKENS", "400");
    std::env::set_var("EXAMUS_FRAMING", "per-chunk");

    let config = ExamusConfig::from_env().unwrap();
    assert_eq!(config.base_url, "http://tutor-box:11434");
    assert_eq!(config.model, "llama3.2");
    assert_eq!(config.settings.max_tokens, 400);
    assert!((config.settings.temperature - 0.5).abs() < f64::EPSILON);
    assert_eq!(config.framing, FramingMode::PerChunk);
    assert_eq!(config.data_dir, dir.path());
}

#[test]
fn examus_base_url_wins_over_ollama_base_url() {
    let _lock = env_lock_guard();
    let _guard = EnvGuard::capture(&CONFIG_ENV_VARS);
    let dir = tempfile::tempdir().unwrap();

    std::env::set_var("EXAMUS_DATA_DIR", dir.path());
    std::env::set_var("OLLAMA_BASE_URL", "http://ollama:11434");
    assert_eq!(
        ExamusConfig::from_env().unwrap().base_url,
        "http://ollama:11434"
    );

    std::env::set_var("EXAMUS_BASE_URL", "http://examus:11434");
    assert_eq!(
        ExamusConfig::from_env().unwrap().base_url,
        "http://examus:11434"
    );
}

#[test]
fn config_file_in_data_dir_is_applied() {
    let _lock = env_lock_guard();
    let _guard = EnvGuard::capture(&CONFIG_ENV_VARS);
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join(CONFIG_FILE_NAME),
        "model = \"phi3\"\nmax_tokens = 250\nsystem_prompt = \"Be brief.\"\n",
    )
    .unwrap();

    std::env::set_var("EXAMUS_DATA_DIR", dir.path());
    let config = ExamusConfig::from_env().unwrap();
    assert_eq!(config.model, "phi3");
    assert_eq!(config.settings.max_tokens, 250);
    assert_eq!(config.system_prompt, "Be brief.");
}

#[test]
fn invalid_variable_is_configuration_error() {
    let _lock = env_lock_guard();
    let _guard = EnvGuard::capture(&CONFIG_ENV_VARS);
    let dir = tempfile::tempdir().unwrap();

    std::env::set_var("EXAMUS_DATA_DIR", dir.path());
    std::env::set_var("EXAMUS_TEMPERATURE", "warm");
    let err = ExamusConfig::from_env().unwrap_err();
    assert!(matches!(err, ExamusError::Configuration(_)));
    assert!(err.to_string().contains("EXAMUS_TEMPERATURE"));
}

#[test]
fn unknown_config_key_is_rejected() {
    let _lock = env_lock_guard();
    let _guard = EnvGuard::capture(&CONFIG_ENV_VARS);
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join(CONFIG_FILE_NAME), "api_key = \"x\"\n").unwrap();

    std::env::set_var("EXAMUS_DATA_DIR", dir.path());
    assert!(matches!(
        ExamusConfig::from_env(),
        Err(ExamusError::Toml(_))
    ));
}

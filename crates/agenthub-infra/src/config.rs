//! Global configuration loader for AgentHub.
//!
//! Reads `config.toml` from the data directory (`~/.agenthub/` in production)
//! and deserializes it into [`GlobalConfig`]. Falls back to defaults when the
//! file is missing or malformed.

use std::path::{Path, PathBuf};

use agenthub_types::config::GlobalConfig;

/// Environment variable overriding the data directory.
pub const DATA_DIR_ENV: &str = "AGENTHUB_DATA_DIR";

/// The data directory: `AGENTHUB_DATA_DIR` if set, else `~/.agenthub`.
pub fn data_dir() -> PathBuf {
    match std::env::var_os(DATA_DIR_ENV) {
        Some(dir) if !dir.is_empty() => PathBuf::from(dir),
        _ => dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".agenthub"),
    }
}

/// Load global configuration from `{data_dir}/config.toml`.
///
/// - If the file does not exist, returns [`GlobalConfig::default()`].
/// - If the file exists but fails to parse, logs a warning and returns the default.
/// - If the file exists and parses successfully, returns the parsed config.
pub async fn load_global_config(data_dir: &Path) -> GlobalConfig {
    let config_path = data_dir.join("config.toml");

    let content = match tokio::fs::read_to_string(&config_path).await {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("No config.toml found at {}, using defaults", config_path.display());
            return GlobalConfig::default();
        }
        Err(err) => {
            tracing::warn!("Failed to read {}: {err}, using defaults", config_path.display());
            return GlobalConfig::default();
        }
    };

    match toml::from_str::<GlobalConfig>(&content) {
        Ok(config) => config,
        Err(err) => {
            tracing::warn!(
                "Failed to parse {}: {err}, using defaults",
                config_path.display()
            );
            GlobalConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agenthub_types::runner::OutputPolicy;
    use tempfile::TempDir;

    #[tokio::test]
    async fn load_global_config_missing_file_returns_default() {
        let tmp = TempDir::new().unwrap();
        let config = load_global_config(tmp.path()).await;
        assert_eq!(config.default_model, "gpt-4o-mini");
        assert_eq!(config.execution_timeout_secs, 120);
        assert!(config.providers.is_empty());
    }

    #[tokio::test]
    async fn load_global_config_valid_toml_returns_parsed() {
        let tmp = TempDir::new().unwrap();
        let config_path = tmp.path().join("config.toml");
        tokio::fs::write(
            &config_path,
            r#"
default_model = "gemini/gemini-2.5-flash"
execution_timeout_secs = 30
output_policy = "last_block"

[providers.groq]
api_key_env = "MY_GROQ_KEY"
"#,
        )
        .await
        .unwrap();

        let config = load_global_config(tmp.path()).await;
        assert_eq!(config.default_model, "gemini/gemini-2.5-flash");
        assert_eq!(config.execution_timeout_secs, 30);
        assert_eq!(config.output_policy, OutputPolicy::LastBlock);
        assert_eq!(config.app_name, "AgentHub");
        assert_eq!(
            config.providers["groq"].api_key_env.as_deref(),
            Some("MY_GROQ_KEY")
        );
    }

    #[tokio::test]
    async fn load_global_config_invalid_toml_returns_default() {
        let tmp = TempDir::new().unwrap();
        let config_path = tmp.path().join("config.toml");
        tokio::fs::write(&config_path, "this is not { valid toml !!!")
            .await
            .unwrap();

        let config = load_global_config(tmp.path()).await;
        assert_eq!(config.default_model, "gpt-4o-mini");
        assert!(config.providers.is_empty());
    }

    #[test]
    fn data_dir_ends_with_agenthub_by_default() {
        if std::env::var_os(DATA_DIR_ENV).is_none() {
            assert!(data_dir().ends_with(".agenthub"));
        }
    }
}

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::env;
use std::path::Path;

pub const ENV_PREFIX: &str = "MEETMAP";

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub cors_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8000,
            cors_origins: vec![
                "http://localhost:5173".to_string(),
                "http://127.0.0.1:5173".to_string(),
            ],
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct StorageConfig {
    pub data_dir: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: "data".to_string(),
        }
    }
}

/// Text-generation backend used for graph, summary and task extraction.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct LlmConfig {
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: "gemini-1.5-flash".to_string(),
            base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            timeout_secs: 60,
        }
    }
}

impl LlmConfig {
    /// The key, if one is set and non-blank. Without it extraction runs on mock data.
    pub fn api_key(&self) -> Option<&str> {
        non_blank(self.api_key.as_deref())
    }
}

/// Chat-completion backend behind the grounded chat endpoint.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ChatConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub timeout_secs: u64,
    pub context_chars: usize,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: "https://api.friendli.ai/serverless/v1".to_string(),
            model: "meta-llama-3.1-8b-instruct".to_string(),
            temperature: 0.3,
            max_tokens: 512,
            timeout_secs: 40,
            context_chars: 18_000,
        }
    }
}

impl ChatConfig {
    pub fn api_key(&self) -> Option<&str> {
        non_blank(self.api_key.as_deref())
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub llm: LlmConfig,
    pub chat: ChatConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());
        Self::load_from(Path::new("config"), &run_mode)
    }

    /// Layer `{dir}/default`, `{dir}/{run_mode}` and `MEETMAP__*` environment
    /// variables over the built-in defaults. Both files are optional.
    pub fn load_from(dir: &Path, run_mode: &str) -> Result<Self, ConfigError> {
        let builder = Config::builder()
            .add_source(File::from(dir.join("default")).required(false))
            .add_source(File::from(dir.join(run_mode)).required(false))
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("server.cors_origins"),
            );

        builder.build()?.try_deserialize()
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_defaults_without_files() {
        let dir = tempdir().unwrap();
        let config = AppConfig::load_from(dir.path(), "development").unwrap();

        assert_eq!(config.server.port, 8000);
        assert_eq!(config.storage.data_dir, "data");
        assert_eq!(config.llm.model, "gemini-1.5-flash");
        assert_eq!(config.chat.context_chars, 18_000);
    }

    #[test]
    fn test_run_mode_file_overrides_default_file() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join("default.toml"),
            "[server]\nport = 9000\n[storage]\ndata_dir = \"/srv/meetmap\"\n",
        )
        .unwrap();
        fs::write(dir.path().join("test.toml"), "[server]\nport = 9100\n").unwrap();

        let config = AppConfig::load_from(dir.path(), "test").unwrap();
        assert_eq!(config.server.port, 9100);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.storage.data_dir, "/srv/meetmap");
    }

    #[test]
    fn test_blank_api_key_counts_as_unset() {
        let llm = LlmConfig {
            api_key: Some("   ".to_string()),
            ..LlmConfig::default()
        };
        assert_eq!(llm.api_key(), None);

        let chat = ChatConfig {
            api_key: Some("flp_x".to_string()),
            ..ChatConfig::default()
        };
        assert_eq!(chat.api_key(), Some("flp_x"));
    }
}

//! Configuration and judge factory.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use wordcraft_core::traits::Judge;

use crate::anthropic::AnthropicJudge;
use crate::mock::MockJudge;
use crate::openai::OpenAiJudge;
use crate::remote::RemoteJudge;

/// Configuration for a single judge backend.
///
/// Note: Custom Debug impl masks API keys to prevent accidental exposure in logs.
#[derive(Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum JudgeConfig {
    Remote {
        #[serde(default)]
        base_url: Option<String>,
    },
    Anthropic {
        api_key: String,
        #[serde(default)]
        base_url: Option<String>,
        #[serde(default)]
        model: Option<String>,
    },
    OpenAI {
        api_key: String,
        #[serde(default)]
        base_url: Option<String>,
        #[serde(default)]
        org_id: Option<String>,
        #[serde(default)]
        model: Option<String>,
    },
    Mock {
        #[serde(default = "default_mock_score")]
        score: u8,
    },
}

impl std::fmt::Debug for JudgeConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JudgeConfig::Remote { base_url } => f
                .debug_struct("Remote")
                .field("base_url", base_url)
                .finish(),
            JudgeConfig::Anthropic {
                api_key: _,
                base_url,
                model,
            } => f
                .debug_struct("Anthropic")
                .field("api_key", &"***")
                .field("base_url", base_url)
                .field("model", model)
                .finish(),
            JudgeConfig::OpenAI {
                api_key: _,
                base_url,
                org_id,
                model,
            } => f
                .debug_struct("OpenAI")
                .field("api_key", &"***")
                .field("base_url", base_url)
                .field("org_id", org_id)
                .field("model", model)
                .finish(),
            JudgeConfig::Mock { score } => f.debug_struct("Mock").field("score", score).finish(),
        }
    }
}

fn default_mock_score() -> u8 {
    3
}

/// Assessment service settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Address to listen on.
    #[serde(default = "default_bind")]
    pub bind: String,
    /// Judge the service forwards to.
    #[serde(default = "default_server_judge")]
    pub judge: String,
    /// Requests allowed per client within one window.
    #[serde(default = "default_rate_limit_max")]
    pub rate_limit_max: u32,
    /// Sliding window length in seconds.
    #[serde(default = "default_rate_limit_window")]
    pub rate_limit_window_secs: u64,
}

fn default_bind() -> String {
    "127.0.0.1:8787".to_string()
}
fn default_server_judge() -> String {
    "anthropic".to_string()
}
fn default_rate_limit_max() -> u32 {
    10
}
fn default_rate_limit_window() -> u64 {
    60
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            judge: default_server_judge(),
            rate_limit_max: default_rate_limit_max(),
            rate_limit_window_secs: default_rate_limit_window(),
        }
    }
}

/// Top-level wordcraft configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WordcraftConfig {
    /// Judge configurations keyed by name.
    #[serde(default)]
    pub judges: HashMap<String, JudgeConfig>,
    /// Judge used by the CLI.
    #[serde(default = "default_judge")]
    pub default_judge: String,
    /// Model override applied to whichever LLM judge is selected.
    #[serde(default)]
    pub judge_model: Option<String>,
    /// Directory holding local progress and preferences. `${VAR}` is
    /// interpolated; `~` is not.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    /// Custom word bank; the built-in bank is used when unset.
    #[serde(default)]
    pub bank: Option<PathBuf>,
    /// Assessment service settings.
    #[serde(default)]
    pub server: ServerConfig,
}

fn default_judge() -> String {
    "remote".to_string()
}
fn default_data_dir() -> PathBuf {
    std::env::var("HOME")
        .map(|h| PathBuf::from(h).join(".local").join("share").join("wordcraft"))
        .unwrap_or_else(|_| PathBuf::from(".wordcraft"))
}

impl Default for WordcraftConfig {
    fn default() -> Self {
        Self {
            judges: HashMap::new(),
            default_judge: default_judge(),
            judge_model: None,
            data_dir: default_data_dir(),
            bank: None,
            server: ServerConfig::default(),
        }
    }
}

impl WordcraftConfig {
    /// Look up a judge by name. `remote` and `mock` work without an entry.
    pub fn judge_config(&self, name: &str) -> Result<JudgeConfig> {
        if let Some(config) = self.judges.get(name) {
            return Ok(config.clone());
        }
        match name {
            "remote" => Ok(JudgeConfig::Remote { base_url: None }),
            "mock" => Ok(JudgeConfig::Mock {
                score: default_mock_score(),
            }),
            _ => {
                let mut available: Vec<&String> = self.judges.keys().collect();
                available.sort();
                anyhow::bail!("judge '{name}' not found in config. Available: {available:?}")
            }
        }
    }
}

/// Resolve environment variable references like `${VAR_NAME}` in a string.
fn resolve_env_vars(s: &str) -> String {
    let mut result = s.to_string();
    while let Some(start) = result.find("${") {
        if let Some(end) = result[start..].find('}') {
            let var_name = &result[start + 2..start + end];
            let value = std::env::var(var_name).unwrap_or_default();
            result = format!(
                "{}{}{}",
                &result[..start],
                value,
                &result[start + end + 1..]
            );
        } else {
            break;
        }
    }
    result
}

fn resolve_opt(s: &Option<String>) -> Option<String> {
    s.as_ref().map(|v| resolve_env_vars(v))
}

fn resolve_path(path: &Path) -> PathBuf {
    PathBuf::from(resolve_env_vars(&path.to_string_lossy()))
}

/// Resolve env vars in a judge config.
fn resolve_judge_config(config: &JudgeConfig) -> JudgeConfig {
    match config {
        JudgeConfig::Remote { base_url } => JudgeConfig::Remote {
            base_url: resolve_opt(base_url),
        },
        JudgeConfig::Anthropic {
            api_key,
            base_url,
            model,
        } => JudgeConfig::Anthropic {
            api_key: resolve_env_vars(api_key),
            base_url: resolve_opt(base_url),
            model: resolve_opt(model),
        },
        JudgeConfig::OpenAI {
            api_key,
            base_url,
            org_id,
            model,
        } => JudgeConfig::OpenAI {
            api_key: resolve_env_vars(api_key),
            base_url: resolve_opt(base_url),
            org_id: resolve_opt(org_id),
            model: resolve_opt(model),
        },
        JudgeConfig::Mock { score } => JudgeConfig::Mock { score: *score },
    }
}

/// Load configuration from well-known paths.
///
/// Search order:
/// 1. `wordcraft.toml` in the current directory
/// 2. `~/.config/wordcraft/config.toml`
///
/// Environment variable overrides: `WORDCRAFT_ANTHROPIC_KEY`,
/// `WORDCRAFT_OPENAI_KEY`, `WORDCRAFT_SERVICE_URL`.
pub fn load_config() -> Result<WordcraftConfig> {
    load_config_from(None)
}

/// Load config from an explicit path, or search the default locations.
pub fn load_config_from(path: Option<&Path>) -> Result<WordcraftConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from("wordcraft.toml");
        if local.exists() {
            Some(local)
        } else {
            config_dir()
                .map(|dir| dir.join("config.toml"))
                .filter(|global| global.exists())
        }
    };

    let mut config = match config_path {
        Some(path) => {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            toml::from_str::<WordcraftConfig>(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?
        }
        None => WordcraftConfig::default(),
    };

    apply_env_overrides(&mut config);

    config.data_dir = resolve_path(&config.data_dir);
    config.bank = config.bank.as_deref().map(resolve_path);
    config.judges = config
        .judges
        .iter()
        .map(|(k, v)| (k.clone(), resolve_judge_config(v)))
        .collect();

    Ok(config)
}

fn apply_env_overrides(config: &mut WordcraftConfig) {
    if let Ok(key) = std::env::var("WORDCRAFT_ANTHROPIC_KEY") {
        let entry = config
            .judges
            .entry("anthropic".into())
            .or_insert(JudgeConfig::Anthropic {
                api_key: String::new(),
                base_url: None,
                model: None,
            });
        if let JudgeConfig::Anthropic { api_key, .. } = entry {
            *api_key = key;
        }
    }

    if let Ok(key) = std::env::var("WORDCRAFT_OPENAI_KEY") {
        let entry = config
            .judges
            .entry("openai".into())
            .or_insert(JudgeConfig::OpenAI {
                api_key: String::new(),
                base_url: None,
                org_id: None,
                model: None,
            });
        if let JudgeConfig::OpenAI { api_key, .. } = entry {
            *api_key = key;
        }
    }

    if let Ok(url) = std::env::var("WORDCRAFT_SERVICE_URL") {
        let entry = config
            .judges
            .entry("remote".into())
            .or_insert(JudgeConfig::Remote { base_url: None });
        if let JudgeConfig::Remote { base_url } = entry {
            *base_url = Some(url);
        }
    }
}

fn config_dir() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("wordcraft"))
}

/// Create a judge instance from its configuration.
///
/// `model_override` replaces the configured model of LLM judges.
pub fn create_judge(config: &JudgeConfig, model_override: Option<&str>) -> Result<Box<dyn Judge>> {
    let pick = |model: &Option<String>| model_override.map(str::to_string).or_else(|| model.clone());
    match config {
        JudgeConfig::Remote { base_url } => Ok(Box::new(RemoteJudge::new(base_url.clone())?)),
        JudgeConfig::Anthropic {
            api_key,
            base_url,
            model,
        } => Ok(Box::new(AnthropicJudge::new(
            api_key,
            base_url.clone(),
            pick(model),
        )?)),
        JudgeConfig::OpenAI {
            api_key,
            base_url,
            org_id,
            model,
        } => Ok(Box::new(OpenAiJudge::new(
            api_key,
            base_url.clone(),
            org_id.clone(),
            pick(model),
        )?)),
        JudgeConfig::Mock { score } => Ok(Box::new(MockJudge::with_fixed_score(*score))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_env_vars_basic() {
        std::env::set_var("_WORDCRAFT_TEST_VAR", "hello");
        assert_eq!(resolve_env_vars("${_WORDCRAFT_TEST_VAR}"), "hello");
        assert_eq!(
            resolve_env_vars("prefix_${_WORDCRAFT_TEST_VAR}_suffix"),
            "prefix_hello_suffix"
        );
        assert_eq!(resolve_env_vars("${unterminated"), "${unterminated");
        std::env::remove_var("_WORDCRAFT_TEST_VAR");
    }

    #[test]
    fn default_config() {
        let config = WordcraftConfig::default();
        assert_eq!(config.default_judge, "remote");
        assert_eq!(config.server.rate_limit_max, 10);
        assert_eq!(config.server.rate_limit_window_secs, 60);
        assert!(config.bank.is_none());
    }

    #[test]
    fn parse_judge_config() {
        let toml_str = r#"
default_judge = "anthropic"
judge_model = "claude-3-5-haiku-latest"
data_dir = "/tmp/wordcraft"

[judges.anthropic]
type = "anthropic"
api_key = "sk-test"

[judges.openai]
type = "openai"
api_key = "sk-openai"
model = "gpt-4.1-mini"

[judges.remote]
type = "remote"
base_url = "http://localhost:8787"

[judges.offline]
type = "mock"
score = 5

[server]
rate_limit_max = 3
"#;
        let config: WordcraftConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.judges.len(), 4);
        assert_eq!(config.judge_model.as_deref(), Some("claude-3-5-haiku-latest"));
        assert_eq!(config.data_dir, PathBuf::from("/tmp/wordcraft"));
        assert_eq!(config.server.rate_limit_max, 3);
        assert_eq!(config.server.bind, "127.0.0.1:8787");
        assert!(matches!(
            config.judges.get("offline"),
            Some(JudgeConfig::Mock { score: 5 })
        ));
    }

    #[test]
    fn debug_masks_api_keys() {
        let config = JudgeConfig::Anthropic {
            api_key: "sk-secret".into(),
            base_url: None,
            model: None,
        };
        let debug = format!("{config:?}");
        assert!(!debug.contains("sk-secret"));
        assert!(debug.contains("***"));
    }

    #[test]
    fn builtin_judge_names_resolve_without_entries() {
        let config = WordcraftConfig::default();
        assert!(matches!(
            config.judge_config("remote").unwrap(),
            JudgeConfig::Remote { base_url: None }
        ));
        assert!(matches!(
            config.judge_config("mock").unwrap(),
            JudgeConfig::Mock { score: 3 }
        ));
        let err = config.judge_config("gemini").unwrap_err();
        assert!(err.to_string().contains("not found"));
    }

    #[test]
    fn load_explicit_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wordcraft.toml");
        std::fs::write(
            &path,
            "default_judge = \"offline\"\n[judges.offline]\ntype = \"mock\"\nscore = 4\n",
        )
        .unwrap();
        let config = load_config_from(Some(&path)).unwrap();
        assert_eq!(config.default_judge, "offline");

        assert!(load_config_from(Some(&dir.path().join("missing.toml"))).is_err());
    }

    #[test]
    fn paths_interpolate_env_vars() {
        std::env::set_var("_WORDCRAFT_TEST_ROOT", "/srv/words");
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wordcraft.toml");
        std::fs::write(
            &path,
            "data_dir = \"${_WORDCRAFT_TEST_ROOT}/data\"\nbank = \"${_WORDCRAFT_TEST_ROOT}/bank.json\"\n",
        )
        .unwrap();
        let config = load_config_from(Some(&path)).unwrap();
        std::env::remove_var("_WORDCRAFT_TEST_ROOT");

        assert_eq!(config.data_dir, PathBuf::from("/srv/words/data"));
        assert_eq!(config.bank, Some(PathBuf::from("/srv/words/bank.json")));
    }

    #[test]
    fn create_each_judge_kind() {
        let remote = create_judge(&JudgeConfig::Remote { base_url: None }, None).unwrap();
        assert_eq!(remote.name(), "remote");
        let mock = create_judge(&JudgeConfig::Mock { score: 4 }, None).unwrap();
        assert_eq!(mock.name(), "mock");
        let openai = create_judge(
            &JudgeConfig::OpenAI {
                api_key: "k".into(),
                base_url: None,
                org_id: None,
                model: None,
            },
            Some("gpt-4.1-mini"),
        )
        .unwrap();
        assert_eq!(openai.name(), "openai");
    }
}

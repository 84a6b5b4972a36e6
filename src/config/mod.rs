//! Configuration management for termi

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub llm: LlmConfig,
    pub dialogue: DialogueConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Active provider: openai, azure-openai, gemini, claude, llama-cpp
    pub provider: String,
    pub openai: OpenAiConfig,
    pub azure_openai: AzureOpenAiConfig,
    pub gemini: GeminiConfig,
    pub claude: ClaudeConfig,
    pub llama_cpp: LlamaCppConfig,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: "openai".to_string(),
            openai: OpenAiConfig::default(),
            azure_openai: AzureOpenAiConfig::default(),
            gemini: GeminiConfig::default(),
            claude: ClaudeConfig::default(),
            llama_cpp: LlamaCppConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OpenAiConfig {
    pub api_key: String,
    pub model: String,
    pub base_url: Option<String>,
    pub org_id: Option<String>,
    pub timeout_secs: u64,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: "gpt-3.5-turbo".to_string(),
            base_url: None,
            org_id: None,
            timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AzureOpenAiConfig {
    pub api_key: String,
    pub base_url: String,
    pub deployment_id: String,
    pub api_version: String,
    pub timeout_secs: u64,
}

impl Default for AzureOpenAiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: String::new(),
            deployment_id: String::new(),
            api_version: "2023-12-01-preview".to_string(),
            timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeminiConfig {
    pub api_key: String,
    pub model: String,
    pub base_url: Option<String>,
    pub timeout_secs: u64,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: "gemini-pro".to_string(),
            base_url: None,
            timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClaudeConfig {
    pub api_key: String,
    pub model: String,
    pub base_url: Option<String>,
    pub timeout_secs: u64,
}

impl Default for ClaudeConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: "claude-3-haiku-20240307".to_string(),
            base_url: None,
            timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlamaCppConfig {
    /// The server serves a single model; only its address is configurable.
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for LlamaCppConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            timeout_secs: 30,
        }
    }
}

/// Settings for the clarification dialogue itself
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DialogueConfig {
    /// Upper bound on clarification round trips before giving up.
    /// 0 means unbounded.
    pub max_clarify_turns: usize,
}

impl Default for DialogueConfig {
    fn default() -> Self {
        Self {
            max_clarify_turns: 0,
        }
    }
}

impl Config {
    /// Load configuration: the TOML file when present, otherwise environment
    /// variables, otherwise defaults (which leave the provider disabled).
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;
        if config_path.exists() {
            return Self::load_from(&config_path);
        }
        Ok(Self::from_env())
    }

    /// Load configuration from a specific TOML file.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Build a configuration from environment variables.
    ///
    /// Providers are scanned in a fixed order; the first one with its primary
    /// variable set becomes the active provider and pulls its secondary
    /// variables. With nothing set, the default (disabled) config is
    /// returned and the dialogue reports the auth error.
    pub fn from_env() -> Self {
        let mut config = Config::default();

        if let Ok(key) = std::env::var("OPENAI_API_KEY") {
            config.llm.provider = "openai".to_string();
            config.llm.openai.api_key = key;
            config.llm.openai.base_url = std::env::var("OPENAI_BASE_URL").ok();
            config.llm.openai.org_id = std::env::var("OPENAI_ORG_ID").ok();
            if let Ok(model) = std::env::var("OPENAI_MODEL") {
                config.llm.openai.model = model;
            }
        } else if let Ok(key) = std::env::var("AZURE_OPENAI_API_KEY") {
            config.llm.provider = "azure-openai".to_string();
            config.llm.azure_openai.api_key = key;
            config.llm.azure_openai.base_url =
                std::env::var("AZURE_OPENAI_BASE_URL").unwrap_or_default();
            config.llm.azure_openai.deployment_id =
                std::env::var("AZURE_OPENAI_DEPLOYMENT_ID").unwrap_or_default();
            if let Ok(version) = std::env::var("AZURE_OPENAI_API_VERSION") {
                config.llm.azure_openai.api_version = version;
            }
        } else if let Ok(key) = std::env::var("GEMINI_API_KEY") {
            config.llm.provider = "gemini".to_string();
            config.llm.gemini.api_key = key;
            config.llm.gemini.base_url = std::env::var("GEMINI_BASE_URL").ok();
            if let Ok(model) = std::env::var("GEMINI_MODEL") {
                config.llm.gemini.model = model;
            }
        } else if let Ok(key) = std::env::var("ANTHROPIC_API_KEY") {
            config.llm.provider = "claude".to_string();
            config.llm.claude.api_key = key;
            config.llm.claude.base_url = std::env::var("ANTHROPIC_BASE_URL").ok();
            if let Ok(model) = std::env::var("CLAUDE_MODEL") {
                config.llm.claude.model = model;
            }
        } else if let Ok(base_url) = std::env::var("LLAMA_CPP_BASE_URL") {
            config.llm.provider = "llama-cpp".to_string();
            config.llm.llama_cpp.base_url = base_url;
        }

        config
    }

    /// Report the first missing field for the active provider.
    pub fn validate(&self) -> Result<()> {
        match self.llm.provider.as_str() {
            "openai" => {
                if self.llm.openai.api_key.is_empty() {
                    bail!("OpenAI API key is not set");
                }
            }
            "azure-openai" => {
                let azure = &self.llm.azure_openai;
                if azure.api_key.is_empty() {
                    bail!("Azure OpenAI API key is not set");
                }
                if azure.base_url.is_empty() {
                    bail!("Azure OpenAI base URL is not set");
                }
                if azure.deployment_id.is_empty() {
                    bail!("Azure OpenAI deployment id is not set");
                }
            }
            "gemini" => {
                if self.llm.gemini.api_key.is_empty() {
                    bail!("Gemini API key is not set");
                }
            }
            "claude" => {
                if self.llm.claude.api_key.is_empty() {
                    bail!("Claude API key is not set");
                }
            }
            "llama-cpp" => {
                if self.llm.llama_cpp.base_url.is_empty() {
                    bail!("llama.cpp base URL is not set");
                }
            }
            other => bail!("unknown provider: {other}"),
        }
        Ok(())
    }

    /// Get the configuration file path
    pub fn config_path() -> Result<PathBuf> {
        if let Some(proj_dirs) = directories::ProjectDirs::from("", "", "termi") {
            let config_dir = proj_dirs.config_dir();
            std::fs::create_dir_all(config_dir)?;
            Ok(config_dir.join("config.toml"))
        } else {
            Ok(PathBuf::from("config.toml"))
        }
    }

    /// Save configuration to the default location
    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;
        self.save_to(&config_path)
    }

    /// Save configuration to a specific TOML file.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

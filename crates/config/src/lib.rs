//! Configuration loading, validation, and management for codecrew.
//!
//! Loads configuration from `codecrew.toml` under the workspace root
//! (every field optional, serde defaults throughout) with an environment
//! variable override for the API key. Validates settings at startup.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;
use tracing::debug;

/// Environment variable overriding `[provider].api_key`.
pub const API_KEY_ENV: &str = "CODECREW_API_KEY";

/// Default config filename under the workspace root.
pub const CONFIG_FILE: &str = "codecrew.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(String),

    #[error("Failed to parse config file: {0}")]
    Parse(String),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// The root configuration structure. Maps directly to `codecrew.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub provider: ProviderConfig,

    #[serde(default)]
    pub retry: RetryConfig,

    #[serde(default)]
    pub memory: MemoryConfig,

    #[serde(default)]
    pub coordinator: CoordinatorConfig,

    #[serde(default)]
    pub tools: ToolsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default)]
    pub api_key: String,

    #[serde(default = "default_model")]
    pub model: String,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

fn default_base_url() -> String {
    "https://api.mistral.ai/v1".into()
}
fn default_model() -> String {
    "mistral-large-latest".into()
}
fn default_temperature() -> f32 {
    0.7
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key: String::new(),
            model: default_model(),
            temperature: default_temperature(),
            max_tokens: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    #[serde(default = "default_multiplier")]
    pub multiplier: f64,

    #[serde(default = "default_min_delay")]
    pub min_delay_secs: u64,

    #[serde(default = "default_max_delay")]
    pub max_delay_secs: u64,
}

fn default_max_attempts() -> u32 {
    3
}
fn default_multiplier() -> f64 {
    2.0
}
fn default_min_delay() -> u64 {
    2
}
fn default_max_delay() -> u64 {
    10
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            multiplier: default_multiplier(),
            min_delay_secs: default_min_delay(),
            max_delay_secs: default_max_delay(),
        }
    }
}

/// Which trim policy a role runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrimPolicyChoice {
    Summarize,
    Discard,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoleMemoryConfig {
    pub budget_chars: usize,
    pub policy: TrimPolicyChoice,
}

/// Per-role memory budgets. Both trim policies are deliberate options;
/// the defaults mirror the roles' historical behavior.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryConfig {
    #[serde(default = "default_agent_memory")]
    pub agent: RoleMemoryConfig,

    #[serde(default = "default_lead_memory")]
    pub lead: RoleMemoryConfig,

    #[serde(default = "default_worker_memory")]
    pub worker: RoleMemoryConfig,

    #[serde(default = "default_subagent_memory")]
    pub subagent: RoleMemoryConfig,
}

fn default_agent_memory() -> RoleMemoryConfig {
    RoleMemoryConfig {
        budget_chars: 120_000,
        policy: TrimPolicyChoice::Summarize,
    }
}
fn default_lead_memory() -> RoleMemoryConfig {
    RoleMemoryConfig {
        budget_chars: 40_000,
        policy: TrimPolicyChoice::Summarize,
    }
}
fn default_worker_memory() -> RoleMemoryConfig {
    RoleMemoryConfig {
        budget_chars: 120_000,
        policy: TrimPolicyChoice::Discard,
    }
}
fn default_subagent_memory() -> RoleMemoryConfig {
    RoleMemoryConfig {
        budget_chars: 120_000,
        policy: TrimPolicyChoice::Summarize,
    }
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            agent: default_agent_memory(),
            lead: default_lead_memory(),
            worker: default_worker_memory(),
            subagent: default_subagent_memory(),
        }
    }
}

/// How the coordinator reconciles the plan after a delegation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReconcileChoice {
    Incremental,
    Monolithic,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoordinatorConfig {
    #[serde(default = "default_reconcile")]
    pub reconcile: ReconcileChoice,
}

fn default_reconcile() -> ReconcileChoice {
    ReconcileChoice::Incremental
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            reconcile: default_reconcile(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolsConfig {
    /// Hard wall-clock timeout for subprocess-backed tools.
    #[serde(default = "default_script_timeout")]
    pub script_timeout_secs: u64,

    /// Start the approval gate in Auto (no prompts) mode.
    #[serde(default)]
    pub auto_approve: bool,
}

fn default_script_timeout() -> u64 {
    30
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            script_timeout_secs: default_script_timeout(),
            auto_approve: false,
        }
    }
}

impl AppConfig {
    /// Load configuration for a workspace: `codecrew.toml` under the
    /// root if present, defaults otherwise, then env overrides.
    pub fn load(workspace_root: &Path) -> Result<Self, ConfigError> {
        let path = workspace_root.join(CONFIG_FILE);
        let mut config = if path.exists() {
            let content =
                std::fs::read_to_string(&path).map_err(|e| ConfigError::Io(e.to_string()))?;
            debug!(path = %path.display(), "Loaded config file");
            toml::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))?
        } else {
            debug!("No config file, using defaults");
            Self::default()
        };

        if let Ok(key) = std::env::var(API_KEY_ENV) {
            if !key.is_empty() {
                config.provider.api_key = key;
            }
        }

        config.validate()?;
        Ok(config)
    }

    /// Sanity-check numeric ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.retry.max_attempts == 0 {
            return Err(ConfigError::Invalid("retry.max_attempts must be ≥ 1".into()));
        }
        if self.retry.min_delay_secs > self.retry.max_delay_secs {
            return Err(ConfigError::Invalid(
                "retry.min_delay_secs must not exceed retry.max_delay_secs".into(),
            ));
        }
        if !(0.0..=2.0).contains(&self.provider.temperature) {
            return Err(ConfigError::Invalid(
                "provider.temperature must be between 0.0 and 2.0".into(),
            ));
        }
        for (name, role) in [
            ("agent", &self.memory.agent),
            ("lead", &self.memory.lead),
            ("worker", &self.memory.worker),
            ("subagent", &self.memory.subagent),
        ] {
            if role.budget_chars < 1000 {
                return Err(ConfigError::Invalid(format!(
                    "memory.{name}.budget_chars must be at least 1000"
                )));
            }
        }
        Ok(())
    }
}

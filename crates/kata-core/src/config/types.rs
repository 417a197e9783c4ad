//! Configuration type definitions.
//!
//! One explicit configuration struct is built at process start and passed by
//! reference to every component that needs it; nothing reads the environment
//! after startup. Serde defaults keep a minimal YAML file working while
//! allowing every knob the components expose to be set.

use serde::{Deserialize, Serialize};

use crate::errors::KataError;
use crate::languages;
use crate::validator::MatchPolicy;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct KataConfig {
    #[serde(default)]
    pub solver: SolverConfig,
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub sandbox: SandboxConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Conversation-loop settings: sentinel keyword, turn ceiling, language.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SolverConfig {
    #[serde(default = "default_sentinel")]
    pub sentinel_keyword: String,
    /// Extra phrases that also terminate the loop when they appear in a
    /// solver turn.
    #[serde(default = "default_termination_phrases")]
    pub termination_phrases: Vec<String>,
    #[serde(default = "default_turn_ceiling")]
    pub turn_ceiling: usize,
    #[serde(default = "default_language")]
    pub default_language: String,
    #[serde(default)]
    pub match_policy: MatchPolicy,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            sentinel_keyword: default_sentinel(),
            termination_phrases: default_termination_phrases(),
            turn_ceiling: default_turn_ceiling(),
            default_language: default_language(),
            match_policy: MatchPolicy::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default)]
    pub api_base: Option<String>,
    #[serde(default)]
    pub parameters: ModelParameters,
    #[serde(default)]
    pub auth: LlmAuth,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            api_base: None,
            parameters: ModelParameters::default(),
            auth: LlmAuth::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelParameters {
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    /// Upper bound on one chat-turn call to the provider.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_seconds: u64,
}

impl Default for ModelParameters {
    fn default() -> Self {
        Self {
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            request_timeout_seconds: default_request_timeout(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmAuth {
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_api_key_env")]
    pub api_key_env: Option<String>,
}

impl Default for LlmAuth {
    fn default() -> Self {
        Self {
            api_key: None,
            api_key_env: default_api_key_env(),
        }
    }
}

/// Sandbox resource bounds. `image` overrides the language profile's image
/// when set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SandboxConfig {
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default = "default_time_budget")]
    pub time_budget_seconds: u64,
    #[serde(default = "default_memory_limit_mb")]
    pub memory_limit_mb: i64,
    #[serde(default = "default_output_limit_bytes")]
    pub output_limit_bytes: usize,
}

impl Default for SandboxConfig {
    fn default() -> Self {
        Self {
            image: None,
            time_budget_seconds: default_time_budget(),
            memory_limit_mb: default_memory_limit_mb(),
            output_limit_bytes: default_output_limit_bytes(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

/// Problem complexity presets. Each adjusts the turn ceiling and the sandbox
/// time budget; everything else stays as configured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Complexity {
    Easy,
    Medium,
    Hard,
    Expert,
}

impl Complexity {
    pub fn turn_ceiling(&self) -> usize {
        match self {
            Complexity::Easy => 10,
            Complexity::Medium => 15,
            Complexity::Hard => 25,
            Complexity::Expert => 35,
        }
    }

    pub fn time_budget_seconds(&self) -> u64 {
        match self {
            Complexity::Easy => 60,
            Complexity::Medium => 120,
            Complexity::Hard => 180,
            Complexity::Expert => 300,
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.to_lowercase().as_str() {
            "easy" | "simple" => Some(Complexity::Easy),
            "medium" => Some(Complexity::Medium),
            "hard" | "complex" => Some(Complexity::Hard),
            "expert" => Some(Complexity::Expert),
            _ => None,
        }
    }
}

impl KataConfig {
    /// Overlay a complexity preset onto the loop and sandbox settings.
    pub fn apply_complexity(&mut self, complexity: Complexity) {
        self.solver.turn_ceiling = complexity.turn_ceiling();
        self.sandbox.time_budget_seconds = complexity.time_budget_seconds();
    }

    pub fn validate(&self) -> Result<(), KataError> {
        if self.solver.turn_ceiling == 0 {
            return Err(KataError::Config("turn_ceiling must be at least 1".to_string()));
        }
        if self.solver.sentinel_keyword.trim().is_empty() {
            return Err(KataError::Config("sentinel_keyword must not be empty".to_string()));
        }
        if self.llm.parameters.request_timeout_seconds == 0 {
            return Err(KataError::Config(
                "llm request_timeout_seconds must be at least 1".to_string(),
            ));
        }
        if self.sandbox.time_budget_seconds == 0 {
            return Err(KataError::Config(
                "sandbox time_budget_seconds must be at least 1".to_string(),
            ));
        }
        if self.sandbox.memory_limit_mb <= 0 {
            return Err(KataError::Config(
                "sandbox memory_limit_mb must be positive".to_string(),
            ));
        }
        if languages::profile(&self.solver.default_language).is_none() {
            return Err(KataError::Config(format!(
                "unknown default_language '{}'; supported: {}",
                self.solver.default_language,
                languages::supported_languages().join(", ")
            )));
        }
        Ok(())
    }
}

fn default_sentinel() -> String {
    "STOP".to_string()
}

fn default_termination_phrases() -> Vec<String> {
    vec![
        "Task Completed!".to_string(),
        "Solution Complete".to_string(),
        "All tests passed".to_string(),
    ]
}

fn default_turn_ceiling() -> usize {
    15
}

fn default_language() -> String {
    "Python".to_string()
}

fn default_model() -> String {
    "gpt-4o".to_string()
}

fn default_temperature() -> f32 {
    0.3
}

fn default_max_tokens() -> u32 {
    4096
}

fn default_request_timeout() -> u64 {
    120
}

fn default_api_key_env() -> Option<String> {
    Some("OPENAI_API_KEY".to_string())
}

fn default_time_budget() -> u64 {
    180
}

fn default_memory_limit_mb() -> i64 {
    512
}

fn default_output_limit_bytes() -> usize {
    1024 * 1024
}

fn default_log_level() -> String {
    "info".to_string()
}

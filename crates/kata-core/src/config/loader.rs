//! Configuration loading from YAML files.
//!
//! Values are read once at startup and are immutable for the process
//! lifetime. API keys are resolved from the environment here, never later.

use std::path::Path;

use tokio::fs;

use crate::config::types::KataConfig;
use crate::errors::KataError;

pub struct ConfigLoader;

impl ConfigLoader {
    pub async fn from_file<P: AsRef<Path>>(path: P) -> Result<KataConfig, KataError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).await.map_err(|e| {
            KataError::Config(format!("failed to read config file {}: {}", path.display(), e))
        })?;
        Self::from_str(&content)
    }

    pub fn from_str(content: &str) -> Result<KataConfig, KataError> {
        let config: KataConfig = serde_yaml::from_str(content)
            .map_err(|e| KataError::Config(format!("invalid YAML configuration: {}", e)))?;
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validator::MatchPolicy;

    #[test]
    fn test_empty_yaml_yields_defaults() {
        let config = ConfigLoader::from_str("{}").unwrap();
        assert_eq!(config.solver.sentinel_keyword, "STOP");
        assert_eq!(config.solver.turn_ceiling, 15);
        assert_eq!(config.solver.default_language, "Python");
        assert_eq!(config.llm.model, "gpt-4o");
        assert_eq!(config.sandbox.time_budget_seconds, 180);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_partial_yaml_overrides() {
        let yaml = r#"
solver:
  turn_ceiling: 30
  default_language: JavaScript
  match_policy:
    kind: numeric
    relative_tolerance: 0.001
sandbox:
  time_budget_seconds: 60
  image: python:3.11-slim
"#;
        let config = ConfigLoader::from_str(yaml).unwrap();
        assert_eq!(config.solver.turn_ceiling, 30);
        assert_eq!(config.solver.default_language, "JavaScript");
        assert!(matches!(
            config.solver.match_policy,
            MatchPolicy::Numeric { .. }
        ));
        assert_eq!(config.sandbox.image.as_deref(), Some("python:3.11-slim"));
        // Untouched sections keep defaults.
        assert_eq!(config.llm.model, "gpt-4o");
    }

    #[test]
    fn test_llm_request_timeout_configurable_with_default() {
        let config = ConfigLoader::from_str("{}").unwrap();
        assert_eq!(config.llm.parameters.request_timeout_seconds, 120);

        let yaml = "llm:\n  parameters:\n    request_timeout_seconds: 30\n";
        let config = ConfigLoader::from_str(yaml).unwrap();
        assert_eq!(config.llm.parameters.request_timeout_seconds, 30);
    }

    #[test]
    fn test_zero_llm_request_timeout_rejected() {
        let yaml = "llm:\n  parameters:\n    request_timeout_seconds: 0\n";
        let err = ConfigLoader::from_str(yaml).unwrap_err();
        assert!(err.to_string().contains("request_timeout_seconds"));
    }

    #[test]
    fn test_zero_turn_ceiling_rejected() {
        let err = ConfigLoader::from_str("solver:\n  turn_ceiling: 0\n").unwrap_err();
        assert!(matches!(err, KataError::Config(_)));
    }

    #[test]
    fn test_unknown_language_rejected() {
        let err =
            ConfigLoader::from_str("solver:\n  default_language: Fortran\n").unwrap_err();
        assert!(err.to_string().contains("Fortran"));
    }
}

// Engine Configuration
//
// YAML-backed settings for the lifecycle engine. Every field has a default
// so a missing or partial file still yields a working configuration.

use crate::domain::policy::LifecyclePolicy;
use serde::{Deserialize, Serialize};
use std::path::Path;

fn default_event_capacity() -> usize {
    1000
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// SLA and refresh schedules per risk level
    #[serde(default)]
    pub policy: LifecyclePolicy,

    /// Buffer size of the in-process event bus
    #[serde(default = "default_event_capacity")]
    pub event_capacity: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            policy: LifecyclePolicy::default(),
            event_capacity: default_event_capacity(),
        }
    }
}

impl EngineConfig {
    /// Load configuration from YAML file
    pub fn from_yaml_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Parse configuration from YAML string
    pub fn from_yaml_str(yaml: &str) -> anyhow::Result<Self> {
        let config = serde_yaml::from_str(yaml)?;
        Ok(config)
    }

    /// Save configuration to YAML file
    pub fn to_yaml_file(&self, path: impl AsRef<Path>) -> anyhow::Result<()> {
        let yaml = serde_yaml::to_string(self)?;
        std::fs::write(path, yaml)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_yaml_yields_defaults() {
        let config = EngineConfig::from_yaml_str("{}").unwrap();
        assert_eq!(config, EngineConfig::default());
        assert_eq!(config.event_capacity, 1000);
    }

    #[test]
    fn test_partial_yaml_overrides_defaults() {
        let yaml = r#"
policy:
  sla:
    high_days: 5
event_capacity: 64
"#;
        let config = EngineConfig::from_yaml_str(yaml).unwrap();
        assert_eq!(config.policy.sla.high_days, 5);
        assert_eq!(config.policy.sla.low_days, 30);
        assert_eq!(config.event_capacity, 64);
    }

    #[test]
    fn test_yaml_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("engine.yaml");

        let mut config = EngineConfig::default();
        config.policy.refresh.critical_months = 3;
        config.to_yaml_file(&path).unwrap();

        let loaded = EngineConfig::from_yaml_file(&path).unwrap();
        assert_eq!(loaded, config);
    }
}

//! Runtime configuration for the simulation engine.

use serde::{Deserialize, Serialize};

use crate::types::DEFAULT_STEP_LIMIT;

/// Parameters that bound a run without changing its semantics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// The maximum number of steps a run executes before it halts with
    /// [`HaltReason::StepLimitExceeded`](crate::types::HaltReason::StepLimitExceeded).
    pub step_limit: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            step_limit: DEFAULT_STEP_LIMIT,
        }
    }
}

impl EngineConfig {
    /// Returns a configuration with the given step limit. A limit of zero is raised to one,
    /// since every run that does not halt first executes at least one step.
    pub fn with_step_limit(step_limit: u64) -> Self {
        Self {
            step_limit: step_limit.max(1),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_step_limit() {
        assert_eq!(EngineConfig::default().step_limit, 1000);
    }

    #[test]
    fn test_zero_step_limit_is_raised() {
        assert_eq!(EngineConfig::with_step_limit(0).step_limit, 1);
        assert_eq!(EngineConfig::with_step_limit(25).step_limit, 25);
    }

    #[test]
    fn test_deserialize_with_defaults() {
        let config: EngineConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, EngineConfig::default());

        let config: EngineConfig = serde_json::from_str(r#"{"step_limit": 50}"#).unwrap();
        assert_eq!(config.step_limit, 50);
    }
}

//! Engine configuration.

use cinegraph_core::{EngineError, Result};
use serde::{Deserialize, Serialize};

/// Friend hops considered for hottest movies. Bounds the walk on dense graphs.
pub const HOTTEST_MAX_DEGREE: u32 = 10;

/// Number of hottest movies returned.
pub const HOTTEST_LIMIT: usize = 10;

/// Friend hops considered for recommendations.
pub const RECOMMENDATION_MAX_DEGREE: u32 = 2;

/// Tunables for the query engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EngineConfig {
    pub hottest_max_degree: u32,
    pub hottest_limit: usize,
    pub recommendation_max_degree: u32,
    /// Upper bound on the degree a friend-network query may ask for.
    pub max_network_degree: Option<u32>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            hottest_max_degree: HOTTEST_MAX_DEGREE,
            hottest_limit: HOTTEST_LIMIT,
            recommendation_max_degree: RECOMMENDATION_MAX_DEGREE,
            max_network_degree: None,
        }
    }
}

impl EngineConfig {
    /// Parses a config from JSON; absent fields keep their defaults.
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    /// Rejects settings no query could run with.
    pub fn validate(&self) -> Result<()> {
        if self.hottest_max_degree == 0 || self.recommendation_max_degree == 0 {
            return Err(EngineError::invalid("traversal degrees must be at least 1"));
        }
        if self.hottest_limit == 0 {
            return Err(EngineError::invalid("hottestLimit must be at least 1"));
        }
        if self.max_network_degree == Some(0) {
            return Err(EngineError::invalid("maxNetworkDegree must be at least 1"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = EngineConfig::from_json(r#"{ "maxNetworkDegree": 6 }"#).unwrap();
        assert_eq!(config.max_network_degree, Some(6));
        assert_eq!(config.hottest_max_degree, HOTTEST_MAX_DEGREE);
        assert_eq!(config.hottest_limit, HOTTEST_LIMIT);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_settings_rejected() {
        let config = EngineConfig {
            hottest_limit: 0,
            ..EngineConfig::default()
        };
        assert!(config.validate().is_err());

        let config = EngineConfig {
            recommendation_max_degree: 0,
            ..EngineConfig::default()
        };
        assert!(config.validate().is_err());
    }
}

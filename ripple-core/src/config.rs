//! Graph Configuration

use std::num::NonZeroUsize;

use serde::{Deserialize, Serialize};

const DEFAULT_WAVE_DEPTH: NonZeroUsize = match NonZeroUsize::new(64) {
    Some(depth) => depth,
    None => panic!("default wave depth must be non-zero"),
};

/// Tunables for a [`Graph`](crate::graph::Graph).
///
/// Every field has a default, so a partial JSON document is enough:
///
/// ```rust
/// use ripple_core::GraphConfig;
///
/// let config = GraphConfig::from_json(r#"{ "max_wave_depth": 8 }"#).unwrap();
/// assert_eq!(config.max_wave_depth.get(), 8);
/// assert!(config.strict_payload_kinds);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphConfig {
    /// Reject `emit` calls whose value kind differs from the source's
    /// current value kind.
    pub strict_payload_kinds: bool,

    /// How many waves may be in flight at once through observers starting
    /// nested waves. At least one, or no `emit` could ever run.
    pub max_wave_depth: NonZeroUsize,

    /// Number of node slots to reserve up front.
    pub initial_capacity: usize,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            strict_payload_kinds: true,
            max_wave_depth: DEFAULT_WAVE_DEPTH,
            initial_capacity: 0,
        }
    }
}

impl GraphConfig {
    /// Parse a configuration from a JSON string.
    ///
    /// A `max_wave_depth` of zero is rejected.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_gives_defaults() {
        let config = GraphConfig::from_json("{}").unwrap();
        assert_eq!(config, GraphConfig::default());
    }

    #[test]
    fn fields_override_defaults() {
        let json = r#"{
            "strict_payload_kinds": false,
            "max_wave_depth": 2,
            "initial_capacity": 128
        }"#;

        let config = GraphConfig::from_json(json).unwrap();
        assert!(!config.strict_payload_kinds);
        assert_eq!(config.max_wave_depth.get(), 2);
        assert_eq!(config.initial_capacity, 128);
    }

    #[test]
    fn zero_wave_depth_is_rejected() {
        assert!(GraphConfig::from_json(r#"{ "max_wave_depth": 0 }"#).is_err());
        assert!(GraphConfig::from_json(r#"{ "max_wave_depth": 1 }"#).is_ok());
    }

    #[test]
    fn malformed_json_is_rejected() {
        assert!(GraphConfig::from_json(r#"{ "max_wave_depth": "deep" }"#).is_err());
    }
}

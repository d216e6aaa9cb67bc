use serde::{Deserialize, Serialize};

/// Tuning knobs for a [`Walker`](crate::Walker).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WalkerConfig {
    /// Payload keys never scanned for references, at any depth. These hold
    /// free-form text whose hash-like substrings are not real inputs.
    pub reserved_fields: Vec<String>,
    /// Do not follow the zero-length block hash downstream. Nearly every job
    /// mentions it, so its consumers say nothing about lineage.
    pub skip_empty_downstream: bool,
    /// Stop after recording this many nodes. `None` walks to exhaustion.
    pub max_nodes: Option<usize>,
}

impl Default for WalkerConfig {
    fn default() -> Self {
        Self {
            reserved_fields: vec!["log".to_string()],
            skip_empty_downstream: true,
            max_nodes: None,
        }
    }
}

impl WalkerConfig {
    /// Returns `true` if `key` must not be scanned.
    pub fn is_reserved(&self, key: &str) -> bool {
        self.reserved_fields.iter().any(|f| f == key)
    }

    pub fn with_max_nodes(mut self, max_nodes: usize) -> Self {
        self.max_nodes = Some(max_nodes);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_reserve_log() {
        let config = WalkerConfig::default();
        assert!(config.is_reserved("log"));
        assert!(!config.is_reserved("input"));
        assert!(config.skip_empty_downstream);
        assert_eq!(config.max_nodes, None);
    }

    #[test]
    fn partial_json_fills_defaults() {
        let config: WalkerConfig = serde_json::from_str(r#"{"max_nodes": 10}"#).unwrap();
        assert_eq!(config.max_nodes, Some(10));
        assert_eq!(config.reserved_fields, vec!["log".to_string()]);
    }
}

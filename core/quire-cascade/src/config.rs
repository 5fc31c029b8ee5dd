use serde::{Deserialize, Serialize};

/// Default bound on the length of a cascade chain.
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Cascade engine configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CascadeConfig {
    /// Longest chain of cascaded deletes below the root.
    pub max_depth: usize,
}

impl Default for CascadeConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl CascadeConfig {
    /// Parses a JSON config; missing keys take their defaults.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    #[must_use]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }
}

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default Docker Hub base URL (build-script pages).
pub const DEFAULT_HUB_URL: &str = "https://hub.docker.com";

/// Default registry v2 API base URL (digest resolution).
pub const DEFAULT_REGISTRY_URL: &str = "https://registry.hub.docker.com/v2/";

/// Default cap on the length of a resolved ancestor chain.
pub const DEFAULT_MAX_LINEAGE_DEPTH: usize = 32;

/// Converter configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConvertConfig {
    /// Docker Hub base URL, where build-script pages are fetched from
    pub hub_url: String,

    /// Registry v2 API base URL, used to resolve manifest digests
    pub registry_url: String,

    /// Directory where materialized files and recipes are written
    pub output_dir: PathBuf,

    /// Upper bound on the ancestor chain walked by the lineage resolver
    pub max_lineage_depth: usize,
}

impl Default for ConvertConfig {
    fn default() -> Self {
        Self {
            hub_url: DEFAULT_HUB_URL.to_string(),
            registry_url: DEFAULT_REGISTRY_URL.to_string(),
            output_dir: PathBuf::from("."),
            max_lineage_depth: DEFAULT_MAX_LINEAGE_DEPTH,
        }
    }
}

impl ConvertConfig {
    /// Build a configuration from environment variables, falling back
    /// to the defaults.
    ///
    /// Honors `MONODEF_HUB_URL`, `MONODEF_REGISTRY_URL`,
    /// `MONODEF_OUTPUT_DIR`, and `MONODEF_MAX_DEPTH`.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(url) = std::env::var("MONODEF_HUB_URL") {
            config.hub_url = url;
        }
        if let Ok(url) = std::env::var("MONODEF_REGISTRY_URL") {
            config.registry_url = url;
        }
        if let Ok(dir) = std::env::var("MONODEF_OUTPUT_DIR") {
            config.output_dir = PathBuf::from(dir);
        }
        if let Ok(depth) = std::env::var("MONODEF_MAX_DEPTH") {
            if let Ok(depth) = depth.parse() {
                config.max_lineage_depth = depth;
            }
        }
        config
    }
}

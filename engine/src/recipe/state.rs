//! Translator build state.
//!
//! The mutable record a translation pass accumulates: the bootstrap
//! header, the ordered section text blocks, and the environment mapping
//! the `%environment` section is derived from.

use crate::reference::ImageReference;

/// Bootstrap scheme recorded for images sourced from a Docker registry.
pub const BOOTSTRAP_DOCKER: &str = "docker";

/// Mutable state accumulated while translating one build stage.
#[derive(Debug, Clone, Default)]
pub struct BuildState {
    /// Source scheme for the recipe header (e.g., "docker")
    pub bootstrap: String,
    /// Base image recorded by the stage's first FROM
    pub base_image: Option<ImageReference>,
    /// Host-side commands run before the filesystem is populated
    pub setup: String,
    /// `basename destination` copy entries
    pub files: String,
    /// `key value` metadata lines
    pub labels: String,
    /// Build-time commands, interleaved with the instruction trace
    pub post: String,
    /// Test-section commands
    pub test: String,
    /// Variables recorded by ARG, in insertion order
    pub environment: Vec<(String, String)>,
    /// Run-time entry command
    pub entrypoint: String,
    /// Default run-time command
    pub cmd: String,
    /// Working directory recorded by WORKDIR (stored, not interpreted)
    pub working_directory: String,
}

impl BuildState {
    pub fn new() -> Self {
        Self {
            working_directory: "/".to_string(),
            ..Default::default()
        }
    }

    /// Discard everything accumulated so far.
    ///
    /// A stage has exactly one base image; the FROM that starts a stage
    /// starts from scratch.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Look up a variable recorded by ARG.
    pub fn env_lookup(&self, key: &str) -> Option<&str> {
        self.environment
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Record a variable, replacing an earlier value for the same key
    /// while keeping its original position.
    pub fn env_set(&mut self, key: String, value: String) {
        if let Some(existing) = self.environment.iter_mut().find(|(k, _)| *k == key) {
            existing.1 = value;
        } else {
            self.environment.push((key, value));
        }
    }

    /// Derive the `%environment` section body from the mapping:
    /// `KEY=VALUE` lines followed by one `export` of all keys.
    pub fn environment_block(&self) -> String {
        if self.environment.is_empty() {
            return "\n".to_string();
        }
        let values = self
            .environment
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect::<Vec<_>>()
            .join("\n    ");
        let keys = self
            .environment
            .iter()
            .map(|(k, _)| k.as_str())
            .collect::<Vec<_>>()
            .join(" ");
        format!("{}\n    export {}", values, keys)
    }

    /// Fold one translated stage into this state, keeping this state's
    /// bootstrap header. Used when flattening a lineage: text blocks
    /// append, the environment merges, and the run-time commands of the
    /// later stage win.
    pub fn absorb(&mut self, stage: &BuildState) {
        self.setup.push_str(&stage.setup);
        self.files.push_str(&stage.files);
        self.labels.push_str(&stage.labels);
        self.post.push_str(&stage.post);
        self.test.push_str(&stage.test);
        for (key, value) in &stage.environment {
            self.env_set(key.clone(), value.clone());
        }
        if !stage.entrypoint.is_empty() {
            self.entrypoint = stage.entrypoint.clone();
        }
        if !stage.cmd.is_empty() {
            self.cmd = stage.cmd.clone();
        }
        if stage.working_directory != "/" {
            self.working_directory = stage.working_directory.clone();
        }
    }
}

//! Monodef Engine - build-script translation and lineage resolution.
//!
//! This module turns Dockerfile-style build scripts into
//! Singularity-style definition files: instruction scanning and
//! dispatch, Docker Hub fetching, file materialization, and the
//! ancestor-chain resolver that flattens a lineage into one recipe.

pub mod hub;
pub mod lineage;
pub mod materialize;
pub mod recipe;
pub mod reference;

// Re-export common types
pub use hub::{BuildScriptSource, DockerHub};
pub use lineage::{FlattenedRecipe, Lineage, LineageNode, LineageResolver};
pub use materialize::{DockerCli, ImageFileSource};
pub use recipe::{definition, BuildState, InstructionKind, RawInstruction, Translator};
pub use reference::ImageReference;

/// Monodef Engine version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

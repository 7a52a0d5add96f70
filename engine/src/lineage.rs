//! Ancestor-chain resolution and flattening.
//!
//! Walks FROM declarations from a leaf image back to its root ancestor,
//! then replays every stage through the translator to produce one
//! flattened recipe. Only linear chains are supported; a node that
//! records a second child is reported as an error, never flattened.

use std::path::PathBuf;
use std::sync::Arc;

use monodef_core::config::ConvertConfig;
use monodef_core::error::{MonodefError, Result};

use crate::hub::BuildScriptSource;
use crate::materialize::ImageFileSource;
use crate::recipe::state::{BuildState, BOOTSTRAP_DOCKER};
use crate::recipe::{definition, Translator};
use crate::reference::ImageReference;

/// One resolved ancestor.
#[derive(Debug, Clone)]
pub struct LineageNode {
    /// Image this node stands for
    pub reference: ImageReference,
    /// Raw build script; empty when none could be fetched
    pub build_script: String,
    /// Arena index of the ancestor
    pub parent: Option<usize>,
    /// Arena indices of descendants
    pub children: Vec<usize>,
}

impl LineageNode {
    fn new(reference: ImageReference) -> Self {
        Self {
            reference,
            build_script: String::new(),
            parent: None,
            children: Vec::new(),
        }
    }
}

/// A resolved ancestor chain, leaf first.
#[derive(Debug, Clone)]
pub struct Lineage {
    nodes: Vec<LineageNode>,
}

impl Lineage {
    /// Nodes ordered leaf to root.
    pub fn nodes(&self) -> &[LineageNode] {
        &self.nodes
    }

    /// Image references ordered leaf to root.
    pub fn references(&self) -> Vec<&ImageReference> {
        self.nodes.iter().map(|n| &n.reference).collect()
    }

    /// Record `child` under `parent`. A parent with a child already
    /// recorded makes the chain non-linear.
    fn link(&mut self, parent: usize, child: usize) -> Result<()> {
        if !self.nodes[parent].children.is_empty() {
            return Err(MonodefError::NonLinearLineage(
                self.nodes[parent].reference.to_string(),
            ));
        }
        self.nodes[parent].children.push(child);
        self.nodes[child].parent = Some(parent);
        Ok(())
    }
}

/// Output of flattening a lineage.
#[derive(Debug, Clone)]
pub struct FlattenedRecipe {
    /// Rendered definition file
    pub definition: String,
    /// Monolithic build script: stage headers and raw stage texts,
    /// root to leaf
    pub build_script: String,
}

/// Resolves the ancestor chain of an image and flattens it.
pub struct LineageResolver {
    scripts: Arc<dyn BuildScriptSource>,
    files: Arc<dyn ImageFileSource>,
    output_dir: PathBuf,
    max_depth: usize,
}

impl LineageResolver {
    pub fn new(
        scripts: Arc<dyn BuildScriptSource>,
        files: Arc<dyn ImageFileSource>,
        config: &ConvertConfig,
    ) -> Self {
        Self {
            scripts,
            files,
            output_dir: config.output_dir.clone(),
            max_depth: config.max_lineage_depth,
        }
    }

    /// Walk from `image` to its effective root.
    ///
    /// A fetch that reports `NotFound` (or an empty script, or a stage
    /// with no base-image directive) ends the walk successfully; any
    /// other failure aborts it.
    pub async fn resolve(&self, image: &str) -> Result<Lineage> {
        let reference = ImageReference::parse(image)?;
        let mut lineage = Lineage {
            nodes: vec![LineageNode::new(reference)],
        };
        let mut current = 0usize;

        loop {
            if lineage.nodes.len() > self.max_depth {
                return Err(MonodefError::Other(format!(
                    "ancestor chain exceeds {} stages",
                    self.max_depth
                )));
            }
            let frontier = lineage.nodes[current].reference.clone();
            tracing::info!(image = %frontier, depth = lineage.nodes.len(), "fetching build script");

            let script = match self.scripts.fetch_build_script(&frontier).await {
                Ok(text) => text,
                Err(MonodefError::NotFound(_)) => {
                    tracing::info!(image = %frontier, "no published build script; effective root");
                    break;
                }
                Err(err) => return Err(err),
            };
            if script.trim().is_empty() {
                break;
            }

            // Translate the stage on its own to discover its base image
            let mut probe = Translator::new(frontier.clone(), self.files.clone(), &self.output_dir);
            probe.translate(&script).await?;
            let base = probe.state().base_image.clone();
            lineage.nodes[current].build_script = script;

            let base = match base {
                Some(base) => base,
                None => {
                    tracing::info!(image = %frontier, "stage declares no base image; effective root");
                    break;
                }
            };

            let next = lineage.nodes.len();
            lineage.nodes.push(LineageNode::new(base));
            lineage.link(next, current)?;
            current = next;
        }

        Ok(lineage)
    }

    /// Replay the chain root-to-leaf into one flattened recipe.
    ///
    /// The recipe bootstraps from the root image; every stage's
    /// translated sections are folded in under a header comment carrying
    /// the stage's image name and a timestamp. ADD/COPY fetches use the
    /// leaf image, whose filesystem contains every ancestor's files.
    pub async fn flatten(&self, lineage: &Lineage) -> Result<FlattenedRecipe> {
        let nodes = lineage.nodes();
        let (leaf, root) = match (nodes.first(), nodes.last()) {
            (Some(leaf), Some(root)) => (leaf.reference.clone(), root.reference.clone()),
            _ => return Err(MonodefError::Other("empty lineage".to_string())),
        };

        let mut merged = BuildState::new();
        merged.bootstrap = BOOTSTRAP_DOCKER.to_string();
        merged.base_image = Some(root);
        let mut build_script = String::new();

        for node in nodes.iter().rev() {
            let header = format!(
                "### {} --- {}",
                node.reference,
                chrono::Utc::now().to_rfc3339()
            );
            merged.post.push_str(&format!("\n    # {}", header));
            build_script.push_str(&header);
            build_script.push('\n');

            if node.build_script.is_empty() {
                continue;
            }
            build_script.push_str(&node.build_script);
            if !node.build_script.ends_with('\n') {
                build_script.push('\n');
            }

            let mut stage = Translator::new(leaf.clone(), self.files.clone(), &self.output_dir);
            stage.translate(&node.build_script).await?;
            merged.absorb(stage.state());
        }

        Ok(FlattenedRecipe {
            definition: definition::render(&merged),
            build_script,
        })
    }
}

//! `monodef lineage` command — print an image's ancestor chain.

use std::sync::Arc;

use clap::Args;

use monodef_core::ConvertConfig;
use monodef_engine::{DockerCli, DockerHub, LineageResolver};

#[derive(Args)]
pub struct LineageArgs {
    /// Image reference to trace
    pub image: String,
}

pub async fn execute(args: LineageArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = ConvertConfig::from_env();
    let hub = Arc::new(DockerHub::new(&config));
    let files = Arc::new(DockerCli::new());
    let resolver = LineageResolver::new(hub, files, &config);

    let lineage = resolver.resolve(&args.image).await?;

    for (depth, node) in lineage.nodes().iter().enumerate() {
        let note = if node.build_script.is_empty() {
            " (no published build script)"
        } else {
            ""
        };
        println!("{:>2}. {}{}", depth + 1, node.reference, note);
    }

    Ok(())
}

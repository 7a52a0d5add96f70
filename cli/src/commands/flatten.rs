//! `monodef flatten` command — resolve an image's ancestry and emit
//! one flattened recipe.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Args;

use monodef_core::ConvertConfig;
use monodef_engine::{DockerCli, DockerHub, LineageResolver};

#[derive(Args)]
pub struct FlattenArgs {
    /// Image reference whose ancestry to flatten
    pub image: String,

    /// Where to write the flattened definition file
    #[arg(short = 'o', long = "output", default_value = "Singularity")]
    pub output: PathBuf,

    /// Also write the monolithic build script
    #[arg(
        long = "build-script",
        value_name = "PATH",
        num_args = 0..=1,
        default_missing_value = "Monolith.txt"
    )]
    pub build_script: Option<PathBuf>,
}

pub async fn execute(args: FlattenArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = ConvertConfig::from_env();
    let hub = Arc::new(DockerHub::new(&config));
    let files = Arc::new(DockerCli::new());
    let resolver = LineageResolver::new(hub, files, &config);

    let lineage = resolver.resolve(&args.image).await?;
    println!("Resolved {} stage(s)", lineage.nodes().len());

    let recipe = resolver.flatten(&lineage).await?;
    std::fs::write(&args.output, &recipe.definition)?;
    println!("Wrote {}", args.output.display());

    if let Some(path) = &args.build_script {
        std::fs::write(path, &recipe.build_script)?;
        println!("Wrote {}", path.display());
    }

    Ok(())
}

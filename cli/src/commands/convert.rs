//! `monodef convert` command — translate one build stage.
//!
//! Fetches the image's published build script (or reads a local file),
//! translates it, and writes the definition file.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Args;

use monodef_core::ConvertConfig;
use monodef_engine::{definition, BuildScriptSource, DockerCli, DockerHub, Translator};

#[derive(Args)]
pub struct ConvertArgs {
    /// Image reference (e.g., "jupyterhub/jupyterhub:3.1")
    pub image: String,

    /// Translate a local build-script file instead of fetching from the Hub
    #[arg(short = 'f', long = "file")]
    pub file: Option<PathBuf>,

    /// Where to write the definition file
    #[arg(short = 'o', long = "output", default_value = "Singularity")]
    pub output: PathBuf,

    /// Pin the discovered base image to its registry manifest digest
    #[arg(long = "pin-digest")]
    pub pin_digest: bool,

    /// Also write the build script that was translated
    #[arg(long = "keep-build-script", value_name = "PATH")]
    pub keep_build_script: Option<PathBuf>,
}

pub async fn execute(args: ConvertArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = ConvertConfig::from_env();
    let subject = monodef_engine::ImageReference::parse(&args.image)?;
    let hub = DockerHub::new(&config);

    let script = match &args.file {
        Some(path) => {
            tracing::debug!(path = %path.display(), "reading local build script");
            std::fs::read_to_string(path)?
        }
        None => hub.fetch_build_script(&subject).await?,
    };

    let files = Arc::new(DockerCli::new());
    let mut translator = Translator::new(subject, files, &config.output_dir);
    translator.translate(&script).await?;
    let mut state = translator.into_state();

    if args.pin_digest {
        if let Some(base) = state.base_image.take() {
            let digest = hub.resolve_digest(&base).await?;
            println!("Pinned {} to {}", base, digest);
            state.base_image = Some(monodef_engine::ImageReference {
                tag: None,
                digest: Some(digest),
                ..base
            });
        }
    }

    std::fs::write(&args.output, definition::render(&state))?;
    println!("Wrote {}", args.output.display());

    if let Some(path) = &args.keep_build_script {
        std::fs::write(path, &script)?;
        println!("Wrote {}", path.display());
    }

    Ok(())
}

//! # sketchgen CLI Entry Point

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use sketchgen::{export, GeneratorConfig, GeneratorError};
use std::path::PathBuf;
use store::StoreError;

/// Generate Sketch design files from UI module lists and check existing ones.
#[derive(Parser, Debug)]
#[command(name = "sketchgen", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Assemble modules into a validated `.sketch` archive.
    Generate(GenerateArgs),
    /// Check an archive directory or `.sketch` file.
    Validate(ValidateArgs),
}

#[derive(Args, Debug)]
struct GenerateArgs {
    /// Generator configuration (JSON).
    #[arg(long)]
    config: PathBuf,

    /// Module list (JSON array); replaces the modules in the config.
    #[arg(long)]
    modules: Option<PathBuf>,

    /// Output root; overrides the config.
    #[arg(long)]
    output: Option<PathBuf>,

    /// Skip validation before packaging.
    #[arg(long)]
    no_validate: bool,
}

#[derive(Args, Debug)]
struct ValidateArgs {
    /// Archive directory or `.sketch` file.
    path: PathBuf,
}

async fn generate(args: GenerateArgs) -> anyhow::Result<()> {
    let mut config = GeneratorConfig::load(&args.config)?;
    if let Some(path) = &args.modules {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("reading module list {}", path.display()))?;
        config.modules = assembler::parse_modules(&json)
            .with_context(|| format!("parsing module list {}", path.display()))?;
    }
    if let Some(output) = args.output {
        config.output_root = output;
    }
    if args.no_validate {
        config.validate = false;
    }

    match export(&config).await {
        Ok(summary) => {
            println!("{}", serde_json::to_string_pretty(&summary)?);
            Ok(())
        }
        Err(GeneratorError::Store(StoreError::ValidationFailed { violations })) => {
            for violation in &violations {
                eprintln!("{violation}");
            }
            anyhow::bail!("generated document has {} violation(s)", violations.len())
        }
        Err(e) => Err(e.into()),
    }
}

fn validate(args: ValidateArgs) -> anyhow::Result<()> {
    let report = sketch_validator::validate_path(&args.path);
    for violation in &report.violations {
        println!("{violation}");
    }
    for path in &report.unchecked {
        tracing::info!("Not checked in depth: {}", path);
    }
    if !report.is_valid() {
        anyhow::bail!(
            "{} has {} violation(s)",
            args.path.display(),
            report.violations.len()
        );
    }
    println!("{}: valid ({} nodes)", args.path.display(), report.nodes_visited);
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Generate(args) => generate(args).await,
        Commands::Validate(args) => validate(args),
    }
}

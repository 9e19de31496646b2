use crate::config::GenerationConfig;
use crate::discovery::discover_inputs;
use crate::openapi_builder::generate;
use crate::serializer::{serialize_json, serialize_yaml, write_to_file};
use crate::{store, validator};
use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use log::{debug, info, warn};
use std::path::{Path, PathBuf};

/// Generate OpenAPI 3.0 documents from `#[api_*]` annotated Rust handlers
#[derive(Parser, Debug)]
#[command(name = "openapi-from-annotations")]
#[command(author, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(long = "verbose", global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Scan sources and write an OpenAPI document
    Generate(GenerateArgs),
}

#[derive(Args, Debug, Clone, Default)]
pub struct GenerateArgs {
    /// Rust file or directory to scan (repeatable)
    #[arg(short = 'i', long = "input", value_name = "PATH")]
    pub inputs: Vec<PathBuf>,

    /// Output file path (if not specified, outputs to stdout)
    #[arg(short = 'o', long = "output", value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Output format; defaults to json unless the output file ends in .yaml/.yml
    #[arg(short = 'f', long = "format", value_enum)]
    pub format: Option<OutputFormat>,

    /// API title
    #[arg(short = 't', long = "title")]
    pub title: Option<String>,

    /// API version
    #[arg(short = 'v', long = "version")]
    pub api_version: Option<String>,

    /// Prefix for every generated path
    #[arg(short = 'b', long = "base-path")]
    pub base_path: Option<String>,

    /// Generation config file (JSON or YAML); flags override its values
    #[arg(short = 'c', long = "config", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Fail when the generated document does not validate
    #[arg(long = "strict")]
    pub strict: bool,
}

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// JSON format
    Json,
    /// YAML format
    Yaml,
}

impl GenerateArgs {
    /// Explicit `--format`, else the output file extension, else JSON
    pub fn output_format(&self) -> OutputFormat {
        if let Some(format) = self.format {
            return format;
        }
        let extension = self
            .output
            .as_deref()
            .and_then(Path::extension)
            .and_then(|e| e.to_str());
        match extension {
            Some("yaml" | "yml") => OutputFormat::Yaml,
            _ => OutputFormat::Json,
        }
    }
}

/// Merge the optional config file with the command-line flags.
///
/// # Errors
///
/// Fails when the config file cannot be loaded or no input is given.
pub fn resolve_config(args: &GenerateArgs) -> Result<GenerationConfig> {
    debug!("Generate arguments: {:?}", args);

    let mut config = match &args.config {
        Some(path) => GenerationConfig::from_file(path)
            .with_context(|| format!("Failed to load config: {}", path.display()))?,
        None => GenerationConfig::default(),
    };

    if !args.inputs.is_empty() {
        config.inputs = args.inputs.clone();
    }
    if let Some(title) = &args.title {
        config.info.title = title.clone();
    }
    if let Some(version) = &args.api_version {
        config.info.version = version.clone();
    }
    if let Some(base_path) = &args.base_path {
        config.base_path = Some(base_path.clone());
    }
    config.options.strict |= args.strict;

    if config.inputs.is_empty() {
        anyhow::bail!("No inputs given. Pass --input <PATH> or list `inputs` in the config file");
    }

    info!("Inputs: {:?}", config.inputs);
    info!("Output format: {:?}", args.output_format());
    match &args.output {
        Some(output) => info!("Output file: {}", output.display()),
        None => info!("Output: stdout"),
    }

    Ok(config)
}

/// Run the `generate` workflow
pub fn run(args: &GenerateArgs) -> Result<()> {
    let config = resolve_config(args)?;

    info!("Discovering annotated handlers...");
    let mut store = store::global();
    let discovery = discover_inputs(&config.inputs, &mut store)?;
    if discovery.handlers.is_empty() {
        warn!("No annotated handlers found");
    }

    info!("Building OpenAPI document...");
    let document = generate(&config, &store, &discovery.handlers);
    drop(store);

    if config.options.strict {
        validator::ensure_valid(&document)?;
        info!("Document passed validation");
    }

    let format = args.output_format();
    let content = match format {
        OutputFormat::Json => serialize_json(&document)?,
        OutputFormat::Yaml => serialize_yaml(&document)?,
    };

    if let Some(output) = &args.output {
        write_to_file(&content, output)?;
        info!("Successfully wrote OpenAPI document to {}", output.display());
    } else {
        println!("{}", content);
    }

    info!("Generation complete!");
    info!("  - Handlers found: {}", discovery.handlers.len());
    info!("  - Paths emitted: {}", document.paths.len());
    info!("  - Warnings: {}", discovery.warnings.len());

    Ok(())
}

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use clap_complete::Shell;

use opspec_core::config::{self, CONFIG_FILE_NAME, OutputFormat, ProjectConfig};
use opspec_core::decl::{self, ApiDeclaration};
use opspec_core::{Generator, openapi};

#[derive(Parser)]
#[command(
    name = "opspec",
    about = "OpenAPI documents from operation declarations",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate an OpenAPI document from a declaration table
    Generate {
        /// Path to the declaration file (YAML or JSON)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Endpoint group to document
        #[arg(short, long)]
        endpoint: Option<String>,

        /// Where to write the document
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Document format
        #[arg(long)]
        format: Option<DocumentFormat>,
    },

    /// Validate a declaration table against the generation rules
    Validate {
        /// Path to the declaration file
        #[arg(short, long)]
        input: PathBuf,

        /// Endpoint group to check
        #[arg(short, long)]
        endpoint: Option<String>,
    },

    /// Inspect the operations extracted from an endpoint group
    Inspect {
        /// Path to the declaration file
        #[arg(short, long)]
        input: PathBuf,

        /// Endpoint group to inspect
        #[arg(short, long)]
        endpoint: Option<String>,

        /// Output format
        #[arg(long, default_value = "yaml")]
        format: DocumentFormat,
    },

    /// Initialize a new opspec configuration
    Init {
        /// Overwrite existing files
        #[arg(long)]
        force: bool,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: Shell,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum DocumentFormat {
    Yaml,
    Json,
}

impl From<DocumentFormat> for OutputFormat {
    fn from(format: DocumentFormat) -> Self {
        match format {
            DocumentFormat::Yaml => OutputFormat::Yaml,
            DocumentFormat::Json => OutputFormat::Json,
        }
    }
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Generate {
            input,
            endpoint,
            output,
            format,
        } => cmd_generate(input, endpoint, output, format),

        Commands::Validate { input, endpoint } => cmd_validate(input, endpoint),

        Commands::Inspect {
            input,
            endpoint,
            format,
        } => cmd_inspect(input, endpoint, format),

        Commands::Init { force } => cmd_init(force),

        Commands::Completions { shell } => {
            let mut cmd = <Cli as clap::CommandFactory>::command();
            clap_complete::generate(shell, &mut cmd, "opspec", &mut std::io::stdout());
            Ok(())
        }
    }
}

/// Try to load the project config file from the current directory.
fn try_load_config() -> Result<Option<ProjectConfig>> {
    let config_path = PathBuf::from(CONFIG_FILE_NAME);
    config::load_config(&config_path).map_err(|e| anyhow::anyhow!(e))
}

fn load_declaration(path: &Path) -> Result<ApiDeclaration> {
    let content =
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;

    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("yaml");

    let api = match ext {
        "json" => decl::from_json(&content),
        _ => decl::from_yaml(&content),
    }
    .with_context(|| format!("failed to load declarations from {}", path.display()))?;
    log::debug!(
        "loaded {} groups and {} types from {}",
        api.groups.len(),
        api.types.len(),
        path.display()
    );
    Ok(api)
}

/// The requested endpoint group, falling back to the first declared group.
fn resolve_endpoint(api: &ApiDeclaration, requested: Option<String>) -> Result<String> {
    match requested {
        Some(name) => Ok(name),
        None => api
            .groups
            .keys()
            .next()
            .cloned()
            .context("the declaration has no endpoint groups"),
    }
}

fn cmd_generate(
    input: Option<PathBuf>,
    endpoint: Option<String>,
    output: Option<PathBuf>,
    format: Option<DocumentFormat>,
) -> Result<()> {
    let cfg = try_load_config()?.unwrap_or_default();
    let input = input.unwrap_or_else(|| PathBuf::from(&cfg.input));
    let output = output.unwrap_or_else(|| PathBuf::from(&cfg.output));
    let format = format.map(OutputFormat::from).unwrap_or(cfg.format);

    let api = load_declaration(&input)?;
    let endpoint = resolve_endpoint(&api, endpoint.or(cfg.endpoint))?;

    eprintln!("Generating {} → {}", endpoint, output.display());
    let generator = Generator::new(&api, &endpoint, cfg.options)?;
    let document = generator.generate()?;

    let rendered = match format {
        OutputFormat::Json => openapi::to_json(&document, cfg.pretty)?,
        OutputFormat::Yaml => openapi::to_yaml(&document)?,
    };

    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create directory {}", parent.display()))?;
    }
    fs::write(&output, rendered)
        .with_context(|| format!("failed to write {}", output.display()))?;

    eprintln!(
        "  wrote {} paths, {} tags",
        document.paths.len(),
        document.tags.len()
    );
    Ok(())
}

fn cmd_validate(input: PathBuf, endpoint: Option<String>) -> Result<()> {
    let cfg = try_load_config()?.unwrap_or_default();
    let api = load_declaration(&input)?;
    let endpoint = resolve_endpoint(&api, endpoint.or(cfg.endpoint))?;

    eprintln!("Valid declaration table: {}", input.display());
    eprintln!("  Groups: {}", api.groups.len());
    eprintln!("  Types: {}", api.types.len());

    let generator = Generator::new(&api, &endpoint, cfg.options)?;
    let operations = generator.operations()?;
    let document = generator.generate()?;
    eprintln!("  Endpoint: {}", generator.endpoint());
    eprintln!("  OpenAPI version: {}", generator.options().openapi_version);
    eprintln!("  Operations: {}", operations.len());
    eprintln!("  Paths: {}", document.paths.len());
    if let Some(ref components) = document.components {
        eprintln!("  Schemas: {}", components.schemas.len());
    }

    eprintln!("Validation successful.");
    Ok(())
}

fn cmd_inspect(input: PathBuf, endpoint: Option<String>, format: DocumentFormat) -> Result<()> {
    let cfg = try_load_config()?.unwrap_or_default();
    let api = load_declaration(&input)?;
    let endpoint = resolve_endpoint(&api, endpoint.or(cfg.endpoint))?;

    let generator = Generator::new(&api, &endpoint, cfg.options)?;
    let operations = generator.operations()?;

    match format {
        DocumentFormat::Yaml => {
            let yaml = serde_yaml_ng::to_string(&operations)?;
            print!("{}", yaml);
        }
        DocumentFormat::Json => {
            let json = serde_json::to_string_pretty(&operations)?;
            println!("{}", json);
        }
    }

    Ok(())
}

fn cmd_init(force: bool) -> Result<()> {
    let config_path = PathBuf::from(CONFIG_FILE_NAME);

    if config_path.exists() && !force {
        anyhow::bail!(
            "{} already exists. Use --force to overwrite.",
            config_path.display()
        );
    }

    fs::write(&config_path, config::default_config_content())?;
    eprintln!("Created {}", config_path.display());
    Ok(())
}

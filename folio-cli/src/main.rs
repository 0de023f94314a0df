//! folio CLI - project-based document composer
//!
//! Entry point for the `folio` command-line tool:
//! - Project and document management against the persistence service
//! - Interactive block editor (`edit`) with preset styles and save
//! - HTML preview of a document
//! - The persistence service itself (`serve`)

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use folio_core::FolioConfig;

mod commands;
mod config;
mod tracing_setup;

use commands::{Globals, OutputFormat};

#[derive(Parser, Debug)]
#[command(
    name = "folio",
    author,
    version,
    about = "Compose structured documents from styled text and image blocks",
    long_about = "Organize documents into projects, edit them as ordered blocks with preset \
                  roles, save them to the persistence service and preview them as HTML."
)]
struct Cli {
    /// Base URL of the persistence service (overrides config)
    #[arg(long, global = true, env = folio_core::config::ENV_API_BASE_URL)]
    api_url: Option<String>,

    /// Enable debug logging to stderr
    #[arg(long, global = true)]
    debug: bool,

    /// Emit JSON instead of human-readable output
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the persistence service (REST API + HTML preview)
    Serve(commands::serve::ServeArgs),
    /// List or create projects
    Projects(commands::projects::ProjectsArgs),
    /// List, create, show or preview documents
    Docs(commands::docs::DocsArgs),
    /// Open a document in the interactive block editor
    Edit(commands::edit::EditArgs),
    /// Manage folio configuration (init, show, path)
    Config(config::ConfigArgs),
    /// Generate shell completion scripts
    Completions(CompletionsArgs),
}

#[derive(Parser, Debug)]
struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    shell: Shell,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
#[allow(clippy::enum_variant_names)] // PowerShell is a proper noun, not a suffix
enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
    Elvish,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    // These never touch the config file, so a broken one can still be replaced
    let command = match cli.command {
        Commands::Completions(args) => return run_completions(args),
        Commands::Config(args) => return config::run_config(args),
        other => other,
    };

    let config = FolioConfig::load().context("Failed to load config")?;
    tracing_setup::init(&tracing_setup::TracingConfig {
        debug: cli.debug,
        level: config.logging.level.clone(),
    })
    .ok();

    let globals = Globals {
        api_url: cli.api_url.unwrap_or_else(|| config.client.base_url.clone()),
        output: if cli.json {
            OutputFormat::Json
        } else {
            OutputFormat::Human
        },
    };

    match command {
        Commands::Serve(args) => commands::run_serve(args, &config).await?,
        Commands::Projects(args) => commands::run_projects(args, &globals).await?,
        Commands::Docs(args) => commands::run_docs(args, &globals).await?,
        Commands::Edit(args) => commands::run_edit(args, &globals).await?,
        Commands::Config(_) | Commands::Completions(_) => {}
    }
    Ok(())
}

fn run_completions(args: CompletionsArgs) -> Result<()> {
    use clap::CommandFactory;
    use clap_complete::{generate, Shell as CompletionShell};
    use std::io;

    let mut cmd = Cli::command();
    let bin_name = cmd.get_name().to_string();

    let shell = match args.shell {
        Shell::Bash => CompletionShell::Bash,
        Shell::Zsh => CompletionShell::Zsh,
        Shell::Fish => CompletionShell::Fish,
        Shell::PowerShell => CompletionShell::PowerShell,
        Shell::Elvish => CompletionShell::Elvish,
    };

    generate(shell, &mut cmd, bin_name, &mut io::stdout());

    Ok(())
}

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use folio_core::FolioConfig;

#[derive(Parser, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommands,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Write a config file with default values
    Init(InitArgs),
    /// Show the effective config (file, environment overrides, expansion)
    Show,
    /// Show config file path
    Path,
}

#[derive(Parser, Debug)]
pub struct InitArgs {
    /// Force overwrite existing config
    #[arg(long, short)]
    pub force: bool,
}

pub fn run_config(args: ConfigArgs) -> Result<()> {
    match args.command {
        ConfigCommands::Init(args) => run_init(args),
        ConfigCommands::Show => run_show(),
        ConfigCommands::Path => run_path(),
    }
}

fn run_init(args: InitArgs) -> Result<()> {
    let config_path = FolioConfig::config_path();

    if config_path.exists() && !args.force {
        return Err(anyhow::anyhow!(
            "Config already exists at {:?}\n\nUse --force to overwrite",
            config_path
        ));
    }

    FolioConfig::default()
        .save_to(&config_path)
        .with_context(|| format!("Failed to write config to {}", config_path.display()))?;

    println!("Wrote {}", config_path.display());
    Ok(())
}

fn run_show() -> Result<()> {
    let config = FolioConfig::load().context("Failed to load config")?;
    let rendered = toml::to_string_pretty(&config).context("Failed to render config")?;
    print!("{}", rendered);
    Ok(())
}

fn run_path() -> Result<()> {
    println!("{}", FolioConfig::config_path().display());
    Ok(())
}

//! Project commands: list and create

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use folio_core::{DocumentStore, NewProject, Project};

use super::{or_dash, print_json, Globals, OutputFormat};

#[derive(Parser, Debug)]
pub struct ProjectsArgs {
    #[command(subcommand)]
    pub command: ProjectsCommands,
}

#[derive(Subcommand, Debug)]
pub enum ProjectsCommands {
    /// List all projects
    List,
    /// Create a project
    Create(CreateProjectArgs),
}

#[derive(Parser, Debug)]
pub struct CreateProjectArgs {
    /// Project name (trimmed, 1-200 characters)
    pub name: String,

    /// Optional description (trimmed, blank means none)
    #[arg(long, short)]
    pub description: Option<String>,
}

pub async fn run_projects(args: ProjectsArgs, globals: &Globals) -> Result<()> {
    let store = globals.store()?;
    match args.command {
        ProjectsCommands::List => {
            let projects = store
                .list_projects()
                .await
                .context("Failed to list projects")?;
            match globals.output {
                OutputFormat::Json => print_json(&projects)?,
                OutputFormat::Human => print_projects(&projects),
            }
        }
        ProjectsCommands::Create(args) => {
            let draft = NewProject::new(&args.name, args.description.as_deref())?;
            let project = store
                .create_project(&draft)
                .await
                .context("Failed to create project")?;
            match globals.output {
                OutputFormat::Json => print_json(&project)?,
                OutputFormat::Human => println!("Created project {} ({})", project.name, project.id),
            }
        }
    }
    Ok(())
}

fn print_projects(projects: &[Project]) {
    if projects.is_empty() {
        println!("No projects yet. Create one with `folio projects create <name>`.");
        return;
    }
    for project in projects {
        println!(
            "{}  {}  {}",
            project.id,
            project.name,
            or_dash(project.description.as_deref())
        );
    }
}

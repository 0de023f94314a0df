//! Command implementations for the folio CLI

pub mod docs;
pub mod edit;
pub mod projects;
pub mod serve;

use anyhow::{Context, Result};
use folio_client::HttpStore;
use serde::Serialize;

pub use docs::run_docs;
pub use edit::run_edit;
pub use projects::run_projects;
pub use serve::run_serve;

/// Output format for listing commands
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable output (default)
    #[default]
    Human,
    /// JSON output (for piping to jq)
    Json,
}

/// Settings resolved from global flags and the config file
#[derive(Debug, Clone)]
pub struct Globals {
    pub api_url: String,
    pub output: OutputFormat,
}

impl Globals {
    pub fn store(&self) -> Result<HttpStore> {
        HttpStore::new(&self.api_url)
            .with_context(|| format!("Invalid API base URL '{}'", self.api_url))
    }
}

pub(crate) fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!(
        "{}",
        serde_json::to_string_pretty(value).context("Failed to serialize output")?
    );
    Ok(())
}

/// Placeholder for a missing description
pub(crate) fn or_dash(value: Option<&str>) -> &str {
    value.filter(|v| !v.is_empty()).unwrap_or("-")
}

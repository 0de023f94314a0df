//! HTTP server command
//!
//! Runs the persistence service: JSON API for projects and documents plus
//! the per-document HTML preview.

use anyhow::{Context, Result};
use clap::Parser;
use std::net::SocketAddr;

use folio_core::config::{ENV_BIND, ENV_DATABASE_URL};
use folio_core::FolioConfig;
use folio_server::{run_server, ServerConfig};

/// Arguments for the serve command
#[derive(Parser, Debug)]
pub struct ServeArgs {
    /// Address to bind to (default from config: 127.0.0.1:8000)
    #[arg(long, short = 'b', env = ENV_BIND)]
    pub bind: Option<SocketAddr>,

    /// Allow permissive CORS (all origins) - use with caution
    #[arg(long)]
    pub cors_permissive: bool,

    /// Database URL, e.g. sqlite://folio.db (overrides config)
    #[arg(long, env = ENV_DATABASE_URL)]
    pub database_url: Option<String>,
}

impl ServeArgs {
    fn server_config(self, config: &FolioConfig) -> Result<ServerConfig> {
        let bind_addr = match self.bind {
            Some(addr) => addr,
            None => config.server.bind.parse().with_context(|| {
                format!("Invalid bind address '{}' in config", config.server.bind)
            })?,
        };
        let database_url = self
            .database_url
            .unwrap_or_else(|| config.server.database_url.clone());

        Ok(ServerConfig {
            bind_addr,
            database_url,
            cors_permissive: self.cors_permissive,
        })
    }
}

/// Run the HTTP server
pub async fn run_serve(args: ServeArgs, config: &FolioConfig) -> Result<()> {
    let server_config = args.server_config(config)?;

    tracing::info!("Starting folio server on {}", server_config.bind_addr);

    // Blocks until shutdown
    run_server(server_config).await.context("Server error")?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(bind: Option<&str>, database_url: Option<&str>) -> ServeArgs {
        ServeArgs {
            bind: bind.map(|b| b.parse().unwrap()),
            cors_permissive: false,
            database_url: database_url.map(str::to_owned),
        }
    }

    #[test]
    fn flags_override_config() {
        let config = FolioConfig::default();
        let server = args(Some("0.0.0.0:9000"), Some("sqlite://other.db"))
            .server_config(&config)
            .unwrap();
        assert_eq!(server.bind_addr.port(), 9000);
        assert_eq!(server.database_url, "sqlite://other.db");
    }

    #[test]
    fn config_fills_missing_flags() {
        let mut config = FolioConfig::default();
        config.server.bind = "127.0.0.1:8123".into();
        config.server.database_url = "sqlite://from-config.db".into();

        let server = args(None, None).server_config(&config).unwrap();
        assert_eq!(server.bind_addr.port(), 8123);
        assert_eq!(server.database_url, "sqlite://from-config.db");
    }

    #[test]
    fn bad_config_bind_is_reported() {
        let mut config = FolioConfig::default();
        config.server.bind = "not-an-address".into();

        let err = args(None, None).server_config(&config).unwrap_err();
        assert!(err.to_string().contains("not-an-address"));
    }
}

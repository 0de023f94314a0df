//! folio-server: persistence service for folio
//!
//! Stores projects and their block documents in SQLite and serves them over
//! a JSON REST API, plus a standalone HTML preview per document.

pub mod db;
pub mod error;
pub mod render;
pub mod routes;
pub mod server;

pub use db::{Database, StoreError};
pub use error::ApiError;
pub use server::{build_router, run_server, serve, ServerConfig, ServerError};

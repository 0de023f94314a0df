//! Axum server setup
//!
//! Server skeleton with:
//! - Localhost-only CORS by default
//! - Tracing middleware
//! - Graceful shutdown on SIGTERM/Ctrl+C

use std::net::SocketAddr;
use std::sync::Arc;

use axum::http::HeaderValue;
use axum::Router;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::db::{Database, StoreError};
use crate::routes;

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind to (default: 127.0.0.1:8000)
    pub bind_addr: SocketAddr,

    /// SQLite database URL
    pub database_url: String,

    /// Allow permissive CORS (default: false = localhost only)
    pub cors_permissive: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 8000)),
            database_url: "sqlite://folio.db".to_string(),
            cors_permissive: false,
        }
    }
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
}

/// Build the application router with all routes
pub fn build_router(db: Database, cors_permissive: bool) -> Router {
    let cors = if cors_permissive {
        tracing::warn!("CORS: Permissive mode enabled - all origins allowed");
        CorsLayer::permissive()
    } else {
        // Localhost only
        CorsLayer::new()
            .allow_origin([
                HeaderValue::from_static("http://localhost:5173"),
                HeaderValue::from_static("http://localhost:8000"),
                HeaderValue::from_static("http://127.0.0.1:5173"),
                HeaderValue::from_static("http://127.0.0.1:8000"),
            ])
            .allow_methods(Any)
            .allow_headers(Any)
    };

    Router::new()
        .merge(routes::health::router())
        .merge(routes::projects::router())
        .merge(routes::documents::router())
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(Arc::new(AppState { db }))
}

/// Open the database and serve until Ctrl+C or SIGTERM
pub async fn run_server(config: ServerConfig) -> Result<(), ServerError> {
    let db = Database::connect(&config.database_url).await?;
    tracing::info!(database_url = %config.database_url, "database ready");

    let app = build_router(db, config.cors_permissive);

    let listener = TcpListener::bind(config.bind_addr).await?;
    tracing::info!("Server listening on {}", config.bind_addr);

    serve(listener, app).await
}

/// Serve `app` on an already bound listener with graceful shutdown
pub async fn serve(listener: TcpListener, app: Router) -> Result<(), ServerError> {
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut term) => {
                term.recv().await;
            }
            Err(e) => {
                tracing::error!("failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, starting shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, starting shutdown");
        }
    }
}

/// Server error type
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("storage error: {0}")]
    Store(#[from] StoreError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    async fn app() -> Router {
        build_router(Database::open_in_memory().await.unwrap(), false)
    }

    async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let mut request = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(json) => {
                request = request.header("content-type", "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };

        let response = app
            .clone()
            .oneshot(request.body(body).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, value)
    }

    async fn create_project_and_document(app: &Router) -> (String, String) {
        let (status, project) = send(
            app,
            "POST",
            "/projects",
            Some(json!({"name": "Haggadah Yeshuas Nissan", "description": "Pesach"})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        let project_id = project["id"].as_str().unwrap().to_string();

        let (status, doc) = send(
            app,
            "POST",
            &format!("/projects/{project_id}/documents"),
            Some(json!({"title": "Maggid", "blocks": []})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(doc["blocks"], json!([]));
        (project_id, doc["id"].as_str().unwrap().to_string())
    }

    #[test]
    fn default_config() {
        let config = ServerConfig::default();
        assert_eq!(config.bind_addr.port(), 8000);
        assert!(!config.cors_permissive);
    }

    #[tokio::test]
    async fn health_endpoint() {
        let app = app().await;
        let (status, body) = send(&app, "GET", "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn project_crud() {
        let app = app().await;
        create_project_and_document(&app).await;

        let (status, projects) = send(&app, "GET", "/projects", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(projects[0]["name"], "Haggadah Yeshuas Nissan");
        assert_eq!(projects[0]["description"], "Pesach");
    }

    #[tokio::test]
    async fn blank_project_name_is_422() {
        let app = app().await;
        let (status, body) = send(&app, "POST", "/projects", Some(json!({"name": "  "}))).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["detail"], "name cannot be empty");
    }

    #[tokio::test]
    async fn overlong_description_is_422() {
        let app = app().await;
        let (status, _) = send(
            &app,
            "POST",
            "/projects",
            Some(json!({"name": "P", "description": "x".repeat(1001)})),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn save_replaces_blocks_and_fills_alignment() {
        let app = app().await;
        let (project_id, doc_id) = create_project_and_document(&app).await;
        let uri = format!("/projects/{project_id}/documents/{doc_id}");

        let (status, saved) = send(
            &app,
            "PUT",
            &uri,
            Some(json!({
                "title": "Maggid",
                "blocks": [
                    {"kind": "text", "role": "haggadah_main_hebrew", "text": "Avadim hayinu"},
                    {"kind": "image", "role": "archaeology_fig", "src": "/images/fig1.jpg", "alt_text": null}
                ]
            })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(saved["blocks"][1]["alignment"], "block");

        let (_, fetched) = send(&app, "GET", &uri, None).await;
        assert_eq!(fetched["blocks"][0]["text"], "Avadim hayinu");
        assert_eq!(fetched, saved);
    }

    #[tokio::test]
    async fn unknown_ids_are_404_with_detail() {
        let app = app().await;
        let (project_id, _) = create_project_and_document(&app).await;

        let (status, body) = send(&app, "GET", "/projects/nope/documents", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, json!({"detail": "Project not found"}));

        let (status, body) = send(
            &app,
            "GET",
            &format!("/projects/{project_id}/documents/nope"),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, json!({"detail": "Document not found"}));
    }

    #[tokio::test]
    async fn html_preview_renders_document() {
        let app = app().await;
        let (project_id, doc_id) = create_project_and_document(&app).await;

        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .uri(format!("/projects/{project_id}/documents/{doc_id}/html"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let content_type = response.headers()["content-type"].to_str().unwrap().to_owned();
        assert!(content_type.starts_with("text/html"));
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let html = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(html.contains("<h1 class=\"page-header-title\">Maggid</h1>"));
    }
}

//! Document endpoints, scoped under their project

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Html,
    routing::get,
    Json, Router,
};
use folio_core::model::{Document, DocumentUpdate, NewDocument};

use crate::error::ApiError;
use crate::render::render_document;
use crate::server::AppState;

/// GET /projects/{project_id}/documents
async fn list_documents(
    State(state): State<Arc<AppState>>,
    Path(project_id): Path<String>,
) -> Result<Json<Vec<Document>>, ApiError> {
    let documents = state.db.list_documents(&project_id).await?;
    Ok(Json(documents))
}

/// POST /projects/{project_id}/documents
async fn create_document(
    State(state): State<Arc<AppState>>,
    Path(project_id): Path<String>,
    Json(draft): Json<NewDocument>,
) -> Result<(StatusCode, Json<Document>), ApiError> {
    draft.validate()?;
    let document = state.db.create_document(&project_id, &draft).await?;
    tracing::info!(%project_id, document_id = %document.id, "document created");

    Ok((StatusCode::CREATED, Json(document)))
}

/// GET /projects/{project_id}/documents/{document_id}
async fn get_document(
    State(state): State<Arc<AppState>>,
    Path((project_id, document_id)): Path<(String, String)>,
) -> Result<Json<Document>, ApiError> {
    let document = state.db.get_document(&project_id, &document_id).await?;
    Ok(Json(document))
}

/// PUT /projects/{project_id}/documents/{document_id} - full replacement
async fn update_document(
    State(state): State<Arc<AppState>>,
    Path((project_id, document_id)): Path<(String, String)>,
    Json(update): Json<DocumentUpdate>,
) -> Result<Json<Document>, ApiError> {
    update.validate()?;
    let document = state
        .db
        .update_document(&project_id, &document_id, &update)
        .await?;
    tracing::info!(%document_id, blocks = document.blocks.len(), "document saved");

    Ok(Json(document))
}

/// GET /projects/{project_id}/documents/{document_id}/html
async fn document_html(
    State(state): State<Arc<AppState>>,
    Path((project_id, document_id)): Path<(String, String)>,
) -> Result<Html<String>, ApiError> {
    let document = state.db.get_document(&project_id, &document_id).await?;
    Ok(Html(render_document(&document)))
}

/// Document routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/projects/{project_id}/documents",
            get(list_documents).post(create_document),
        )
        .route(
            "/projects/{project_id}/documents/{document_id}",
            get(get_document).put(update_document),
        )
        .route(
            "/projects/{project_id}/documents/{document_id}/html",
            get(document_html),
        )
        .route(
            "/projects/{project_id}/documents/{document_id}/export/html",
            get(document_html),
        )
}

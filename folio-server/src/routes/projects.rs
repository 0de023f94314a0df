//! Project endpoints

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use folio_core::model::{NewProject, Project};

use crate::error::ApiError;
use crate::server::AppState;

/// GET /projects - list all projects in creation order
async fn list_projects(State(state): State<Arc<AppState>>) -> Result<Json<Vec<Project>>, ApiError> {
    let projects = state.db.list_projects().await?;
    Ok(Json(projects))
}

/// POST /projects - create a new project
async fn create_project(
    State(state): State<Arc<AppState>>,
    Json(draft): Json<NewProject>,
) -> Result<(StatusCode, Json<Project>), ApiError> {
    draft.validate()?;
    let project = state.db.create_project(&draft).await?;
    tracing::info!(project_id = %project.id, name = %project.name, "project created");

    Ok((StatusCode::CREATED, Json(project)))
}

/// Project routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/projects", get(list_projects).post(create_project))
}

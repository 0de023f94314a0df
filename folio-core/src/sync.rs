//! Sync controller: drives an [`EditorSession`] against a [`DocumentStore`].
//!
//! Every operation is one begin/request/finish round trip. Failures are
//! recorded on the session for display and returned to the caller.

use tracing::{debug, info};

use crate::error::{FolioError, Result, SessionError};
use crate::model::{Document, NewDocument, NewProject, Project};
use crate::session::{EditorSession, Resolution};
use crate::store::DocumentStore;

pub struct SyncController<S> {
    session: EditorSession,
    store: S,
}

impl<S: DocumentStore> SyncController<S> {
    pub fn new(store: S) -> Self {
        Self {
            session: EditorSession::new(),
            store,
        }
    }

    pub fn session(&self) -> &EditorSession {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut EditorSession {
        &mut self.session
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Record a failure raised before any request was made
    fn reject(&mut self, err: impl Into<FolioError>) -> FolioError {
        let err = err.into();
        self.session.report(&err);
        err
    }

    /// Fetch the project list; auto-selects the first project when none is
    /// selected and loads its documents.
    pub async fn load_projects(&mut self) -> Result<&[Project]> {
        let projects = match self.store.list_projects().await {
            Ok(projects) => projects,
            Err(err) => {
                self.session.report(&err);
                return Err(err);
            }
        };
        info!(count = projects.len(), "projects loaded");

        if let Some(selected) = self.session.apply_projects(projects) {
            debug!(project_id = %selected, "auto-selected project");
            self.follow_up_refresh().await;
        }
        Ok(self.session.projects())
    }

    pub async fn create_project(&mut self, name: &str, description: Option<&str>) -> Result<Project> {
        let draft = NewProject::new(name, description).map_err(|e| self.reject(e))?;
        let project = match self.store.create_project(&draft).await {
            Ok(project) => project,
            Err(err) => {
                self.session.report(&err);
                return Err(err);
            }
        };
        info!(project_id = %project.id, name = %project.name, "project created");

        if self.session.add_project(project.clone()) {
            self.follow_up_refresh().await;
        }
        Ok(project)
    }

    /// Switch to a project and load its document list
    pub async fn select_project(&mut self, project_id: &str) -> Result<Resolution> {
        self.session.select_project(project_id);
        self.refresh_documents().await
    }

    /// Reload the selected project's document list.
    ///
    /// Closes the open document if it has been deleted on the server.
    pub async fn refresh_documents(&mut self) -> Result<Resolution> {
        let ticket = self.session.begin_documents().map_err(|e| self.reject(e))?;
        let result = self.store.list_documents(&ticket.project_id).await;
        self.session.apply_document_list(&ticket, result)
    }

    /// Document-list load that trails a successful primary call. A failure
    /// stays on the session's error surface only.
    async fn follow_up_refresh(&mut self) {
        if let Err(err) = self.refresh_documents().await {
            debug!(error = %err, "document list refresh failed after primary call");
        }
    }

    /// Create an empty document in the selected project
    pub async fn create_document(&mut self, title: &str, description: Option<&str>) -> Result<Document> {
        let Some(project_id) = self.session.project_id().map(str::to_owned) else {
            return Err(self.reject(SessionError::NoProject));
        };
        let draft = NewDocument::new(title, description).map_err(|e| self.reject(e))?;

        let document = match self.store.create_document(&project_id, &draft).await {
            Ok(document) => document,
            Err(err) => {
                self.session.report(&err);
                return Err(err);
            }
        };
        info!(document_id = %document.id, title = %document.title, "document created");
        self.session.add_document(document.clone());
        Ok(document)
    }

    /// Fetch a document into the editor
    pub async fn open_document(&mut self, document_id: &str) -> Result<Resolution> {
        let ticket = self.session.begin_load(document_id).map_err(|e| self.reject(e))?;
        let result = self
            .store
            .get_document(&ticket.project_id, &ticket.document_id)
            .await;
        self.session.finish_load(&ticket, result)
    }

    /// Persist the open document, replacing the server's copy
    pub async fn save(&mut self) -> Result<Document> {
        let ticket = self.session.begin_save().map_err(|e| self.reject(e))?;
        let result = self
            .store
            .save_document(&ticket.project_id, &ticket.document_id, &ticket.update)
            .await;
        self.session.finish_save(&ticket, result)
    }

    /// HTML preview of the open document, if the store serves one
    pub fn preview_url(&self) -> Option<String> {
        let open = self.session.open_document()?;
        self.store.html_url(open.project_id(), open.id())
    }
}

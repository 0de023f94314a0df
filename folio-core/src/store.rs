//! Persistence seam for the sync controller.
//!
//! [`DocumentStore`] is the remote collaborator: the HTTP client implements
//! it against the persistence service, [`MemoryStore`] implements it in
//! process for tests and offline use.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::{FolioError, Result};
use crate::model::{Document, DocumentUpdate, NewDocument, NewProject, Project};

/// Remote persistence for projects and documents
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn list_projects(&self) -> Result<Vec<Project>>;

    async fn create_project(&self, draft: &NewProject) -> Result<Project>;

    async fn list_documents(&self, project_id: &str) -> Result<Vec<Document>>;

    /// Create a document in `project_id`. New documents always start with no
    /// blocks; `draft.blocks` is ignored.
    async fn create_document(&self, project_id: &str, draft: &NewDocument) -> Result<Document>;

    async fn get_document(&self, project_id: &str, document_id: &str) -> Result<Document>;

    /// Replace a document wholesale
    async fn save_document(
        &self,
        project_id: &str,
        document_id: &str,
        update: &DocumentUpdate,
    ) -> Result<Document>;

    /// URL of the rendered HTML preview, when the store can serve one
    fn html_url(&self, _project_id: &str, _document_id: &str) -> Option<String> {
        None
    }
}

#[derive(Debug, Default)]
struct Tables {
    projects: Vec<Project>,
    documents: Vec<Document>,
}

/// In-process store with the same semantics as the service
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
    requests: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of store calls made so far
    pub fn request_count(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }

    /// Delete a document out from under any client
    pub fn delete_document(&self, project_id: &str, document_id: &str) -> bool {
        let mut tables = self.lock();
        let before = tables.documents.len();
        tables
            .documents
            .retain(|d| !(d.project_id == project_id && d.id == document_id));
        tables.documents.len() != before
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Tables> {
        // a poisoned lock only means a test panicked mid-call
        self.tables.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn hit(&self) {
        self.requests.fetch_add(1, Ordering::SeqCst);
    }
}

fn project_missing() -> FolioError {
    FolioError::not_found("Project not found")
}

fn document_missing() -> FolioError {
    FolioError::not_found("Document not found")
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn list_projects(&self) -> Result<Vec<Project>> {
        self.hit();
        Ok(self.lock().projects.clone())
    }

    async fn create_project(&self, draft: &NewProject) -> Result<Project> {
        self.hit();
        draft.validate()?;
        let project = Project {
            id: Uuid::new_v4().to_string(),
            name: draft.name.clone(),
            description: draft.description.clone(),
        };
        self.lock().projects.push(project.clone());
        Ok(project)
    }

    async fn list_documents(&self, project_id: &str) -> Result<Vec<Document>> {
        self.hit();
        let tables = self.lock();
        if !tables.projects.iter().any(|p| p.id == project_id) {
            return Err(project_missing());
        }
        Ok(tables
            .documents
            .iter()
            .filter(|d| d.project_id == project_id)
            .cloned()
            .collect())
    }

    async fn create_document(&self, project_id: &str, draft: &NewDocument) -> Result<Document> {
        self.hit();
        draft.validate()?;
        let mut tables = self.lock();
        if !tables.projects.iter().any(|p| p.id == project_id) {
            return Err(project_missing());
        }
        let document = Document {
            id: Uuid::new_v4().to_string(),
            project_id: project_id.to_owned(),
            title: draft.title.clone(),
            description: draft.description.clone(),
            blocks: Vec::new(),
        };
        tables.documents.push(document.clone());
        Ok(document)
    }

    async fn get_document(&self, project_id: &str, document_id: &str) -> Result<Document> {
        self.hit();
        self.lock()
            .documents
            .iter()
            .find(|d| d.project_id == project_id && d.id == document_id)
            .cloned()
            .ok_or_else(document_missing)
    }

    async fn save_document(
        &self,
        project_id: &str,
        document_id: &str,
        update: &DocumentUpdate,
    ) -> Result<Document> {
        self.hit();
        update.validate()?;
        let mut tables = self.lock();
        let document = tables
            .documents
            .iter_mut()
            .find(|d| d.project_id == project_id && d.id == document_id)
            .ok_or_else(document_missing)?;
        document.title = update.title.clone();
        document.description = update.description.clone();
        document.blocks = update.blocks.clone();
        Ok(document.clone())
    }
}

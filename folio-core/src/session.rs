//! Editor session: the single owner of client-side editing state.
//!
//! Holds the project list, the selected project's document list, the open
//! document with its in-memory blocks and active index, and the last error
//! to show. Network work is split into `begin_*` (issue a ticket) and
//! `finish_*` (apply a response): a response whose ticket no longer matches
//! the session is discarded, so the last selection always wins.

use std::fmt;

use tracing::{debug, info, warn};

use crate::blocks::{self, BlockField};
use crate::error::{FolioError, SessionError};
use crate::model::{normalize_description, Block, BlockKind, Document, DocumentUpdate, Project};

/// Coarse state of the session, derived from what it holds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// No project selected
    Empty,
    /// Project chosen, no document open
    ProjectSelected,
    /// A document fetch is in flight
    DocumentLoading,
    /// Blocks in memory, clean or dirty
    DocumentOpen,
    /// A save is in flight
    DocumentSaving,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Empty => "empty",
            Phase::ProjectSelected => "project selected",
            Phase::DocumentLoading => "document loading",
            Phase::DocumentOpen => "document open",
            Phase::DocumentSaving => "document saving",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether a finished response was applied or dropped as stale
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Applied,
    Discarded,
}

/// Identifies one document fetch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadTicket {
    pub project_id: String,
    pub document_id: String,
    generation: u64,
}

/// Identifies one document-list fetch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListTicket {
    pub project_id: String,
    generation: u64,
}

/// Identifies one save, carrying the exact payload to send
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveTicket {
    pub project_id: String,
    pub document_id: String,
    pub update: DocumentUpdate,
    generation: u64,
}

/// Last loaded-or-saved server state, for dirty tracking
#[derive(Debug, Clone, PartialEq, Eq)]
struct Snapshot {
    title: String,
    description: String,
    blocks: Vec<Block>,
}

impl From<&Document> for Snapshot {
    fn from(doc: &Document) -> Self {
        Self {
            title: doc.title.clone(),
            description: doc.description.clone().unwrap_or_default(),
            blocks: doc.blocks.clone(),
        }
    }
}

/// The document currently held in editor memory
#[derive(Debug, Clone)]
pub struct OpenDocument {
    id: String,
    project_id: String,
    title: String,
    description: String,
    blocks: Vec<Block>,
    active: Option<usize>,
    baseline: Snapshot,
    saving: bool,
    /// Generation of the load that opened this document
    generation: u64,
}

impl OpenDocument {
    fn from_document(doc: Document, generation: u64) -> Self {
        let baseline = Snapshot::from(&doc);
        Self {
            id: doc.id,
            project_id: doc.project_id,
            title: doc.title,
            description: doc.description.unwrap_or_default(),
            blocks: doc.blocks,
            active: None,
            baseline,
            saving: false,
            generation,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn active(&self) -> Option<usize> {
        self.active
    }

    pub fn active_block(&self) -> Option<&Block> {
        self.active.and_then(|i| self.blocks.get(i))
    }

    pub fn is_saving(&self) -> bool {
        self.saving
    }

    /// True when title, description or blocks differ from the server copy
    pub fn is_dirty(&self) -> bool {
        self.title != self.baseline.title
            || self.description != self.baseline.description
            || self.blocks != self.baseline.blocks
    }

    fn to_update(&self) -> DocumentUpdate {
        DocumentUpdate {
            title: self.title.trim().to_owned(),
            description: normalize_description(Some(&self.description)),
            blocks: self.blocks.clone(),
        }
    }

    fn replace_blocks(&mut self, next: Option<Vec<Block>>) -> bool {
        match next {
            Some(blocks) => {
                self.blocks = blocks;
                true
            }
            None => false,
        }
    }
}

/// Client-side editing state, owned by one controller
#[derive(Debug, Default)]
pub struct EditorSession {
    projects: Vec<Project>,
    project_id: Option<String>,
    documents: Vec<Document>,
    open: Option<OpenDocument>,
    loading: Option<LoadTicket>,
    /// Bumped on every project selection and every load; tickets compare it
    generation: u64,
    /// Generation at the last project selection
    project_generation: u64,
    last_error: Option<String>,
}

impl EditorSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> Phase {
        if self.project_id.is_none() {
            return Phase::Empty;
        }
        if self.loading.is_some() {
            return Phase::DocumentLoading;
        }
        match &self.open {
            Some(open) if open.saving => Phase::DocumentSaving,
            Some(_) => Phase::DocumentOpen,
            None => Phase::ProjectSelected,
        }
    }

    pub fn projects(&self) -> &[Project] {
        &self.projects
    }

    pub fn project_id(&self) -> Option<&str> {
        self.project_id.as_deref()
    }

    pub fn selected_project(&self) -> Option<&Project> {
        let id = self.project_id.as_deref()?;
        self.projects.iter().find(|p| p.id == id)
    }

    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    pub fn open_document(&self) -> Option<&OpenDocument> {
        self.open.as_ref()
    }

    /// Document id the pending load is for, if any
    pub fn loading_target(&self) -> Option<&str> {
        self.loading.as_ref().map(|t| t.document_id.as_str())
    }

    pub fn is_dirty(&self) -> bool {
        self.open.as_ref().is_some_and(OpenDocument::is_dirty)
    }

    // ------------------------------------------------------------------
    // Error surface
    // ------------------------------------------------------------------

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn dismiss_error(&mut self) {
        self.last_error = None;
    }

    /// Record a failure for display. Replaces any earlier message.
    pub fn report(&mut self, err: &FolioError) {
        warn!(error = %err, "surfacing error");
        self.last_error = Some(err.to_string());
    }

    fn next_generation(&mut self) -> u64 {
        self.generation += 1;
        self.generation
    }

    // ------------------------------------------------------------------
    // Projects
    // ------------------------------------------------------------------

    /// Replace the project list.
    ///
    /// Selects the first project when none is selected and returns its id so
    /// the caller can fetch its documents. A selected project missing from
    /// the new list resets the session to [`Phase::Empty`].
    pub fn apply_projects(&mut self, projects: Vec<Project>) -> Option<String> {
        self.projects = projects;

        if let Some(current) = self.project_id.as_deref() {
            if self.projects.iter().any(|p| p.id == current) {
                return None;
            }
            info!(project_id = current, "selected project no longer listed");
            self.clear_project();
        }

        let first = self.projects.first()?.id.clone();
        self.select_project(&first);
        Some(first)
    }

    /// Add a freshly created project; selects it if nothing is selected
    pub fn add_project(&mut self, project: Project) -> bool {
        let id = project.id.clone();
        self.projects.push(project);
        if self.project_id.is_none() {
            self.select_project(&id);
            return true;
        }
        false
    }

    /// Switch projects. Nothing from the previous project survives.
    pub fn select_project(&mut self, project_id: &str) {
        info!(project_id, "selecting project");
        self.clear_project();
        self.project_id = Some(project_id.to_owned());
        self.project_generation = self.next_generation();
    }

    fn clear_project(&mut self) {
        self.project_id = None;
        self.documents.clear();
        self.open = None;
        self.loading = None;
        self.project_generation = self.next_generation();
    }

    // ------------------------------------------------------------------
    // Document list
    // ------------------------------------------------------------------

    pub fn begin_documents(&mut self) -> Result<ListTicket, SessionError> {
        let project_id = self.project_id.clone().ok_or(SessionError::NoProject)?;
        self.last_error = None;
        Ok(ListTicket {
            project_id,
            generation: self.project_generation,
        })
    }

    /// Apply a document-list response.
    ///
    /// If the open document is no longer listed (deleted elsewhere) it is
    /// force-closed, and a pending load of an unlisted document is dropped.
    pub fn apply_document_list(
        &mut self,
        ticket: &ListTicket,
        result: Result<Vec<Document>, FolioError>,
    ) -> Result<Resolution, FolioError> {
        let current = self.project_id.as_deref() == Some(ticket.project_id.as_str())
            && ticket.generation == self.project_generation;
        if !current {
            debug!(project_id = %ticket.project_id, "discarding stale document list");
            return Ok(Resolution::Discarded);
        }

        let documents = match result {
            Ok(documents) => documents,
            Err(err) => {
                self.report(&err);
                return Err(err);
            }
        };

        if let Some(open) = &self.open {
            if !documents.iter().any(|d| d.id == open.id) {
                info!(document_id = %open.id, "open document no longer listed, closing");
                self.open = None;
            }
        }
        if let Some(pending) = &self.loading {
            if !documents.iter().any(|d| d.id == pending.document_id) {
                info!(document_id = %pending.document_id, "pending document no longer listed, cancelling load");
                self.loading = None;
            }
        }
        self.documents = documents;
        Ok(Resolution::Applied)
    }

    /// Add a freshly created document to the list of its project
    pub fn add_document(&mut self, document: Document) -> bool {
        if self.project_id.as_deref() != Some(document.project_id.as_str()) {
            debug!(document_id = %document.id, "created document belongs to another project");
            return false;
        }
        self.documents.push(document);
        true
    }

    // ------------------------------------------------------------------
    // Loading
    // ------------------------------------------------------------------

    /// Start opening a document. A newer call supersedes an older one.
    pub fn begin_load(&mut self, document_id: &str) -> Result<LoadTicket, SessionError> {
        let project_id = match self.phase() {
            Phase::Empty => return Err(SessionError::NoProject),
            Phase::DocumentSaving => {
                return Err(SessionError::InvalidPhase {
                    operation: "open a document",
                    phase: Phase::DocumentSaving,
                })
            }
            _ => self.project_id.clone().ok_or(SessionError::NoProject)?,
        };

        self.last_error = None;
        let ticket = LoadTicket {
            project_id,
            document_id: document_id.to_owned(),
            generation: self.next_generation(),
        };
        debug!(document_id, generation = ticket.generation, "load started");
        self.loading = Some(ticket.clone());
        Ok(ticket)
    }

    /// Apply a document fetch. On failure the previous state is kept.
    pub fn finish_load(
        &mut self,
        ticket: &LoadTicket,
        result: Result<Document, FolioError>,
    ) -> Result<Resolution, FolioError> {
        if self.loading.as_ref() != Some(ticket) {
            debug!(document_id = %ticket.document_id, "discarding stale load response");
            return Ok(Resolution::Discarded);
        }
        self.loading = None;

        match result {
            Ok(document) => {
                info!(
                    document_id = %document.id,
                    blocks = document.blocks.len(),
                    "document opened"
                );
                self.open = Some(OpenDocument::from_document(document, ticket.generation));
                Ok(Resolution::Applied)
            }
            Err(err) => {
                self.report(&err);
                Err(err)
            }
        }
    }

    /// Explicitly close the open document. Refused while a save is in flight.
    pub fn close_document(&mut self) -> Result<bool, SessionError> {
        if self.phase() == Phase::DocumentSaving {
            return Err(SessionError::InvalidPhase {
                operation: "close the document",
                phase: Phase::DocumentSaving,
            });
        }
        self.loading = None;
        Ok(self.open.take().is_some())
    }

    // ------------------------------------------------------------------
    // Editing
    // ------------------------------------------------------------------

    fn editable(&mut self) -> Result<&mut OpenDocument, SessionError> {
        match self.phase() {
            Phase::DocumentOpen | Phase::DocumentSaving => {
                self.open.as_mut().ok_or(SessionError::NoOpenDocument)
            }
            Phase::DocumentLoading => Err(SessionError::InvalidPhase {
                operation: "edit",
                phase: Phase::DocumentLoading,
            }),
            Phase::Empty | Phase::ProjectSelected => Err(SessionError::NoOpenDocument),
        }
    }

    pub fn set_title(&mut self, title: &str) -> Result<(), SessionError> {
        self.editable()?.title = title.to_owned();
        Ok(())
    }

    pub fn set_description(&mut self, description: &str) -> Result<(), SessionError> {
        self.editable()?.description = description.to_owned();
        Ok(())
    }

    /// Append a block and make it active. Returns its index.
    pub fn append_block(&mut self, block: Block) -> Result<usize, SessionError> {
        let open = self.editable()?;
        let (next, index) = blocks::append(&open.blocks, block);
        open.blocks = next;
        open.active = Some(index);
        Ok(index)
    }

    /// Append the default template for `kind`
    pub fn add_block(&mut self, kind: BlockKind) -> Result<usize, SessionError> {
        self.append_block(Block::template(kind))
    }

    /// Remove a block, keeping the active index on the same logical block.
    ///
    /// Returns `false` for a stale index.
    pub fn remove_block(&mut self, index: usize) -> Result<bool, SessionError> {
        let open = self.editable()?;
        let next = blocks::changed(blocks::remove_at(&open.blocks, index));
        if !open.replace_blocks(next) {
            debug!(index, "remove ignored: index out of range");
            return Ok(false);
        }
        open.active = match open.active {
            Some(active) if active == index => None,
            Some(active) if active > index => Some(active - 1),
            other => other,
        };
        Ok(true)
    }

    /// Apply a style picker choice (`"custom"` keeps the current role)
    pub fn set_role(&mut self, index: usize, choice: &str) -> Result<bool, SessionError> {
        let open = self.editable()?;
        let next = blocks::changed(blocks::set_role_at(&open.blocks, index, choice));
        Ok(open.replace_blocks(next))
    }

    /// Apply a field edit; mismatched kinds and stale indices are ignored
    pub fn set_field(&mut self, index: usize, update: &BlockField) -> Result<bool, SessionError> {
        let open = self.editable()?;
        let next = blocks::changed(blocks::set_field_at(&open.blocks, index, update));
        let applied = open.replace_blocks(next);
        if !applied {
            debug!(index, ?update, "field edit ignored");
        }
        Ok(applied)
    }

    /// Focus a block. An out-of-range index clears focus.
    pub fn set_active(&mut self, index: Option<usize>) -> Result<Option<usize>, SessionError> {
        let open = self.editable()?;
        open.active = index.filter(|&i| i < open.blocks.len());
        Ok(open.active)
    }

    // ------------------------------------------------------------------
    // Saving
    // ------------------------------------------------------------------

    /// Start a save. Rejected locally when the title is blank, so no
    /// request is ever issued for it.
    pub fn begin_save(&mut self) -> Result<SaveTicket, SessionError> {
        match self.phase() {
            Phase::DocumentOpen => {}
            Phase::DocumentSaving => return Err(SessionError::SaveInProgress),
            Phase::Empty | Phase::ProjectSelected => return Err(SessionError::NoOpenDocument),
            phase @ Phase::DocumentLoading => {
                return Err(SessionError::InvalidPhase {
                    operation: "save",
                    phase,
                })
            }
        }

        let open = self.open.as_mut().ok_or(SessionError::NoOpenDocument)?;
        let update = open.to_update();
        update.validate()?;

        open.saving = true;
        let ticket = SaveTicket {
            project_id: open.project_id.clone(),
            document_id: open.id.clone(),
            update,
            generation: open.generation,
        };
        self.last_error = None;
        info!(document_id = %ticket.document_id, blocks = ticket.update.blocks.len(), "save started");
        Ok(ticket)
    }

    /// Apply a save response.
    ///
    /// The server's copy replaces the document's list entry and becomes the
    /// new clean baseline. Edits made while the save was in flight are kept
    /// and leave the session dirty.
    pub fn finish_save(
        &mut self,
        ticket: &SaveTicket,
        result: Result<Document, FolioError>,
    ) -> Result<Document, FolioError> {
        let same_document = self
            .open
            .as_ref()
            .is_some_and(|o| o.id == ticket.document_id && o.generation == ticket.generation);

        let saved = match result {
            Ok(saved) => saved,
            Err(err) => {
                if same_document {
                    if let Some(open) = self.open.as_mut() {
                        open.saving = false;
                    }
                }
                self.report(&err);
                return Err(err);
            }
        };

        if self.project_id.as_deref() == Some(ticket.project_id.as_str()) {
            if let Some(entry) = self.documents.iter_mut().find(|d| d.id == saved.id) {
                *entry = saved.clone();
            }
        }

        match self.open.as_mut() {
            Some(open) if same_document => {
                open.saving = false;
                open.baseline = Snapshot::from(&saved);
                if open.to_update() == ticket.update {
                    open.title = saved.title.clone();
                    open.description = saved.description.clone().unwrap_or_default();
                    open.blocks = saved.blocks.clone();
                    open.active = open.active.filter(|&i| i < open.blocks.len());
                } else {
                    debug!(document_id = %saved.id, "edits made during save kept");
                }
                info!(document_id = %saved.id, dirty = open.is_dirty(), "document saved");
            }
            Some(open) if open.id == saved.id && open.project_id == ticket.project_id => {
                // reopened while the save was in flight
                let clean = !open.is_dirty();
                open.baseline = Snapshot::from(&saved);
                if clean {
                    open.title = saved.title.clone();
                    open.description = saved.description.clone().unwrap_or_default();
                    open.blocks = saved.blocks.clone();
                    open.active = open.active.filter(|&i| i < open.blocks.len());
                }
                info!(document_id = %saved.id, dirty = open.is_dirty(), "saved copy reconciled with reopened document");
            }
            _ => debug!(document_id = %saved.id, "save finished for a document no longer open"),
        }
        Ok(saved)
    }
}

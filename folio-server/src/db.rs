//! SQLite storage for projects and documents
//!
//! Blocks are stored as one JSON array per document. Every document lookup
//! is scoped by project id, so a document requested under the wrong project
//! is not found.

use std::str::FromStr;
use std::time::Duration;

use folio_core::model::{Block, Document, DocumentUpdate, NewDocument, NewProject, Project};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::Row;
use uuid::Uuid;

/// Default maximum connections for the pool.
/// Kept low for single-user tooling.
const DEFAULT_MAX_CONNECTIONS: u32 = 5;

/// Storage error type
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    #[error("corrupt blocks for document '{id}': {source}")]
    Blocks {
        id: String,
        source: serde_json::Error,
    },

    #[error("{resource} not found")]
    NotFound { resource: &'static str },
}

impl StoreError {
    fn project_missing() -> Self {
        Self::NotFound {
            resource: "Project",
        }
    }

    fn document_missing() -> Self {
        Self::NotFound {
            resource: "Document",
        }
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Pooled SQLite database
#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Open or create the database at `database_url` (e.g. `sqlite://folio.db`)
    pub async fn connect(database_url: &str) -> StoreResult<Self> {
        let options = SqliteConnectOptions::from_str(database_url)?
            .create_if_missing(true)
            .busy_timeout(Duration::from_secs(5))
            .foreign_keys(true);

        if let Some(parent) = options.get_filename().parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(sqlx::Error::Io)?;
            }
        }

        let pool = SqlitePoolOptions::new()
            .max_connections(DEFAULT_MAX_CONNECTIONS)
            .connect_with(options)
            .await?;

        Self::with_pool(pool).await
    }

    /// Open an in-memory database (for testing).
    ///
    /// Limited to one connection: each SQLite memory connection is its own
    /// database.
    pub async fn open_in_memory() -> StoreResult<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;

        Self::with_pool(pool).await
    }

    async fn with_pool(pool: SqlitePool) -> StoreResult<Self> {
        sqlx::raw_sql(include_str!("schema.sql"))
            .execute(&pool)
            .await?;
        tracing::debug!("schema ready");
        Ok(Self { pool })
    }

    // ========================================================================
    // Projects
    // ========================================================================

    pub async fn list_projects(&self) -> StoreResult<Vec<Project>> {
        let rows = sqlx::query("SELECT id, name, description FROM projects ORDER BY rowid")
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.iter().map(project_from_row).collect())
    }

    pub async fn create_project(&self, draft: &NewProject) -> StoreResult<Project> {
        let project = Project {
            id: Uuid::new_v4().to_string(),
            name: draft.name.clone(),
            description: draft.description.clone(),
        };

        sqlx::query("INSERT INTO projects (id, name, description) VALUES (?, ?, ?)")
            .bind(&project.id)
            .bind(&project.name)
            .bind(&project.description)
            .execute(&self.pool)
            .await?;

        Ok(project)
    }

    async fn require_project(&self, project_id: &str) -> StoreResult<()> {
        sqlx::query("SELECT 1 FROM projects WHERE id = ?")
            .bind(project_id)
            .fetch_optional(&self.pool)
            .await?
            .map(|_| ())
            .ok_or_else(StoreError::project_missing)
    }

    // ========================================================================
    // Documents
    // ========================================================================

    pub async fn list_documents(&self, project_id: &str) -> StoreResult<Vec<Document>> {
        self.require_project(project_id).await?;

        let rows = sqlx::query(
            r#"
            SELECT id, project_id, title, description, blocks
            FROM documents
            WHERE project_id = ?
            ORDER BY rowid
            "#,
        )
        .bind(project_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(document_from_row).collect()
    }

    pub async fn create_document(
        &self,
        project_id: &str,
        draft: &NewDocument,
    ) -> StoreResult<Document> {
        self.require_project(project_id).await?;

        let document = Document {
            id: Uuid::new_v4().to_string(),
            project_id: project_id.to_owned(),
            title: draft.title.clone(),
            description: draft.description.clone(),
            blocks: normalize_blocks(&draft.blocks),
        };

        sqlx::query(
            "INSERT INTO documents (id, project_id, title, description, blocks) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&document.id)
        .bind(&document.project_id)
        .bind(&document.title)
        .bind(&document.description)
        .bind(encode_blocks(&document)?)
        .execute(&self.pool)
        .await?;

        Ok(document)
    }

    pub async fn get_document(&self, project_id: &str, document_id: &str) -> StoreResult<Document> {
        let row = sqlx::query(
            r#"
            SELECT id, project_id, title, description, blocks
            FROM documents
            WHERE project_id = ? AND id = ?
            "#,
        )
        .bind(project_id)
        .bind(document_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(StoreError::document_missing)?;

        document_from_row(&row)
    }

    /// Replace title, description and the whole block sequence
    pub async fn update_document(
        &self,
        project_id: &str,
        document_id: &str,
        update: &DocumentUpdate,
    ) -> StoreResult<Document> {
        let document = Document {
            id: document_id.to_owned(),
            project_id: project_id.to_owned(),
            title: update.title.clone(),
            description: update.description.clone(),
            blocks: normalize_blocks(&update.blocks),
        };

        let result = sqlx::query(
            "UPDATE documents SET title = ?, description = ?, blocks = ? WHERE project_id = ? AND id = ?",
        )
        .bind(&document.title)
        .bind(&document.description)
        .bind(encode_blocks(&document)?)
        .bind(project_id)
        .bind(document_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::document_missing());
        }
        Ok(document)
    }

    #[cfg(test)]
    pub(crate) async fn delete_document(&self, project_id: &str, document_id: &str) -> StoreResult<()> {
        sqlx::query("DELETE FROM documents WHERE project_id = ? AND id = ?")
            .bind(project_id)
            .bind(document_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

/// Write out the effective alignment of every image block
fn normalize_blocks(blocks: &[Block]) -> Vec<Block> {
    blocks
        .iter()
        .map(|block| match block {
            Block::Image(image) if image.stored_alignment.is_none() => {
                let mut image = image.clone();
                image.stored_alignment = Some(image.alignment());
                Block::Image(image)
            }
            other => other.clone(),
        })
        .collect()
}

fn encode_blocks(document: &Document) -> StoreResult<String> {
    serde_json::to_string(&document.blocks).map_err(|source| StoreError::Blocks {
        id: document.id.clone(),
        source,
    })
}

fn project_from_row(row: &SqliteRow) -> Project {
    Project {
        id: row.get("id"),
        name: row.get("name"),
        description: row.get("description"),
    }
}

fn document_from_row(row: &SqliteRow) -> StoreResult<Document> {
    let id: String = row.get("id");
    let raw: String = row.get("blocks");
    let blocks = serde_json::from_str(&raw).map_err(|source| StoreError::Blocks {
        id: id.clone(),
        source,
    })?;

    Ok(Document {
        id,
        project_id: row.get("project_id"),
        title: row.get("title"),
        description: row.get("description"),
        blocks,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_core::model::{ImageAlignment, ImageBlock};

    async fn seeded() -> (Database, Project) {
        let db = Database::open_in_memory().await.unwrap();
        let project = db
            .create_project(&NewProject::new("Haggadah Yeshuas Nissan", None).unwrap())
            .await
            .unwrap();
        (db, project)
    }

    #[tokio::test]
    async fn projects_list_in_creation_order() {
        let (db, first) = seeded().await;
        db.create_project(&NewProject::new("Chumash", Some("Bereishis")).unwrap())
            .await
            .unwrap();

        let projects = db.list_projects().await.unwrap();
        assert_eq!(projects.len(), 2);
        assert_eq!(projects[0], first);
        assert_eq!(projects[1].description.as_deref(), Some("Bereishis"));
    }

    #[tokio::test]
    async fn document_under_wrong_project_is_missing() {
        let (db, project) = seeded().await;
        let other = db
            .create_project(&NewProject::new("Other", None).unwrap())
            .await
            .unwrap();
        let doc = db
            .create_document(&project.id, &NewDocument::new("Maggid", None).unwrap())
            .await
            .unwrap();

        let err = db.get_document(&other.id, &doc.id).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound { resource: "Document" }));
    }

    #[tokio::test]
    async fn update_replaces_blocks_and_fills_alignment() {
        let (db, project) = seeded().await;
        let doc = db
            .create_document(&project.id, &NewDocument::new("Maggid", None).unwrap())
            .await
            .unwrap();

        let update = DocumentUpdate {
            title: "Maggid".into(),
            description: Some("Telling".into()),
            blocks: vec![Block::Image(ImageBlock {
                role: "archaeology_fig".into(),
                src: "/images/fig1.jpg".into(),
                alt_text: None,
                stored_alignment: None,
            })],
        };
        db.update_document(&project.id, &doc.id, &update)
            .await
            .unwrap();

        let stored = db.get_document(&project.id, &doc.id).await.unwrap();
        let image = stored.blocks[0].as_image().unwrap();
        assert_eq!(image.stored_alignment, Some(ImageAlignment::Block));
        assert_eq!(stored.description.as_deref(), Some("Telling"));
    }

    #[tokio::test]
    async fn update_of_missing_document_fails() {
        let (db, project) = seeded().await;
        let update = DocumentUpdate {
            title: "x".into(),
            description: None,
            blocks: vec![],
        };
        let err = db
            .update_document(&project.id, "missing", &update)
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));
    }

    #[tokio::test]
    async fn list_for_unknown_project_fails() {
        let db = Database::open_in_memory().await.unwrap();
        let err = db.list_documents("nope").await.unwrap_err();
        assert_eq!(err.to_string(), "Project not found");
    }

    #[tokio::test]
    async fn deleted_document_disappears_from_list() {
        let (db, project) = seeded().await;
        let doc = db
            .create_document(&project.id, &NewDocument::new("Maggid", None).unwrap())
            .await
            .unwrap();
        db.delete_document(&project.id, &doc.id).await.unwrap();
        assert!(db.list_documents(&project.id).await.unwrap().is_empty());
    }
}

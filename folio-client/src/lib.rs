//! folio-client: [`DocumentStore`] over HTTP
//!
//! One request per call, no retry or caching. Non-2xx responses become
//! [`FolioError::Api`] carrying status, status text and the raw body.

use std::time::Duration;

use async_trait::async_trait;
use folio_core::model::{Document, DocumentUpdate, NewDocument, NewProject, Project};
use folio_core::{DocumentStore, FolioError, Result};
use reqwest::{Client, Response, Url};
use serde::de::DeserializeOwned;
use tracing::debug;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Persistence service client
#[derive(Debug, Clone)]
pub struct HttpStore {
    client: Client,
    base: Url,
}

impl HttpStore {
    /// Client for the service at `base_url` (e.g. `http://localhost:8000`)
    pub fn new(base_url: &str) -> Result<Self> {
        Self::with_client(build_client()?, base_url)
    }

    pub fn with_client(client: Client, base_url: &str) -> Result<Self> {
        let base = Url::parse(base_url)
            .map_err(|e| FolioError::transport(format!("invalid base URL '{base_url}': {e}")))?;
        if base.cannot_be_a_base() {
            return Err(FolioError::transport(format!(
                "invalid base URL '{base_url}': not a hierarchical URL"
            )));
        }
        Ok(Self { client, base })
    }

    pub fn base_url(&self) -> &str {
        self.base.as_str().trim_end_matches('/')
    }

    fn url(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn document_url(&self, project_id: &str, document_id: &str) -> Url {
        self.url(&["projects", project_id, "documents", document_id])
    }

    /// Fetch the rendered HTML preview of a document
    pub async fn fetch_html(&self, project_id: &str, document_id: &str) -> Result<String> {
        let mut url = self.document_url(project_id, document_id);
        if let Ok(mut path) = url.path_segments_mut() {
            path.push("html");
        }
        debug!(%url, "GET");
        let response = send(self.client.get(url)).await?;
        let response = check_status(response).await?;
        response
            .text()
            .await
            .map_err(|e| FolioError::transport(format!("failed to read response body: {e}")))
    }
}

fn build_client() -> Result<Client> {
    Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .build()
        .map_err(|e| FolioError::transport(format!("failed to build HTTP client: {e}")))
}

async fn send(request: reqwest::RequestBuilder) -> Result<Response> {
    request
        .send()
        .await
        .map_err(|e| FolioError::transport(e.to_string()))
}

/// Turn a non-2xx response into [`FolioError::Api`]
async fn check_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(FolioError::api(
        status.as_u16(),
        status.canonical_reason().unwrap_or(""),
        body,
    ))
}

async fn handle_response<T: DeserializeOwned>(response: Response, context: &str) -> Result<T> {
    let response = check_status(response).await?;
    let text = response
        .text()
        .await
        .map_err(|e| FolioError::transport(format!("failed to read response body: {e}")))?;
    serde_json::from_str(&text).map_err(|e| FolioError::json(context, e))
}

#[async_trait]
impl DocumentStore for HttpStore {
    async fn list_projects(&self) -> Result<Vec<Project>> {
        let url = self.url(&["projects"]);
        debug!(%url, "GET");
        let response = send(self.client.get(url)).await?;
        handle_response(response, "project list").await
    }

    async fn create_project(&self, draft: &NewProject) -> Result<Project> {
        let url = self.url(&["projects"]);
        debug!(%url, "POST");
        let response = send(self.client.post(url).json(draft)).await?;
        handle_response(response, "created project").await
    }

    async fn list_documents(&self, project_id: &str) -> Result<Vec<Document>> {
        let url = self.url(&["projects", project_id, "documents"]);
        debug!(%url, "GET");
        let response = send(self.client.get(url)).await?;
        handle_response(response, "document list").await
    }

    async fn create_document(&self, project_id: &str, draft: &NewDocument) -> Result<Document> {
        let url = self.url(&["projects", project_id, "documents"]);
        // documents always start empty
        let body = NewDocument {
            blocks: Vec::new(),
            ..draft.clone()
        };
        debug!(%url, "POST");
        let response = send(self.client.post(url).json(&body)).await?;
        handle_response(response, "created document").await
    }

    async fn get_document(&self, project_id: &str, document_id: &str) -> Result<Document> {
        let url = self.document_url(project_id, document_id);
        debug!(%url, "GET");
        let response = send(self.client.get(url)).await?;
        handle_response(response, "document").await
    }

    async fn save_document(
        &self,
        project_id: &str,
        document_id: &str,
        update: &DocumentUpdate,
    ) -> Result<Document> {
        let url = self.document_url(project_id, document_id);
        debug!(%url, blocks = update.blocks.len(), "PUT");
        let response = send(self.client.put(url).json(update)).await?;
        handle_response(response, "saved document").await
    }

    fn html_url(&self, project_id: &str, document_id: &str) -> Option<String> {
        let mut url = self.document_url(project_id, document_id);
        url.path_segments_mut().ok()?.push("html");
        Some(url.into())
    }
}

//! HTTP file store
//!
//! Talks to `{endpoint}/files`:
//! - `POST /files` multipart upload, one part named `file`
//! - `GET /files` JSON `{ "items": [...] }`
//! - `GET /files/{id}` raw content

use async_trait::async_trait;
use log::{debug, info, warn};
use reqwest::header::CONTENT_TYPE;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder, Response, Url};

use super::backend::FileStore;
use super::mime::detect_mime_type;
use super::types::{
    BinaryPayload, FileRecord, ListFilesResponse, StoreError, StoreResult, UploadFile,
    DOWNLOAD_FAILED, LIST_FAILED, UPLOAD_FAILED,
};

/// `FileStore` backed by a remote HTTP service.
///
/// The endpoint is fixed at construction. Pointing at another service means
/// building a new store, so a request in flight never changes target.
#[derive(Debug, Clone)]
pub struct HttpFileStore {
    client: Client,
    endpoint: String,
}

impl HttpFileStore {
    pub fn new(endpoint: &str) -> StoreResult<Self> {
        let client = Client::builder()
            .build()
            .map_err(|e| StoreError::Transport(format!("Failed to build HTTP client: {}", e)))?;
        Self::with_client(client, endpoint)
    }

    /// Share an existing `reqwest::Client` (and its connection pool).
    pub fn with_client(client: Client, endpoint: &str) -> StoreResult<Self> {
        let endpoint = normalize_endpoint(endpoint)?;
        Ok(Self { client, endpoint })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn files_url(&self) -> String {
        format!("{}/files", self.endpoint)
    }

    fn file_url(&self, id: &str) -> String {
        format!("{}/files/{}", self.endpoint, urlencoding::encode(id))
    }

    /// Send a request, mapping unreachable backends and non-2xx statuses to
    /// `StoreError::Transport(failure)`.
    async fn send(&self, request: RequestBuilder, failure: &str) -> StoreResult<Response> {
        let response = request.send().await.map_err(|e| {
            warn!("{}: request error: {}", failure, e);
            StoreError::Transport(failure.to_string())
        })?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            warn!("{}: {} - {}", failure, status, text);
            return Err(StoreError::Transport(failure.to_string()));
        }

        Ok(response)
    }

    async fn read_body(response: Response, failure: &str) -> StoreResult<Vec<u8>> {
        let body = response.bytes().await.map_err(|e| {
            warn!("{}: failed to read body: {}", failure, e);
            StoreError::Transport(failure.to_string())
        })?;
        Ok(body.to_vec())
    }
}

/// Validate an endpoint and strip trailing slashes so `{endpoint}/files` is well formed.
fn normalize_endpoint(endpoint: &str) -> StoreResult<String> {
    let trimmed = endpoint.trim().trim_end_matches('/');
    let url = Url::parse(trimmed)
        .map_err(|e| StoreError::InvalidEndpoint(format!("{}: {}", endpoint, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(StoreError::InvalidEndpoint(format!(
            "{}: unsupported scheme {}",
            endpoint,
            url.scheme()
        )));
    }
    if url.host_str().is_none() {
        return Err(StoreError::InvalidEndpoint(format!("{}: missing host", endpoint)));
    }
    if url.query().is_some() || url.fragment().is_some() {
        return Err(StoreError::InvalidEndpoint(format!(
            "{}: query and fragment are not allowed",
            endpoint
        )));
    }

    Ok(trimmed.to_string())
}

/// Mime type to send with an upload. An empty or unparsable declared type is
/// replaced by a detected one, so the file still reaches the backend.
fn upload_mime_type(file: &UploadFile) -> String {
    let declared = file.mime_type.trim();
    if !declared.is_empty() && Part::bytes(Vec::new()).mime_str(declared).is_ok() {
        return declared.to_string();
    }
    let detected = detect_mime_type(&file.name, &file.bytes);
    debug!(
        "add: {} declared mime type {:?} unusable, sending {}",
        file.name, file.mime_type, detected
    );
    detected
}

#[async_trait]
impl FileStore for HttpFileStore {
    async fn add(&self, file: UploadFile) -> StoreResult<FileRecord> {
        debug!("add: {} ({} bytes) -> {}", file.name, file.bytes.len(), self.endpoint);

        let mime_type = upload_mime_type(&file);
        let part = Part::bytes(file.bytes)
            .file_name(file.name.clone())
            .mime_str(&mime_type)
            .map_err(|e| {
                warn!("{}: invalid mime type {}: {}", UPLOAD_FAILED, mime_type, e);
                StoreError::Transport(UPLOAD_FAILED.to_string())
            })?;
        let form = Form::new().part("file", part);

        let response = self
            .send(self.client.post(self.files_url()).multipart(form), UPLOAD_FAILED)
            .await?;
        let body = Self::read_body(response, UPLOAD_FAILED).await?;
        let record: FileRecord =
            serde_json::from_slice(&body).map_err(|e| StoreError::Decode(e.to_string()))?;

        info!("add: {} stored as {}", record.name, record.id);
        Ok(record)
    }

    async fn list(&self) -> StoreResult<Vec<FileRecord>> {
        debug!("list: {}", self.endpoint);

        let response = self
            .send(self.client.get(self.files_url()), LIST_FAILED)
            .await?;
        let body = Self::read_body(response, LIST_FAILED).await?;
        let listing: ListFilesResponse =
            serde_json::from_slice(&body).map_err(|e| StoreError::Decode(e.to_string()))?;

        Ok(listing.items)
    }

    async fn download(&self, id: &str) -> StoreResult<BinaryPayload> {
        debug!("download: {} from {}", id, self.endpoint);

        let response = self
            .send(self.client.get(self.file_url(id)), DOWNLOAD_FAILED)
            .await?;
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let bytes = Self::read_body(response, DOWNLOAD_FAILED).await?;

        Ok(BinaryPayload {
            bytes,
            content_type,
        })
    }
}

//! Client abstractions for the remote services the pipeline talks to:
//! folder storage, code generation, and the target repository.

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod anthropic;
pub mod drive;
pub mod github;

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("request failed: {0}")]
    RequestFailed(String),
    #[error("api error ({status}): {message}")]
    Api { status: u16, message: String },
}

/// A file as reported by the storage listing. The declared MIME type is only
/// a traversal filter; eligibility is re-derived from the bytes downstream.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteFile {
    pub id: String,
    pub name: String,
    pub mime_type: String,
}

#[async_trait::async_trait]
pub trait FileStore: Send + Sync {
    /// Enumerate every image and plain-text file under the folder tree.
    async fn list_eligible_files(
        &self,
        root_folder_id: &str,
    ) -> Result<Vec<RemoteFile>, ProviderError>;

    /// Retrieve the raw bytes of one file. Single round-trip, no resume.
    async fn download(&self, file_id: &str) -> Result<Bytes, ProviderError>;
}

/// One code-generation call.
#[derive(Debug, Clone)]
pub struct GenerateRequest<'a> {
    pub file_name: &'a str,
    pub instruction: &'a str,
    pub content: &'a [u8],
    /// IANA media type when the content is an image; `None` for plain text.
    pub image_media_type: Option<&'a str>,
}

#[async_trait::async_trait]
pub trait CodeGenerator: Send + Sync {
    async fn generate(&self, req: GenerateRequest<'_>) -> Result<String, ProviderError>;
}

#[async_trait::async_trait]
pub trait RepoWriter: Send + Sync {
    /// Commit `content` at `path` on the repository's current default branch.
    async fn commit_file(
        &self,
        repo: &str,
        path: &str,
        content: &str,
    ) -> Result<(), ProviderError>;
}

pub(crate) async fn send(
    builder: reqwest::RequestBuilder,
) -> Result<reqwest::Response, ProviderError> {
    builder
        .send()
        .await
        .map_err(|e| ProviderError::RequestFailed(e.to_string()))
}

pub(crate) async fn read_json<T: serde::de::DeserializeOwned>(
    resp: reqwest::Response,
) -> Result<T, ProviderError> {
    let status = resp.status();
    if !status.is_success() {
        let message = resp.text().await.unwrap_or_default();
        return Err(ProviderError::Api {
            status: status.as_u16(),
            message,
        });
    }
    resp.json()
        .await
        .map_err(|e| ProviderError::RequestFailed(e.to_string()))
}

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Outcome of a single commit against the remote store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteCommitResult {
    pub content_url: String,
}

/// One item of a remote directory listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteEntry {
    pub name: String,
    pub path: String,
    pub download_url: Option<String>,
    pub html_url: Option<String>,
}

#[derive(Error, Debug)]
pub enum RemoteStoreError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("remote store rejected the request ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("malformed response from remote store: {0}")]
    MalformedResponse(String),

    #[error("not found: {0}")]
    NotFound(String),
}

/// Remote repository that durably keeps uploaded content.
///
/// Paths are relative to the store's fixed root (`mangas/`).
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Commits `content` at `remote_path`. Every call produces a new commit.
    async fn put_file(
        &self,
        remote_path: &str,
        content: Vec<u8>,
        message: &str,
    ) -> Result<RemoteCommitResult, RemoteStoreError>;

    /// Lists the files directly under `remote_dir`.
    async fn list_directory(&self, remote_dir: &str) -> Result<Vec<RemoteEntry>, RemoteStoreError>;
}

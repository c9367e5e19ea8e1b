use super::content_store::{ContentStore, RemoteCommitResult, RemoteEntry, RemoteStoreError};
use crate::config::AppConfig;
use async_trait::async_trait;
use base64::Engine;
use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};
use reqwest::{Client, StatusCode, header};
use serde::{Deserialize, Serialize};
use tracing::{error, info};

/// Root directory inside the repository that all uploads live under
pub const CONTENT_ROOT: &str = "mangas";

const PATH_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}')
    .add(b'/');

#[derive(Serialize)]
struct PutContentRequest<'a> {
    message: &'a str,
    content: String,
}

#[derive(Deserialize)]
struct PutContentResponse {
    content: Option<ContentInfo>,
}

#[derive(Deserialize)]
struct ContentInfo {
    html_url: Option<String>,
}

#[derive(Deserialize)]
struct ApiErrorBody {
    message: Option<String>,
}

/// Content store backed by the GitHub repository contents API.
pub struct GithubContentStore {
    client: Client,
    api_url: String,
    owner: String,
    repo: String,
    token: String,
}

impl GithubContentStore {
    pub fn new(
        client: Client,
        api_url: String,
        owner: String,
        repo: String,
        token: String,
    ) -> Self {
        Self {
            client,
            api_url: api_url.trim_end_matches('/').to_string(),
            owner,
            repo,
            token,
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(
            Client::new(),
            config.github_api_url.clone(),
            config.github_owner.clone(),
            config.github_repo.clone(),
            config.github_token.clone(),
        )
    }

    /// `<api>/repos/<owner>/<repo>/contents/mangas/<path>`, each segment escaped
    pub fn contents_url(&self, remote_path: &str) -> String {
        let encoded: Vec<String> = remote_path
            .split('/')
            .filter(|s| !s.is_empty())
            .map(|s| utf8_percent_encode(s, PATH_SEGMENT).to_string())
            .collect();
        format!(
            "{}/repos/{}/{}/contents/{}/{}",
            self.api_url,
            self.owner,
            self.repo,
            CONTENT_ROOT,
            encoded.join("/")
        )
    }

    fn request(&self, method: reqwest::Method, url: &str) -> reqwest::RequestBuilder {
        self.client
            .request(method, url)
            .bearer_auth(&self.token)
            .header(header::ACCEPT, "application/vnd.github+json")
            .header(
                header::USER_AGENT,
                concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")),
            )
    }

    async fn rejection(response: reqwest::Response) -> RemoteStoreError {
        let status = response.status();
        let raw = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ApiErrorBody>(&raw)
            .ok()
            .and_then(|b| b.message)
            .unwrap_or_else(|| status.to_string());
        RemoteStoreError::Rejected {
            status: status.as_u16(),
            message,
        }
    }
}

#[async_trait]
impl ContentStore for GithubContentStore {
    async fn put_file(
        &self,
        remote_path: &str,
        content: Vec<u8>,
        message: &str,
    ) -> Result<RemoteCommitResult, RemoteStoreError> {
        let url = self.contents_url(remote_path);
        let body = PutContentRequest {
            message,
            content: base64::engine::general_purpose::STANDARD.encode(&content),
        };

        let response = match self
            .request(reqwest::Method::PUT, &url)
            .json(&body)
            .send()
            .await
        {
            Ok(r) => r,
            Err(e) => {
                error!("❌ Upload to GitHub failed: {}", e);
                return Err(e.into());
            }
        };

        if !response.status().is_success() {
            let err = Self::rejection(response).await;
            if let RemoteStoreError::Rejected { message, .. } = &err {
                error!("❌ Upload to GitHub failed: {}", message);
            }
            return Err(err);
        }

        let parsed: PutContentResponse = response.json().await.map_err(|e| {
            error!("❌ Unreadable GitHub response: {}", e);
            RemoteStoreError::MalformedResponse(e.to_string())
        })?;

        let content_url = parsed
            .content
            .and_then(|c| c.html_url)
            .ok_or_else(|| {
                RemoteStoreError::MalformedResponse("missing content.html_url".to_string())
            })?;

        info!("✅ Committed {} -> {}", remote_path, content_url);
        Ok(RemoteCommitResult { content_url })
    }

    async fn list_directory(&self, remote_dir: &str) -> Result<Vec<RemoteEntry>, RemoteStoreError> {
        let url = self.contents_url(remote_dir);
        let response = self.request(reqwest::Method::GET, &url).send().await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(RemoteStoreError::NotFound(remote_dir.to_string()));
        }
        if !response.status().is_success() {
            return Err(Self::rejection(response).await);
        }

        // A file path answers with a single object instead of an array
        let value: serde_json::Value = response
            .json()
            .await
            .map_err(|e| RemoteStoreError::MalformedResponse(e.to_string()))?;
        if !value.is_array() {
            return Err(RemoteStoreError::MalformedResponse(format!(
                "{} is not a directory",
                remote_dir
            )));
        }
        serde_json::from_value(value).map_err(|e| RemoteStoreError::MalformedResponse(e.to_string()))
    }
}

use crate::api::error::AppError;
use crate::services::content_store::{ContentStore, RemoteStoreError};
use crate::services::staging::StagedFile;
use crate::utils::{tags::parse_tags, validation::describe_missing};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};
use utoipa::ToSchema;
use validator::{Validate, ValidationErrors};

pub const UPLOAD_SUCCESS_MESSAGE: &str = "Manga uploaded successfully";

/// Text fields of an upload form. Presence is the only rule.
#[derive(Debug, Default, Clone, Validate)]
pub struct UploadFields {
    #[validate(length(min = 1))]
    pub title: String,
    #[validate(length(min = 1))]
    pub author: String,
    #[validate(length(min = 1))]
    pub tags: String,
    /// Optional chapter (`capNumber`), adds a directory level when present
    pub chapter: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct MangaData {
    pub title: String,
    pub author: String,
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct UploadResponse {
    pub message: String,
    pub data: MangaData,
}

/// `<title>/<filename>`, or `<title>/<chapter>/<filename>` when a chapter is given
pub fn remote_path(title: &str, chapter: Option<&str>, staged_filename: &str) -> String {
    match chapter.filter(|c| !c.is_empty()) {
        Some(chapter) => format!("{}/{}/{}", title, chapter, staged_filename),
        None => format!("{}/{}", title, staged_filename),
    }
}

pub fn commit_message(title: &str) -> String {
    format!("Add manga: {}", title)
}

pub struct UploadService {
    store: Arc<dyn ContentStore>,
}

impl UploadService {
    pub fn new(store: Arc<dyn ContentStore>) -> Self {
        Self { store }
    }

    /// Validates, commits and cleans up a single staged upload.
    ///
    /// Takes ownership of `staged`: it is removed from disk before this
    /// returns, whatever the outcome.
    pub async fn handle_upload(
        &self,
        fields: UploadFields,
        staged: Option<StagedFile>,
    ) -> Result<UploadResponse, AppError> {
        let staged = match (fields.validate(), staged) {
            (Ok(()), Some(staged)) => staged,
            (checked, staged) => {
                let extra: &[&str] = if staged.is_none() { &["image"] } else { &[] };
                if let Some(staged) = staged {
                    staged.discard().await;
                }
                let errors = checked.err().unwrap_or_else(ValidationErrors::new);
                let message = describe_missing(&errors, extra);
                warn!("🚫 Upload rejected: {}", message);
                return Err(AppError::Validation(message));
            }
        };

        let tags = parse_tags(&fields.tags);
        let result = self.commit_staged(&fields, &staged).await;
        staged.discard().await;

        let commit = result?;
        info!(
            "📚 '{}' by {} committed at {}",
            fields.title, fields.author, commit
        );

        Ok(UploadResponse {
            message: UPLOAD_SUCCESS_MESSAGE.to_string(),
            data: MangaData {
                title: fields.title,
                author: fields.author,
                tags,
            },
        })
    }

    async fn commit_staged(
        &self,
        fields: &UploadFields,
        staged: &StagedFile,
    ) -> Result<String, AppError> {
        let content = staged.read_all().await.map_err(|e| {
            AppError::Internal(format!(
                "Failed to read staged file {}: {}",
                staged.path.display(),
                e
            ))
        })?;

        let path = remote_path(&fields.title, fields.chapter.as_deref(), &staged.filename);
        let message = commit_message(&fields.title);

        let result = self.store.put_file(&path, content, &message).await?;
        Ok(result.content_url)
    }

    /// Download URLs of every file in `<title>/<chapter>`
    pub async fn list_chapter(&self, title: &str, chapter: &str) -> Result<Vec<String>, AppError> {
        let dir = format!("{}/{}", title, chapter);
        let entries = self.store.list_directory(&dir).await.map_err(|e| match e {
            RemoteStoreError::NotFound(path) => AppError::NotFound(format!("No chapter at {}", path)),
            other => AppError::RemoteStore(other),
        })?;

        Ok(entries
            .into_iter()
            .filter_map(|entry| entry.download_url.or(entry.html_url))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::content_store::{RemoteCommitResult, RemoteEntry};
    use crate::services::staging::StagingArea;
    use async_trait::async_trait;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingStore {
        commits: Mutex<Vec<(String, Vec<u8>, String)>>,
        fail: bool,
    }

    #[async_trait]
    impl ContentStore for RecordingStore {
        async fn put_file(
            &self,
            remote_path: &str,
            content: Vec<u8>,
            message: &str,
        ) -> Result<RemoteCommitResult, RemoteStoreError> {
            self.commits.lock().unwrap().push((
                remote_path.to_string(),
                content,
                message.to_string(),
            ));
            if self.fail {
                return Err(RemoteStoreError::Rejected {
                    status: 500,
                    message: "boom".to_string(),
                });
            }
            Ok(RemoteCommitResult {
                content_url: format!("https://example.test/{}", remote_path),
            })
        }

        async fn list_directory(
            &self,
            remote_dir: &str,
        ) -> Result<Vec<RemoteEntry>, RemoteStoreError> {
            if remote_dir != "Known/1" {
                return Err(RemoteStoreError::NotFound(remote_dir.to_string()));
            }
            Ok(vec![
                RemoteEntry {
                    name: "a.png".to_string(),
                    path: "mangas/Known/1/a.png".to_string(),
                    download_url: Some("https://raw.test/a.png".to_string()),
                    html_url: None,
                },
                RemoteEntry {
                    name: "b.png".to_string(),
                    path: "mangas/Known/1/b.png".to_string(),
                    download_url: None,
                    html_url: Some("https://html.test/b.png".to_string()),
                },
            ])
        }
    }

    fn fields() -> UploadFields {
        UploadFields {
            title: "Dorohedoro".to_string(),
            author: "Q Hayashida".to_string(),
            tags: "seinen, dark".to_string(),
            chapter: None,
        }
    }

    #[test]
    fn test_remote_path() {
        assert_eq!(remote_path("T", None, "1-a.png"), "T/1-a.png");
        assert_eq!(remote_path("T", Some(""), "1-a.png"), "T/1-a.png");
        assert_eq!(remote_path("T", Some("3"), "1-a.png"), "T/3/1-a.png");
    }

    #[test]
    fn test_commit_message_embeds_title() {
        assert!(commit_message("Berserk").contains("Berserk"));
    }

    #[tokio::test]
    async fn test_success_commits_and_cleans_up() {
        let dir = tempfile::tempdir().unwrap();
        let staging = StagingArea::new(dir.path());
        let staged = staging.stage("cover.png", &b"img"[..]).await.unwrap();
        let staged_path = staged.path.clone();
        let staged_name = staged.filename.clone();

        let store = Arc::new(RecordingStore::default());
        let service = UploadService::new(store.clone());

        let response = service.handle_upload(fields(), Some(staged)).await.unwrap();

        assert_eq!(response.message, UPLOAD_SUCCESS_MESSAGE);
        assert_eq!(response.data.tags, vec!["seinen", "dark"]);
        assert!(!staged_path.exists());

        let commits = store.commits.lock().unwrap();
        assert_eq!(commits.len(), 1);
        assert_eq!(commits[0].0, format!("Dorohedoro/{}", staged_name));
        assert_eq!(commits[0].1, b"img");
        assert!(commits[0].2.contains("Dorohedoro"));
    }

    #[tokio::test]
    async fn test_missing_field_rejects_without_commit() {
        let dir = tempfile::tempdir().unwrap();
        let staging = StagingArea::new(dir.path());
        let staged = staging.stage("cover.png", &b"img"[..]).await.unwrap();
        let staged_path = staged.path.clone();

        let store = Arc::new(RecordingStore::default());
        let service = UploadService::new(store.clone());

        let mut input = fields();
        input.author.clear();
        let err = service.handle_upload(input, Some(staged)).await.unwrap_err();

        assert!(matches!(err, AppError::Validation(ref m) if m.contains("author")));
        assert!(!staged_path.exists());
        assert!(store.commits.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_missing_image_rejects() {
        let store = Arc::new(RecordingStore::default());
        let service = UploadService::new(store.clone());

        let err = service.handle_upload(fields(), None).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(ref m) if m.ends_with("image")));
        assert!(store.commits.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_remote_failure_still_cleans_up() {
        let dir = tempfile::tempdir().unwrap();
        let staging = StagingArea::new(dir.path());
        let staged = staging.stage("cover.png", &b"img"[..]).await.unwrap();
        let staged_path = staged.path.clone();

        let store = Arc::new(RecordingStore {
            fail: true,
            ..Default::default()
        });
        let service = UploadService::new(store);

        let err = service.handle_upload(fields(), Some(staged)).await.unwrap_err();
        assert!(matches!(err, AppError::RemoteStore(_)));
        assert!(!staged_path.exists());
    }

    #[tokio::test]
    async fn test_list_chapter() {
        let service = UploadService::new(Arc::new(RecordingStore::default()));

        let urls = service.list_chapter("Known", "1").await.unwrap();
        assert_eq!(urls, vec!["https://raw.test/a.png", "https://html.test/b.png"]);

        let err = service.list_chapter("Unknown", "1").await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }
}

#![allow(dead_code)]

use async_trait::async_trait;
use axum::Router;
use manga_uploader::config::AppConfig;
use manga_uploader::services::content_store::{
    ContentStore, RemoteCommitResult, RemoteEntry, RemoteStoreError,
};
use manga_uploader::services::staging::StagingArea;
use manga_uploader::{AppState, create_app};
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

pub const BOUNDARY: &str = "---------------------------123456789012345678901234567";

#[derive(Debug, Clone)]
pub struct Commit {
    pub path: String,
    pub content: Vec<u8>,
    pub message: String,
}

#[derive(Default)]
pub struct MockContentStore {
    pub commits: Mutex<Vec<Commit>>,
    pub directories: Mutex<HashMap<String, Vec<RemoteEntry>>>,
    pub fail: bool,
}

impl MockContentStore {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }

    pub fn commits(&self) -> Vec<Commit> {
        self.commits.lock().unwrap().clone()
    }
}

#[async_trait]
impl ContentStore for MockContentStore {
    async fn put_file(
        &self,
        remote_path: &str,
        content: Vec<u8>,
        message: &str,
    ) -> Result<RemoteCommitResult, RemoteStoreError> {
        if self.fail {
            return Err(RemoteStoreError::Rejected {
                status: 502,
                message: "Server Error".to_string(),
            });
        }
        self.commits.lock().unwrap().push(Commit {
            path: remote_path.to_string(),
            content,
            message: message.to_string(),
        });
        Ok(RemoteCommitResult {
            content_url: format!("https://github.com/owner/mangas/blob/main/mangas/{}", remote_path),
        })
    }

    async fn list_directory(&self, remote_dir: &str) -> Result<Vec<RemoteEntry>, RemoteStoreError> {
        if self.fail {
            return Err(RemoteStoreError::Rejected {
                status: 502,
                message: "Server Error".to_string(),
            });
        }
        self.directories
            .lock()
            .unwrap()
            .get(remote_dir)
            .cloned()
            .ok_or_else(|| RemoteStoreError::NotFound(remote_dir.to_string()))
    }
}

pub struct TestApp {
    pub router: Router,
    pub store: Arc<MockContentStore>,
    pub staging: TempDir,
}

pub fn setup_app(store: MockContentStore) -> TestApp {
    setup_app_with(store, |_| {})
}

pub fn setup_app_with(store: MockContentStore, tweak: impl FnOnce(&mut AppConfig)) -> TestApp {
    let _ = tracing_subscriber::fmt::try_init();
    let staging = tempfile::tempdir().unwrap();
    let mut config = AppConfig::development("http://127.0.0.1:9", staging.path().to_path_buf());
    tweak(&mut config);

    let store = Arc::new(store);
    let state = AppState::new(
        config,
        store.clone(),
        Arc::new(StagingArea::new(staging.path())),
    );

    TestApp {
        router: create_app(state),
        store,
        staging,
    }
}

pub fn staged_count(dir: &Path) -> usize {
    std::fs::read_dir(dir).unwrap().count()
}

/// Hand-written multipart body: text fields first, then the optional image part
pub fn multipart_body(fields: &[(&str, &str)], image: Option<(&str, &[u8])>) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
    }
    if let Some((filename, bytes)) = image {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"image\"; filename=\"{filename}\"\r\nContent-Type: image/png\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

pub fn content_type() -> String {
    format!("multipart/form-data; boundary={}", BOUNDARY)
}

pub async fn spawn(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}", addr)
}

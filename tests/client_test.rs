mod common;

use axum::{Router, extract::State, http::StatusCode};
use common::*;
use manga_uploader::client::{ClientError, MangaForm, UploadClient};
use manga_uploader::services::content_store::RemoteEntry;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

async fn write_pages(dir: &std::path::Path, pages: &[(&str, &[u8])]) -> Vec<PathBuf> {
    let mut paths = Vec::new();
    for (name, bytes) in pages {
        let path = dir.join(name);
        tokio::fs::write(&path, bytes).await.unwrap();
        paths.push(path);
    }
    paths
}

#[tokio::test]
async fn test_form_uploads_each_image_once() {
    let app = setup_app(MockContentStore::default());
    let store = app.store.clone();
    let staging = app.staging.path().to_path_buf();
    let server = spawn(app.router.clone()).await;

    let files = tempfile::tempdir().unwrap();
    let paths = write_pages(
        files.path(),
        &[
            ("p1.png", &b"\x89PNG\r\n\x1a\npage one"[..]),
            ("p2.png", &b"\x89PNG\r\n\x1a\npage two"[..]),
            ("p3.png", &b"\x89PNG\r\n\x1a\npage three"[..]),
        ],
    )
    .await;

    let mut form = MangaForm::new("Undead Unluck", "Yoshifumi Tozuka", r#"["action","comedy"]"#, "1");
    assert_eq!(form.on_files_selected(paths).await.unwrap(), 3);

    let client = UploadClient::new(&server).unwrap();
    let acks = form.on_submit(&client).await.unwrap();

    assert_eq!(acks.len(), 3);
    assert!(acks.iter().all(|a| a.data.tags == vec!["action", "comedy"]));
    assert!(!form.is_loading());

    let commits = store.commits();
    assert_eq!(commits.len(), 3);
    for (commit, expected) in commits.iter().zip(["p1.png", "p2.png", "p3.png"]) {
        assert!(commit.path.starts_with("Undead Unluck/1/"));
        assert!(commit.path.ends_with(&format!("-{}", expected)));
    }
    assert_eq!(commits[1].content, b"\x89PNG\r\n\x1a\npage two");
    assert_eq!(staged_count(&staging), 0);
}

#[tokio::test]
async fn test_blocked_submit_sends_nothing() {
    let hits = Arc::new(AtomicUsize::new(0));
    let router = Router::new()
        .fallback(|State(hits): State<Arc<AtomicUsize>>| async move {
            hits.fetch_add(1, Ordering::SeqCst);
            StatusCode::OK
        })
        .with_state(hits.clone());
    let server = spawn(router).await;
    let client = UploadClient::new(&server).unwrap();

    let files = tempfile::tempdir().unwrap();
    let paths = write_pages(files.path(), &[("p1.png", &b"page"[..])]).await;

    for blank in ["title", "author", "tags", "capNumber"] {
        let mut form = MangaForm::new("T", "A", "x", "1");
        match blank {
            "title" => form.title.clear(),
            "author" => form.author.clear(),
            "tags" => form.tags.clear(),
            _ => form.cap_number.clear(),
        }
        form.on_files_selected(paths.clone()).await.unwrap();

        let err = form.on_submit(&client).await.unwrap_err();
        assert!(matches!(err, ClientError::SubmitBlocked(_)), "blank {blank}");
    }

    let mut no_images = MangaForm::new("T", "A", "x", "1");
    let err = no_images.on_submit(&client).await.unwrap_err();
    assert!(matches!(err, ClientError::SubmitBlocked(_)));

    assert_eq!(hits.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_remote_failure_surfaces_server_error() {
    let app = setup_app(MockContentStore::failing());
    let server = spawn(app.router.clone()).await;

    let files = tempfile::tempdir().unwrap();
    let paths = write_pages(files.path(), &[("p1.png", &b"page"[..]), ("p2.png", &b"page"[..])]).await;

    let mut form = MangaForm::new("T", "A", "x", "1");
    form.on_files_selected(paths).await.unwrap();

    let err = form
        .on_submit(&UploadClient::new(&server).unwrap())
        .await
        .unwrap_err();

    match err {
        ClientError::Upload { filename, source } => {
            assert_eq!(filename, "p1.png");
            assert!(matches!(*source, ClientError::Server { status: 500, .. }));
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(staged_count(app.staging.path()), 0);
}

#[tokio::test]
async fn test_fetch_listing() {
    let store = MockContentStore::default();
    store.directories.lock().unwrap().insert(
        "Undead Unluck/1".to_string(),
        vec![RemoteEntry {
            name: "1-p1.png".to_string(),
            path: "mangas/Undead Unluck/1/1-p1.png".to_string(),
            download_url: Some("https://raw.test/1-p1.png".to_string()),
            html_url: None,
        }],
    );
    let app = setup_app(store);
    let client = UploadClient::new(&spawn(app.router.clone()).await).unwrap();

    let urls = client.fetch_listing("Undead Unluck", "1").await.unwrap();
    assert_eq!(urls, vec!["https://raw.test/1-p1.png"]);

    let err = client.fetch_listing("Undead Unluck", "2").await.unwrap_err();
    assert!(matches!(err, ClientError::Server { status: 404, .. }));
}

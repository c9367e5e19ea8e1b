use crate::utils::validation::sanitize_filename;
use chrono::Utc;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicI64, Ordering};
use tokio::fs;
use tokio::io::{AsyncRead, AsyncWriteExt, BufWriter};
use tracing::{info, warn};

static LAST_PREFIX: AtomicI64 = AtomicI64::new(0);

/// Millisecond timestamp that never repeats within this process, so two
/// uploads of the same filename in the same millisecond stage apart.
pub fn next_prefix() -> i64 {
    let now = Utc::now().timestamp_millis();
    let mut last = LAST_PREFIX.load(Ordering::Relaxed);
    loop {
        let next = now.max(last + 1);
        match LAST_PREFIX.compare_exchange_weak(last, next, Ordering::AcqRel, Ordering::Relaxed) {
            Ok(_) => return next,
            Err(current) => last = current,
        }
    }
}

/// Request-scoped file waiting to be committed.
#[derive(Debug)]
pub struct StagedFile {
    pub path: PathBuf,
    /// `<prefix>-<sanitized original name>`
    pub filename: String,
    pub original_filename: String,
    pub size: u64,
}

impl StagedFile {
    pub async fn read_all(&self) -> std::io::Result<Vec<u8>> {
        fs::read(&self.path).await
    }

    /// Unlinks the staged file. Failures are logged and swallowed.
    pub async fn discard(self) {
        match fs::remove_file(&self.path).await {
            Ok(()) => info!("🧹 Removed staged file {}", self.path.display()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!(
                "⚠️  Failed to remove staged file {}: {}",
                self.path.display(),
                e
            ),
        }
    }
}

/// Directory that holds in-flight uploads.
pub struct StagingArea {
    dir: PathBuf,
}

impl StagingArea {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub async fn ensure_dir(&self) -> std::io::Result<()> {
        fs::create_dir_all(&self.dir).await
    }

    /// Streams `reader` into a fresh file under the staging directory.
    ///
    /// A partially written file is removed before the error is returned.
    pub async fn stage<R>(&self, original_filename: &str, mut reader: R) -> std::io::Result<StagedFile>
    where
        R: AsyncRead + Unpin,
    {
        let filename = format!("{}-{}", next_prefix(), sanitize_filename(original_filename));
        let path = self.dir.join(&filename);

        let file = fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await?;
        let mut writer = BufWriter::new(file);

        let written = async {
            let size = tokio::io::copy(&mut reader, &mut writer).await?;
            writer.flush().await?;
            Ok::<u64, std::io::Error>(size)
        }
        .await;

        match written {
            Ok(size) => Ok(StagedFile {
                path,
                filename,
                original_filename: original_filename.to_string(),
                size,
            }),
            Err(e) => {
                drop(writer);
                if let Err(cleanup) = fs::remove_file(&path).await {
                    warn!(
                        "⚠️  Failed to remove partial staged file {}: {}",
                        path.display(),
                        cleanup
                    );
                }
                Err(e)
            }
        }
    }
}

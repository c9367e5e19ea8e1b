use super::ClientError;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use std::future::Future;
use std::path::{Path, PathBuf};
use tokio::task::JoinSet;

const OCTET_STREAM: &str = "application/octet-stream";

/// An image held as a `data:<mime>;base64,<payload>` string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedImage {
    pub filename: String,
    pub data_url: String,
}

impl EncodedImage {
    pub fn from_bytes(filename: impl Into<String>, bytes: &[u8]) -> Self {
        let mime = infer::get(bytes)
            .map(|kind| kind.mime_type())
            .unwrap_or(OCTET_STREAM);
        Self {
            filename: filename.into(),
            data_url: format!("data:{};base64,{}", mime, STANDARD.encode(bytes)),
        }
    }

    /// Splits the data URL back into its MIME type and raw bytes.
    pub fn decode(&self) -> Result<(mime::Mime, Vec<u8>), ClientError> {
        let invalid = || ClientError::InvalidDataUrl(self.filename.clone());

        let rest = self.data_url.strip_prefix("data:").ok_or_else(invalid)?;
        let (header, payload) = rest.split_once(',').ok_or_else(invalid)?;
        let media_type = header.strip_suffix(";base64").ok_or_else(invalid)?;

        let mime = if media_type.is_empty() {
            mime::APPLICATION_OCTET_STREAM
        } else {
            media_type.parse::<mime::Mime>().map_err(|_| invalid())?
        };
        let bytes = STANDARD.decode(payload).map_err(|_| invalid())?;
        Ok((mime, bytes))
    }
}

pub async fn encode_file(path: PathBuf) -> Result<EncodedImage, ClientError> {
    let bytes = tokio::fs::read(&path)
        .await
        .map_err(|source| ClientError::Decode {
            path: path.clone(),
            source,
        })?;
    Ok(EncodedImage::from_bytes(display_name(&path), &bytes))
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "unnamed".to_string())
}

/// Encodes every file concurrently.
pub async fn encode_all(paths: Vec<PathBuf>) -> Result<Vec<EncodedImage>, ClientError> {
    encode_all_with(paths, encode_file).await
}

/// Launches one task per path, joins all of them and keeps input order.
///
/// The first failure aborts the remaining tasks and is returned; no partial
/// result escapes.
pub async fn encode_all_with<F, Fut>(
    paths: Vec<PathBuf>,
    decode: F,
) -> Result<Vec<EncodedImage>, ClientError>
where
    F: Fn(PathBuf) -> Fut,
    Fut: Future<Output = Result<EncodedImage, ClientError>> + Send + 'static,
{
    let total = paths.len();
    let mut tasks = JoinSet::new();
    for (index, path) in paths.into_iter().enumerate() {
        let pending = decode(path);
        tasks.spawn(async move { (index, pending.await) });
    }

    let mut slots: Vec<Option<EncodedImage>> = vec![None; total];
    while let Some(joined) = tasks.join_next().await {
        let outcome = match joined {
            Ok((index, Ok(image))) => {
                slots[index] = Some(image);
                continue;
            }
            Ok((_, Err(e))) => e,
            Err(e) => ClientError::Task(e.to_string()),
        };
        tasks.abort_all();
        return Err(outcome);
    }

    Ok(slots.into_iter().flatten().collect())
}

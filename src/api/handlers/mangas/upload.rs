use crate::api::error::AppError;
use crate::services::staging::StagedFile;
use crate::services::upload_service::{UploadFields, UploadResponse};
use axum::{
    Json,
    extract::{Multipart, State, multipart::MultipartError},
    http::StatusCode,
};
use futures::TryStreamExt;
use tokio_util::io::StreamReader;

use super::types::*;

fn multipart_error(e: MultipartError) -> AppError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge("Request body exceeds the maximum allowed limit".to_string())
    } else {
        AppError::BadRequest(e.body_text())
    }
}

fn staging_error(e: std::io::Error) -> AppError {
    match e
        .get_ref()
        .and_then(|inner| inner.downcast_ref::<MultipartError>())
    {
        Some(inner) if inner.status() == StatusCode::PAYLOAD_TOO_LARGE => {
            AppError::PayloadTooLarge("Request body exceeds the maximum allowed limit".to_string())
        }
        Some(inner) => AppError::BadRequest(inner.body_text()),
        None => AppError::Internal(format!("Failed to stage upload: {}", e)),
    }
}

#[utoipa::path(
    post,
    path = "/mangas/upload",
    request_body(content = UploadForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Manga committed to the repository", body = UploadResponse),
        (status = 400, description = "Missing required fields"),
        (status = 413, description = "Payload too large"),
        (status = 500, description = "Processing or remote store failure")
    ),
    tag = "mangas"
)]
pub async fn upload_manga(
    State(state): State<crate::AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, AppError> {
    let mut fields = UploadFields::default();
    let mut staged: Option<StagedFile> = None;

    let received: Result<(), AppError> = async {
        while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
            let name = field.name().unwrap_or_default().to_string();

            match name.as_str() {
                IMAGE_FIELD if staged.is_none() => {
                    // Only a file part counts as the image
                    let Some(original_filename) = field.file_name().map(str::to_string) else {
                        tracing::warn!("Ignoring '{}' part without a filename", IMAGE_FIELD);
                        continue;
                    };
                    let reader = StreamReader::new(field.map_err(std::io::Error::other));
                    let file = state
                        .staging
                        .stage(&original_filename, reader)
                        .await
                        .map_err(staging_error)?;
                    tracing::info!(
                        "📥 Staged {} ({} bytes) as {}",
                        original_filename,
                        file.size,
                        file.filename
                    );
                    staged = Some(file);
                }
                TITLE_FIELD => fields.title = field.text().await.map_err(multipart_error)?,
                AUTHOR_FIELD => fields.author = field.text().await.map_err(multipart_error)?,
                TAGS_FIELD => fields.tags = field.text().await.map_err(multipart_error)?,
                CHAPTER_FIELD => {
                    let text = field.text().await.map_err(multipart_error)?;
                    fields.chapter = Some(text).filter(|t| !t.is_empty());
                }
                _ => {}
            }
        }
        Ok(())
    }
    .await;

    if let Err(e) = received {
        if let Some(file) = staged.take() {
            file.discard().await;
        }
        // Drain what is left so the client sees our response instead of a reset
        tracing::warn!("Upload failed early: {}. Consuming remaining stream...", e);
        while let Ok(Some(mut field)) = multipart.next_field().await {
            while let Ok(Some(_)) = field.chunk().await {}
        }
        return Err(e);
    }

    let response = state.upload_service.handle_upload(fields, staged).await?;
    Ok(Json(response))
}

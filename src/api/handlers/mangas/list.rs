use crate::api::error::AppError;
use axum::{
    Json,
    extract::{Path, State},
};

#[utoipa::path(
    get,
    path = "/mangas/{title}/{chapter}",
    params(
        ("title" = String, Path, description = "Manga title"),
        ("chapter" = String, Path, description = "Chapter number")
    ),
    responses(
        (status = 200, description = "URLs of the chapter's images", body = Vec<String>),
        (status = 404, description = "Chapter not found"),
        (status = 500, description = "Remote store failure")
    ),
    tag = "mangas"
)]
pub async fn list_chapter(
    State(state): State<crate::AppState>,
    Path((title, chapter)): Path<(String, String)>,
) -> Result<Json<Vec<String>>, AppError> {
    let urls = state.upload_service.list_chapter(&title, &chapter).await?;
    Ok(Json(urls))
}

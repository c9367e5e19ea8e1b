use serde::Deserialize;
use utoipa::ToSchema;

/// Shape of the multipart body accepted by `POST /mangas/upload`.
///
/// Only used to document the form; the handler reads the parts directly.
#[derive(Deserialize, ToSchema)]
pub struct UploadForm {
    pub title: String,
    pub author: String,
    /// JSON array of strings or a comma separated list
    pub tags: String,
    /// Optional chapter number, stored as an extra directory level
    #[serde(rename = "capNumber")]
    pub cap_number: Option<String>,
    #[schema(value_type = String, format = Binary)]
    pub image: String,
}

pub const IMAGE_FIELD: &str = "image";
pub const TITLE_FIELD: &str = "title";
pub const AUTHOR_FIELD: &str = "author";
pub const TAGS_FIELD: &str = "tags";
pub const CHAPTER_FIELD: &str = "capNumber";

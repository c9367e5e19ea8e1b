use super::{ClientError, EncodedImage, MangaForm};
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use url::Url;

pub type UploadAck = crate::services::upload_service::UploadResponse;

pub const DEFAULT_SERVER: &str = "http://localhost:8080";

#[derive(Deserialize)]
struct ErrorBody {
    error: Option<String>,
}

/// HTTP side of the form: one multipart upload per image, and the chapter listing.
pub struct UploadClient {
    http: reqwest::Client,
    base_url: Url,
}

impl UploadClient {
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        let base_url =
            Url::parse(base_url).map_err(|e| ClientError::InvalidUrl(format!("{base_url}: {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(ClientError::InvalidUrl(base_url.to_string()));
        }
        Ok(Self {
            http: reqwest::Client::new(),
            base_url,
        })
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, ClientError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ClientError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn check(response: reqwest::Response) -> Result<reqwest::Response, ClientError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let raw = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorBody>(&raw)
            .ok()
            .and_then(|b| b.error)
            .unwrap_or(raw);
        Err(ClientError::Server {
            status: status.as_u16(),
            message,
        })
    }

    /// Sends the form's text fields plus `image` as the single binary part.
    pub async fn upload(
        &self,
        form: &MangaForm,
        image: &EncodedImage,
    ) -> Result<UploadAck, ClientError> {
        let (mime, bytes) = image.decode()?;
        let part = Part::bytes(bytes)
            .file_name(image.filename.clone())
            .mime_str(mime.as_ref())?;

        let body = Form::new()
            .text("title", form.title.clone())
            .text("author", form.author.clone())
            .text("capNumber", form.cap_number.clone())
            .text("tags", form.tags.clone())
            .part("image", part);

        let response = self
            .http
            .post(self.endpoint(&["mangas", "upload"])?)
            .multipart(body)
            .send()
            .await?;

        Ok(Self::check(response).await?.json().await?)
    }

    /// Image URLs stored for one chapter
    pub async fn fetch_listing(&self, title: &str, chapter: &str) -> Result<Vec<String>, ClientError> {
        let response = self
            .http
            .get(self.endpoint(&["mangas", title, chapter])?)
            .send()
            .await?;

        Ok(Self::check(response).await?.json().await?)
    }
}

use super::encode::{encode_all, encode_all_with};
use super::{ClientError, EncodedImage, UploadAck, UploadClient};
use crate::utils::validation::describe_missing;
use std::future::Future;
use std::path::PathBuf;
use tracing::{error, info};
use validator::Validate;

/// State behind the upload form.
#[derive(Debug, Default, Validate)]
pub struct MangaForm {
    #[validate(length(min = 1))]
    pub title: String,
    #[validate(length(min = 1))]
    pub author: String,
    #[validate(length(min = 1))]
    pub tags: String,
    #[validate(length(min = 1))]
    pub cap_number: String,
    images: Vec<EncodedImage>,
    loading: bool,
}

impl MangaForm {
    pub fn new(
        title: impl Into<String>,
        author: impl Into<String>,
        tags: impl Into<String>,
        cap_number: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            author: author.into(),
            tags: tags.into(),
            cap_number: cap_number.into(),
            ..Default::default()
        }
    }

    pub fn images(&self) -> &[EncodedImage] {
        &self.images
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Converts every selected file to a data URL. Returns how many were converted.
    pub async fn on_files_selected(&mut self, paths: Vec<PathBuf>) -> Result<usize, ClientError> {
        if paths.is_empty() {
            return Ok(0);
        }
        self.loading = true;
        let result = encode_all(paths).await;
        self.finish_selection(result)
    }

    /// Same as [`on_files_selected`](Self::on_files_selected) with a custom decoder.
    pub async fn on_files_selected_with<F, Fut>(
        &mut self,
        paths: Vec<PathBuf>,
        decode: F,
    ) -> Result<usize, ClientError>
    where
        F: Fn(PathBuf) -> Fut,
        Fut: Future<Output = Result<EncodedImage, ClientError>> + Send + 'static,
    {
        if paths.is_empty() {
            return Ok(0);
        }
        self.loading = true;
        let result = encode_all_with(paths, decode).await;
        self.finish_selection(result)
    }

    fn finish_selection(
        &mut self,
        result: Result<Vec<EncodedImage>, ClientError>,
    ) -> Result<usize, ClientError> {
        self.loading = false;
        match result {
            Ok(images) => {
                info!("🖼️  Converted {} images", images.len());
                self.images = images;
                Ok(self.images.len())
            }
            Err(e) => {
                error!("❌ Failed to convert images: {}", e);
                Err(e)
            }
        }
    }

    /// Gate run before any network call
    pub fn check_ready(&self) -> Result<(), ClientError> {
        if let Err(errors) = self.validate() {
            return Err(ClientError::SubmitBlocked(describe_missing(&errors, &[])));
        }
        if self.images.is_empty() {
            return Err(ClientError::SubmitBlocked("No images selected".to_string()));
        }
        Ok(())
    }

    /// Uploads each converted image in its own request, one at a time.
    pub async fn on_submit(&mut self, client: &UploadClient) -> Result<Vec<UploadAck>, ClientError> {
        self.check_ready()?;

        self.loading = true;
        let mut acks = Vec::with_capacity(self.images.len());
        let mut outcome = Ok(());
        for image in &self.images {
            match client.upload(self, image).await {
                Ok(ack) => {
                    info!("📤 Uploaded {}: {}", image.filename, ack.message);
                    acks.push(ack);
                }
                Err(e) => {
                    outcome = Err(ClientError::Upload {
                        filename: image.filename.clone(),
                        source: Box::new(e),
                    });
                    break;
                }
            }
        }
        self.loading = false;

        outcome.map(|()| acks)
    }
}

use crate::config::AppConfig;
use crate::services::content_store::ContentStore;
use crate::services::github::GithubContentStore;
use crate::services::staging::StagingArea;
use std::sync::Arc;
use tracing::info;

pub fn setup_storage(config: &AppConfig) -> Arc<dyn ContentStore> {
    info!(
        "☁️  Content Store: {} (Repository: {})",
        config.github_api_url,
        config.repository()
    );

    Arc::new(GithubContentStore::from_config(config))
}

pub async fn setup_staging(config: &AppConfig) -> std::io::Result<Arc<StagingArea>> {
    let staging = StagingArea::new(&config.staging_dir);
    staging.ensure_dir().await?;
    info!("📂 Staging directory ready at {}", staging.dir().display());
    Ok(Arc::new(staging))
}

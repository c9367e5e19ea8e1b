use std::env;
use std::path::PathBuf;
use thiserror::Error;

pub const DEFAULT_API_URL: &str = "https://api.github.com";
const MULTIPART_OVERHEAD: usize = 1024 * 1024;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{name} has an invalid value: {value}")]
    Invalid { name: &'static str, value: String },
}

/// Runtime configuration for the upload service
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Bearer token used for every write against the content API (required)
    pub github_token: String,

    /// Repository owner (required)
    pub github_owner: String,

    /// Repository name (required)
    pub github_repo: String,

    /// Content API base URL (default: https://api.github.com)
    pub github_api_url: String,

    /// Listen port (default: 8080)
    pub port: u16,

    /// Directory where incoming images are staged (default: "uploads/mangas")
    pub staging_dir: PathBuf,

    /// Maximum request body size in bytes (default: 50 MB)
    pub max_file_size: usize,

    /// Allowed CORS origins, "*" allows any (default: "*")
    pub allowed_origins: Vec<String>,
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup.
    ///
    /// Fails fast when the token or repository coordinates are absent so
    /// that the process never binds a listener it cannot serve.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |name: &'static str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .ok_or(ConfigError::Missing(name))
        };

        let github_token = required("GITHUB_API_TOKEN")?;
        let github_owner = required("GITHUB_OWNER")?;
        let github_repo = required("GITHUB_REPO")?;

        let port = match lookup("PORT") {
            Some(v) => v.trim().parse().map_err(|_| ConfigError::Invalid {
                name: "PORT",
                value: v,
            })?,
            None => 8080,
        };

        let max_file_size = match lookup("MAX_FILE_SIZE") {
            Some(v) => v.trim().parse().map_err(|_| ConfigError::Invalid {
                name: "MAX_FILE_SIZE",
                value: v,
            })?,
            None => 50 * 1024 * 1024, // 50 MB
        };

        Ok(Self {
            github_token,
            github_owner,
            github_repo,
            github_api_url: lookup("GITHUB_API_URL")
                .map(|v| v.trim().trim_end_matches('/').to_string())
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| DEFAULT_API_URL.to_string()),
            port,
            staging_dir: lookup("STAGING_DIR")
                .filter(|v| !v.trim().is_empty())
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("uploads/mangas")),
            max_file_size,
            allowed_origins: lookup("ALLOWED_ORIGINS")
                .map(|v| {
                    v.split(',')
                        .map(|s| s.trim().to_string())
                        .filter(|s| !s.is_empty())
                        .collect()
                })
                .unwrap_or_else(|| vec!["*".to_string()]),
        })
    }

    /// Config pointing at a local API double, used by tests and local runs
    pub fn development(api_url: &str, staging_dir: PathBuf) -> Self {
        Self {
            github_token: "dev-token".to_string(),
            github_owner: "owner".to_string(),
            github_repo: "mangas".to_string(),
            github_api_url: api_url.trim_end_matches('/').to_string(),
            port: 8080,
            staging_dir,
            max_file_size: 50 * 1024 * 1024,
            allowed_origins: vec!["*".to_string()],
        }
    }

    /// Request body cap: the file limit plus room for multipart framing and text fields
    pub fn body_limit(&self) -> usize {
        self.max_file_size.saturating_add(MULTIPART_OVERHEAD)
    }

    pub fn repository(&self) -> String {
        format!("{}/{}", self.github_owner, self.github_repo)
    }
}

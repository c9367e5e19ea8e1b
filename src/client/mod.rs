//! Client side of the upload flow: form state, image encoding and the HTTP
//! calls the form makes against the upload server.

pub mod encode;
pub mod form;
pub mod http;

pub use encode::EncodedImage;
pub use form::MangaForm;
pub use http::{UploadAck, UploadClient};

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("failed to read {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("decode task failed: {0}")]
    Task(String),

    #[error("invalid data URL: {0}")]
    InvalidDataUrl(String),

    #[error("{0}")]
    SubmitBlocked(String),

    #[error("invalid server URL: {0}")]
    InvalidUrl(String),

    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("server answered {status}: {message}")]
    Server { status: u16, message: String },

    #[error("upload of {filename} failed: {source}")]
    Upload {
        filename: String,
        #[source]
        source: Box<ClientError>,
    },
}

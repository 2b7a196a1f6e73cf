//! Error type for catalog operations.

use thiserror::Error;

/// Errors surfaced by the synchronous (awaited) catalog operations.
///
/// Background variants never return these; they hand them to the
/// matching listener's failure callback instead.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Connection, TLS or body-read failure.
    #[error("network error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The server answered with a non-success status.
    #[error("request to {url} failed with status {status}")]
    HttpStatus {
        /// Requested URL
        url: String,
        /// HTTP status code
        status: u16,
    },

    /// Manifest body was not a valid wallpaper array.
    #[error("malformed manifest: {0}")]
    Decode(#[from] serde_json::Error),

    /// Remote image bytes could not be decoded.
    #[error("image decode error: {0}")]
    Image(#[from] image::ImageError),

    /// Writing a download to disk failed.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// A remote record has no name it can be saved under.
    #[error("no usable file name for {0}")]
    InvalidFileName(String),

    /// The host platform refused to set or index a wallpaper.
    #[error("platform error: {0}")]
    Platform(String),

    #[error("no tokio runtime available for background tasks")]
    NoRuntime,
}

impl CatalogError {
    pub(crate) fn platform(err: anyhow::Error) -> Self {
        Self::Platform(format!("{err:#}"))
    }
}

pub type Result<T> = std::result::Result<T, CatalogError>;

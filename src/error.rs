use thiserror::Error;

/// Failures the gallery can hit outside its own state machine.
#[derive(Debug, Error)]
pub enum GalleryError {
    #[error("failed to decode project content: {0}")]
    Content(#[from] serde_json::Error),

    #[error("failed to fetch project content: {0}")]
    Fetch(String),

    #[error("invalid gallery setting: {0}")]
    InvalidSettings(&'static str),

    #[error("DOM unavailable: {0}")]
    Dom(&'static str),
}

impl From<gloo::net::Error> for GalleryError {
    fn from(err: gloo::net::Error) -> Self {
        GalleryError::Fetch(err.to_string())
    }
}

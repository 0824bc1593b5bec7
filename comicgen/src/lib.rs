use thiserror::Error;

use crate::imagegen::ServiceKind;

pub mod analyze;
pub mod comic;
pub mod config;
pub mod fallback;
pub mod imagegen;
pub mod input;
pub mod pipeline;
pub mod prompt;

// Inline video payloads above this are rejected by the analysis API
pub const MAX_INLINE_VIDEO_BYTES: usize = 20 * 1024 * 1024;
pub const MIN_DESCRIPTION_CHARS: usize = 10;

// One erring to rule them all...
#[derive(Error, Debug)]
pub enum ComicError {
    #[error("{0} not found in environment variables")]
    MissingApiKey(&'static str),
    #[error("{0}")]
    Validation(String),
    #[error("Unknown image service '{0}' (expected openai or imagen)")]
    UnknownService(String),
    #[error("{} API key not configured", .0.display_name())]
    ServiceNotConfigured(ServiceKind),
    #[error("{service} returned HTTP {status}: {body}")]
    Upstream {
        service: &'static str,
        status: u16,
        body: String,
    },
    #[error("{0} returned no usable content")]
    EmptyResponse(&'static str),
    #[error("Video analysis failed: {0}")]
    VideoAnalysis(Box<ComicError>),
    #[error("{0}")]
    ImageGeneration(String),
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Unexpected Json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Invalid base64 payload: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("Could not decode image: {0}")]
    Image(#[from] image::ImageError),
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),
    #[error("Unexpected IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ComicError {
    pub fn validation(msg: &str) -> Self {
        Self::Validation(String::from(msg))
    }

    // HTTP status reported by the provider, looking through the analysis wrapper
    pub fn upstream_status(&self) -> Option<u16> {
        match self {
            ComicError::Upstream { status, .. } => Some(*status),
            ComicError::VideoAnalysis(inner) => inner.upstream_status(),
            ComicError::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

// Turns a non-2xx provider reply into `ComicError::Upstream`, keeping the body for diagnostics
pub(crate) async fn ensure_success(
    service: &'static str,
    resp: reqwest::Response,
) -> Result<reqwest::Response, ComicError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    tracing::warn!("{service} responded {status}: {body}");
    Err(ComicError::Upstream {
        service,
        status: status.as_u16(),
        body,
    })
}

/// Installs the fmt subscriber used by both binaries; `RUST_LOG` overrides `default_filter`.
pub fn init_tracing(default_filter: &str) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
    let _ = tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .try_init();
}

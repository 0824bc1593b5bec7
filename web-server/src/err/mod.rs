use crate::response::Response1;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use comicgen::fallback::troubleshooting_tip;
use comicgen::ComicError;
use serde::Serialize;
use std::borrow::Cow;
use thiserror::Error;

#[derive(Debug, Default, Clone, Serialize)]
pub struct ResponseErrorItem {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<Cow<'static, str>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<Cow<'static, str>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<Cow<'static, str>>,
}

impl ResponseErrorItem {
    pub fn title(title: String) -> Self {
        ResponseErrorItem {
            title: Some(Cow::Owned(title)),
            ..Default::default()
        }
    }
    pub fn title_source(title: String, source: &'static str) -> Self {
        ResponseErrorItem {
            title: Some(Cow::Owned(title)),
            source: Some(Cow::Borrowed(source)),
            ..Default::default()
        }
    }
    pub fn with_detail(mut self, detail: &'static str) -> Self {
        self.detail = Some(Cow::Borrowed(detail));
        self
    }
    // attaches the troubleshooting hint for this title, if any
    pub fn with_tip(mut self) -> Self {
        if let Some(tip) = self.title.as_deref().and_then(troubleshooting_tip) {
            self.detail = Some(Cow::Borrowed(tip));
        }
        self
    }
}

#[derive(Error, Debug)]
pub enum RequestError {
    #[error("Validation {0:?} error")]
    Validation(Vec<ResponseErrorItem>),
    #[error("Configuration error {0:?}")]
    Configuration(ResponseErrorItem),
    #[error("Generation failed {0:?}")]
    Generation(ResponseErrorItem),
    #[error("Unexpected system error")]
    SystemError(Cow<'static, str>),
}

impl RequestError {
    pub fn sys_str(msg: &'static str) -> Self {
        Self::SystemError(Cow::Borrowed(msg))
    }

    pub fn status_code(&self) -> StatusCode {
        use RequestError::*;
        match self {
            Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Configuration(_) => StatusCode::SERVICE_UNAVAILABLE,
            Generation(_) => StatusCode::BAD_GATEWAY,
            SystemError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn items(&self) -> Vec<ResponseErrorItem> {
        use RequestError::*;
        match self {
            Validation(v) => v.clone(),
            Configuration(v) | Generation(v) => vec![v.clone()],
            SystemError(v) => vec![ResponseErrorItem {
                title: Some(v.clone()),
                ..Default::default()
            }],
        }
    }
}

impl From<ComicError> for RequestError {
    fn from(e: ComicError) -> Self {
        match e {
            ComicError::Validation(msg) => Self::Validation(vec![ResponseErrorItem::title(msg)]),
            ComicError::UnknownService(_) => {
                Self::Validation(vec![ResponseErrorItem::title(e.to_string())])
            }
            ComicError::MissingApiKey(_) => Self::Configuration(
                ResponseErrorItem::title(e.to_string())
                    .with_detail("Please check that your GEMINI_API_KEY is set in the .env file"),
            ),
            ComicError::Url(_) | ComicError::Io(_) => {
                Self::SystemError(Cow::Owned(e.to_string()))
            }
            // everything else comes out of a provider round-trip
            _ => Self::Generation(ResponseErrorItem::title(e.to_string()).with_tip()),
        }
    }
}

impl IntoResponse for RequestError {
    fn into_response(self) -> axum::response::Response {
        if let RequestError::SystemError(ref v) = self {
            tracing::error!("request failed: {v}");
        }
        let status = self.status_code();
        (status, Json(Response1::errs(self.items()))).into_response()
    }
}

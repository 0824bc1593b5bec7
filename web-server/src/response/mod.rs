use crate::err::ResponseErrorItem;
use comicgen::config::KeyStatus;
use comicgen::imagegen::ServiceKind;
use comicgen::pipeline::ComicResult;
use serde::Serialize;
use std::borrow::Cow;

#[derive(Debug, Default, Serialize)]
pub struct ComicInfo {
    pub id: String,
    pub enhanced_prompt: String,
    pub service_used: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
    pub width: u32,
    pub height: u32,
    pub took_sec: f64,
    pub image_png_base64: String,
}

impl From<&ComicResult> for ComicInfo {
    fn from(result: &ComicResult) -> Self {
        ComicInfo {
            id: result.id.to_string(),
            enhanced_prompt: result.enhanced_prompt.clone(),
            service_used: result.service_used.to_string(),
            warning: result.warning.clone(),
            width: result.image.width,
            height: result.image.height,
            took_sec: result.took.as_secs_f64(),
            image_png_base64: result.image.to_base64(),
        }
    }
}

#[derive(Debug, Default, Serialize)]
pub struct ResponseComic {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<ResponseErrorItem>>,
    pub status: Cow<'static, str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<ComicInfo>,
}

impl ResponseComic {
    pub fn ok(info: ComicInfo) -> Self {
        Self {
            status: Cow::Borrowed("Ok"),
            errors: None,
            data: Some(info),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct StatusInfo {
    pub api_keys: KeyStatus,
    pub primary_service: ServiceKind,
    pub fallback_service: ServiceKind,
}

#[derive(Debug, Serialize)]
pub struct ResponseStatus {
    pub status: Cow<'static, str>,
    pub data: StatusInfo,
}

// Envelope for errors that carry no payload
#[derive(Debug, Default, Serialize)]
pub struct Response1 {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<ResponseErrorItem>>,
    pub status: Cow<'static, str>,
}

impl Response1 {
    pub fn errs(reason: Vec<ResponseErrorItem>) -> Self {
        Self {
            status: Cow::Borrowed("Error"),
            errors: Some(reason),
        }
    }
}

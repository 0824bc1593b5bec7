use bytes::Bytes;
use comicgen::imagegen::ServiceKind;
use comicgen::input::{validate_description, ComicRequest, VideoSource};
use comicgen::ComicError;
use serde::Deserialize;

use crate::err::{RequestError, ResponseErrorItem};

#[derive(Debug, Clone, Deserialize)]
pub struct GenerateJson {
    pub video_url: Option<String>,
    pub description: Option<String>,
    pub primary_service: Option<String>,
    pub fallback_service: Option<String>,
}

pub struct UploadedVideo {
    pub bytes: Bytes,
    pub content_type: Option<String>,
    pub file_name: String,
}

// Fields of the multipart form posted by the index page
#[derive(Default)]
pub struct GenerateForm {
    pub video_url: Option<String>,
    pub video_file: Option<UploadedVideo>,
    pub description: Option<String>,
    pub primary_service: Option<String>,
    pub fallback_service: Option<String>,
}

pub struct GenerateApi {
    pub request: ComicRequest,
    pub primary: Option<ServiceKind>,
    pub fallback: Option<ServiceKind>,
}

impl GenerateApi {
    /// Resolves the services against the server defaults. A missing fallback
    /// is the other service of the chosen primary.
    pub fn services(&self, defaults: (ServiceKind, ServiceKind)) -> (ServiceKind, ServiceKind) {
        match (self.primary, self.fallback) {
            (Some(p), Some(f)) => (p, f),
            (Some(p), None) => (p, p.other()),
            (None, Some(f)) => (defaults.0, f),
            (None, None) => defaults,
        }
    }
}

fn push_err(errors: &mut Vec<ResponseErrorItem>, field_name: &'static str, e: ComicError) {
    errors.push(ResponseErrorItem::title_source(e.to_string(), field_name));
}

fn extract_service(
    field_name: &'static str,
    op_str: &Option<String>,
    errors: &mut Vec<ResponseErrorItem>,
) -> Option<ServiceKind> {
    let raw = op_str.as_deref().map(str::trim).filter(|s| !s.is_empty())?;
    match raw.parse::<ServiceKind>() {
        Ok(kind) => Some(kind),
        Err(e) => {
            push_err(errors, field_name, e);
            None
        }
    }
}

fn build(
    source: Result<VideoSource, (&'static str, ComicError)>,
    description: &Option<String>,
    primary: &Option<String>,
    fallback: &Option<String>,
) -> Result<GenerateApi, RequestError> {
    let mut err_reasons = Vec::with_capacity(4);

    let source = match source {
        Ok(s) => Some(s),
        Err((field_name, e)) => {
            push_err(&mut err_reasons, field_name, e);
            None
        }
    };
    let description = description.as_deref().unwrap_or_default();
    if let Err(e) = validate_description(description) {
        push_err(&mut err_reasons, "/description", e);
    }
    let primary = extract_service("/primary_service", primary, &mut err_reasons);
    let fallback = extract_service("/fallback_service", fallback, &mut err_reasons);

    if !err_reasons.is_empty() {
        return Err(RequestError::Validation(err_reasons));
    }
    // the source is present whenever no error was recorded
    let source = source.ok_or_else(|| RequestError::sys_str("internal assertion error"))?;
    Ok(GenerateApi {
        request: ComicRequest::new(source, description)?,
        primary,
        fallback,
    })
}

impl TryFrom<GenerateJson> for GenerateApi {
    type Error = RequestError;

    fn try_from(json: GenerateJson) -> Result<Self, RequestError> {
        let source = VideoSource::youtube(json.video_url.as_deref().unwrap_or_default())
            .map_err(|e| ("/video_url", e));
        build(
            source,
            &json.description,
            &json.primary_service,
            &json.fallback_service,
        )
    }
}

impl TryFrom<GenerateForm> for GenerateApi {
    type Error = RequestError;

    fn try_from(form: GenerateForm) -> Result<Self, RequestError> {
        let source = match form.video_file {
            // a non-empty upload takes precedence over the URL field
            Some(upload) if !upload.bytes.is_empty() => VideoSource::upload(
                upload.bytes,
                upload.content_type.as_deref(),
                &upload.file_name,
            )
            .map_err(|e| ("/video_file", e)),
            _ => VideoSource::youtube(form.video_url.as_deref().unwrap_or_default())
                .map_err(|e| ("/video_url", e)),
        };
        build(
            source,
            &form.description,
            &form.primary_service,
            &form.fallback_service,
        )
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn json(video_url: Option<&str>, description: Option<&str>) -> GenerateJson {
        GenerateJson {
            video_url: video_url.map(str::to_string),
            description: description.map(str::to_string),
            primary_service: None,
            fallback_service: None,
        }
    }

    fn sources(err: RequestError) -> Vec<String> {
        match err {
            RequestError::Validation(items) => items
                .into_iter()
                .filter_map(|i| i.source.map(|s| s.into_owned()))
                .collect(),
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn reports_every_bad_field() {
        let mut req = json(Some("https://vimeo.com/1"), Some("short"));
        req.primary_service = Some(String::from("dalle"));
        let err = GenerateApi::try_from(req).err().unwrap();
        assert_eq!(
            sources(err),
            vec!["/video_url", "/description", "/primary_service"]
        );
    }

    #[test]
    fn missing_fields_are_validation_errors() {
        let err = GenerateApi::try_from(json(None, None)).err().unwrap();
        assert_eq!(sources(err), vec!["/video_url", "/description"]);
    }

    #[test]
    fn accepts_valid_json() {
        let mut req = json(
            Some("https://www.youtube.com/shorts/Q42OFDakgXc"),
            Some("Make the cat a wizard"),
        );
        req.primary_service = Some(String::from("imagen"));
        let api = GenerateApi::try_from(req).ok().unwrap();
        assert_eq!(api.request.description, "Make the cat a wizard");
        let defaults = (ServiceKind::OpenAi, ServiceKind::Imagen);
        assert_eq!(api.services(defaults), (ServiceKind::Imagen, ServiceKind::OpenAi));
    }

    #[test]
    fn blank_services_use_defaults() {
        let mut req = json(Some("https://youtu.be/abc"), Some("pirates on a ship"));
        req.primary_service = Some(String::from(""));
        let api = GenerateApi::try_from(req).ok().unwrap();
        let defaults = (ServiceKind::Imagen, ServiceKind::Imagen);
        assert_eq!(api.services(defaults), defaults);
    }

    #[test]
    fn upload_wins_over_url() {
        let form = GenerateForm {
            video_url: Some(String::from("not a url")),
            video_file: Some(UploadedVideo {
                bytes: Bytes::from_static(b"\x00\x00\x00\x18ftypmp42"),
                content_type: Some(String::from("video/mp4")),
                file_name: String::from("cat.mp4"),
            }),
            description: Some(String::from("the cat becomes a knight")),
            ..Default::default()
        };
        let api = GenerateApi::try_from(form).ok().unwrap();
        assert!(matches!(api.request.source, VideoSource::Upload { .. }));
    }

    #[test]
    fn empty_upload_falls_back_to_url() {
        let form = GenerateForm {
            video_url: Some(String::from("https://youtu.be/abc")),
            video_file: Some(UploadedVideo {
                bytes: Bytes::new(),
                content_type: Some(String::from("application/octet-stream")),
                file_name: String::new(),
            }),
            description: Some(String::from("the cat becomes a knight")),
            ..Default::default()
        };
        let api = GenerateApi::try_from(form).ok().unwrap();
        assert!(matches!(api.request.source, VideoSource::YouTube(_)));
    }
}

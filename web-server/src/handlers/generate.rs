use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::response::Html;
use axum::Json;
use comicgen::imagegen::ServiceKind;
use comicgen::pipeline::{ComicGenerator, ComicResult};
use comicgen::ComicError;

use crate::err::{RequestError, ResponseErrorItem};
use crate::page::{render_error, render_index, render_result, FormEcho, IndexPage};
use crate::response::{ComicInfo, ResponseComic};
use crate::server::AppState;
use crate::spec::{GenerateApi, GenerateForm, GenerateJson, UploadedVideo};

const OPENAI_MISSING_TIP: &str =
    "OpenAI API key not configured. Try setting primary service to 'imagen'.";

async fn run(
    state: &AppState,
    api: &GenerateApi,
    services: (ServiceKind, ServiceKind),
) -> Result<ComicResult, ComicError> {
    let (primary, fallback) = services;
    let generator = ComicGenerator::new(&state.config, state.http.clone(), primary, fallback)?;
    generator.generate_comic(&api.request).await
}

fn form_error(e: axum::extract::multipart::MultipartError) -> RequestError {
    RequestError::Validation(vec![ResponseErrorItem::title(format!(
        "Could not read the submitted form: {e}"
    ))])
}

async fn read_form(multipart: &mut Multipart) -> Result<GenerateForm, RequestError> {
    let mut form = GenerateForm::default();
    while let Some(field) = multipart.next_field().await.map_err(form_error)? {
        let field_name = field.name().map(|n| n.to_string());
        match field_name.as_deref() {
            Some("video_file") => {
                let file_name = field.file_name().unwrap_or("upload").to_string();
                let content_type = field.content_type().map(|c| c.to_string());
                let bytes = field.bytes().await.map_err(form_error)?;
                form.video_file = Some(UploadedVideo {
                    bytes,
                    content_type,
                    file_name,
                });
            }
            Some("video_url") => form.video_url = Some(field.text().await.map_err(form_error)?),
            Some("description") => {
                form.description = Some(field.text().await.map_err(form_error)?)
            }
            Some("primary_service") => {
                form.primary_service = Some(field.text().await.map_err(form_error)?)
            }
            Some("fallback_service") => {
                form.fallback_service = Some(field.text().await.map_err(form_error)?)
            }
            _ => {}
        }
    }
    Ok(form)
}

fn error_section(err: &RequestError, extra_tip: Option<&'static str>) -> String {
    let items = err.items();
    let message = items
        .iter()
        .filter_map(|i| i.title.as_deref())
        .collect::<Vec<_>>()
        .join("\n");
    let message = match err {
        RequestError::Generation(_) => format!("Comic generation failed: {message}"),
        RequestError::Configuration(_) => format!("Configuration Error: {message}"),
        _ => message,
    };
    let mut tips: Vec<&str> = items.iter().filter_map(|i| i.detail.as_deref()).collect();
    tips.extend(extra_tip);
    render_error(&message, &tips)
}

// Only an image failure with openai as an unconfigured primary earns the hint
fn openai_tip(
    e: &ComicError,
    primary: ServiceKind,
    openai_configured: bool,
) -> Option<&'static str> {
    match e {
        ComicError::ImageGeneration(_) if primary == ServiceKind::OpenAi && !openai_configured => {
            Some(OPENAI_MISSING_TIP)
        }
        _ => None,
    }
}

pub async fn generate_form(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> (StatusCode, Html<String>) {
    let defaults = (state.defaults.primary, state.defaults.fallback);
    let keys = state.config.key_status();

    let mut echo = FormEcho::default();
    let mut services = None;
    let mut extra_tip = None;
    let outcome = match read_form(&mut multipart).await {
        Ok(form) => {
            echo.video_url = form.video_url.clone().unwrap_or_default();
            echo.description = form.description.clone().unwrap_or_default();
            match GenerateApi::try_from(form) {
                Ok(api) => {
                    let chosen = api.services(defaults);
                    services = Some(chosen);
                    run(&state, &api, chosen).await.map_err(|e| {
                        extra_tip = openai_tip(&e, chosen.0, keys.openai);
                        RequestError::from(e)
                    })
                }
                Err(e) => Err(e),
            }
        }
        Err(e) => Err(e),
    };

    let (status, result) = match outcome {
        Ok(result) => (StatusCode::OK, render_result(&result)),
        Err(e) => (e.status_code(), error_section(&e, extra_tip)),
    };
    let (primary, fallback) = services.unwrap_or(defaults);
    let html = render_index(&IndexPage {
        keys,
        primary,
        fallback,
        echo: &echo,
        result,
    });
    (status, Html(html))
}

pub async fn generate_json(
    State(state): State<AppState>,
    Json(req_json): Json<GenerateJson>,
) -> Result<Json<ResponseComic>, RequestError> {
    let api = GenerateApi::try_from(req_json)?;
    let services = api.services((state.defaults.primary, state.defaults.fallback));
    let result = run(&state, &api, services).await?;
    tracing::info!("comic {} served via api", result.id);
    Ok(Json(ResponseComic::ok(ComicInfo::from(&result))))
}

use crate::handlers::generate::{generate_form, generate_json};
use crate::handlers::help::{css, help, index};
use crate::handlers::status::api_status;
use crate::FORM_FIELDS_BYTES;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use comicgen::config::ComicConfig;
use comicgen::imagegen::ServiceKind;
use comicgen::{ComicError, MAX_INLINE_VIDEO_BYTES};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

#[derive(Debug, Copy, Clone)]
pub struct ServerDefaults {
    pub primary: ServiceKind,
    pub fallback: ServiceKind,
}

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ComicConfig>,
    pub http: reqwest::Client,
    pub defaults: ServerDefaults,
}

impl AppState {
    pub fn new(config: ComicConfig, defaults: ServerDefaults) -> Result<Self, ComicError> {
        let http = config.http_client()?;
        Ok(Self {
            config: Arc::new(config),
            http,
            defaults,
        })
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/generate", post(generate_form))
        .route("/api/generate", post(generate_json))
        .route("/api/status", get(api_status))
        .route("/help", get(help))
        .route("/", get(index))
        .route("/index.htm", get(index))
        .route("/index.html", get(index))
        .route("/static/style.css", get(css))
        .layer(DefaultBodyLimit::max(MAX_INLINE_VIDEO_BYTES + FORM_FIELDS_BYTES))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn launch_server(port: u16, defaults: ServerDefaults) -> Result<(), ComicError> {
    comicgen::init_tracing("comicgen=info,comicgen_ws=info,tower_http=info");

    let config = ComicConfig::from_env();
    let keys = config.key_status();
    if !keys.gemini {
        tracing::warn!("GEMINI_API_KEY is not configured; generation requests will be refused");
    }
    if !keys.openai {
        tracing::info!("OPENAI_API_KEY is not configured; the openai service is unavailable");
    }
    let app = router(AppState::new(config, defaults)?);

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{port}")).await?;
    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;
    Ok(())
}

use std::time::{Duration, Instant};

use tracing::Instrument;
use ulid::Ulid;

use crate::analyze::VideoAnalyzer;
use crate::comic::ComicImage;
use crate::config::ComicConfig;
use crate::fallback::{generate_with_fallback, FallbackOutcome};
use crate::imagegen::{ImageServices, ServiceKind};
use crate::input::ComicRequest;
use crate::ComicError;

#[derive(Debug, Clone)]
pub struct ComicResult {
    // time-ordered, also used as the log span id
    pub id: Ulid,
    pub image: ComicImage,
    pub enhanced_prompt: String,
    pub service_used: ServiceKind,
    pub warning: Option<String>,
    pub took: Duration,
}

/// Video analysis followed by image generation with one fallback.
#[derive(Debug, Clone)]
pub struct ComicGenerator {
    analyzer: VideoAnalyzer,
    images: ImageServices,
    primary: ServiceKind,
    fallback: ServiceKind,
}

impl ComicGenerator {
    pub fn new(
        config: &ComicConfig,
        http: reqwest::Client,
        primary: ServiceKind,
        fallback: ServiceKind,
    ) -> Result<Self, ComicError> {
        let analyzer = VideoAnalyzer::new(config, http.clone())?;
        let images = ImageServices::new(config, http);
        if !images.is_configured(primary) {
            tracing::warn!("primary service {primary} has no API key; fallback {fallback} will be used");
        }
        Ok(Self {
            analyzer,
            images,
            primary,
            fallback,
        })
    }

    pub fn primary(&self) -> ServiceKind {
        self.primary
    }

    pub fn fallback(&self) -> ServiceKind {
        self.fallback
    }

    pub async fn extract_comic_prompt_and_enhance(
        &self,
        request: &ComicRequest,
    ) -> Result<String, ComicError> {
        self.analyzer.enhance_prompt(request).await
    }

    pub async fn generate_image_with_fallback(
        &self,
        prompt: &str,
    ) -> Result<FallbackOutcome, ComicError> {
        generate_with_fallback(self.primary, self.fallback, |kind| {
            self.images.generate(kind, prompt)
        })
        .await
    }

    pub async fn generate_comic(&self, request: &ComicRequest) -> Result<ComicResult, ComicError> {
        let id = Ulid::new();
        let span = tracing::info_span!("comic", id = %id);
        async move {
            let st = Instant::now();
            tracing::info!(
                "analyzing {} (primary {}, fallback {})",
                request.source.describe(),
                self.primary,
                self.fallback
            );
            let enhanced_prompt = self.extract_comic_prompt_and_enhance(request).await?;
            tracing::info!("enhanced prompt is {} chars", enhanced_prompt.len());

            let outcome = self.generate_image_with_fallback(&enhanced_prompt).await?;
            let image = ComicImage::from_bytes(&outcome.bytes)?;
            let took = Instant::now().duration_since(st);
            tracing::info!(
                "comic {}x{} generated with {} took: {}ms",
                image.width,
                image.height,
                outcome.service,
                took.as_millis()
            );
            Ok(ComicResult {
                id,
                image,
                enhanced_prompt,
                service_used: outcome.service,
                warning: outcome.warning,
                took,
            })
        }
        .instrument(span)
        .await
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::input::VideoSource;
    use axum::extract::{Path, State};
    use axum::http::{HeaderMap, StatusCode};
    use axum::response::{IntoResponse, Response};
    use axum::routing::post;
    use axum::{Json, Router};
    use base64::engine::general_purpose::STANDARD as BASE64;
    use base64::Engine;
    use serde_json::{json, Value};
    use std::io::Cursor;
    use std::sync::{Arc, Mutex};

    // Local stand-in for the Gemini, Imagen and OpenAI endpoints
    #[derive(Clone)]
    struct Providers {
        png_b64: String,
        imagen_status: StatusCode,
        seen: Arc<Mutex<Vec<String>>>,
    }

    async fn models(
        State(p): State<Providers>,
        Path(call): Path<String>,
        headers: HeaderMap,
        Json(body): Json<Value>,
    ) -> Response {
        let key = headers
            .get("x-goog-api-key")
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        p.seen.lock().unwrap().push(format!("{call} key={key}"));
        if key != "g-key" {
            return (StatusCode::UNAUTHORIZED, "API key not valid").into_response();
        }
        if call.ends_with(":generateContent") {
            let uri = &body["contents"][0]["parts"][1]["fileData"]["fileUri"];
            let text = format!(
                "Panel 1: the cat from {} in a cape",
                uri.as_str().unwrap_or("?")
            );
            Json(json!({"candidates": [{"content": {"parts": [{"text": text}]}}]})).into_response()
        } else if call.ends_with(":predict") {
            if p.imagen_status != StatusCode::OK {
                return (p.imagen_status, "Imagen API is only accessible to billed users")
                    .into_response();
            }
            Json(json!({"predictions": [{"bytesBase64Encoded": p.png_b64}]})).into_response()
        } else {
            StatusCode::NOT_FOUND.into_response()
        }
    }

    async fn openai_images(State(p): State<Providers>, headers: HeaderMap) -> Response {
        let auth = headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        p.seen.lock().unwrap().push(format!("images/generations {auth}"));
        (StatusCode::TOO_MANY_REQUESTS, "rate limited").into_response()
    }

    async fn spawn_providers(imagen_status: StatusCode) -> (ComicConfig, Arc<Mutex<Vec<String>>>) {
        let mut png = Cursor::new(Vec::new());
        image::RgbImage::new(6, 4)
            .write_to(&mut png, image::ImageOutputFormat::Png)
            .unwrap();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let providers = Providers {
            png_b64: BASE64.encode(png.into_inner()),
            imagen_status,
            seen: seen.clone(),
        };
        let app = Router::new()
            .route("/v1beta/models/:call", post(models))
            .route("/v1/images/generations", post(openai_images))
            .with_state(providers);
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });

        let cfg = ComicConfig {
            gemini_api_key: Some(String::from("g-key")),
            openai_api_key: Some(String::from("sk-key")),
            gemini_api_base: format!("http://{addr}/v1beta"),
            openai_api_base: format!("http://{addr}/v1"),
            ..Default::default()
        };
        (cfg, seen)
    }

    fn local_client() -> reqwest::Client {
        reqwest::Client::builder().no_proxy().build().unwrap()
    }

    fn request() -> ComicRequest {
        let source = VideoSource::youtube("https://youtu.be/abc").unwrap();
        ComicRequest::new(source, "make the cat a superhero").unwrap()
    }

    #[tokio::test]
    async fn rate_limited_primary_falls_back_to_imagen() {
        let (cfg, seen) = spawn_providers(StatusCode::OK).await;
        let generator =
            ComicGenerator::new(&cfg, local_client(), ServiceKind::OpenAi, ServiceKind::Imagen)
                .unwrap();
        let result = generator.generate_comic(&request()).await.unwrap();

        assert_eq!(result.service_used, ServiceKind::Imagen);
        assert_eq!(
            result.warning.as_deref(),
            Some("Primary service failed: OPENAI: Daily limit reached. Please try again later.")
        );
        assert_eq!(result.enhanced_prompt, "Panel 1: the cat from https://youtu.be/abc in a cape");
        assert_eq!((result.image.width, result.image.height), (6, 4));
        assert_eq!(
            *seen.lock().unwrap(),
            vec![
                String::from("gemini-2.0-flash:generateContent key=g-key"),
                String::from("images/generations Bearer sk-key"),
                String::from("imagen-4.0-generate-001:predict key=g-key"),
            ]
        );
    }

    #[tokio::test]
    async fn both_services_failing_reports_each_reason() {
        let (cfg, _) = spawn_providers(StatusCode::BAD_REQUEST).await;
        let generator =
            ComicGenerator::new(&cfg, local_client(), ServiceKind::OpenAi, ServiceKind::Imagen)
                .unwrap();
        let err = generator.generate_comic(&request()).await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "Primary: OPENAI: Daily limit reached. Please try again later.\n\
             Fallback: IMAGEN: Billing required. Please enable billing in your account."
        );
    }

    #[tokio::test]
    async fn rejected_analysis_keeps_upstream_status() {
        let (mut cfg, _) = spawn_providers(StatusCode::OK).await;
        cfg.gemini_api_key = Some(String::from("wrong"));
        let generator =
            ComicGenerator::new(&cfg, local_client(), ServiceKind::Imagen, ServiceKind::OpenAi)
                .unwrap();
        let err = generator.generate_comic(&request()).await.unwrap_err();
        assert_eq!(err.upstream_status(), Some(401));
        match err {
            ComicError::VideoAnalysis(inner) => assert!(matches!(
                *inner,
                ComicError::Upstream {
                    service: "Gemini",
                    status: 401,
                    ..
                }
            )),
            other => panic!("expected analysis error, got {other:?}"),
        }
    }

    #[test]
    fn generator_needs_gemini_key() {
        let err = ComicGenerator::new(
            &ComicConfig::default(),
            reqwest::Client::new(),
            ServiceKind::OpenAi,
            ServiceKind::Imagen,
        )
        .unwrap_err();
        assert!(matches!(err, ComicError::MissingApiKey("GEMINI_API_KEY")));
    }

    #[test]
    fn generator_keeps_service_order() {
        let cfg = ComicConfig {
            gemini_api_key: Some(String::from("g-key")),
            ..Default::default()
        };
        let generator = ComicGenerator::new(
            &cfg,
            reqwest::Client::new(),
            ServiceKind::Imagen,
            ServiceKind::OpenAi,
        )
        .unwrap();
        assert_eq!(generator.primary(), ServiceKind::Imagen);
        assert_eq!(generator.fallback(), ServiceKind::OpenAi);
    }

    #[tokio::test]
    async fn unconfigured_services_fail_without_network() {
        let cfg = ComicConfig {
            gemini_api_key: Some(String::from("g-key")),
            ..Default::default()
        };
        let generator = ComicGenerator::new(
            &cfg,
            reqwest::Client::new(),
            ServiceKind::OpenAi,
            ServiceKind::OpenAi,
        )
        .unwrap();
        let err = generator.generate_image_with_fallback("a comic").await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "OPENAI: Invalid API key. Please check your credentials."
        );
    }
}

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde::{Deserialize, Serialize};

use crate::config::{ComicConfig, GEMINI_API_KEY};
use crate::input::{ComicRequest, VideoSource};
use crate::prompt::enhancement_prompt;
use crate::{ensure_success, ComicError};

const SERVICE: &str = "Gemini";

// generateContent wire format; only the fields we send or read
#[derive(Debug, Serialize)]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    role: &'static str,
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
enum Part<'a> {
    Text(&'a str),
    FileData {
        #[serde(rename = "fileUri")]
        file_uri: &'a str,
    },
    InlineData {
        #[serde(rename = "mimeType")]
        mime_type: &'a str,
        data: String,
    },
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

/// Client for the multimodal model that watches the video and writes the
/// image prompt.
#[derive(Debug, Clone)]
pub struct VideoAnalyzer {
    http: reqwest::Client,
    endpoint: String,
    api_key: String,
}

impl VideoAnalyzer {
    pub fn new(config: &ComicConfig, http: reqwest::Client) -> Result<Self, ComicError> {
        let api_key = config
            .gemini_api_key
            .clone()
            .ok_or(ComicError::MissingApiKey(GEMINI_API_KEY))?;
        Ok(Self {
            http,
            endpoint: format!(
                "{}/models/{}:generateContent",
                config.gemini_api_base, config.gemini_model
            ),
            api_key,
        })
    }

    /// Returns the enhanced prompt for `request`. Any failure is reported as
    /// a video analysis failure.
    pub async fn enhance_prompt(&self, request: &ComicRequest) -> Result<String, ComicError> {
        self.enhance_prompt_inner(request)
            .await
            .map_err(|e| ComicError::VideoAnalysis(Box::new(e)))
    }

    async fn enhance_prompt_inner(&self, request: &ComicRequest) -> Result<String, ComicError> {
        let instruction = enhancement_prompt(&request.source.describe(), &request.description);
        let body = build_request(&instruction, &request.source);

        tracing::debug!("requesting video analysis from {}", self.endpoint);
        let resp = self
            .http
            .post(&self.endpoint)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await?;
        let resp = ensure_success(SERVICE, resp).await?;
        let payload = resp.json::<GenerateContentResponse>().await?;
        extract_text(payload)
    }
}

fn build_request<'a>(instruction: &'a str, source: &'a VideoSource) -> GenerateContentRequest<'a> {
    let video = match source {
        VideoSource::YouTube(url) => Part::FileData {
            file_uri: url.as_str(),
        },
        VideoSource::Upload {
            bytes, mime_type, ..
        } => Part::InlineData {
            mime_type: mime_type.as_str(),
            data: BASE64.encode(bytes),
        },
    };
    GenerateContentRequest {
        contents: vec![Content {
            role: "user",
            parts: vec![Part::Text(instruction), video],
        }],
    }
}

fn extract_text(payload: GenerateContentResponse) -> Result<String, ComicError> {
    let text: String = payload
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
        .unwrap_or_default();
    let text = text.trim();
    if text.is_empty() {
        return Err(ComicError::EmptyResponse(SERVICE));
    }
    Ok(text.to_string())
}

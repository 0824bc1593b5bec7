use std::fmt;
use std::str::FromStr;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::config::ComicConfig;
use crate::{ensure_success, ComicError};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceKind {
    OpenAi,
    Imagen,
}

impl ServiceKind {
    pub const ALL: [ServiceKind; 2] = [ServiceKind::OpenAi, ServiceKind::Imagen];

    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceKind::OpenAi => "openai",
            ServiceKind::Imagen => "imagen",
        }
    }

    // badge text
    pub fn label(&self) -> &'static str {
        match self {
            ServiceKind::OpenAi => "OPENAI",
            ServiceKind::Imagen => "IMAGEN",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            ServiceKind::OpenAi => "OpenAI",
            ServiceKind::Imagen => "Imagen",
        }
    }

    /// The service picked as fallback when only a primary is chosen.
    pub fn other(&self) -> ServiceKind {
        match self {
            ServiceKind::OpenAi => ServiceKind::Imagen,
            ServiceKind::Imagen => ServiceKind::OpenAi,
        }
    }
}

impl fmt::Display for ServiceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ServiceKind {
    type Err = ComicError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "openai" => Ok(ServiceKind::OpenAi),
            "imagen" => Ok(ServiceKind::Imagen),
            _ => Err(ComicError::UnknownService(s.to_string())),
        }
    }
}

#[derive(Debug, Deserialize)]
struct OpenAiImagesResponse {
    #[serde(default)]
    data: Vec<OpenAiImage>,
}

#[derive(Debug, Deserialize)]
struct OpenAiImage {
    b64_json: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ImagenResponse {
    #[serde(default)]
    predictions: Vec<ImagenPrediction>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ImagenPrediction {
    bytes_base64_encoded: Option<String>,
}

#[derive(Debug, Clone)]
pub struct OpenAiImages {
    http: reqwest::Client,
    endpoint: String,
    api_key: String,
    model: String,
}

impl OpenAiImages {
    pub fn new(config: &ComicConfig, http: reqwest::Client) -> Option<Self> {
        let api_key = config.openai_api_key.clone()?;
        Some(Self {
            http,
            endpoint: format!("{}/images/generations", config.openai_api_base),
            api_key,
            model: config.openai_model.clone(),
        })
    }

    pub async fn generate(&self, prompt: &str) -> Result<Vec<u8>, ComicError> {
        let body = json!({
            "model": self.model,
            "prompt": prompt,
            "size": "1024x1024",
            "n": 1,
        });
        let resp = self
            .http
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;
        let resp = ensure_success("OpenAI", resp).await?;
        decode_openai(resp.json::<OpenAiImagesResponse>().await?)
    }
}

#[derive(Debug, Clone)]
pub struct ImagenImages {
    http: reqwest::Client,
    endpoint: String,
    api_key: String,
}

impl ImagenImages {
    pub fn new(config: &ComicConfig, http: reqwest::Client) -> Option<Self> {
        let api_key = config.gemini_api_key.clone()?;
        Some(Self {
            http,
            endpoint: format!(
                "{}/models/{}:predict",
                config.gemini_api_base, config.imagen_model
            ),
            api_key,
        })
    }

    pub async fn generate(&self, prompt: &str) -> Result<Vec<u8>, ComicError> {
        let body = json!({
            "instances": [{"prompt": prompt}],
            "parameters": {"sampleCount": 1, "aspectRatio": "1:1"},
        });
        let resp = self
            .http
            .post(&self.endpoint)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await?;
        let resp = ensure_success("Imagen", resp).await?;
        decode_imagen(resp.json::<ImagenResponse>().await?)
    }
}

fn decode_openai(payload: OpenAiImagesResponse) -> Result<Vec<u8>, ComicError> {
    let encoded = payload
        .data
        .into_iter()
        .find_map(|d| d.b64_json)
        .ok_or(ComicError::EmptyResponse("OpenAI"))?;
    Ok(BASE64.decode(encoded.as_bytes())?)
}

fn decode_imagen(payload: ImagenResponse) -> Result<Vec<u8>, ComicError> {
    let encoded = payload
        .predictions
        .into_iter()
        .find_map(|p| p.bytes_base64_encoded)
        .ok_or(ComicError::EmptyResponse("Imagen"))?;
    Ok(BASE64.decode(encoded.as_bytes())?)
}

/// The image generators available under the current configuration.
#[derive(Debug, Clone)]
pub struct ImageServices {
    openai: Option<OpenAiImages>,
    imagen: Option<ImagenImages>,
}

impl ImageServices {
    pub fn new(config: &ComicConfig, http: reqwest::Client) -> Self {
        Self {
            openai: OpenAiImages::new(config, http.clone()),
            imagen: ImagenImages::new(config, http),
        }
    }

    pub fn is_configured(&self, kind: ServiceKind) -> bool {
        match kind {
            ServiceKind::OpenAi => self.openai.is_some(),
            ServiceKind::Imagen => self.imagen.is_some(),
        }
    }

    pub async fn generate(&self, kind: ServiceKind, prompt: &str) -> Result<Vec<u8>, ComicError> {
        tracing::info!("generating image with {kind}");
        match kind {
            ServiceKind::OpenAi => match self.openai {
                Some(ref client) => client.generate(prompt).await,
                None => Err(ComicError::ServiceNotConfigured(kind)),
            },
            ServiceKind::Imagen => match self.imagen {
                Some(ref client) => client.generate(prompt).await,
                None => Err(ComicError::ServiceNotConfigured(kind)),
            },
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn service_names() {
        assert_eq!("OpenAI".parse::<ServiceKind>().unwrap(), ServiceKind::OpenAi);
        assert_eq!(" imagen ".parse::<ServiceKind>().unwrap(), ServiceKind::Imagen);
        assert!(matches!(
            "dalle".parse::<ServiceKind>(),
            Err(ComicError::UnknownService(_))
        ));
        assert_eq!(ServiceKind::OpenAi.to_string(), "openai");
        assert_eq!(ServiceKind::Imagen.label(), "IMAGEN");
        assert_eq!(ServiceKind::OpenAi.other(), ServiceKind::Imagen);
        assert_eq!(
            serde_json::to_string(&ServiceKind::OpenAi).unwrap(),
            "\"openai\""
        );
    }

    #[test]
    fn decodes_openai_payload() {
        let payload: OpenAiImagesResponse =
            serde_json::from_str(r#"{"created": 1, "data": [{"b64_json": "iVBORw=="}]}"#).unwrap();
        assert_eq!(decode_openai(payload).unwrap(), vec![0x89, b'P', b'N', b'G']);
    }

    #[test]
    fn decodes_imagen_payload() {
        let payload: ImagenResponse = serde_json::from_str(
            r#"{"predictions": [{"mimeType": "image/png", "bytesBase64Encoded": "aGk="}]}"#,
        )
        .unwrap();
        assert_eq!(decode_imagen(payload).unwrap(), b"hi".to_vec());
    }

    #[test]
    fn missing_payload_is_empty_response() {
        let payload: ImagenResponse = serde_json::from_str(r#"{"predictions": []}"#).unwrap();
        assert!(matches!(
            decode_imagen(payload),
            Err(ComicError::EmptyResponse("Imagen"))
        ));
        let payload: OpenAiImagesResponse = serde_json::from_str(r#"{"data": [{}]}"#).unwrap();
        assert!(decode_openai(payload).is_err());
    }

    #[tokio::test]
    async fn unconfigured_service_is_reported() {
        let services = ImageServices::new(&ComicConfig::default(), reqwest::Client::new());
        assert!(!services.is_configured(ServiceKind::OpenAi));
        let err = services
            .generate(ServiceKind::OpenAi, "a comic")
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "OpenAI API key not configured");
    }
}

use std::future::Future;

use crate::imagegen::ServiceKind;
use crate::ComicError;

#[derive(Debug)]
pub struct FallbackOutcome {
    pub bytes: Vec<u8>,
    pub service: ServiceKind,
    // set when the fallback produced the image
    pub warning: Option<String>,
}

/// Tries `primary`, then `fallback` once if it differs. `call` performs the
/// actual generation for a given service.
pub async fn generate_with_fallback<F, Fut>(
    primary: ServiceKind,
    fallback: ServiceKind,
    mut call: F,
) -> Result<FallbackOutcome, ComicError>
where
    F: FnMut(ServiceKind) -> Fut,
    Fut: Future<Output = Result<Vec<u8>, ComicError>>,
{
    let primary_err = match call(primary).await {
        Ok(bytes) => {
            return Ok(FallbackOutcome {
                bytes,
                service: primary,
                warning: None,
            })
        }
        Err(e) => describe_failure(primary, &e),
    };
    tracing::warn!("primary image service failed: {primary_err}");

    if fallback == primary {
        return Err(ComicError::ImageGeneration(primary_err));
    }

    match call(fallback).await {
        Ok(bytes) => Ok(FallbackOutcome {
            bytes,
            service: fallback,
            warning: Some(format!("Primary service failed: {primary_err}")),
        }),
        Err(e) => {
            let fallback_err = describe_failure(fallback, &e);
            tracing::warn!("fallback image service failed: {fallback_err}");
            Err(ComicError::ImageGeneration(format!(
                "Primary: {primary_err}\nFallback: {fallback_err}"
            )))
        }
    }
}

/// Maps a provider error onto the short reason shown to users.
pub fn describe_failure(service: ServiceKind, error: &ComicError) -> String {
    let text = error.to_string();
    let lower = text.to_lowercase();
    let status = error.upstream_status();
    let svc = service.label();

    if status == Some(429) || lower.contains("quota") {
        format!("{svc}: Daily limit reached. Please try again later.")
    } else if status == Some(400) && lower.contains("billed") {
        format!("{svc}: Billing required. Please enable billing in your account.")
    } else if status == Some(401) || lower.contains("api key") {
        format!("{svc}: Invalid API key. Please check your credentials.")
    } else if status == Some(403) || lower.contains("permission") {
        format!("{svc}: Permission denied. Check API key permissions.")
    } else if lower.contains("invalid") && lower.contains("url") {
        String::from("Invalid video URL. Ensure the YouTube video is publicly accessible.")
    } else {
        format!("{svc}: {text}")
    }
}

/// Hint displayed under an error message, if one applies.
pub fn troubleshooting_tip(message: &str) -> Option<&'static str> {
    let lower = message.to_lowercase();
    if lower.contains("quota") || lower.contains("limit") {
        Some("The API has daily usage limits. Try again after the quota resets.")
    } else if lower.contains("billing") {
        Some("Enable billing in your Google Cloud account to use this model.")
    } else if lower.contains("permission") {
        Some("Verify your API key has the correct permissions in Google AI Studio.")
    } else if lower.contains("invalid") && lower.contains("url") {
        Some("Make sure the YouTube video is public and the URL is correct.")
    } else {
        None
    }
}

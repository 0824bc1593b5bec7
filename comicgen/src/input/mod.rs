use bytes::Bytes;
use url::Url;

use crate::{ComicError, MAX_INLINE_VIDEO_BYTES, MIN_DESCRIPTION_CHARS};

const YOUTUBE_PATTERNS: [&str; 4] = [
    "youtube.com/watch",
    "youtube.com/shorts",
    "youtu.be/",
    "m.youtube.com",
];

const DEFAULT_VIDEO_MIME: &str = "video/mp4";

#[derive(Debug, Clone)]
pub enum VideoSource {
    // fetched by the analysis model itself
    YouTube(Url),
    // sent inline with the analysis request
    Upload {
        bytes: Bytes,
        mime_type: String,
        file_name: String,
    },
}

impl VideoSource {
    pub fn youtube(url: &str) -> Result<Self, ComicError> {
        let url = url.trim();
        if url.is_empty() {
            return Err(ComicError::validation("Please provide a video URL"));
        }
        if !is_youtube_url(url) {
            return Err(ComicError::validation(
                "Please provide a valid YouTube URL (youtube.com or youtu.be)",
            ));
        }
        // links pasted without a scheme, e.g. `youtu.be/abc`
        if !url.contains("://") {
            return Ok(VideoSource::YouTube(Url::parse(&format!("https://{url}"))?));
        }
        Ok(VideoSource::YouTube(Url::parse(url)?))
    }

    pub fn upload(
        bytes: Bytes,
        mime_type: Option<&str>,
        file_name: &str,
    ) -> Result<Self, ComicError> {
        if bytes.is_empty() {
            return Err(ComicError::validation("The uploaded video is empty"));
        }
        if bytes.len() > MAX_INLINE_VIDEO_BYTES {
            return Err(ComicError::Validation(format!(
                "The uploaded video is {} MiB; the limit is {} MiB",
                bytes.len() / (1024 * 1024),
                MAX_INLINE_VIDEO_BYTES / (1024 * 1024)
            )));
        }
        let mime_type = mime_type
            .map(str::trim)
            .filter(|m| !m.is_empty() && *m != "application/octet-stream")
            .unwrap_or(DEFAULT_VIDEO_MIME);
        if !mime_type.starts_with("video/") {
            return Err(ComicError::Validation(format!(
                "Unsupported upload type {mime_type}; please upload a video file"
            )));
        }
        Ok(VideoSource::Upload {
            bytes,
            mime_type: mime_type.to_string(),
            file_name: file_name.to_string(),
        })
    }

    // How the prompt refers to the video
    pub fn describe(&self) -> String {
        match self {
            VideoSource::YouTube(url) => url.to_string(),
            VideoSource::Upload { file_name, .. } => {
                format!("the attached video file `{file_name}`")
            }
        }
    }
}

/// A validated generation request.
#[derive(Debug, Clone)]
pub struct ComicRequest {
    pub source: VideoSource,
    pub description: String,
}

impl ComicRequest {
    pub fn new(source: VideoSource, description: &str) -> Result<Self, ComicError> {
        validate_description(description)?;
        Ok(Self {
            source,
            description: description.trim().to_string(),
        })
    }
}

pub fn is_youtube_url(url: &str) -> bool {
    YOUTUBE_PATTERNS.iter().any(|p| url.contains(p))
}

/// Blank or too-short descriptions are rejected.
pub fn validate_description(description: &str) -> Result<(), ComicError> {
    let trimmed = description.trim();
    if trimmed.is_empty() {
        return Err(ComicError::validation("Please provide a comic description"));
    }
    if trimmed.chars().count() < MIN_DESCRIPTION_CHARS {
        return Err(ComicError::Validation(format!(
            "Comic description is too short. Please provide more details (at least {MIN_DESCRIPTION_CHARS} characters)"
        )));
    }
    Ok(())
}

/// Checks a URL/description pair in the order the form reports problems.
pub fn validate_inputs(video_url: &str, description: &str) -> Result<(), ComicError> {
    if video_url.trim().is_empty() {
        return Err(ComicError::validation("Please provide a video URL"));
    }
    if description.trim().is_empty() {
        return Err(ComicError::validation("Please provide a comic description"));
    }
    if !is_youtube_url(video_url) {
        return Err(ComicError::validation(
            "Please provide a valid YouTube URL (youtube.com or youtu.be)",
        ));
    }
    validate_description(description)
}

/// Guesses a video content type from a file extension.
pub fn mime_for_extension(ext: &str) -> &'static str {
    match ext.to_ascii_lowercase().as_str() {
        "mov" => "video/quicktime",
        "webm" => "video/webm",
        "mpeg" | "mpg" => "video/mpeg",
        "avi" => "video/x-msvideo",
        "3gp" => "video/3gpp",
        _ => DEFAULT_VIDEO_MIME,
    }
}

use std::io::Cursor;
use std::path::Path;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use image::{GenericImageView, ImageOutputFormat};

use crate::ComicError;

/// A generated comic, normalised to PNG whatever the provider returned.
#[derive(Debug, Clone)]
pub struct ComicImage {
    png: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

impl ComicImage {
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ComicError> {
        let img = image::load_from_memory(bytes)?;
        let (width, height) = img.dimensions();
        let mut png = Cursor::new(Vec::with_capacity(bytes.len()));
        img.write_to(&mut png, ImageOutputFormat::Png)?;
        Ok(Self {
            png: png.into_inner(),
            width,
            height,
        })
    }

    pub fn png(&self) -> &[u8] {
        &self.png
    }

    pub fn to_base64(&self) -> String {
        BASE64.encode(&self.png)
    }

    pub fn to_data_uri(&self) -> String {
        format!("data:image/png;base64,{}", self.to_base64())
    }

    pub async fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), ComicError> {
        tokio::fs::write(path, &self.png).await?;
        Ok(())
    }
}

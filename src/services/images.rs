//! Resizing and on-disk storage of processed product images.
//!
//! Images are halved in both dimensions and written to the output directory
//! as `processed_<file name from the source URL>`. Decode, resize and encode
//! run on the blocking pool.

use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView, ImageFormat};
use reqwest::Url;
use std::io::Cursor;
use std::path::PathBuf;
use tracing::debug;

const OUTPUT_PREFIX: &str = "processed_";

/// Writes resized images under a root directory.
#[derive(Debug, Clone)]
pub struct ImageStore {
    root: PathBuf,
}

impl ImageStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Resize `data` and store it under the name derived from `url`.
    /// Returns the output reference.
    pub async fn process(&self, url: &str, data: Vec<u8>) -> Result<String, ImageError> {
        let name = output_name(url)?;
        let target_format = ImageFormat::from_path(&name)
            .ok()
            .filter(|format| format.writing_enabled());

        let encoded = tokio::task::spawn_blocking(move || resize_half(&data, target_format))
            .await
            .map_err(|e| ImageError::Task(e.to_string()))??;

        tokio::fs::create_dir_all(&self.root).await?;
        tokio::fs::write(self.root.join(&name), encoded).await?;

        Ok(name)
    }
}

/// `processed_` plus the last path segment of the URL.
pub fn output_name(url: &str) -> Result<String, ImageError> {
    let parsed = Url::parse(url).map_err(|_| ImageError::InvalidUrl(url.to_string()))?;
    let file_name = parsed
        .path_segments()
        .and_then(|mut segments| segments.next_back())
        .filter(|segment| !segment.is_empty())
        .ok_or_else(|| ImageError::NoFileName(url.to_string()))?;

    Ok(format!("{OUTPUT_PREFIX}{file_name}"))
}

/// Decode, halve width and height (integer division, at least 1px) and
/// re-encode. Without a usable target format the source format is kept.
pub fn resize_half(data: &[u8], target_format: Option<ImageFormat>) -> Result<Vec<u8>, ImageError> {
    let source_format = image::guess_format(data)?;
    let img = image::load_from_memory_with_format(data, source_format)?;

    let (width, height) = img.dimensions();
    let (new_w, new_h) = half_dimensions(width, height);
    let resized = img.resize_exact(new_w, new_h, FilterType::Triangle);
    debug!(width, height, new_w, new_h, "Resized image");

    let format = target_format.unwrap_or(source_format);
    let resized = match format {
        // JPEG has no alpha channel
        ImageFormat::Jpeg => DynamicImage::ImageRgb8(resized.to_rgb8()),
        _ => resized,
    };

    let mut buf = Vec::new();
    resized.write_to(&mut Cursor::new(&mut buf), format)?;
    Ok(buf)
}

pub fn half_dimensions(width: u32, height: u32) -> (u32, u32) {
    ((width / 2).max(1), (height / 2).max(1))
}

#[derive(Debug, thiserror::Error)]
pub enum ImageError {
    #[error("Invalid image URL: {0}")]
    InvalidUrl(String),

    #[error("No file name in image URL: {0}")]
    NoFileName(String),

    #[error("Image decode/encode failed: {0}")]
    Image(#[from] image::ImageError),

    #[error("Failed to write processed image: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image task failed: {0}")]
    Task(String),
}

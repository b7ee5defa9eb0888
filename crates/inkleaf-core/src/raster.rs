//! Raster backend seam: image probing, flattening a scene to PNG.
//!
//! The core never draws pixels itself. `inkleaf-render` provides the CPU
//! implementation used by the shell.

use crate::scene::Scene;
use crate::shapes::ImageFormat;
use base64::{Engine, engine::general_purpose::STANDARD};
use thiserror::Error;

/// Raster errors.
#[derive(Debug, Error)]
pub enum RasterError {
    #[error("Unsupported image format")]
    UnsupportedFormat,
    #[error("Decode failed: {0}")]
    Decode(String),
    #[error("Encode failed: {0}")]
    Encode(String),
    #[error("Invalid surface size: {0}x{1}")]
    InvalidSize(u32, u32),
}

/// Basic facts about a decodable image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageInfo {
    pub format: ImageFormat,
    pub width: u32,
    pub height: u32,
}

/// Renders scenes to pixels.
pub trait Rasterizer {
    /// Fully decode `bytes` and report what they are.
    ///
    /// Only images that decode completely are accepted as backgrounds.
    fn probe(&self, bytes: &[u8]) -> Result<ImageInfo, RasterError>;

    /// Flatten `scene` (background included) into a PNG of the given size.
    ///
    /// The scene's surface is scaled uniformly to fit. Fails if the
    /// background cannot be decoded, so a partial image is never produced.
    fn render_png(&self, scene: &Scene, width: u32, height: u32) -> Result<Vec<u8>, RasterError>;
}

impl<R: Rasterizer + ?Sized> Rasterizer for Box<R> {
    fn probe(&self, bytes: &[u8]) -> Result<ImageInfo, RasterError> {
        (**self).probe(bytes)
    }

    fn render_png(&self, scene: &Scene, width: u32, height: u32) -> Result<Vec<u8>, RasterError> {
        (**self).render_png(scene, width, height)
    }
}

/// Wrap PNG bytes in a `data:` URL, the stored thumbnail representation.
pub fn png_data_url(png: &[u8]) -> String {
    format!("data:{};base64,{}", ImageFormat::Png.mime_type(), STANDARD.encode(png))
}

/// Extract PNG bytes from a `data:` URL produced by [`png_data_url`].
pub fn decode_data_url(url: &str) -> Option<Vec<u8>> {
    let (header, payload) = url.split_once(',')?;
    if !header.starts_with("data:") || !header.ends_with(";base64") {
        return None;
    }
    STANDARD.decode(payload).ok()
}

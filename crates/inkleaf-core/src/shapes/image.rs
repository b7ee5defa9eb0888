//! Raster background image (imported worksheet or rendered page).

use base64::{Engine, engine::general_purpose::STANDARD};
use kurbo::{Point, Rect, Size, Vec2};
use serde::{Deserialize, Serialize};

/// Image format for stored image data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ImageFormat {
    /// PNG format.
    Png,
    /// JPEG format.
    Jpeg,
    /// WebP format.
    WebP,
}

impl ImageFormat {
    /// Get MIME type for this format.
    pub fn mime_type(&self) -> &'static str {
        match self {
            ImageFormat::Png => "image/png",
            ImageFormat::Jpeg => "image/jpeg",
            ImageFormat::WebP => "image/webp",
        }
    }

    /// Detect format from file extension.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "png" => Some(ImageFormat::Png),
            "jpg" | "jpeg" => Some(ImageFormat::Jpeg),
            "webp" => Some(ImageFormat::WebP),
            _ => None,
        }
    }

    /// Detect format from magic bytes.
    pub fn from_magic_bytes(data: &[u8]) -> Option<Self> {
        if data.len() < 4 {
            return None;
        }

        // PNG: 89 50 4E 47
        if data.starts_with(&[0x89, 0x50, 0x4E, 0x47]) {
            return Some(ImageFormat::Png);
        }

        // JPEG: FF D8 FF
        if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
            return Some(ImageFormat::Jpeg);
        }

        // WebP: RIFF....WEBP
        if data.len() >= 12 && &data[0..4] == b"RIFF" && &data[8..12] == b"WEBP" {
            return Some(ImageFormat::WebP);
        }

        None
    }
}

/// A background image laid out on the surface.
///
/// Image bytes are kept base64-encoded so the scene stays a plain JSON string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackgroundImage {
    /// Top-left corner position.
    pub position: Point,
    /// Display width.
    pub width: f64,
    /// Display height.
    pub height: f64,
    /// Original image width in pixels.
    pub source_width: u32,
    /// Original image height in pixels.
    pub source_height: u32,
    /// Image format.
    pub format: ImageFormat,
    /// Image data as base64-encoded string.
    pub data_base64: String,
}

impl BackgroundImage {
    /// Create a background image at its natural size at the origin.
    pub fn new(data: &[u8], source_width: u32, source_height: u32, format: ImageFormat) -> Self {
        Self {
            position: Point::ZERO,
            width: source_width as f64,
            height: source_height as f64,
            source_width,
            source_height,
            format,
            data_base64: STANDARD.encode(data),
        }
    }

    /// Scale to fit the surface without distortion and centre it.
    pub fn fit_to_surface(mut self, surface: Size) -> Self {
        if self.source_width == 0 || self.source_height == 0 {
            return self;
        }
        let scale = (surface.width / self.source_width as f64)
            .min(surface.height / self.source_height as f64);
        self.width = self.source_width as f64 * scale;
        self.height = self.source_height as f64 * scale;
        self.position = Point::new(
            (surface.width - self.width) / 2.0,
            (surface.height - self.height) / 2.0,
        );
        self
    }

    /// Get the raw image data (decoded from base64).
    pub fn data(&self) -> Option<Vec<u8>> {
        STANDARD.decode(&self.data_base64).ok()
    }

    /// Get the bounding rectangle.
    pub fn bounds(&self) -> Rect {
        Rect::new(
            self.position.x,
            self.position.y,
            self.position.x + self.width,
            self.position.y + self.height,
        )
    }

    pub fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        self.bounds().inflate(tolerance, tolerance).contains(point)
    }

    /// Move the image by a delta.
    pub fn translate(&mut self, delta: Vec2) {
        self.position += delta;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_detection() {
        let png_header = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];
        assert_eq!(ImageFormat::from_magic_bytes(&png_header), Some(ImageFormat::Png));
        assert_eq!(ImageFormat::from_magic_bytes(&[0xFF, 0xD8, 0xFF, 0xE0]), Some(ImageFormat::Jpeg));
        assert_eq!(ImageFormat::from_magic_bytes(b"%PDF-1.7"), None);
        assert_eq!(ImageFormat::from_extension("JPG"), Some(ImageFormat::Jpeg));
        assert_eq!(ImageFormat::from_extension("gif"), None);
    }

    #[test]
    fn test_fit_wide_image() {
        // 1000x500 into 800x500: width-bound, centred vertically
        let img = BackgroundImage::new(&[1, 2, 3], 1000, 500, ImageFormat::Png)
            .fit_to_surface(Size::new(800.0, 500.0));
        assert!((img.width - 800.0).abs() < 1e-9);
        assert!((img.height - 400.0).abs() < 1e-9);
        assert!((img.position.x).abs() < 1e-9);
        assert!((img.position.y - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_fit_tall_image() {
        let img = BackgroundImage::new(&[1], 100, 1000, ImageFormat::Jpeg)
            .fit_to_surface(Size::new(800.0, 500.0));
        assert!((img.height - 500.0).abs() < 1e-9);
        assert!((img.width - 50.0).abs() < 1e-9);
        assert!((img.position.x - 375.0).abs() < 1e-9);
    }

    #[test]
    fn test_data_roundtrip() {
        let img = BackgroundImage::new(&[9, 8, 7], 1, 1, ImageFormat::Png);
        assert_eq!(img.data(), Some(vec![9, 8, 7]));
    }
}

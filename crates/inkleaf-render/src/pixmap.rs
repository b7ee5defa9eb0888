//! RGBA8 pixel buffer with source-over blending.

use inkleaf_core::RasterError;
use kurbo::Rect;
use peniko::Color;

/// Straight-alpha RGBA8 pixel buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pixmap {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl Pixmap {
    /// Create a pixmap filled with `fill`.
    pub fn new(width: u32, height: u32, fill: Color) -> Self {
        let rgba = fill.to_rgba8();
        let pixel = [rgba.r, rgba.g, rgba.b, rgba.a];
        let data = pixel.repeat(width as usize * height as usize);
        Self { width, height, data }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Pixel at (x, y), `None` outside the buffer.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = self.index(x, y);
        Some([self.data[i], self.data[i + 1], self.data[i + 2], self.data[i + 3]])
    }

    fn index(&self, x: u32, y: u32) -> usize {
        (y as usize * self.width as usize + x as usize) * 4
    }

    /// Composite `src` over the pixel at (x, y).
    pub fn blend_pixel(&mut self, x: u32, y: u32, src: [u8; 4]) {
        if x >= self.width || y >= self.height || src[3] == 0 {
            return;
        }
        let i = self.index(x, y);
        let sa = src[3] as f32 / 255.0;
        let da = self.data[i + 3] as f32 / 255.0;
        let out_a = sa + da * (1.0 - sa);
        if out_a <= 0.0 {
            return;
        }
        for c in 0..3 {
            let s = src[c] as f32 / 255.0;
            let d = self.data[i + c] as f32 / 255.0;
            let out = (s * sa + d * da * (1.0 - sa)) / out_a;
            self.data[i + c] = (out * 255.0).round() as u8;
        }
        self.data[i + 3] = (out_a * 255.0).round() as u8;
    }

    /// Blend `color` into every pixel whose centre lies in `rect`.
    pub fn fill_rect(&mut self, rect: Rect, color: [u8; 4]) {
        let Some((x0, y0, x1, y1)) = self.pixel_span(rect) else {
            return;
        };
        for y in y0..y1 {
            for x in x0..x1 {
                let (cx, cy) = (x as f64 + 0.5, y as f64 + 0.5);
                if cx >= rect.x0 && cx < rect.x1 && cy >= rect.y0 && cy < rect.y1 {
                    self.blend_pixel(x, y, color);
                }
            }
        }
    }

    /// Blend `color` into every pixel whose centre satisfies `covered`,
    /// scanning only pixels inside `bounds`. Each pixel is blended at most
    /// once, so overlapping geometry does not darken translucent colors.
    pub fn fill_where(&mut self, bounds: Rect, color: [u8; 4], covered: impl Fn(f64, f64) -> bool) {
        let Some((x0, y0, x1, y1)) = self.pixel_span(bounds) else {
            return;
        };
        for y in y0..y1 {
            for x in x0..x1 {
                if covered(x as f64 + 0.5, y as f64 + 0.5) {
                    self.blend_pixel(x, y, color);
                }
            }
        }
    }

    /// Pixel index range covering `rect`, clipped to the buffer.
    pub(crate) fn pixel_span(&self, rect: Rect) -> Option<(u32, u32, u32, u32)> {
        let x0 = rect.x0.floor().max(0.0);
        let y0 = rect.y0.floor().max(0.0);
        let x1 = rect.x1.ceil().min(self.width as f64);
        let y1 = rect.y1.ceil().min(self.height as f64);
        if x0 >= x1 || y0 >= y1 {
            return None;
        }
        Some((x0 as u32, y0 as u32, x1 as u32, y1 as u32))
    }

    /// Encode as PNG.
    pub fn to_png(&self) -> Result<Vec<u8>, RasterError> {
        encode_png(&self.data, self.width, self.height)
    }
}

/// Encode RGBA8 data as PNG.
pub fn encode_png(rgba_data: &[u8], width: u32, height: u32) -> Result<Vec<u8>, RasterError> {
    let mut png_data = Vec::new();
    {
        let mut encoder = png::Encoder::new(&mut png_data, width, height);
        encoder.set_color(png::ColorType::Rgba);
        encoder.set_depth(png::BitDepth::Eight);

        let mut writer = encoder
            .write_header()
            .map_err(|e| RasterError::Encode(format!("PNG header: {}", e)))?;
        writer
            .write_image_data(rgba_data)
            .map_err(|e| RasterError::Encode(format!("PNG data: {}", e)))?;
    }
    Ok(png_data)
}

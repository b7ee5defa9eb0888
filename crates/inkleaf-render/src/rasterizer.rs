//! Scene rasterizer.

use crate::pixmap::Pixmap;
use inkleaf_core::shapes::{
    BackgroundImage, Freehand, ImageFormat, Shape, Text, point_to_segment_dist,
};
use inkleaf_core::{ImageInfo, RasterError, Rasterizer, Scene};
use kurbo::{Affine, Point, Rect};
use peniko::Color;

/// Glyph cell height relative to the font size.
const GLYPH_HEIGHT_FACTOR: f64 = 0.7;

/// Renders scenes on the CPU.
///
/// Text is drawn as one solid cell per visible character; there is no font
/// backend.
#[derive(Debug, Clone)]
pub struct CpuRasterizer {
    /// Surface fill under the background.
    pub background_color: Color,
}

impl Default for CpuRasterizer {
    fn default() -> Self {
        Self {
            background_color: Color::WHITE,
        }
    }
}

impl CpuRasterizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rasterize `scene` scaled uniformly into a `width` x `height` pixmap.
    pub fn render(&self, scene: &Scene, width: u32, height: u32) -> Result<Pixmap, RasterError> {
        if width == 0 || height == 0 {
            return Err(RasterError::InvalidSize(width, height));
        }
        let mut pixmap = Pixmap::new(width, height, self.background_color);

        let (sw, sh) = (scene.size.width.max(1.0), scene.size.height.max(1.0));
        let scale = (width as f64 / sw).min(height as f64 / sh);
        let offset = ((width as f64 - sw * scale) / 2.0, (height as f64 - sh * scale) / 2.0);
        let transform = Affine::translate(offset) * Affine::scale(scale);

        if let Some(background) = &scene.background {
            draw_background(&mut pixmap, background, transform)?;
        }
        for shape in scene.objects() {
            match shape {
                Shape::Freehand(stroke) => draw_stroke(&mut pixmap, stroke, transform, scale),
                Shape::Text(text) => draw_text(&mut pixmap, text, transform),
            }
        }
        Ok(pixmap)
    }
}

impl Rasterizer for CpuRasterizer {
    fn probe(&self, bytes: &[u8]) -> Result<ImageInfo, RasterError> {
        let format = ImageFormat::from_magic_bytes(bytes).ok_or(RasterError::UnsupportedFormat)?;
        let decoded =
            image::load_from_memory(bytes).map_err(|e| RasterError::Decode(e.to_string()))?;
        Ok(ImageInfo {
            format,
            width: decoded.width(),
            height: decoded.height(),
        })
    }

    fn render_png(&self, scene: &Scene, width: u32, height: u32) -> Result<Vec<u8>, RasterError> {
        let pixmap = self.render(scene, width, height)?;
        log::debug!("Rendered scene at {}x{}", width, height);
        pixmap.to_png()
    }
}

fn rgba(color: Color) -> [u8; 4] {
    let c = color.to_rgba8();
    [c.r, c.g, c.b, c.a]
}

/// Decode the whole background, then sample it nearest-neighbour into its
/// placement rect. Any decode failure aborts the render.
fn draw_background(
    pixmap: &mut Pixmap,
    background: &BackgroundImage,
    transform: Affine,
) -> Result<(), RasterError> {
    let raw = background
        .data()
        .ok_or_else(|| RasterError::Decode("invalid base64 image data".to_string()))?;
    let decoded = image::load_from_memory(&raw)
        .map_err(|e| RasterError::Decode(e.to_string()))?
        .to_rgba8();
    let (src_w, src_h) = decoded.dimensions();
    if src_w == 0 || src_h == 0 {
        return Ok(());
    }

    let target = transform.transform_rect_bbox(background.bounds());
    let Some((x0, y0, x1, y1)) = pixmap.pixel_span(target) else {
        return Ok(());
    };
    for y in y0..y1 {
        let cy = y as f64 + 0.5;
        if cy < target.y0 || cy >= target.y1 {
            continue;
        }
        let v = ((cy - target.y0) / target.height() * src_h as f64) as u32;
        for x in x0..x1 {
            let cx = x as f64 + 0.5;
            if cx < target.x0 || cx >= target.x1 {
                continue;
            }
            let u = ((cx - target.x0) / target.width() * src_w as f64) as u32;
            let texel = decoded.get_pixel(u.min(src_w - 1), v.min(src_h - 1));
            pixmap.blend_pixel(x, y, texel.0);
        }
    }
    Ok(())
}

fn draw_stroke(pixmap: &mut Pixmap, stroke: &Freehand, transform: Affine, scale: f64) {
    if stroke.points.is_empty() {
        return;
    }
    let points: Vec<Point> = stroke.points.iter().map(|p| transform * *p).collect();
    let radius = (stroke.style.stroke_width * scale / 2.0).max(0.5);

    let bounds = points
        .iter()
        .fold(Rect::from_points(points[0], points[0]), |r, p| r.union_pt(*p))
        .inflate(radius, radius);

    let covered = |x: f64, y: f64| {
        let at = Point::new(x, y);
        if points.len() == 1 {
            return at.distance(points[0]) <= radius;
        }
        points
            .windows(2)
            .any(|seg| point_to_segment_dist(at, seg[0], seg[1]) <= radius)
    };
    pixmap.fill_where(bounds, rgba(stroke.style.stroke()), covered);
}

fn draw_text(pixmap: &mut Pixmap, text: &Text, transform: Affine) {
    let color = rgba(text.style.stroke());
    let (cell_w, line_h) = (text.font_size * 0.6, text.font_size * 1.2);
    let glyph_h = text.font_size * GLYPH_HEIGHT_FACTOR;

    for (row, line) in text.lines().enumerate() {
        let top = text.position.y + row as f64 * line_h + (line_h - glyph_h) / 2.0;
        for (col, c) in line.chars().enumerate() {
            if c.is_whitespace() {
                continue;
            }
            let left = text.position.x + col as f64 * cell_w;
            let cell = Rect::new(left + cell_w * 0.1, top, left + cell_w * 0.9, top + glyph_h);
            pixmap.fill_rect(transform.transform_rect_bbox(cell), color);
        }
    }
}

//! Editable text object.

use super::{ShapeId, ShapeStyle, ShapeTrait};
use kurbo::{Affine, Point, Rect};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Average glyph advance relative to the font size, used for approximate bounds.
const CHAR_WIDTH_FACTOR: f64 = 0.6;

/// Line height relative to the font size.
const LINE_HEIGHT_FACTOR: f64 = 1.2;

/// A text object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Text {
    pub(crate) id: ShapeId,
    /// Position (top-left corner of the text box).
    pub position: Point,
    /// The text content.
    pub content: String,
    /// Font size in pixels.
    pub font_size: f64,
    /// Style properties (stroke color is the text fill).
    pub style: ShapeStyle,
}

impl Text {
    /// Font size of newly placed text.
    pub const DEFAULT_FONT_SIZE: f64 = 24.0;

    /// Content of newly placed text.
    pub const PLACEHOLDER: &'static str = "Type here";

    /// Create a new text object.
    pub fn new(position: Point, content: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            position,
            content,
            font_size: Self::DEFAULT_FONT_SIZE,
            style: ShapeStyle::default(),
        }
    }

    /// Append a character at the end of the content.
    pub fn push_char(&mut self, c: char) {
        self.content.push(c);
    }

    /// Remove the last character. Returns false if already empty.
    pub fn pop_char(&mut self) -> bool {
        self.content.pop().is_some()
    }

    /// Lines of content (at least one).
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        let lines: Vec<&str> = if self.content.is_empty() {
            vec![""]
        } else {
            self.content.split('\n').collect()
        };
        lines.into_iter()
    }

    /// Approximate layout size (width, height) without a font backend.
    pub fn approximate_size(&self) -> (f64, f64) {
        let mut max_chars = 0usize;
        let mut line_count = 0usize;
        for line in self.lines() {
            max_chars = max_chars.max(line.chars().count());
            line_count += 1;
        }
        let width = (max_chars.max(1) as f64) * self.font_size * CHAR_WIDTH_FACTOR;
        let height = line_count as f64 * self.font_size * LINE_HEIGHT_FACTOR;
        (width, height)
    }
}

impl ShapeTrait for Text {
    fn id(&self) -> ShapeId {
        self.id
    }

    fn bounds(&self) -> Rect {
        let (width, height) = self.approximate_size();
        Rect::new(
            self.position.x,
            self.position.y,
            self.position.x + width,
            self.position.y + height,
        )
    }

    fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        self.bounds().inflate(tolerance, tolerance).contains(point)
    }

    fn style(&self) -> &ShapeStyle {
        &self.style
    }

    fn style_mut(&mut self) -> &mut ShapeStyle {
        &mut self.style
    }

    fn transform(&mut self, affine: Affine) {
        self.position = affine * self.position;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_editing() {
        let mut text = Text::new(Point::ZERO, String::new());
        text.push_char('h');
        text.push_char('i');
        assert_eq!(text.content, "hi");
        assert!(text.pop_char());
        assert!(text.pop_char());
        assert!(!text.pop_char());
    }

    #[test]
    fn test_bounds_grow_with_content() {
        let short = Text::new(Point::ZERO, "ab".to_string());
        let long = Text::new(Point::ZERO, "abcdef".to_string());
        assert!(long.bounds().width() > short.bounds().width());

        let two_lines = Text::new(Point::ZERO, "ab\ncd".to_string());
        assert!((two_lines.bounds().height() - 2.0 * short.bounds().height()).abs() < 1e-9);
    }

    #[test]
    fn test_hit_test() {
        let text = Text::new(Point::new(100.0, 100.0), Text::PLACEHOLDER.to_string());
        assert!(text.hit_test(Point::new(105.0, 110.0), 0.0));
        assert!(!text.hit_test(Point::new(90.0, 90.0), 0.0));
    }
}

//! The annotated worksheet: background plus drawable objects.

use crate::shapes::{BackgroundImage, Shape, ShapeId};
use kurbo::{Point, Rect, Size};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default surface size.
pub const DEFAULT_SURFACE_SIZE: Size = Size::new(800.0, 500.0);

/// Scene (de)serialization errors.
#[derive(Debug, Error)]
pub enum SceneError {
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// What a pointer landed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hit {
    /// A drawable object.
    Object(ShapeId),
    /// The background image (under every object).
    Background,
}

/// A worksheet scene.
///
/// Objects are kept in a vector in z-order (back to front) so serialization
/// is deterministic: the same scene always produces the same string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    /// Surface size in scene units.
    pub size: Size,
    /// Locked-or-not background layer.
    #[serde(default)]
    pub background: Option<BackgroundImage>,
    /// Drawable objects, back to front.
    #[serde(default)]
    objects: Vec<Shape>,
}

impl Default for Scene {
    fn default() -> Self {
        Self::new(DEFAULT_SURFACE_SIZE)
    }
}

impl Scene {
    /// Create an empty scene of the given size.
    pub fn new(size: Size) -> Self {
        Self {
            size,
            background: None,
            objects: Vec::new(),
        }
    }

    /// Add an object on top.
    pub fn add(&mut self, shape: Shape) -> ShapeId {
        let id = shape.id();
        self.objects.push(shape);
        id
    }

    /// Remove an object.
    pub fn remove(&mut self, id: ShapeId) -> Option<Shape> {
        let index = self.objects.iter().position(|s| s.id() == id)?;
        Some(self.objects.remove(index))
    }

    /// Get an object by ID.
    pub fn get(&self, id: ShapeId) -> Option<&Shape> {
        self.objects.iter().find(|s| s.id() == id)
    }

    /// Get a mutable reference to an object by ID.
    pub fn get_mut(&mut self, id: ShapeId) -> Option<&mut Shape> {
        self.objects.iter_mut().find(|s| s.id() == id)
    }

    /// Objects in z-order (back to front).
    pub fn objects(&self) -> &[Shape] {
        &self.objects
    }

    /// Remove all objects, keeping the background.
    pub fn clear_objects(&mut self) {
        self.objects.clear();
    }

    /// Check if the scene has neither objects nor background.
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty() && self.background.is_none()
    }

    /// Get the number of objects.
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Topmost thing under `point`: objects front to back, then the background.
    pub fn hit_test(&self, point: Point, tolerance: f64) -> Option<Hit> {
        self.objects
            .iter()
            .rev()
            .find(|s| s.hit_test(point, tolerance))
            .map(|s| Hit::Object(s.id()))
            .or_else(|| {
                self.background
                    .as_ref()
                    .filter(|bg| bg.hit_test(point, tolerance))
                    .map(|_| Hit::Background)
            })
    }

    /// Get the bounding box of all objects.
    pub fn bounds(&self) -> Option<Rect> {
        self.objects
            .iter()
            .map(Shape::bounds)
            .reduce(|a, b| a.union(b))
    }

    /// Serialize the scene to JSON.
    pub fn to_json(&self) -> Result<String, SceneError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Deserialize a scene from JSON.
    pub fn from_json(json: &str) -> Result<Self, SceneError> {
        Ok(serde_json::from_str(json)?)
    }
}

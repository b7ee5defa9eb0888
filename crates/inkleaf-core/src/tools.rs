//! Tool state machine.
//!
//! Exactly one mode is live at a time. Selecting a tool always drops any
//! in-flight gesture and any pending text placement before the new mode
//! applies. Pointer events are translated into [`ToolEffect`]s which the
//! controller applies to the scene.

use crate::scene::{Hit, Scene};
use crate::shapes::{Freehand, SerializableColor, ShapeId, ShapeStyle};
use kurbo::{Point, Vec2};
use serde::{Deserialize, Serialize};

/// Colors cycled through by the color button.
pub const PALETTE: [SerializableColor; 5] = [
    SerializableColor::new(0, 0, 0, 255),
    SerializableColor::new(0, 0, 255, 255),
    SerializableColor::new(255, 0, 0, 255),
    SerializableColor::new(0, 128, 0, 255),
    SerializableColor::new(255, 255, 0, 255),
];

/// Highlighter color, `rgba(255,255,0,0.4)`, independent of the palette.
pub const HIGHLIGHT_COLOR: SerializableColor = SerializableColor::new(255, 255, 0, 102);

/// Pencil stroke width.
pub const PENCIL_WIDTH: f64 = 3.0;

/// Highlighter stroke width.
pub const HIGHLIGHT_WIDTH: f64 = 15.0;

/// Hit tolerance for erase and selection clicks.
pub const HIT_TOLERANCE: f64 = 4.0;

/// Tools offered by the toolbar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ToolKind {
    #[default]
    None,
    Pencil,
    Highlight,
    Erase,
    Text,
}

impl ToolKind {
    /// Parse a toolbar name.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "none" | "select" => Some(ToolKind::None),
            "pencil" | "pen" => Some(ToolKind::Pencil),
            "highlight" | "highlighter" => Some(ToolKind::Highlight),
            "erase" | "eraser" => Some(ToolKind::Erase),
            "text" => Some(ToolKind::Text),
            _ => None,
        }
    }
}

/// Live mode of the machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ToolState {
    #[default]
    None,
    Pencil,
    Highlight,
    Erase,
    /// Armed for exactly one text placement.
    TextPending,
}

/// Pointer interaction in progress.
#[derive(Debug, Clone, Default)]
enum Gesture {
    #[default]
    Idle,
    /// Stroke being drawn (preview only until pointer-up).
    Stroke(Freehand),
    /// Selection being dragged.
    Drag { target: Hit, last: Point, moved: bool },
}

/// What the controller should do in response to a pointer event.
#[derive(Debug, Clone, PartialEq)]
pub enum ToolEffect {
    /// Nothing to apply.
    None,
    /// Create editable text at this point and start editing it.
    PlaceText(Point),
    /// Delete this object.
    Erase(ShapeId),
    /// Erase was aimed at the background, which is never erasable.
    EraseRefused,
    /// Change the selection (`None` deselects).
    Select(Option<Hit>),
    /// Transient move of the selection by `delta`.
    Drag { target: Hit, delta: Vec2 },
    /// Stroke finished: add it to the scene.
    FinishStroke(Freehand),
    /// Drag finished: apply the last `delta` and commit the modification.
    FinishDrag { target: Hit, delta: Vec2 },
}

/// Manages the current tool and its in-flight gesture.
#[derive(Debug, Clone, Default)]
pub struct ToolMachine {
    state: ToolState,
    gesture: Gesture,
}

impl ToolMachine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Switch tools. Any gesture and pending placement are discarded.
    pub fn select(&mut self, tool: ToolKind) {
        self.gesture = Gesture::Idle;
        self.state = match tool {
            ToolKind::None => ToolState::None,
            ToolKind::Pencil => ToolState::Pencil,
            ToolKind::Highlight => ToolState::Highlight,
            ToolKind::Erase => ToolState::Erase,
            ToolKind::Text => ToolState::TextPending,
        };
        log::debug!("Tool: {:?}", self.state);
    }

    pub fn state(&self) -> ToolState {
        self.state
    }

    /// The toolbar tool corresponding to the live state.
    pub fn kind(&self) -> ToolKind {
        match self.state {
            ToolState::None => ToolKind::None,
            ToolState::Pencil => ToolKind::Pencil,
            ToolState::Highlight => ToolKind::Highlight,
            ToolState::Erase => ToolKind::Erase,
            ToolState::TextPending => ToolKind::Text,
        }
    }

    /// Whether a click will place text.
    pub fn is_text_pending(&self) -> bool {
        self.state == ToolState::TextPending
    }

    /// Whether free drawing is enabled.
    pub fn is_drawing_mode(&self) -> bool {
        matches!(self.state, ToolState::Pencil | ToolState::Highlight)
    }

    /// Brush for the drawing modes, `None` otherwise.
    pub fn brush(&self, color: SerializableColor) -> Option<ShapeStyle> {
        match self.state {
            ToolState::Pencil => Some(ShapeStyle::new(color, PENCIL_WIDTH)),
            ToolState::Highlight => Some(ShapeStyle::new(HIGHLIGHT_COLOR, HIGHLIGHT_WIDTH)),
            _ => None,
        }
    }

    /// Stroke preview while drawing.
    pub fn preview(&self) -> Option<&Freehand> {
        match &self.gesture {
            Gesture::Stroke(stroke) => Some(stroke),
            _ => None,
        }
    }

    /// Check if a gesture is in progress.
    pub fn is_active(&self) -> bool {
        !matches!(self.gesture, Gesture::Idle)
    }

    /// Re-color the stroke being drawn (pencil only).
    pub fn recolor_preview(&mut self, color: SerializableColor) {
        if self.state == ToolState::Pencil {
            if let Gesture::Stroke(stroke) = &mut self.gesture {
                stroke.style.stroke_color = color;
            }
        }
    }

    /// Drop the in-flight gesture without applying it.
    pub fn cancel(&mut self) {
        self.gesture = Gesture::Idle;
    }

    /// Pointer pressed at `point` (scene coordinates).
    pub fn pointer_down(
        &mut self,
        point: Point,
        scene: &Scene,
        color: SerializableColor,
        background_locked: bool,
    ) -> ToolEffect {
        self.gesture = Gesture::Idle;
        match self.state {
            ToolState::TextPending => {
                // One-shot: disarm before anything else can observe it.
                self.state = ToolState::None;
                ToolEffect::PlaceText(point)
            }
            ToolState::Pencil | ToolState::Highlight => {
                if let Some(brush) = self.brush(color) {
                    self.gesture = Gesture::Stroke(Freehand::from_points(vec![point], brush));
                }
                ToolEffect::None
            }
            ToolState::Erase => match scene.hit_test(point, HIT_TOLERANCE) {
                Some(Hit::Object(id)) => ToolEffect::Erase(id),
                Some(Hit::Background) => {
                    log::info!("Background is not erasable");
                    ToolEffect::EraseRefused
                }
                None => ToolEffect::None,
            },
            ToolState::None => {
                let hit = scene
                    .hit_test(point, HIT_TOLERANCE)
                    .filter(|hit| !(background_locked && *hit == Hit::Background));
                if let Some(target) = hit {
                    self.gesture = Gesture::Drag {
                        target,
                        last: point,
                        moved: false,
                    };
                }
                ToolEffect::Select(hit)
            }
        }
    }

    /// Pointer moved to `point` (scene coordinates).
    pub fn pointer_move(&mut self, point: Point) -> ToolEffect {
        match &mut self.gesture {
            Gesture::Stroke(stroke) => {
                if stroke.points.last() != Some(&point) {
                    stroke.add_point(point);
                }
                ToolEffect::None
            }
            Gesture::Drag { target, last, moved } => {
                let delta = point - *last;
                if delta == Vec2::ZERO {
                    return ToolEffect::None;
                }
                *last = point;
                *moved = true;
                ToolEffect::Drag {
                    target: *target,
                    delta,
                }
            }
            Gesture::Idle => ToolEffect::None,
        }
    }

    /// Pointer released at `point` (scene coordinates).
    pub fn pointer_up(&mut self, point: Point) -> ToolEffect {
        match std::mem::take(&mut self.gesture) {
            Gesture::Stroke(mut stroke) => {
                if stroke.points.last() != Some(&point) {
                    stroke.add_point(point);
                }
                ToolEffect::FinishStroke(stroke)
            }
            Gesture::Drag { target, last, moved } => {
                let delta = point - last;
                if moved || delta != Vec2::ZERO {
                    ToolEffect::FinishDrag { target, delta }
                } else {
                    ToolEffect::None
                }
            }
            Gesture::Idle => ToolEffect::None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shapes::{BackgroundImage, ImageFormat, Shape};

    const BLACK: SerializableColor = PALETTE[0];

    fn scene_with_stroke() -> (Scene, ShapeId) {
        let mut scene = Scene::default();
        let id = scene.add(Shape::Freehand(Freehand::from_points(
            vec![Point::new(0.0, 50.0), Point::new(100.0, 50.0)],
            ShapeStyle::default(),
        )));
        (scene, id)
    }

    #[test]
    fn test_pencil_and_highlight_brushes() {
        let mut tools = ToolMachine::new();
        tools.select(ToolKind::Pencil);
        assert_eq!(tools.brush(PALETTE[2]), Some(ShapeStyle::new(PALETTE[2], 3.0)));

        tools.select(ToolKind::Highlight);
        // Palette color is ignored by the highlighter
        assert_eq!(tools.brush(PALETTE[2]), Some(ShapeStyle::new(HIGHLIGHT_COLOR, 15.0)));

        tools.select(ToolKind::Erase);
        assert_eq!(tools.brush(PALETTE[2]), None);
        assert!(!tools.is_drawing_mode());
    }

    #[test]
    fn test_stroke_gesture() {
        let mut tools = ToolMachine::new();
        tools.select(ToolKind::Pencil);
        let scene = Scene::default();

        assert_eq!(tools.pointer_down(Point::new(1.0, 1.0), &scene, BLACK, true), ToolEffect::None);
        tools.pointer_move(Point::new(2.0, 2.0));
        tools.pointer_move(Point::new(2.0, 2.0));
        assert_eq!(tools.preview().unwrap().len(), 2);

        match tools.pointer_up(Point::new(3.0, 3.0)) {
            ToolEffect::FinishStroke(stroke) => {
                assert_eq!(stroke.points.len(), 3);
                assert_eq!(stroke.style.stroke_width, PENCIL_WIDTH);
            }
            other => panic!("unexpected {:?}", other),
        }
        assert!(!tools.is_active());
    }

    #[test]
    fn test_text_placement_is_one_shot() {
        let mut tools = ToolMachine::new();
        tools.select(ToolKind::Text);
        let scene = Scene::default();

        let at = Point::new(40.0, 60.0);
        assert_eq!(tools.pointer_down(at, &scene, BLACK, true), ToolEffect::PlaceText(at));
        assert_eq!(tools.kind(), ToolKind::None);
        assert!(!matches!(
            tools.pointer_down(at, &scene, BLACK, true),
            ToolEffect::PlaceText(_)
        ));
    }

    #[test]
    fn test_selecting_another_tool_disarms_text() {
        for next in [ToolKind::Erase, ToolKind::Pencil, ToolKind::Highlight, ToolKind::None] {
            let mut tools = ToolMachine::new();
            tools.select(ToolKind::Text);
            tools.select(next);
            assert!(!tools.is_text_pending());
            let effect = tools.pointer_down(Point::new(5.0, 5.0), &Scene::default(), BLACK, true);
            assert!(!matches!(effect, ToolEffect::PlaceText(_)), "after {:?}", next);
        }
    }

    #[test]
    fn test_switching_tool_drops_stroke() {
        let mut tools = ToolMachine::new();
        tools.select(ToolKind::Pencil);
        tools.pointer_down(Point::ZERO, &Scene::default(), BLACK, true);
        tools.select(ToolKind::Erase);
        assert!(tools.preview().is_none());
        assert_eq!(tools.pointer_up(Point::ZERO), ToolEffect::None);
    }

    #[test]
    fn test_erase_hits_object() {
        let (scene, id) = scene_with_stroke();
        let mut tools = ToolMachine::new();
        tools.select(ToolKind::Erase);
        assert_eq!(
            tools.pointer_down(Point::new(50.0, 51.0), &scene, BLACK, true),
            ToolEffect::Erase(id)
        );
        assert_eq!(
            tools.pointer_down(Point::new(50.0, 300.0), &scene, BLACK, true),
            ToolEffect::None
        );
    }

    #[test]
    fn test_erase_refuses_background() {
        let mut scene = Scene::default();
        scene.background = Some(BackgroundImage::new(&[0], 800, 500, ImageFormat::Png));
        let mut tools = ToolMachine::new();
        tools.select(ToolKind::Erase);
        // Unlocked or not, the background is never erased
        assert_eq!(
            tools.pointer_down(Point::new(10.0, 10.0), &scene, BLACK, false),
            ToolEffect::EraseRefused
        );
    }

    #[test]
    fn test_select_and_drag() {
        let (scene, id) = scene_with_stroke();
        let mut tools = ToolMachine::new();

        assert_eq!(
            tools.pointer_down(Point::new(10.0, 50.0), &scene, BLACK, true),
            ToolEffect::Select(Some(Hit::Object(id)))
        );
        assert_eq!(
            tools.pointer_move(Point::new(15.0, 60.0)),
            ToolEffect::Drag { target: Hit::Object(id), delta: Vec2::new(5.0, 10.0) }
        );
        assert_eq!(
            tools.pointer_up(Point::new(16.0, 60.0)),
            ToolEffect::FinishDrag { target: Hit::Object(id), delta: Vec2::new(1.0, 0.0) }
        );
    }

    #[test]
    fn test_click_without_move_does_not_commit() {
        let (scene, _) = scene_with_stroke();
        let mut tools = ToolMachine::new();
        tools.pointer_down(Point::new(10.0, 50.0), &scene, BLACK, true);
        assert_eq!(tools.pointer_up(Point::new(10.0, 50.0)), ToolEffect::None);
    }

    #[test]
    fn test_locked_background_not_selectable() {
        let mut scene = Scene::default();
        scene.background = Some(BackgroundImage::new(&[0], 800, 500, ImageFormat::Png));
        let mut tools = ToolMachine::new();

        assert_eq!(tools.pointer_down(Point::new(10.0, 10.0), &scene, BLACK, true), ToolEffect::Select(None));
        assert_eq!(
            tools.pointer_down(Point::new(10.0, 10.0), &scene, BLACK, false),
            ToolEffect::Select(Some(Hit::Background))
        );
    }

    #[test]
    fn test_tool_names() {
        assert_eq!(ToolKind::from_name("Pencil"), Some(ToolKind::Pencil));
        assert_eq!(ToolKind::from_name("eraser"), Some(ToolKind::Erase));
        assert_eq!(ToolKind::from_name("lasso"), None);
    }
}

//! End-to-end session scenarios over a persistent store.

use inkleaf_core::clock::Duration;
use inkleaf_core::storage::{DocumentId, FileStore, KeyValueStore, MemoryStore};
use inkleaf_core::{
    Controller, EditorConfig, ImageInfo, ManualClock, RasterError, Rasterizer, Scene, ToolKind,
    View,
};
use kurbo::Point;
use std::sync::Arc;

struct StubRasterizer;

impl Rasterizer for StubRasterizer {
    fn probe(&self, _bytes: &[u8]) -> Result<ImageInfo, RasterError> {
        Err(RasterError::UnsupportedFormat)
    }

    fn render_png(&self, scene: &Scene, _w: u32, _h: u32) -> Result<Vec<u8>, RasterError> {
        Ok(vec![scene.len() as u8])
    }
}

fn start<S: KeyValueStore>(store: S, clock: &Arc<ManualClock>) -> Controller<S, StubRasterizer> {
    Controller::startup(store, StubRasterizer, Box::new(clock.clone()), EditorConfig::default())
        .unwrap()
}

fn draw<S: KeyValueStore>(controller: &mut Controller<S, StubRasterizer>, points: &[Point]) {
    controller.select_tool(ToolKind::Pencil);
    controller.pointer_down(points[0]);
    for point in &points[1..points.len() - 1] {
        controller.pointer_move(*point);
    }
    controller.pointer_up(points[points.len() - 1]);
}

#[test]
fn test_create_draw_wait_reload_open() {
    let dir = tempfile::tempdir().unwrap();
    let clock = Arc::new(ManualClock::new());
    let points = [Point::new(10.0, 10.0), Point::new(40.0, 30.0), Point::new(80.0, 20.0)];

    let owner = {
        let mut controller = start(FileStore::new(dir.path().to_path_buf()).unwrap(), &clock);
        controller.create_new_doc("sheet1").unwrap();
        draw(&mut controller, &points);
        clock.advance(Duration::from_millis(600));
        assert!(controller.tick().is_some());
        controller.owner().to_string()
    };

    // Fresh start on the same storage
    let mut controller = start(FileStore::new(dir.path().to_path_buf()).unwrap(), &clock);
    assert_eq!(controller.owner(), owner);
    assert_eq!(controller.view(), View::Library);

    let library = controller.library().unwrap();
    assert_eq!(library.len(), 1);
    assert_eq!(library[0].name, "sheet1");
    assert!(library[0].thumbnail.is_some());

    controller.load_doc("sheet1").unwrap();
    let scene = controller.scene();
    assert_eq!(scene.len(), 1);
    let stroke = scene.objects()[0].as_freehand().unwrap();
    assert_eq!(stroke.points, points.to_vec());
}

#[test]
fn test_undo_k_then_redo_k() {
    let clock = Arc::new(ManualClock::new());
    let mut controller = start(MemoryStore::new(), &clock);
    controller.create_new_doc("a").unwrap();

    let mut snapshots = vec![controller.scene().to_json().unwrap()];
    for i in 0..4 {
        let y = 50.0 + i as f64 * 30.0;
        draw(&mut controller, &[Point::new(10.0, y), Point::new(90.0, y)]);
        snapshots.push(controller.scene().to_json().unwrap());
    }

    for k in 1..=4 {
        controller.undo();
        assert_eq!(controller.scene().to_json().unwrap(), snapshots[4 - k]);
    }
    for k in 1..=4 {
        controller.redo();
        assert_eq!(controller.scene().to_json().unwrap(), snapshots[k]);
    }
}

#[test]
fn test_edit_after_undo_discards_redo() {
    let clock = Arc::new(ManualClock::new());
    let mut controller = start(MemoryStore::new(), &clock);
    controller.create_new_doc("a").unwrap();
    draw(&mut controller, &[Point::new(10.0, 10.0), Point::new(90.0, 10.0)]);
    draw(&mut controller, &[Point::new(10.0, 60.0), Point::new(90.0, 60.0)]);

    controller.undo();
    draw(&mut controller, &[Point::new(10.0, 120.0), Point::new(90.0, 120.0)]);
    let after_edit = controller.scene().to_json().unwrap();

    controller.redo();
    assert_eq!(controller.scene().to_json().unwrap(), after_edit);
    assert!(!controller.history().can_redo());
}

#[test]
fn test_library_is_namespaced_per_device() {
    let store = Arc::new(MemoryStore::new());
    let clock = Arc::new(ManualClock::new());
    let mut controller = start(store.clone(), &clock);
    controller.create_new_doc("mine").unwrap();

    // Another device's documents in the same storage
    let other = DocumentId::new("student-other", "theirs").unwrap();
    store.set(&other.content_key(), "{}").unwrap();
    store.set(&other.thumbnail_key(), "data:").unwrap();

    let names: Vec<String> = controller.library().unwrap().into_iter().map(|e| e.name).collect();
    assert_eq!(names, vec!["mine".to_string()]);
}

#[test]
fn test_library_skips_unreadable_names() {
    let store = Arc::new(MemoryStore::new());
    let clock = Arc::new(ManualClock::new());
    let mut controller = start(store.clone(), &clock);
    controller.create_new_doc("mine").unwrap();

    // Written by hand, not a valid document name
    store.set(&format!("{}-doc-   ", controller.owner()), "{}").unwrap();

    let names: Vec<String> = controller.library().unwrap().into_iter().map(|e| e.name).collect();
    assert_eq!(names, vec!["mine".to_string()]);
}

#[test]
fn test_delete_removes_content_and_thumbnail() {
    let store = Arc::new(MemoryStore::new());
    let clock = Arc::new(ManualClock::new());
    let mut controller = start(store.clone(), &clock);
    controller.create_new_doc("gone").unwrap();
    let id = DocumentId::new(controller.owner(), "gone").unwrap();
    assert!(store.get(&id.thumbnail_key()).unwrap().is_some());

    controller.delete_doc("gone").unwrap();
    assert_eq!(store.get(&id.content_key()).unwrap(), None);
    assert_eq!(store.get(&id.thumbnail_key()).unwrap(), None);
    assert!(controller.active_document().is_none());
}

#[test]
fn test_tool_switch_cancels_pending_text() {
    let clock = Arc::new(ManualClock::new());
    let mut controller = start(MemoryStore::new(), &clock);
    controller.create_new_doc("a").unwrap();

    for next in [ToolKind::None, ToolKind::Pencil, ToolKind::Highlight, ToolKind::Erase] {
        controller.select_tool(ToolKind::Text);
        controller.select_tool(next);
        controller.pointer_down(Point::new(200.0, 200.0));
        controller.pointer_up(Point::new(200.0, 200.0));
        assert!(controller.scene().objects().iter().all(|s| s.as_text().is_none()));
    }
}

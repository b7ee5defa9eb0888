//! Scene-changed notification and its listeners.
//!
//! Every committed mutation produces exactly one [`SceneChange`]. The scene is
//! serialized once and the same snapshot is handed to each listener in turn,
//! so no listener observes another listener's side effects.

use crate::clock::Instant;
use crate::shapes::ShapeId;

/// A committed scene mutation.
///
/// Transient frames (stroke preview, drag in progress) never produce one, and
/// restoring a snapshot for undo/redo never produces one either.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneChange {
    /// An object was added.
    Added(ShapeId),
    /// An object's geometry, style or content changed.
    Modified(ShapeId),
    /// An object was removed.
    Removed(ShapeId),
    /// The background image was replaced, moved or removed.
    Background,
    /// The whole scene was replaced (new import clears annotations).
    Replaced,
}

/// A subscriber to scene-changed notifications.
pub trait SceneListener {
    /// Called once per committed mutation with the post-mutation snapshot.
    fn scene_changed(&mut self, change: SceneChange, snapshot: &str, now: Instant);
}

/// Fan a notification out to every listener in order.
pub fn notify(listeners: &mut [&mut dyn SceneListener], change: SceneChange, snapshot: &str, now: Instant) {
    log::debug!("Scene changed: {:?}", change);
    for listener in listeners.iter_mut() {
        listener.scene_changed(change, snapshot, now);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Recorder {
        seen: Vec<(SceneChange, String)>,
    }

    impl SceneListener for Recorder {
        fn scene_changed(&mut self, change: SceneChange, snapshot: &str, _now: Instant) {
            self.seen.push((change, snapshot.to_string()));
        }
    }

    #[test]
    fn test_every_listener_sees_the_same_snapshot() {
        let mut a = Recorder::default();
        let mut b = Recorder::default();
        notify(&mut [&mut a, &mut b], SceneChange::Replaced, "{}", Instant::now());

        assert_eq!(a.seen, vec![(SceneChange::Replaced, "{}".to_string())]);
        assert_eq!(a.seen, b.seen);
    }
}

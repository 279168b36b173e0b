//! Shared scroll-progress state.
//!
//! Scenes publish a normalized 0..1 value; unrelated consumers read the
//! retained last value or subscribe to changes. The store is deliberately a
//! message bus with retained-value semantics rather than an event stream:
//! identical writes are swallowed so consumers keyed on value identity never
//! re-fire for a no-op.

use std::collections::BTreeMap;

type Listener = Box<dyn FnMut(&str, f32)>;

/// Keyed map of last-known normalized progress, one writer per key.
///
/// Created empty at startup and owned by the host for the application
/// lifetime. The setter clamps to `[0, 1]` and de-duplicates: listeners are
/// notified only when the clamped value actually changed.
#[derive(Default)]
pub struct ProgressStore {
    progress_by_id: BTreeMap<String, f32>,
    listeners: Vec<Listener>,
}

impl ProgressStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a change listener, invoked with `(scene_id, value)` after
    /// every effective update.
    pub fn subscribe(&mut self, listener: impl FnMut(&str, f32) + 'static) {
        self.listeners.push(Box::new(listener));
    }

    /// Records `value` for `scene_id`, clamped to `[0, 1]`.
    ///
    /// Returns true when the stored value changed. Re-setting the same
    /// clamped value mutates nothing and notifies nobody. Non-finite input
    /// is treated as zero rather than poisoning the map.
    pub fn set_progress(&mut self, scene_id: &str, value: f32) -> bool {
        let clamped = if value.is_finite() {
            value.clamp(0.0, 1.0)
        } else {
            tracing::warn!(scene_id, value, "non-finite progress coerced to 0");
            0.0
        };

        if self.progress_by_id.get(scene_id) == Some(&clamped) {
            return false;
        }

        self.progress_by_id.insert(scene_id.to_string(), clamped);
        for listener in &mut self.listeners {
            listener(scene_id, clamped);
        }
        true
    }

    /// Last-known progress for a scene, if it ever published.
    pub fn progress(&self, scene_id: &str) -> Option<f32> {
        self.progress_by_id.get(scene_id).copied()
    }

    /// Read-only view of every retained value.
    pub fn progress_by_id(&self) -> &BTreeMap<String, f32> {
        &self.progress_by_id
    }
}

/// Maps one region's scroll offset to normalized progress for one scene.
///
/// The publisher performs the region's own normalization
/// (`offset / max_scroll`, zero when the content fits) and reports a value
/// only on change; the store's clamp/de-dup then guards the shared map.
#[derive(Debug)]
pub struct ProgressPublisher {
    scene_id: String,
    last: Option<f32>,
}

impl ProgressPublisher {
    pub fn new(scene_id: impl Into<String>) -> Self {
        Self {
            scene_id: scene_id.into(),
            last: None,
        }
    }

    pub fn scene_id(&self) -> &str {
        &self.scene_id
    }

    /// Normalizes `offset` against `max_scroll` and forwards it into the
    /// store. Returns the published value when it changed since the last
    /// call, `None` on a no-op.
    pub fn publish(
        &mut self,
        max_scroll: f32,
        offset: f32,
        store: &mut ProgressStore,
    ) -> Option<f32> {
        let value = if max_scroll > 0.0 {
            (offset / max_scroll).clamp(0.0, 1.0)
        } else {
            0.0
        };

        if self.last == Some(value) {
            return None;
        }
        self.last = Some(value);
        store.set_progress(&self.scene_id, value);
        Some(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn setter_clamps_into_unit_interval() {
        let mut store = ProgressStore::new();
        store.set_progress("nature", 1.7);
        assert_eq!(store.progress("nature"), Some(1.0));
        store.set_progress("nature", -0.3);
        assert_eq!(store.progress("nature"), Some(0.0));
        store.set_progress("nature", f32::NAN);
        assert_eq!(store.progress("nature"), Some(0.0));
    }

    #[test]
    fn duplicate_write_is_a_single_observable_update() {
        let mut store = ProgressStore::new();
        let fired = Rc::new(Cell::new(0u32));
        let counter = fired.clone();
        store.subscribe(move |_, _| counter.set(counter.get() + 1));

        assert!(store.set_progress("nature", 0.42));
        assert!(!store.set_progress("nature", 0.42));
        assert_eq!(fired.get(), 1);
    }

    #[test]
    fn clamped_duplicates_also_dedup() {
        let mut store = ProgressStore::new();
        assert!(store.set_progress("void", 2.0));
        // 3.0 clamps to the same stored 1.0, so nothing changes.
        assert!(!store.set_progress("void", 3.0));
    }

    #[test]
    fn listeners_see_scene_and_value() {
        let mut store = ProgressStore::new();
        let seen = Rc::new(Cell::new(0.0f32));
        let sink = seen.clone();
        store.subscribe(move |id, value| {
            assert_eq!(id, "ember");
            sink.set(value);
        });
        store.set_progress("ember", 0.25);
        assert_eq!(seen.get(), 0.25);
    }

    #[test]
    fn publisher_normalizes_by_its_region() {
        let mut store = ProgressStore::new();
        let mut publisher = ProgressPublisher::new("nature");

        assert_eq!(publisher.publish(2000.0, 500.0, &mut store), Some(0.25));
        assert_eq!(store.progress("nature"), Some(0.25));

        // Same offset again: no change surfaces anywhere.
        assert_eq!(publisher.publish(2000.0, 500.0, &mut store), None);

        // Offsets beyond the range clamp at the edges.
        assert_eq!(publisher.publish(2000.0, 9000.0, &mut store), Some(1.0));
    }

    #[test]
    fn non_scrollable_region_publishes_zero() {
        let mut store = ProgressStore::new();
        let mut publisher = ProgressPublisher::new("flat");
        assert_eq!(publisher.publish(0.0, 300.0, &mut store), Some(0.0));
        assert_eq!(store.progress("flat"), Some(0.0));
    }
}

// crates/quicktrim-core/src/pointer.rs
//
// Drag state machine for the trim handles. The host widget resolves which
// handle a pointer-down landed on and feeds raw pointer x-coordinates in;
// the controller maps them to times and routes every mutation through
// TimelineModel's setters. Track geometry is passed in explicitly (at
// construction and on relayout) — nothing is looked up at interaction time.
//
// States: Idle, DraggingStart, DraggingEnd. pointer_up and pointer_cancel
// both return to Idle, so teardown on any exit path leaves no drag active.

use crate::timeline::TimelineModel;

/// Which trim handle a drag is operating on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Handle {
    Start,
    End,
}

/// Horizontal extent of the timeline track in the host's coordinate space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TrackGeometry {
    pub left:  f32,
    pub width: f32,
}

pub struct PointerController {
    geometry: TrackGeometry,
    active:   Option<Handle>,
}

impl PointerController {
    pub fn new(geometry: TrackGeometry) -> Self {
        Self { geometry, active: None }
    }

    /// Update geometry after a relayout. Safe mid-drag; the next
    /// pointer_move uses the fresh extent.
    pub fn set_geometry(&mut self, geometry: TrackGeometry) {
        self.geometry = geometry;
    }

    pub fn active_handle(&self) -> Option<Handle> {
        self.active
    }

    pub fn is_dragging(&self) -> bool {
        self.active.is_some()
    }

    /// Pointer pressed on a handle: enter the drag and return the time at
    /// the pointer for an immediate live-preview seek. The range itself is
    /// not mutated until the first pointer_move.
    pub fn pointer_down(
        &mut self,
        handle: Handle,
        x: f32,
        model: &TimelineModel,
    ) -> Option<f64> {
        self.active = Some(handle);
        self.time_at(x, model.duration())
    }

    /// Pointer moved while a handle is held: clamp the pointer into the
    /// track, map to a time, push it through the model's setter and return
    /// the time for the live-preview seek. No-op when Idle, when the track
    /// has not been laid out yet, or when the duration is unknown.
    pub fn pointer_move(&mut self, x: f32, model: &mut TimelineModel) -> Option<f64> {
        let handle = self.active?;
        let time = self.time_at(x, model.duration())?;
        match handle {
            Handle::Start => model.set_start(time),
            Handle::End => model.set_end(time),
        }
        Some(time)
    }

    /// Pointer released: back to Idle. The caller clears its live-seek
    /// preview and releases pointer capture.
    pub fn pointer_up(&mut self) {
        self.active = None;
    }

    /// Drag aborted (capture lost, view teardown): identical to release.
    pub fn pointer_cancel(&mut self) {
        self.active = None;
    }

    /// `clamp((x − left) / width, 0, 1) · duration`, or None when the
    /// mapping is undefined (zero-width track, zero duration).
    fn time_at(&self, x: f32, duration: f64) -> Option<f64> {
        if self.geometry.width <= 0.0 || duration <= 0.0 {
            return None;
        }
        let pct = ((x - self.geometry.left) / self.geometry.width).clamp(0.0, 1.0);
        Some(pct as f64 * duration)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timeline::MIN_GAP;

    fn model(duration: f64) -> TimelineModel {
        let mut m = TimelineModel::new();
        m.set_duration(duration);
        m
    }

    fn track() -> TrackGeometry {
        TrackGeometry { left: 100.0, width: 800.0 }
    }

    #[test]
    fn drag_start_handle_to_midpoint() {
        let mut m = model(120.0);
        let mut c = PointerController::new(track());
        c.pointer_down(Handle::Start, 100.0, &m);
        // 50% of the track → 60 s
        let seek = c.pointer_move(500.0, &mut m);
        assert_eq!(seek, Some(60.0));
        assert_eq!(m.range().start, 60.0);
    }

    #[test]
    fn end_dragged_below_start_clamps_to_gap() {
        let mut m = model(120.0);
        let mut c = PointerController::new(track());
        c.pointer_down(Handle::Start, 500.0, &m);
        c.pointer_move(500.0, &mut m); // start = 60
        c.pointer_up();

        c.pointer_down(Handle::End, 420.0, &m);
        c.pointer_move(420.0, &mut m); // 40% → 48 s, below start
        let r = m.range();
        assert_eq!(r.start, 60.0);
        assert!((r.end - (60.0 + MIN_GAP)).abs() < 1e-9);
    }

    #[test]
    fn pointer_is_clamped_into_the_track() {
        let mut m = model(120.0);
        let mut c = PointerController::new(track());
        c.pointer_down(Handle::Start, 0.0, &m);
        assert_eq!(c.pointer_move(-400.0, &mut m), Some(0.0));
        c.pointer_up();

        c.pointer_down(Handle::End, 2000.0, &m);
        assert_eq!(c.pointer_move(2000.0, &mut m), Some(120.0));
        assert_eq!(m.range().end, 120.0);
    }

    #[test]
    fn move_without_down_is_a_noop() {
        let mut m = model(120.0);
        let mut c = PointerController::new(track());
        assert_eq!(c.pointer_move(500.0, &mut m), None);
        assert_eq!(m.range().start, 0.0);
    }

    #[test]
    fn zero_width_track_is_a_noop() {
        let mut m = model(120.0);
        let mut c = PointerController::new(TrackGeometry { left: 0.0, width: 0.0 });
        c.pointer_down(Handle::Start, 10.0, &m);
        assert_eq!(c.pointer_move(10.0, &mut m), None);
        assert_eq!(m.range().start, 0.0);
    }

    #[test]
    fn zero_duration_is_a_noop() {
        let mut m = TimelineModel::new();
        let mut c = PointerController::new(track());
        c.pointer_down(Handle::Start, 500.0, &m);
        assert_eq!(c.pointer_move(500.0, &mut m), None);
    }

    #[test]
    fn up_and_cancel_both_return_to_idle() {
        let m = model(120.0);
        let mut c = PointerController::new(track());

        c.pointer_down(Handle::Start, 100.0, &m);
        assert!(c.is_dragging());
        c.pointer_up();
        assert_eq!(c.active_handle(), None);

        c.pointer_down(Handle::End, 100.0, &m);
        c.pointer_cancel();
        assert!(!c.is_dragging());
    }

    #[test]
    fn down_returns_preview_seek_without_mutating_range() {
        let m = model(120.0);
        let mut c = PointerController::new(track());
        let seek = c.pointer_down(Handle::Start, 500.0, &m);
        assert_eq!(seek, Some(60.0));
        assert_eq!(m.range().start, 0.0);
    }
}

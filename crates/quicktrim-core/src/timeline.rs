// crates/quicktrim-core/src/timeline.rs
//
// TimelineModel: single owner of the trim range. Drag math and playback
// never write start/end directly — they go through set_start/set_end so
// the range invariant (0 ≤ start ≤ end − MIN_GAP ≤ duration) holds after
// every mutation. Out-of-bounds inputs are clamped, never rejected, which
// keeps handle drags continuous at the track edges.

use serde::{Deserialize, Serialize};

/// Minimum selectable gap between start and end, in seconds. Prevents a
/// zero-length or inverted selection while dragging one handle across the
/// other.
pub const MIN_GAP: f64 = 0.1;

/// The selected `[start, end]` interval of the source to keep.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TrimRange {
    pub start: f64,
    pub end:   f64,
}

impl TrimRange {
    pub fn len(&self) -> f64 {
        (self.end - self.start).max(0.0)
    }

    pub fn contains(&self, t: f64) -> bool {
        t >= self.start && t <= self.end
    }
}

/// Change notifications delivered synchronously to observers on every
/// mutation, before the setter returns.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TimelineEvent {
    /// A new source's duration was learned; the range was reset to the
    /// full clip.
    DurationSet(f64),
    /// start and/or end moved.
    RangeChanged(TrimRange),
}

pub struct TimelineModel {
    duration:  f64,
    range:     TrimRange,
    observers: Vec<Box<dyn FnMut(TimelineEvent)>>,
}

impl Default for TimelineModel {
    fn default() -> Self {
        Self::new()
    }
}

impl TimelineModel {
    pub fn new() -> Self {
        Self {
            duration:  0.0,
            range:     TrimRange { start: 0.0, end: 0.0 },
            observers: Vec::new(),
        }
    }

    /// Register a synchronous change observer (view overlay, host state).
    pub fn observe(&mut self, f: impl FnMut(TimelineEvent) + 'static) {
        self.observers.push(Box::new(f));
    }

    /// Set the source duration once metadata is known. Resets the range to
    /// the full clip `[0, d]`. Non-positive durations are ignored.
    pub fn set_duration(&mut self, d: f64) {
        if d <= 0.0 {
            return;
        }
        self.duration = d;
        self.range = TrimRange { start: 0.0, end: d };
        self.notify(TimelineEvent::DurationSet(d));
        self.notify(TimelineEvent::RangeChanged(self.range));
    }

    /// Move the start handle. Clamped into `[0, end − MIN_GAP]`.
    pub fn set_start(&mut self, t: f64) {
        if self.duration <= 0.0 {
            return;
        }
        // Upper bound can go negative on sub-MIN_GAP sources; floor at 0
        // so the clamp never inverts.
        let hi = (self.range.end - MIN_GAP).max(0.0);
        self.range.start = t.max(0.0).min(hi);
        self.notify(TimelineEvent::RangeChanged(self.range));
    }

    /// Move the end handle. Clamped into `[start + MIN_GAP, duration]`.
    pub fn set_end(&mut self, t: f64) {
        if self.duration <= 0.0 {
            return;
        }
        self.range.end = t.max(self.range.start + MIN_GAP).min(self.duration);
        self.notify(TimelineEvent::RangeChanged(self.range));
    }

    pub fn range(&self) -> TrimRange {
        self.range
    }

    pub fn duration(&self) -> f64 {
        self.duration
    }

    fn notify(&mut self, event: TimelineEvent) {
        for obs in self.observers.iter_mut() {
            obs(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn set_duration_selects_full_clip() {
        let mut m = TimelineModel::new();
        m.set_duration(120.0);
        assert_eq!(m.range(), TrimRange { start: 0.0, end: 120.0 });
    }

    #[test]
    fn non_positive_duration_is_ignored() {
        let mut m = TimelineModel::new();
        m.set_duration(0.0);
        m.set_duration(-3.0);
        assert_eq!(m.duration(), 0.0);
    }

    #[test]
    fn start_clamps_below_end_minus_gap() {
        let mut m = TimelineModel::new();
        m.set_duration(10.0);
        m.set_start(9.99);
        assert!((m.range().start - (10.0 - MIN_GAP)).abs() < 1e-9);
        m.set_start(-5.0);
        assert_eq!(m.range().start, 0.0);
    }

    #[test]
    fn end_clamps_above_start_plus_gap() {
        let mut m = TimelineModel::new();
        m.set_duration(10.0);
        m.set_start(4.0);
        m.set_end(0.0);
        assert!((m.range().end - (4.0 + MIN_GAP)).abs() < 1e-9);
        m.set_end(99.0);
        assert_eq!(m.range().end, 10.0);
    }

    #[test]
    fn invariant_holds_over_mutation_sequence() {
        let mut m = TimelineModel::new();
        m.set_duration(60.0);
        for &(s, e) in &[(30.0, 20.0), (-1.0, 0.0), (59.95, 100.0), (0.0, 0.05)] {
            m.set_start(s);
            m.set_end(e);
            let r = m.range();
            assert!(r.start >= 0.0);
            assert!(r.start <= r.end - MIN_GAP + 1e-9);
            assert!(r.end <= m.duration());
        }
    }

    #[test]
    fn setters_are_noops_before_duration_is_known() {
        let mut m = TimelineModel::new();
        m.set_start(5.0);
        m.set_end(9.0);
        assert_eq!(m.range(), TrimRange { start: 0.0, end: 0.0 });
    }

    #[test]
    fn observers_see_every_mutation_synchronously() {
        let seen: Rc<RefCell<Vec<TimelineEvent>>> = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);

        let mut m = TimelineModel::new();
        m.observe(move |e| sink.borrow_mut().push(e));

        m.set_duration(20.0);
        m.set_start(5.0);
        let events = seen.borrow();
        assert_eq!(events[0], TimelineEvent::DurationSet(20.0));
        assert_eq!(
            *events.last().unwrap(),
            TimelineEvent::RangeChanged(TrimRange { start: 5.0, end: 20.0 })
        );
    }
}

// crates/quicktrim-core/src/playback.rs
//
// Range-constrained preview playback. The actual playback element (video
// widget, decoder pipeline) sits behind the PreviewPlayer trait; this
// controller only decides when to seek, start and stop so that playback
// never visibly leaves the selected range. The current TrimRange is passed
// into every call — fresh values each event, no captured copies that go
// stale while a handle is being dragged.

use crate::timeline::TrimRange;

/// The external playback element.
pub trait PreviewPlayer {
    fn seek_to(&mut self, t: f64);
    fn play(&mut self);
    fn pause(&mut self);
    fn current_time(&self) -> f64;
}

/// Snapshot exposed to the host for overlay / playhead rendering.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PlaybackState {
    pub current_time: f64,
    pub is_playing:   bool,
}

#[derive(Default)]
pub struct PlaybackController {
    state: PlaybackState,
}

impl PlaybackController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn is_playing(&self) -> bool {
        self.state.is_playing
    }

    /// Begin playback. If the playhead sits at or outside the range
    /// boundaries, reposition to `start` first so play always resumes
    /// cleanly from the selection after a previous run-out.
    pub fn play(&mut self, player: &mut dyn PreviewPlayer, range: TrimRange) {
        let t = player.current_time();
        if t <= range.start || t >= range.end {
            player.seek_to(range.start);
            self.state.current_time = range.start;
        }
        player.play();
        self.state.is_playing = true;
    }

    /// Stop without repositioning.
    pub fn pause(&mut self, player: &mut dyn PreviewPlayer) {
        player.pause();
        self.state.is_playing = false;
    }

    /// Explicit seek, clamped into the range before it reaches the player.
    pub fn seek_to(&mut self, player: &mut dyn PreviewPlayer, range: TrimRange, t: f64) {
        let t = t.clamp(range.start, range.end);
        player.seek_to(t);
        self.state.current_time = t;
    }

    /// Progress tick from the playback element. Reaching `end` stops
    /// playback and parks the playhead back at `start` (no auto-loop); an
    /// externally caused position before `start` is pulled forward.
    pub fn on_progress(&mut self, player: &mut dyn PreviewPlayer, range: TrimRange, t: f64) {
        if t >= range.end {
            player.pause();
            player.seek_to(range.start);
            self.state = PlaybackState { current_time: range.start, is_playing: false };
            return;
        }
        if t < range.start {
            player.seek_to(range.start);
            self.state.current_time = range.start;
            return;
        }
        self.state.current_time = t;
    }
}

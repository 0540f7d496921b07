// crates/quicktrim-core/src/media_types.rs
//
// Types that flow across the channel between quicktrim-media and the host.
// No ffmpeg — just plain data, so the host UI never links against media
// internals.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Handle to the loaded source clip. Owned by the trimming session; the
/// media worker's temp storage for it is released when the session ends or
/// a new source replaces it.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct VideoSource {
    pub path:     PathBuf,
    /// Seconds. 0.0 until the probe result arrives.
    pub duration: f64,
}

impl VideoSource {
    pub fn new(path: PathBuf) -> Self {
        Self { path, duration: 0.0 }
    }
}

/// One sampled preview frame of the scrub strip.
#[derive(Clone, Debug)]
pub struct Thumbnail {
    /// Source time this frame was sampled at, in seconds.
    pub at_time: f64,
    pub width:   u32,
    pub height:  u32,
    /// JPEG-encoded image bytes.
    pub jpeg:    Vec<u8>,
}

/// Output of one trim invocation. Not cached — a second call produces a
/// fresh result.
#[derive(Clone, Debug)]
pub struct ExportResult {
    pub bytes: Vec<u8>,
    /// Container-reported duration of the cut. Stream copy snaps the cut
    /// to keyframes, so this may differ from `end − start` by up to one
    /// keyframe interval.
    pub approximate_duration: f64,
}

/// Errors surfaced across the trim API. Per-sample thumbnail timeouts are
/// absorbed inside the sampler (they become `MediaResult::ThumbnailSkipped`
/// gaps) and never appear here.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum TrimError {
    #[error("invalid trim range: start {start:.3}s, end {end:.3}s, duration {duration:.3}s")]
    InvalidRange { start: f64, end: f64, duration: f64 },

    #[error("trim engine is still initializing")]
    EngineNotReady,

    #[error("cut failed: {0}")]
    TranscodeFailure(String),
}

/// Results sent from the MediaWorker background threads to the host.
///
/// Thumbnail results carry the `run` token of the strip generation that
/// produced them; the consumer keeps only results whose token matches the
/// latest requested run, so completions from a superseded run are discarded
/// instead of written into a newer strip.
pub enum MediaResult {
    /// Probed source duration.
    Duration { seconds: f64 },
    /// The probe or sampler could not open / read the source at all.
    SourceError { msg: String },

    Thumbnail { run: u64, index: usize, thumb: Thumbnail },
    /// Sample `index` did not decode within the bounded wait; the strip
    /// continues with a gap at that slot.
    ThumbnailSkipped { run: u64, index: usize },
    /// All samples of the run have been attempted.
    StripDone { run: u64 },

    TrimDone { job: Uuid, result: ExportResult },
    TrimFailed { job: Uuid, error: TrimError },
}

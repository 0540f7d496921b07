// crates/quicktrim-core/src/lib.rs
//
// Pure trim-session state and interaction logic — no ffmpeg, no threads.
// Everything that touches media bytes lives in quicktrim-media and talks
// back over channels using the types in media_types.rs.

pub mod helpers;
pub mod media_types;
pub mod pointer;
pub mod playback;
pub mod timeline;

// Re-export the main public API so host-application imports are simple.
pub use media_types::{ExportResult, MediaResult, Thumbnail, TrimError, VideoSource};
pub use playback::{PlaybackController, PlaybackState, PreviewPlayer};
pub use pointer::{Handle, PointerController, TrackGeometry};
pub use timeline::{TimelineEvent, TimelineModel, TrimRange, MIN_GAP};

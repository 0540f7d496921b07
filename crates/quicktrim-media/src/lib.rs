// crates/quicktrim-media/src/lib.rs
//
// No UI dependency — communicates with the host via channels only.
//
// To add a new media capability:
//   1. Create a new module file here
//   2. Add `mod mymodule;` below
//   3. Call it from worker.rs (or a new MediaWorker method)

pub mod engine;
pub mod probe;
pub mod sampler;
pub mod worker;

// Re-export the main public API so host imports are simple.
pub use worker::MediaWorker;
pub use quicktrim_core::media_types::{
    ExportResult, MediaResult, Thumbnail, TrimError, VideoSource,
};
pub use quicktrim_core::timeline::TrimRange;

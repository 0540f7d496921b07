// crates/quicktrim-media/src/probe.rs
//
// In-process FFmpeg probing: container duration.

use std::path::Path;

use anyhow::Result;

use ffmpeg_the_third as ffmpeg;
use ffmpeg::format::input;
use ffmpeg::media::Type;

/// Probe the source duration in seconds. Prefers the container duration;
/// falls back to the best video (then audio) stream's duration when the
/// container does not report one.
pub fn probe_duration(path: &Path) -> Result<f64> {
    let ictx = input(path)?;

    let dur = ictx.duration() as f64 / f64::from(ffmpeg::ffi::AV_TIME_BASE);
    if dur > 0.0 {
        return Ok(dur);
    }

    if let Some(stream) = ictx
        .streams()
        .best(Type::Video)
        .or_else(|| ictx.streams().best(Type::Audio))
    {
        let tb = stream.time_base();
        let d = stream.duration() as f64 * tb.numerator() as f64 / tb.denominator() as f64;
        if d > 0.0 {
            return Ok(d);
        }
    }

    anyhow::bail!("duration unknown for {}", path.display())
}

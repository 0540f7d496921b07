// crates/quicktrim-media/src/engine.rs
//
// The trim engine: one-time FFmpeg runtime initialization plus the
// stream-copy cut. The cut repackages existing encoded data without
// re-encoding, so boundaries snap to the keyframe at or before the
// requested start — the output may be up to one keyframe interval longer
// than `end − start`. That imprecision is the accepted trade for a cut
// that runs in milliseconds instead of a full re-encode.
//
// Each trim works in its own TempDir: the source is materialized into it,
// the cut is written next to it, the produced bytes are read back, and the
// directory is dropped when the call settles — whether it succeeded,
// failed, or the caller stopped listening.

use std::fs;
use std::path::Path;
use std::sync::OnceLock;

use anyhow::Result;
use log::debug;

use ffmpeg_the_third as ffmpeg;
use ffmpeg::codec;
use ffmpeg::encoder;
use ffmpeg::format::{input, output};
use ffmpeg::media::Type;

use quicktrim_core::media_types::{ExportResult, TrimError};

use crate::probe::probe_duration;

static INIT: OnceLock<Result<(), String>> = OnceLock::new();

/// One-time FFmpeg runtime initialization. Runs at most once per process;
/// concurrent callers all block on the same underlying init instead of
/// triggering redundant loads.
pub fn initialize() -> Result<(), TrimError> {
    match INIT.get_or_init(|| ffmpeg::init().map_err(|e| e.to_string())) {
        Ok(()) => Ok(()),
        Err(e) => Err(TrimError::TranscodeFailure(format!("engine init: {e}"))),
    }
}

/// True once `initialize` has completed successfully. The host disables
/// the trim action while this is false rather than queueing requests.
pub fn is_ready() -> bool {
    matches!(INIT.get(), Some(Ok(())))
}

/// Cut `[start, end]` out of `source` with a stream copy and return the
/// produced bytes. Preconditions are checked before the engine is touched;
/// a violated range fails fast with `InvalidRange`.
pub fn trim(
    source: &Path,
    duration: f64,
    start: f64,
    end: f64,
) -> Result<ExportResult, TrimError> {
    if !(start >= 0.0 && start < end && end <= duration) {
        return Err(TrimError::InvalidRange { start, end, duration });
    }
    if !is_ready() {
        return Err(TrimError::EngineNotReady);
    }

    let workspace = tempfile::tempdir()
        .map_err(|e| TrimError::TranscodeFailure(format!("workspace: {e}")))?;

    let ext = source
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("mp4");
    let input_path = workspace.path().join(format!("input.{ext}"));
    let output_path = workspace.path().join(format!("output.{ext}"));

    fs::copy(source, &input_path)
        .map_err(|e| TrimError::TranscodeFailure(format!("materialize source: {e}")))?;

    cut_stream_copy(&input_path, &output_path, start, end)
        .map_err(|e| TrimError::TranscodeFailure(e.to_string()))?;

    let bytes = fs::read(&output_path)
        .map_err(|e| TrimError::TranscodeFailure(format!("read output: {e}")))?;
    let approximate_duration = probe_duration(&output_path).unwrap_or(end - start);

    debug!(
        "[media] cut {start:.2}–{end:.2}s → {} bytes, ~{approximate_duration:.2}s",
        bytes.len()
    );

    Ok(ExportResult { bytes, approximate_duration })
    // workspace drops here — partial files are removed on every path
}

/// Stream-copy remux of `[start, end]` from `src` into `dst`. All streams
/// are carried over with their codec parameters untouched.
fn cut_stream_copy(src: &Path, dst: &Path, start: f64, end: f64) -> Result<()> {
    let mut ictx = input(src)?;
    let mut octx = output(dst)?;

    for ist in ictx.streams() {
        let mut ost = octx.add_stream(encoder::find(codec::Id::None))?;
        ost.set_parameters(ist.parameters());
        // Codec tags are container-specific; let the muxer pick its own.
        unsafe {
            (*ost.parameters_mut().as_mut_ptr()).codec_tag = 0;
        }
    }
    octx.write_header()?;

    let video_idx = ictx.streams().best(Type::Video).map(|s| s.index());

    // Keyframe-aligned seek: lands at the nearest keyframe at or before
    // `start`, which is what bounds the cut's precision.
    let seek_ts = (start * f64::from(ffmpeg::ffi::AV_TIME_BASE)) as i64;
    ictx.seek(seek_ts, ..=seek_ts)?;

    // Output timestamps are re-anchored at the first packet after the seek
    // so the cut starts at zero.
    let mut anchor_secs: Option<f64> = None;

    for (ist, mut packet) in ictx.packets().flatten() {
        let idx = ist.index();
        let itb = ist.time_base();
        let tb = itb.numerator() as f64 / itb.denominator() as f64;

        let Some(ts) = packet.dts().or(packet.pts()) else {
            continue;
        };
        let anchor = *anchor_secs.get_or_insert(ts as f64 * tb);

        let pkt_secs = packet.pts().unwrap_or(ts) as f64 * tb;
        if pkt_secs > end {
            if Some(idx) == video_idx {
                break;
            }
            continue;
        }

        let shift = (anchor / tb) as i64;
        packet.set_pts(packet.pts().map(|p| p - shift));
        packet.set_dts(packet.dts().map(|d| d - shift));
        let otb = octx.stream(idx).map(|s| s.time_base()).unwrap_or(itb);
        packet.rescale_ts(itb, otb);
        packet.set_position(-1);
        packet.set_stream(idx);
        packet.write_interleaved(&mut octx)?;
    }

    octx.write_trailer()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    // Range validation runs before the engine or the filesystem is
    // touched, so a bogus path is fine here.
    fn bogus() -> PathBuf {
        PathBuf::from("/nonexistent.mp4")
    }

    #[test]
    fn inverted_range_is_rejected() {
        let err = trim(&bogus(), 120.0, 20.0, 10.0).unwrap_err();
        assert_eq!(
            err,
            TrimError::InvalidRange { start: 20.0, end: 10.0, duration: 120.0 }
        );
    }

    #[test]
    fn zero_length_range_is_rejected() {
        assert!(matches!(
            trim(&bogus(), 120.0, 10.0, 10.0),
            Err(TrimError::InvalidRange { .. })
        ));
    }

    #[test]
    fn negative_start_is_rejected() {
        assert!(matches!(
            trim(&bogus(), 120.0, -1.0, 10.0),
            Err(TrimError::InvalidRange { .. })
        ));
    }

    #[test]
    fn end_past_duration_is_rejected() {
        assert!(matches!(
            trim(&bogus(), 120.0, 10.0, 121.0),
            Err(TrimError::InvalidRange { .. })
        ));
    }

    #[test]
    fn initialize_is_idempotent() {
        assert!(initialize().is_ok());
        assert!(initialize().is_ok());
        assert!(is_ready());
    }
}

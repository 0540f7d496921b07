// crates/quicktrim-media/src/sampler.rs
//
// ThumbnailSampler: walks the source at evenly spaced times producing the
// scrub-strip previews. One decoder + one scaler are built up front and
// reused across every sample; each sample seeks, burns to the target frame
// under a wall-clock deadline, and JPEG-encodes a fixed 240×135 output.
//
// A sample that misses its deadline is reported as ThumbnailSkipped and the
// strip continues — one undecodable spot never aborts the sequence. The
// `cancel` flag is set by MediaWorker when a newer run supersedes this one;
// results already sent carry this run's token and are discarded by the
// consumer once the token is stale.

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use anyhow::{anyhow, Result};
use crossbeam_channel::Sender;
use image::codecs::jpeg::JpegEncoder;
use log::{debug, warn};

use ffmpeg_the_third as ffmpeg;
use ffmpeg::format::{input, Pixel};
use ffmpeg::media::Type;
use ffmpeg::software::scaling::{context::Context as SwsContext, flag::Flags};

use quicktrim_core::media_types::{MediaResult, Thumbnail};

use crate::probe::probe_duration;

/// Default strip length requested by the host.
pub const DEFAULT_STRIP_LEN: usize = 30;

const THUMB_W: u32 = 240;
const THUMB_H: u32 = 135;
const JPEG_QUALITY: u8 = 80;

/// Bounded wait per sample. A seek that produces no decodable frame within
/// this window is skipped, not retried.
const SAMPLE_DEADLINE: Duration = Duration::from_millis(750);

/// Evenly spaced sample times: `tᵢ = i · duration / (n − 1)`, so the first
/// sample is 0 and the last is `duration`.
pub fn sample_times(duration: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![0.0],
        _ => (0..n)
            .map(|i| duration * i as f64 / (n - 1) as f64)
            .collect(),
    }
}

/// Generate the thumbnail strip for `path`, sending one result per sample
/// on `tx` tagged with `run`. Blocking — run this on a dedicated thread.
pub fn sample_strip(
    path: &Path,
    n: usize,
    run: u64,
    cancel: &AtomicBool,
    tx: &Sender<MediaResult>,
) -> Result<()> {
    if cancel.load(Ordering::Relaxed) {
        return Ok(());
    }

    let duration = probe_duration(path)?;

    let mut ictx = input(path)?;
    let video_idx = ictx
        .streams()
        .best(Type::Video)
        .ok_or_else(|| anyhow!("no video stream"))?
        .index();

    let (tb_num, tb_den) = {
        let stream = ictx.stream(video_idx).unwrap();
        let tb = stream.time_base();
        (tb.numerator(), tb.denominator())
    };

    // Second context for decoder construction (Parameters borrows from
    // Stream/ictx).
    let ictx2 = input(path)?;
    let stream2 = ictx2
        .stream(video_idx)
        .ok_or_else(|| anyhow!("stream gone"))?;
    let dec_ctx = ffmpeg::codec::context::Context::from_parameters(stream2.parameters())?;
    let mut decoder = dec_ctx.decoder().video()?;

    let mut scaler = SwsContext::get(
        decoder.format(), decoder.width(), decoder.height(),
        Pixel::RGB24, THUMB_W, THUMB_H, Flags::BILINEAR,
    )?;

    for (i, t) in sample_times(duration, n).into_iter().enumerate() {
        if cancel.load(Ordering::Relaxed) {
            debug!("[media] strip run {run} superseded at sample {i}");
            return Ok(());
        }

        // Format-level seek lands on the keyframe at or before t; frames
        // between the keyframe and t are burned below.
        let seek_ts = (t * f64::from(ffmpeg::ffi::AV_TIME_BASE)) as i64;
        let _ = ictx.seek(seek_ts, ..=seek_ts);
        decoder.flush();

        let target_pts = (t * tb_den as f64 / tb_num as f64) as i64;
        match capture_sample(&mut ictx, &mut decoder, &mut scaler, video_idx, target_pts)? {
            Some(jpeg) => {
                let thumb = Thumbnail {
                    at_time: t,
                    width:   THUMB_W,
                    height:  THUMB_H,
                    jpeg,
                };
                let _ = tx.send(MediaResult::Thumbnail { run, index: i, thumb });
            }
            None => {
                warn!("[media] strip run {run}: no frame within deadline at t={t:.2}s — skipping");
                let _ = tx.send(MediaResult::ThumbnailSkipped { run, index: i });
            }
        }
    }

    let _ = tx.send(MediaResult::StripDone { run });
    debug!("[media] strip run {run} done ({n} samples) ← {}", path.display());
    Ok(())
}

/// Decode forward to `target_pts` and return the JPEG-encoded frame, or
/// None if no frame became ready within SAMPLE_DEADLINE. The most recently
/// decoded frame is kept so a sample at EOF (e.g. t = duration) still
/// yields the final frame instead of a gap.
fn capture_sample(
    ictx:      &mut ffmpeg::format::context::Input,
    decoder:   &mut ffmpeg::decoder::video::Video,
    scaler:    &mut SwsContext,
    video_idx: usize,
    target_pts: i64,
) -> Result<Option<Vec<u8>>> {
    let deadline = Instant::now() + SAMPLE_DEADLINE;
    let mut last_good: Option<ffmpeg::util::frame::video::Video> = None;

    for (stream, packet) in ictx.packets().flatten() {
        if Instant::now() >= deadline {
            return Ok(None);
        }
        if stream.index() != video_idx {
            continue;
        }
        if decoder.send_packet(&packet).is_err() {
            continue;
        }
        let mut decoded = ffmpeg::util::frame::video::Video::empty();
        while decoder.receive_frame(&mut decoded).is_ok() {
            let mut rgb = ffmpeg::util::frame::video::Video::empty();
            if scaler.run(&decoded, &mut rgb).is_err() {
                continue;
            }
            last_good = Some(rgb);
            // Burn frames that landed before the target due to the
            // keyframe-aligned seek.
            if let Some(pts) = decoded.pts() {
                if pts + 2 < target_pts {
                    continue;
                }
            }
            return encode_jpeg(last_good.as_ref().unwrap()).map(Some);
        }
    }

    // EOF before reaching target_pts — use the last frame we saw.
    match last_good {
        Some(frame) => encode_jpeg(&frame).map(Some),
        None => Ok(None),
    }
}

/// Destripe the scaled RGB24 frame (copy visible pixels, not stride
/// padding) and compress it so a full 30-sample strip stays small.
fn encode_jpeg(frame: &ffmpeg::util::frame::video::Video) -> Result<Vec<u8>> {
    let stride = frame.stride(0);
    let raw = frame.data(0);
    let row_bytes = THUMB_W as usize * 3;
    let pixels: Vec<u8> = (0..THUMB_H as usize)
        .flat_map(|row| &raw[row * stride..row * stride + row_bytes])
        .copied()
        .collect();

    let mut jpeg = Vec::new();
    JpegEncoder::new_with_quality(&mut jpeg, JPEG_QUALITY)
        .encode(&pixels, THUMB_W, THUMB_H, image::ExtendedColorType::Rgb8)?;
    Ok(jpeg)
}

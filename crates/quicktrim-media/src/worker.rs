// crates/quicktrim-media/src/worker.rs
//
// MediaWorker: owns the result channel and the background threads for
// probing, thumbnail strips and trim jobs. All public API the host calls
// lives here.
//
// Thumbnail strips are latest-wins: each request gets a fresh run token
// and sets the previous run's cancel flag. Trim jobs are keyed by Uuid
// with a per-job cancel flag, registered before the thread spawns so a
// cancel can never miss its job.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;

use crossbeam_channel::{bounded, Receiver, Sender};
use log::{debug, warn};
use uuid::Uuid;

use quicktrim_core::media_types::{MediaResult, TrimError, VideoSource};
use quicktrim_core::timeline::TrimRange;

use crate::engine;
use crate::probe;
use crate::sampler;

pub struct MediaWorker {
    /// Shared result channel: probe results, thumbnails, trim outcomes.
    pub rx: Receiver<MediaResult>,
    tx:     Sender<MediaResult>,

    shutdown: Arc<AtomicBool>,

    /// Token of the latest thumbnail run. Consumers keep only results
    /// whose `run` matches this value.
    strip_run:    AtomicU64,
    /// Cancel flag of the in-flight strip run, swapped out when a new
    /// request supersedes it.
    strip_cancel: Mutex<Option<Arc<AtomicBool>>>,

    /// Per-job cancel flags. Entries are inserted by start_trim and
    /// removed when the job settles.
    trim_cancels: Arc<Mutex<HashMap<Uuid, Arc<AtomicBool>>>>,
}

impl MediaWorker {
    pub fn new() -> Self {
        let (tx, rx) = bounded(256);

        // Kick off the one-time engine init so the cut is usually ready by
        // the time the user reaches for it. Anything racing this blocks on
        // the same underlying init rather than re-running it.
        thread::spawn(|| {
            if let Err(e) = engine::initialize() {
                warn!("[media] engine init failed: {e}");
            }
        });

        Self {
            rx,
            tx,
            shutdown:     Arc::new(AtomicBool::new(false)),
            strip_run:    AtomicU64::new(0),
            strip_cancel: Mutex::new(None),
            trim_cancels: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// True once the engine's one-time initialization has completed. The
    /// host disables the trim action while this is false.
    pub fn engine_ready(&self) -> bool {
        engine::is_ready()
    }

    pub fn shutdown(&self) {
        self.shutdown.store(true, Ordering::Relaxed);
        if let Some(flag) = self.strip_cancel.lock().unwrap().take() {
            flag.store(true, Ordering::Relaxed);
        }
        for flag in self.trim_cancels.lock().unwrap().values() {
            flag.store(true, Ordering::Relaxed);
        }
    }

    /// Probe the source duration. Result arrives as `MediaResult::Duration`
    /// (or `SourceError` if the file cannot be opened).
    pub fn probe_source(&self, path: PathBuf) {
        let tx = self.tx.clone();
        let sd = self.shutdown.clone();
        thread::spawn(move || {
            if sd.load(Ordering::Relaxed) {
                return;
            }
            match probe::probe_duration(&path) {
                Ok(seconds) => {
                    debug!("[media] duration {seconds:.2}s ← {}", path.display());
                    let _ = tx.send(MediaResult::Duration { seconds });
                }
                Err(e) => {
                    let _ = tx.send(MediaResult::SourceError { msg: e.to_string() });
                }
            }
        });
    }

    /// Start (or restart) thumbnail strip generation and return the new
    /// run token. Any run still in flight is superseded: its cancel flag
    /// is set and its token goes stale, so late completions are discarded
    /// by the consumer instead of written into the new strip.
    pub fn request_thumbnails(&self, path: PathBuf, count: usize) -> u64 {
        let (run, cancel) = self.supersede_strip();
        let tx = self.tx.clone();
        let sd = self.shutdown.clone();
        thread::spawn(move || {
            if sd.load(Ordering::Relaxed) {
                return;
            }
            if let Err(e) = sampler::sample_strip(&path, count, run, &cancel, &tx) {
                warn!("[media] strip run {run} failed: {e}");
                let _ = tx.send(MediaResult::SourceError { msg: e.to_string() });
            }
        });
        run
    }

    /// Token of the most recently requested strip run.
    pub fn current_run(&self) -> u64 {
        self.strip_run.load(Ordering::Relaxed)
    }

    /// Allocate the next run token and swap in a fresh cancel flag,
    /// cancelling the previous run.
    fn supersede_strip(&self) -> (u64, Arc<AtomicBool>) {
        let run = self.strip_run.fetch_add(1, Ordering::Relaxed) + 1;
        let cancel = Arc::new(AtomicBool::new(false));
        if let Some(prev) = self
            .strip_cancel
            .lock()
            .unwrap()
            .replace(Arc::clone(&cancel))
        {
            prev.store(true, Ordering::Relaxed);
        }
        (run, cancel)
    }

    /// Cut `range` out of `source` on a background thread. The outcome
    /// arrives as `TrimDone` / `TrimFailed` carrying the returned job id —
    /// unless the job is cancelled first, in which case it is discarded.
    pub fn start_trim(&self, source: VideoSource, range: TrimRange) -> Uuid {
        let job = Uuid::new_v4();
        let cancel = Arc::new(AtomicBool::new(false));

        // Register the cancel flag before spawning — no window where
        // cancel_trim is called before the thread has inserted it.
        self.trim_cancels
            .lock()
            .unwrap()
            .insert(job, Arc::clone(&cancel));

        let tx = self.tx.clone();
        let sd = self.shutdown.clone();
        let cancels = Arc::clone(&self.trim_cancels);
        thread::spawn(move || {
            let outcome = engine::trim(&source.path, source.duration, range.start, range.end);
            let abandoned = cancel.load(Ordering::Relaxed) || sd.load(Ordering::Relaxed);
            cancels.lock().unwrap().remove(&job);
            deliver_trim_outcome(job, outcome, abandoned, &tx);
        });
        job
    }

    /// Mark the trim job abandoned. Its engine workspace is cleaned up
    /// when the cut settles; the late result is discarded rather than
    /// delivered to whatever session exists by then.
    pub fn cancel_trim(&self, job: Uuid) {
        if let Some(flag) = self.trim_cancels.lock().unwrap().get(&job) {
            flag.store(true, Ordering::Relaxed);
        }
    }
}

/// Send the settled trim outcome to the host, unless the job was abandoned
/// while the cut was running.
fn deliver_trim_outcome(
    job: Uuid,
    outcome: Result<quicktrim_core::media_types::ExportResult, TrimError>,
    abandoned: bool,
    tx: &Sender<MediaResult>,
) {
    if abandoned {
        debug!("[media] trim {job} settled after cancel — discarding");
        return;
    }
    match outcome {
        Ok(result) => {
            let _ = tx.send(MediaResult::TrimDone { job, result });
        }
        Err(error) => {
            let _ = tx.send(MediaResult::TrimFailed { job, error });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strip_requests_supersede_each_other() {
        let w = MediaWorker::new();
        let (run1, cancel1) = w.supersede_strip();
        let (run2, cancel2) = w.supersede_strip();
        assert_eq!(run1, 1);
        assert_eq!(run2, 2);
        assert_eq!(w.current_run(), 2);
        assert!(cancel1.load(Ordering::Relaxed));
        assert!(!cancel2.load(Ordering::Relaxed));
    }

    #[test]
    fn shutdown_cancels_the_inflight_strip() {
        let w = MediaWorker::new();
        let (_, cancel) = w.supersede_strip();
        w.shutdown();
        assert!(cancel.load(Ordering::Relaxed));
    }

    #[test]
    fn abandoned_trim_outcome_is_discarded() {
        let (tx, rx) = bounded(4);
        let result = quicktrim_core::media_types::ExportResult {
            bytes: vec![0u8; 16],
            approximate_duration: 10.0,
        };
        deliver_trim_outcome(Uuid::new_v4(), Ok(result), true, &tx);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn settled_trim_failure_is_delivered() {
        let (tx, rx) = bounded(4);
        let job = Uuid::new_v4();
        deliver_trim_outcome(job, Err(TrimError::EngineNotReady), false, &tx);
        match rx.try_recv() {
            Ok(MediaResult::TrimFailed { job: j, error }) => {
                assert_eq!(j, job);
                assert_eq!(error, TrimError::EngineNotReady);
            }
            _ => panic!("expected TrimFailed"),
        }
    }

    #[test]
    fn cancelled_job_delivers_nothing_to_a_new_session() {
        let w = MediaWorker::new();
        // Invalid range (duration unknown) → the job settles immediately;
        // cancelling before the flag is read must suppress delivery.
        let src = VideoSource::new(PathBuf::from("/nonexistent.mp4"));
        let job = w.start_trim(src, TrimRange { start: 5.0, end: 10.0 });
        w.cancel_trim(job);
        // Either the job saw the cancel (nothing arrives) or it settled
        // first (a TrimFailed for the OLD job id arrives). A new session
        // filtering by its own job ids sees nothing in both cases.
        if let Ok(MediaResult::TrimFailed { job: j, .. }) =
            w.rx.recv_timeout(std::time::Duration::from_secs(2))
        {
            assert_eq!(j, job);
        }
    }
}

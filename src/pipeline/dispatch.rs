//! Admission control and decode dispatch.
//!
//! One `Scanner` sits between the hosting pipeline's frame path and the
//! decode engine. Per frame it decides: decode inline (stride 0), hand a
//! copy to the single decode worker (stride n, sequence on stride, queue
//! slot free), or skip. The frame path is never blocked on a decode.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::Instant;

use tracing::{debug, error, info};

use crate::engine::{invoker, DecodeEngine};
use crate::error::{ConfigError, ScanError};
use crate::event::ScanOutput;
use crate::frame::Frame;
use crate::pipeline::filter;
use crate::pipeline::stats::{ScanStats, StatsSnapshot};
use crate::ScanConfig;

/// What happened to a frame offered to [`Scanner::on_frame`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    /// Decoded inline on the calling thread (stride 0)
    Decoded,
    /// Copied and handed to the decode worker
    Queued,
    /// Not eligible this frame: off-stride, or the worker is still busy
    Skipped,
}

/// Mutable state shared by the frame-delivery thread and the worker. One
/// lock guards the configuration and the detection state together, so a
/// config snapshot and a filter update are each atomic. The lock is never
/// held across a decode.
pub(crate) struct Inner {
    pub config: ScanConfig,
    pub last_payload: Option<Vec<u8>>,
    pub found: u64,
    pub eos_sent: bool,
}

pub(crate) struct Shared<E> {
    pub engine: E,
    pub inner: Mutex<Inner>,
    pub events: flume::Sender<ScanOutput>,
    pub stats: ScanStats,
    shutdown: AtomicBool,
}

impl<E: DecodeEngine> Shared<E> {
    pub fn is_shutting_down(&self) -> bool {
        self.shutdown.load(Ordering::Acquire)
    }

    /// One decode-and-filter step: snapshot the config, run the engine
    /// outside the lock, re-acquire the lock for the duplicate filter and
    /// the stop-after trigger.
    pub fn process_frame(&self, frame: &Frame) -> Result<(), ScanError> {
        let config = self.inner.lock().unwrap().config.clone();
        if !config.quiet {
            debug!("scanning frame {}", frame.meta.sequence);
        }
        self.stats.decode_attempt();

        let started = Instant::now();
        let outcome = invoker::decode_frame(&self.engine, frame, &config)?;
        metrics::histogram!("decode_time_us").record(started.elapsed().as_micros() as f64);

        if let Some(symbol) = outcome {
            let mut inner = self.inner.lock().unwrap();
            if filter::emit_symbol(&mut inner, frame.pts, symbol, &self.events) {
                self.stats.symbol();
            }
        }
        Ok(())
    }
}

/// The frame-scanning stage: admission control, decode dispatch, worker
/// lifecycle, and the outbound event path.
pub struct Scanner<E: DecodeEngine> {
    shared: Arc<Shared<E>>,
    queue: Option<flume::Sender<Frame>>,
    worker: Option<JoinHandle<()>>,
    /// Latched when the worker thread could not be spawned
    worker_failed: bool,
}

impl<E: DecodeEngine> Scanner<E> {
    /// Build a scanner around a decode engine. Returns the scanner and the
    /// receiving end of its event channel.
    pub fn new(
        engine: E,
        config: ScanConfig,
    ) -> Result<(Self, flume::Receiver<ScanOutput>), ConfigError> {
        config.validate()?;
        let (events, events_rx) = flume::unbounded();
        let shared = Arc::new(Shared {
            engine,
            inner: Mutex::new(Inner {
                config,
                last_payload: None,
                found: 0,
                eos_sent: false,
            }),
            events,
            stats: ScanStats::default(),
            shutdown: AtomicBool::new(false),
        });
        let scanner = Self {
            shared,
            queue: None,
            worker: None,
            worker_failed: false,
        };
        Ok((scanner, events_rx))
    }

    /// Transition to running. With a nonzero stride this spawns the decode
    /// worker and its single-slot queue; a spawn failure is reported here
    /// once and latches every later asynchronous [`Scanner::on_frame`] into
    /// an error.
    pub fn start(&mut self) -> Result<(), ScanError> {
        if self.worker.is_some() {
            return Ok(());
        }
        self.shared.shutdown.store(false, Ordering::Release);
        self.worker_failed = false;

        let stride = self.shared.inner.lock().unwrap().config.stride;
        if stride == 0 {
            debug!("starting in synchronous mode");
            return Ok(());
        }

        // Capacity 1: the worker is never more than one frame behind.
        let (tx, rx) = flume::bounded(1);
        let shared = Arc::clone(&self.shared);
        match std::thread::Builder::new()
            .name("argus-decode".into())
            .spawn(move || crate::pipeline::worker::run(shared, rx))
        {
            Ok(handle) => {
                info!("decode worker started (stride {stride})");
                self.queue = Some(tx);
                self.worker = Some(handle);
                Ok(())
            }
            Err(io_error) => {
                error!("failed to spawn decode worker: {io_error}");
                self.worker_failed = true;
                Err(ScanError::WorkerUnavailable)
            }
        }
    }

    /// Transition to stopped: flag the worker, disconnect the queue (the
    /// sentinel that unblocks a waiting `recv`), and join. An in-flight
    /// decode finishes first. Idempotent.
    pub fn stop(&mut self) {
        self.shared.shutdown.store(true, Ordering::Release);
        self.queue = None;
        if let Some(handle) = self.worker.take() {
            if handle.join().is_err() {
                error!("decode worker panicked");
            }
        }
    }

    /// Offer one frame to the admission policy.
    ///
    /// Stride 0 decodes the frame on the calling thread before returning.
    /// Any other stride never blocks: the frame is copied and queued when it
    /// is on stride and the slot is free, and skipped otherwise.
    pub fn on_frame(&self, frame: &Frame) -> Result<Dispatch, ScanError> {
        self.shared.stats.frame_in();

        let stride = self.shared.inner.lock().unwrap().config.stride;
        if stride == 0 {
            self.shared.process_frame(frame)?;
            return Ok(Dispatch::Decoded);
        }

        if self.worker_failed {
            return Err(ScanError::WorkerUnavailable);
        }
        let Some(queue) = &self.queue else {
            return Err(ScanError::WorkerUnavailable);
        };

        if frame.meta.sequence % stride != 0 {
            return Ok(Dispatch::Skipped);
        }

        // Drop-when-busy backpressure: freshness over completeness. is_full
        // spares the copy on the hot path, try_send decides.
        if queue.is_full() {
            return Ok(self.drop_busy_frame(frame));
        }
        match queue.try_send(frame.deep_copy()) {
            Ok(()) => {
                self.shared.stats.admitted();
                Ok(Dispatch::Queued)
            }
            Err(flume::TrySendError::Full(_)) => Ok(self.drop_busy_frame(frame)),
            Err(flume::TrySendError::Disconnected(_)) => Err(ScanError::WorkerUnavailable),
        }
    }

    fn drop_busy_frame(&self, frame: &Frame) -> Dispatch {
        self.shared.stats.dropped();
        metrics::counter!("frames_dropped").increment(1);
        debug!("worker busy, dropping frame {}", frame.meta.sequence);
        Dispatch::Skipped
    }

    /// Replace the configuration. Takes effect for frames offered after the
    /// write completes. Switching stride between zero and nonzero does not
    /// retroactively start or stop the worker; restart the scanner for that.
    pub fn set_config(&self, config: ScanConfig) -> Result<(), ConfigError> {
        config.validate()?;
        self.shared.inner.lock().unwrap().config = config;
        Ok(())
    }

    /// Current configuration snapshot.
    pub fn config(&self) -> ScanConfig {
        self.shared.inner.lock().unwrap().config.clone()
    }

    /// Counter snapshot.
    pub fn stats(&self) -> StatsSnapshot {
        self.shared.stats.snapshot()
    }

    /// Symbols emitted so far (post-filter).
    pub fn found(&self) -> u64 {
        self.shared.inner.lock().unwrap().found
    }
}

impl<E: DecodeEngine> Drop for Scanner<E> {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
#[path = "dispatch_test.rs"]
mod dispatch_test;

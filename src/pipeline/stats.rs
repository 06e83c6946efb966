//! Pipeline counters shared between the frame-delivery thread and the
//! decode worker.

use std::sync::atomic::{AtomicU64, Ordering};

use crossbeam::utils::CachePadded;

#[derive(Default)]
pub(crate) struct ScanStats {
    inner: CachePadded<Counters>,
}

#[derive(Default)]
struct Counters {
    frames_in: AtomicU64,
    admitted: AtomicU64,
    dropped: AtomicU64,
    decode_attempts: AtomicU64,
    symbols: AtomicU64,
}

/// Point-in-time view of the scanner's counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatsSnapshot {
    /// Frames offered to the admission policy
    pub frames_in: u64,
    /// Frame copies handed to the worker queue
    pub admitted: u64,
    /// Eligible frames dropped because the worker was still busy
    pub dropped: u64,
    /// Decode attempts actually run, inline or on the worker
    pub decode_attempts: u64,
    /// Symbols that made it past the duplicate filter
    pub symbols: u64,
}

impl ScanStats {
    pub fn frame_in(&self) {
        self.inner.frames_in.fetch_add(1, Ordering::Relaxed);
    }

    pub fn admitted(&self) {
        self.inner.admitted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn dropped(&self) {
        self.inner.dropped.fetch_add(1, Ordering::Relaxed);
    }

    pub fn decode_attempt(&self) {
        self.inner.decode_attempts.fetch_add(1, Ordering::Relaxed);
    }

    pub fn symbol(&self) {
        self.inner.symbols.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            frames_in: self.inner.frames_in.load(Ordering::Relaxed),
            admitted: self.inner.admitted.load(Ordering::Relaxed),
            dropped: self.inner.dropped.load(Ordering::Relaxed),
            decode_attempts: self.inner.decode_attempts.load(Ordering::Relaxed),
            symbols: self.inner.symbols.load(Ordering::Relaxed),
        }
    }
}

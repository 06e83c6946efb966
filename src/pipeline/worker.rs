//! Decode worker loop.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::engine::DecodeEngine;
use crate::frame::Frame;
use crate::pipeline::dispatch::Shared;

/// Queue consumer: blocks until a frame copy arrives, runs the
/// decode-and-filter step, drops the copy, repeats. The producer dropping
/// its end of the channel is the shutdown sentinel that unblocks `recv`.
pub(crate) fn run<E: DecodeEngine>(shared: Arc<Shared<E>>, queue: flume::Receiver<Frame>) {
    debug!("decode worker running");
    while let Ok(frame) = queue.recv() {
        if shared.is_shutting_down() {
            // Drain without decoding so stop() can join promptly.
            continue;
        }
        if let Err(error) = shared.process_frame(&frame) {
            // A bad frame must not take the worker down.
            warn!("decode failed on frame {}: {error}", frame.meta.sequence);
        }
    }
    debug!("decode worker stopped");
}

//! Synthetic frame source for the demo binary and the end-to-end tests.

use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;

use crate::engine::pattern;
use crate::frame::{Frame, FrameMeta, PixelPacking};

/// Produces flat gray RGB frames with increasing sequence numbers and
/// synthetic timestamps, optionally carrying an embedded test-pattern
/// payload for [`pattern::PatternEngine`] to find.
pub struct TestSource {
    width: u32,
    height: u32,
    frame_interval: Duration,
    sequence: u64,
}

impl TestSource {
    pub fn new(width: u32, height: u32, fps: u32) -> Self {
        Self {
            width,
            height,
            frame_interval: Duration::from_secs(1) / fps.max(1),
            sequence: 0,
        }
    }

    /// Next plain frame.
    pub fn next_frame(&mut self) -> Frame {
        self.build(None)
    }

    /// Next frame with `payload` embedded for the pattern engine.
    pub fn next_frame_with_symbol(&mut self, payload: &[u8]) -> Frame {
        self.build(Some(payload))
    }

    /// Pacing interval between frames at the configured rate.
    pub fn frame_interval(&self) -> Duration {
        self.frame_interval
    }

    fn build(&mut self, payload: Option<&[u8]>) -> Frame {
        let packing = PixelPacking::Rgb24;
        let mut pixels =
            vec![0x7f_u8; self.width as usize * self.height as usize * packing.bytes_per_pixel()];
        if let Some(payload) = payload {
            pattern::embed(&mut pixels, self.width, packing, 0, payload);
        }

        let sequence = self.sequence;
        self.sequence += 1;
        Frame {
            data: Bytes::from(pixels),
            meta: Arc::new(FrameMeta {
                sequence,
                width: self.width,
                height: self.height,
                depth: 24,
            }),
            pts: Some(self.frame_interval.saturating_mul(sequence as u32)),
        }
    }
}

//! Scripted decode engine for tests: records every call it receives and
//! replays queued outcomes, optionally blocking mid-search on a gate so
//! tests can hold the worker busy.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Instant;

use bytes::Bytes;

use crate::error::EngineError;
use crate::frame::PixelPacking;
use crate::{RegionBounds, SymbolFamily};

use super::{DecodeEngine, EngineDecoder};

/// What the next decode attempt should find.
#[derive(Debug, Clone)]
pub(crate) enum Scripted {
    /// A region that fails to decode
    Undecodable,
    /// A region decoding to this payload
    Symbol(Vec<u8>),
}

/// Everything one decode attempt told the engine.
#[derive(Debug, Clone, Default)]
pub(crate) struct CallRecord {
    pub width: u32,
    pub height: u32,
    pub packing: Option<PixelPacking>,
    pub scale: u32,
    pub scan_gap: u32,
    pub bounds: Option<RegionBounds>,
    pub had_deadline: bool,
}

#[derive(Default)]
pub(crate) struct MockState {
    script: Mutex<VecDeque<Scripted>>,
    calls: Mutex<Vec<CallRecord>>,
    gate: Mutex<Option<flume::Receiver<()>>>,
}

impl MockState {
    /// Queue the outcome of the next attempt. Attempts with an empty script
    /// find no region.
    pub fn push(&self, item: Scripted) {
        self.script.lock().unwrap().push_back(item);
    }

    pub fn calls(&self) -> Vec<CallRecord> {
        self.calls.lock().unwrap().clone()
    }

    /// Number of decode attempts so far. Incremented before any gate wait,
    /// so tests can observe that the worker has picked up a frame.
    pub fn attempts(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// Make every region search block until a token arrives (or the sender
    /// is dropped).
    pub fn gate(&self) -> flume::Sender<()> {
        let (tx, rx) = flume::unbounded();
        *self.gate.lock().unwrap() = Some(rx);
        tx
    }
}

#[derive(Clone, Default)]
pub(crate) struct MockEngine {
    pub state: Arc<MockState>,
}

pub(crate) struct MockImage {
    width: u32,
    height: u32,
    packing: PixelPacking,
}

pub(crate) struct MockDecoder {
    state: Arc<MockState>,
    record: CallRecord,
}

impl DecodeEngine for MockEngine {
    type Image = MockImage;
    type Decoder = MockDecoder;

    fn create_image(
        &self,
        _data: Bytes,
        width: u32,
        height: u32,
        packing: PixelPacking,
    ) -> Result<MockImage, EngineError> {
        Ok(MockImage {
            width,
            height,
            packing,
        })
    }

    fn create_decoder(&self, image: MockImage, scale: u32) -> Result<MockDecoder, EngineError> {
        Ok(MockDecoder {
            state: Arc::clone(&self.state),
            record: CallRecord {
                width: image.width,
                height: image.height,
                packing: Some(image.packing),
                scale,
                ..CallRecord::default()
            },
        })
    }
}

impl EngineDecoder for MockDecoder {
    type Region = Scripted;

    fn limit_region(&mut self, bounds: RegionBounds) {
        self.record.bounds = Some(bounds);
    }

    fn set_scan_gap(&mut self, gap: u32) {
        self.record.scan_gap = gap;
    }

    fn find_next_region(&mut self, deadline: Option<Instant>) -> Option<Scripted> {
        self.record.had_deadline = deadline.is_some();
        self.state.calls.lock().unwrap().push(self.record.clone());

        let gate = self.state.gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            let _ = gate.recv();
        }

        self.state.script.lock().unwrap().pop_front()
    }

    fn decode_region(&mut self, region: Scripted, _family: SymbolFamily) -> Option<Vec<u8>> {
        match region {
            Scripted::Symbol(payload) => Some(payload),
            Scripted::Undecodable => None,
        }
    }
}

//! Built-in test-pattern engine.
//!
//! Stands in for a real barcode library: `embed` plants a byte marker plus a
//! payload into a pixel buffer, and the engine's region search finds it
//! again. This lets the demo binary and the end-to-end tests drive the full
//! dispatch path without any symbol mathematics.

use std::time::Instant;

use bytes::Bytes;

use crate::error::EngineError;
use crate::frame::PixelPacking;
use crate::{RegionBounds, SymbolFamily};

use super::{DecodeEngine, EngineDecoder};

/// Marker preceding an embedded payload: GS "DM".
const MARKER: [u8; 3] = [0x1d, 0x44, 0x4d];

/// Write `payload` into `pixels` at the start of `row`, prefixed by the
/// marker and a length byte.
pub fn embed(pixels: &mut [u8], width: u32, packing: PixelPacking, row: u32, payload: &[u8]) {
    assert!(
        payload.len() <= u8::MAX as usize,
        "payload too long for the test pattern"
    );
    let stride = width as usize * packing.bytes_per_pixel();
    let needed = MARKER.len() + 1 + payload.len();
    assert!(needed <= stride, "row too narrow for the test pattern");

    let start = row as usize * stride;
    let slot = &mut pixels[start..start + needed];
    slot[..MARKER.len()].copy_from_slice(&MARKER);
    slot[MARKER.len()] = payload.len() as u8;
    slot[MARKER.len() + 1..].copy_from_slice(payload);
}

/// Engine that recognizes the `embed` marker.
#[derive(Debug, Clone, Copy, Default)]
pub struct PatternEngine;

pub struct PatternImage {
    data: Bytes,
    width: u32,
    height: u32,
    packing: PixelPacking,
}

pub struct PatternDecoder {
    image: PatternImage,
    bounds: Option<RegionBounds>,
    gap: u32,
    next_row: u32,
}

/// Candidate location of an embedded marker.
pub struct PatternRegion {
    offset: usize,
}

impl DecodeEngine for PatternEngine {
    type Image = PatternImage;
    type Decoder = PatternDecoder;

    fn create_image(
        &self,
        data: Bytes,
        width: u32,
        height: u32,
        packing: PixelPacking,
    ) -> Result<PatternImage, EngineError> {
        let expected = width as usize * height as usize * packing.bytes_per_pixel();
        if data.len() < expected {
            return Err(EngineError::new(format!(
                "pixel buffer holds {} bytes, geometry needs {expected}",
                data.len()
            )));
        }
        Ok(PatternImage {
            data,
            width,
            height,
            packing,
        })
    }

    fn create_decoder(&self, image: PatternImage, _scale: u32) -> Result<PatternDecoder, EngineError> {
        // The marker search has nothing to gain from downsampling, so the
        // scale factor is accepted and ignored.
        Ok(PatternDecoder {
            image,
            bounds: None,
            gap: 1,
            next_row: 0,
        })
    }
}

impl EngineDecoder for PatternDecoder {
    type Region = PatternRegion;

    fn limit_region(&mut self, bounds: RegionBounds) {
        self.bounds = Some(bounds);
    }

    fn set_scan_gap(&mut self, gap: u32) {
        self.gap = gap.max(1);
    }

    fn find_next_region(&mut self, deadline: Option<Instant>) -> Option<PatternRegion> {
        let bounds = self.bounds.unwrap_or(RegionBounds {
            x_min: 0,
            x_max: self.image.width,
            y_min: 0,
            y_max: self.image.height,
        });
        let bytes_per_pixel = self.image.packing.bytes_per_pixel();
        let stride = self.image.width as usize * bytes_per_pixel;

        let mut row = self.next_row.max(bounds.y_min);
        while row < bounds.y_max {
            if deadline.is_some_and(|deadline| Instant::now() >= deadline) {
                return None;
            }

            let row_start = row as usize * stride;
            let lo = row_start + bounds.x_min as usize * bytes_per_pixel;
            let hi = (row_start + bounds.x_max as usize * bytes_per_pixel).min(self.image.data.len());
            if lo < hi {
                if let Some(pos) = find_marker(&self.image.data[lo..hi]) {
                    // Continue from the next scan line on a later call.
                    self.next_row = row + self.gap;
                    return Some(PatternRegion { offset: lo + pos });
                }
            }

            row += self.gap;
        }
        None
    }

    fn decode_region(&mut self, region: PatternRegion, _family: SymbolFamily) -> Option<Vec<u8>> {
        let data = &self.image.data;
        let length_at = region.offset + MARKER.len();
        let length = *data.get(length_at)? as usize;
        if length == 0 {
            return None;
        }
        let start = length_at + 1;
        data.get(start..start + length).map(<[u8]>::to_vec)
    }
}

fn find_marker(row: &[u8]) -> Option<usize> {
    row.windows(MARKER.len())
        .position(|window| window == MARKER)
}

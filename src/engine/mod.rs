//! Contract with the external symbol-decoding engine.
//!
//! The engine is an opaque collaborator: it knows how to bind an image to a
//! pixel buffer, hunt for candidate regions, and decode a region into raw
//! payload bytes. Everything it hands out is a transient handle that lives
//! for one decode attempt and releases its resources on drop.

pub mod invoker;
pub mod pattern;

#[cfg(test)]
pub(crate) mod mock;

use std::time::Instant;

use bytes::Bytes;

use crate::error::EngineError;
use crate::frame::PixelPacking;
use crate::{RegionBounds, SymbolFamily};

/// A symbol the engine managed to decode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedSymbol {
    /// Raw payload bytes, exactly as decoded
    pub payload: Vec<u8>,
    /// Family the engine was asked to decode
    pub family: SymbolFamily,
}

/// Factory half of the decode-engine contract.
pub trait DecodeEngine: Send + Sync + 'static {
    type Image;
    type Decoder: EngineDecoder;

    /// Bind an image handle to a frame's pixel storage.
    fn create_image(
        &self,
        data: Bytes,
        width: u32,
        height: u32,
        packing: PixelPacking,
    ) -> Result<Self::Image, EngineError>;

    /// Build a decode context over an image, applying the scale-down factor.
    fn create_decoder(&self, image: Self::Image, scale: u32)
        -> Result<Self::Decoder, EngineError>;
}

/// One decode context. Dropping it, and any region it yielded, releases the
/// engine-side resources.
pub trait EngineDecoder {
    type Region;

    /// Restrict the region search to the given bounds. Callers clamp the
    /// bounds to the image dimensions first.
    fn limit_region(&mut self, bounds: RegionBounds);

    /// Set the gap between scan lines.
    fn set_scan_gap(&mut self, gap: u32);

    /// Search for the next candidate region, giving up at `deadline`.
    fn find_next_region(&mut self, deadline: Option<Instant>) -> Option<Self::Region>;

    /// Try to decode a candidate region as `family`. `None` when the region
    /// does not hold a readable symbol.
    fn decode_region(&mut self, region: Self::Region, family: SymbolFamily) -> Option<Vec<u8>>;
}

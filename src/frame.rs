use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;

use crate::error::ScanError;

/// Frame data with zero-copy semantics
#[derive(Clone)]
pub struct Frame {
    /// Immutable pixel data - can be shared across threads without copying
    pub data: Bytes,

    /// Frame geometry and identity, fixed for a configuration epoch
    pub meta: Arc<FrameMeta>,

    /// Presentation timestamp assigned by the pipeline clock
    pub pts: Option<Duration>,
}

/// Frame metadata
#[derive(Debug, Clone)]
pub struct FrameMeta {
    pub sequence: u64,
    pub width: u32,
    pub height: u32,
    /// Bits per pixel as negotiated by the pipeline
    pub depth: u32,
}

/// Pixel packing orders understood by the decode engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelPacking {
    Gray8,
    Rgb16,
    Rgb24,
    Rgbx32,
}

impl PixelPacking {
    /// Map a frame's bits-per-pixel onto a packing order. Depths outside the
    /// 8/16/24/32 families are a fatal configuration error.
    pub fn from_depth(depth: u32) -> Result<Self, ScanError> {
        match depth {
            8 => Ok(PixelPacking::Gray8),
            16 => Ok(PixelPacking::Rgb16),
            24 => Ok(PixelPacking::Rgb24),
            32 => Ok(PixelPacking::Rgbx32),
            other => Err(ScanError::UnsupportedDepth(other)),
        }
    }

    /// Bytes per pixel for this packing order.
    pub fn bytes_per_pixel(self) -> usize {
        match self {
            PixelPacking::Gray8 => 1,
            PixelPacking::Rgb16 => 2,
            PixelPacking::Rgb24 => 3,
            PixelPacking::Rgbx32 => 4,
        }
    }
}

impl Frame {
    /// Independent copy of this frame for asynchronous handling. The source
    /// buffer may be a mapped capture buffer the pipeline recycles, so the
    /// pixel data is duplicated rather than refcounted.
    pub fn deep_copy(&self) -> Frame {
        Frame {
            data: Bytes::copy_from_slice(&self.data),
            meta: Arc::clone(&self.meta),
            pts: self.pts,
        }
    }
}

pub mod engine;
pub mod error;
pub mod event;
pub mod frame;
pub mod pipeline;
pub mod testsrc;

use std::fmt;
use std::ops::RangeInclusive;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

pub use engine::{DecodeEngine, DecodedSymbol, EngineDecoder};
pub use event::{ScanOutput, SymbolEvent};
pub use frame::{Frame, FrameMeta, PixelPacking};
pub use pipeline::{Dispatch, Scanner, StatsSnapshot};

/// Valid range for the scale-down factor applied by the decode engine
pub const SCALE_RANGE: RangeInclusive<u32> = 1..=4;
/// Valid range for the per-attempt search timeout, when enabled
pub const TIMEOUT_MS_RANGE: RangeInclusive<u32> = 10..=5000;
/// Valid range for the engine's scan gap
pub const SCAN_GAP_RANGE: RangeInclusive<u32> = 1..=32;
/// Upper limit for region-of-interest bounds
pub const REGION_BOUND_MAX: u32 = 8192;

/// Symbol family the decode engine is asked to decode
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SymbolFamily {
    #[default]
    Matrix,
    Mosaic,
}

impl SymbolFamily {
    /// Type tag carried by outbound events
    pub fn as_tag(self) -> &'static str {
        match self {
            SymbolFamily::Matrix => "datamatrix",
            SymbolFamily::Mosaic => "datamosaic",
        }
    }
}

impl fmt::Display for SymbolFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_tag())
    }
}

/// Region-of-interest bounds, in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionBounds {
    pub x_min: u32,
    pub x_max: u32,
    pub y_min: u32,
    pub y_max: u32,
}

impl RegionBounds {
    /// Truncate the bounds to the frame's actual dimensions. Max bounds are
    /// capped at width/height, min bounds at the capped max.
    pub fn clamp_to(self, width: u32, height: u32) -> RegionBounds {
        let x_max = self.x_max.min(width);
        let y_max = self.y_max.min(height);
        RegionBounds {
            x_min: self.x_min.min(x_max),
            x_max,
            y_min: self.y_min.min(y_max),
            y_max,
        }
    }
}

/// Scan parameters shared between the frame-delivery thread and the decode
/// worker. The whole struct lives behind the scanner's mutex; a decode
/// attempt snapshots it so it never sees fields from two different updates.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    pub family: SymbolFamily,
    pub scale: u32,
    pub timeout_ms: u32, // 0 disables the search deadline
    pub scan_gap: u32,
    pub region: Option<RegionBounds>,
    pub suppress_duplicates: bool,
    pub stride: u64,     // 0 = decode every frame synchronously
    pub stop_after: u32, // 0 = never request end-of-stream
    pub quiet: bool,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            family: SymbolFamily::Matrix,
            scale: 1,
            timeout_ms: 250,
            scan_gap: 1,
            region: None,
            suppress_duplicates: true,
            stride: 0,
            stop_after: 0,
            quiet: false,
        }
    }
}

impl ScanConfig {
    /// Bounds-check every field that has a defined range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_range("scale", self.scale, SCALE_RANGE)?;
        if self.timeout_ms != 0 {
            check_range("timeout_ms", self.timeout_ms, TIMEOUT_MS_RANGE)?;
        }
        check_range("scan_gap", self.scan_gap, SCAN_GAP_RANGE)?;
        if let Some(region) = self.region {
            check_range("region.x_min", region.x_min, 0..=REGION_BOUND_MAX)?;
            check_range("region.x_max", region.x_max, 0..=REGION_BOUND_MAX)?;
            check_range("region.y_min", region.y_min, 0..=REGION_BOUND_MAX)?;
            check_range("region.y_max", region.y_max, 0..=REGION_BOUND_MAX)?;
        }
        Ok(())
    }

    /// Per-attempt search timeout, `None` when disabled.
    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_ms > 0).then(|| Duration::from_millis(u64::from(self.timeout_ms)))
    }
}

fn check_range(
    field: &'static str,
    value: u32,
    range: RangeInclusive<u32>,
) -> Result<(), ConfigError> {
    if range.contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange {
            field,
            value,
            min: *range.start(),
            max: *range.end(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(ScanConfig::default().validate().is_ok());
    }

    #[test]
    fn scale_out_of_range_is_rejected() {
        let config = ScanConfig {
            scale: 5,
            ..ScanConfig::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::OutOfRange {
                field: "scale",
                value: 5,
                min: 1,
                max: 4,
            })
        );
    }

    #[test]
    fn zero_timeout_means_no_deadline() {
        let config = ScanConfig {
            timeout_ms: 0,
            ..ScanConfig::default()
        };
        assert!(config.validate().is_ok());
        assert_eq!(config.timeout(), None);
    }

    #[test]
    fn enabled_timeout_must_be_in_range() {
        let config = ScanConfig {
            timeout_ms: 9,
            ..ScanConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn region_bounds_clamp_to_frame() {
        let bounds = RegionBounds {
            x_min: 10,
            x_max: 9000,
            y_min: 700,
            y_max: 9000,
        };
        let clamped = bounds.clamp_to(640, 480);
        assert_eq!(
            clamped,
            RegionBounds {
                x_min: 10,
                x_max: 640,
                y_min: 480,
                y_max: 480,
            }
        );
    }
}

//! One decode attempt over one frame.

use std::time::Instant;

use crate::error::ScanError;
use crate::frame::{Frame, PixelPacking};
use crate::ScanConfig;

use super::{DecodeEngine, DecodedSymbol, EngineDecoder};

/// Run one decode attempt over `frame` with the given parameter snapshot.
///
/// Transient misses (no region, undecodable region, deadline elapsed) come
/// back as `Ok(None)`; only unsupported pixel layouts and engine
/// construction failures are errors. Every engine handle created here is
/// dropped before this function returns, on every path.
pub fn decode_frame<E: DecodeEngine>(
    engine: &E,
    frame: &Frame,
    config: &ScanConfig,
) -> Result<Option<DecodedSymbol>, ScanError> {
    let packing = PixelPacking::from_depth(frame.meta.depth)?;

    let image = engine.create_image(
        frame.data.clone(),
        frame.meta.width,
        frame.meta.height,
        packing,
    )?;
    let mut decoder = engine.create_decoder(image, config.scale)?;

    if let Some(region) = config.region {
        decoder.limit_region(region.clamp_to(frame.meta.width, frame.meta.height));
    }
    decoder.set_scan_gap(config.scan_gap);

    // The deadline bounds only the region search, not the decode after it.
    let deadline = config.timeout().map(|timeout| Instant::now() + timeout);

    let Some(region) = decoder.find_next_region(deadline) else {
        return Ok(None);
    };

    // A region that fails to decode is the same as no region at all.
    Ok(decoder
        .decode_region(region, config.family)
        .map(|payload| DecodedSymbol {
            payload,
            family: config.family,
        }))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use bytes::Bytes;

    use crate::engine::mock::{MockEngine, Scripted};
    use crate::error::ScanError;
    use crate::frame::{Frame, FrameMeta};
    use crate::{RegionBounds, ScanConfig, SymbolFamily};

    use super::decode_frame;

    fn test_frame(depth: u32) -> Frame {
        let bytes_per_pixel = (depth as usize).div_ceil(8);
        Frame {
            data: Bytes::from(vec![0u8; 640 * 480 * bytes_per_pixel]),
            meta: Arc::new(FrameMeta {
                sequence: 0,
                width: 640,
                height: 480,
                depth,
            }),
            pts: Some(Duration::from_millis(40)),
        }
    }

    #[test]
    fn unsupported_depth_never_reaches_the_engine() {
        let engine = MockEngine::default();
        let err = decode_frame(&engine, &test_frame(12), &ScanConfig::default()).unwrap_err();
        assert!(matches!(err, ScanError::UnsupportedDepth(12)));
        assert_eq!(engine.state.attempts(), 0);
    }

    #[test]
    fn region_bounds_are_clamped_before_the_engine_sees_them() {
        let engine = MockEngine::default();
        let config = ScanConfig {
            region: Some(RegionBounds {
                x_min: 0,
                x_max: 9000,
                y_min: 0,
                y_max: 9000,
            }),
            ..ScanConfig::default()
        };
        decode_frame(&engine, &test_frame(24), &config).unwrap();
        let calls = engine.state.calls();
        assert_eq!(
            calls[0].bounds,
            Some(RegionBounds {
                x_min: 0,
                x_max: 640,
                y_min: 0,
                y_max: 480,
            })
        );
    }

    #[test]
    fn scan_parameters_reach_the_decoder() {
        let engine = MockEngine::default();
        let config = ScanConfig {
            scale: 2,
            scan_gap: 4,
            timeout_ms: 100,
            ..ScanConfig::default()
        };
        decode_frame(&engine, &test_frame(24), &config).unwrap();
        let calls = engine.state.calls();
        assert_eq!(calls[0].scale, 2);
        assert_eq!(calls[0].scan_gap, 4);
        assert!(calls[0].had_deadline);
    }

    #[test]
    fn zero_timeout_disables_the_deadline() {
        let engine = MockEngine::default();
        let config = ScanConfig {
            timeout_ms: 0,
            ..ScanConfig::default()
        };
        decode_frame(&engine, &test_frame(24), &config).unwrap();
        assert!(!engine.state.calls()[0].had_deadline);
    }

    #[test]
    fn no_region_is_a_miss() {
        let engine = MockEngine::default();
        let outcome = decode_frame(&engine, &test_frame(24), &ScanConfig::default()).unwrap();
        assert_eq!(outcome, None);
    }

    #[test]
    fn undecodable_region_is_a_miss_not_an_error() {
        let engine = MockEngine::default();
        engine.state.push(Scripted::Undecodable);
        let outcome = decode_frame(&engine, &test_frame(24), &ScanConfig::default()).unwrap();
        assert_eq!(outcome, None);
    }

    #[test]
    fn decoded_region_carries_payload_and_family() {
        let engine = MockEngine::default();
        engine.state.push(Scripted::Symbol(b"HELLO".to_vec()));
        let symbol = decode_frame(&engine, &test_frame(24), &ScanConfig::default())
            .unwrap()
            .unwrap();
        assert_eq!(symbol.payload, b"HELLO");
        assert_eq!(symbol.family, SymbolFamily::Matrix);
    }
}

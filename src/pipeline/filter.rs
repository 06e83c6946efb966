//! Duplicate suppression, event construction, and the stop-after trigger.

use std::time::Duration;

use tracing::{debug, info, warn};

use crate::engine::DecodedSymbol;
use crate::event::{ScanOutput, SymbolEvent};
use crate::pipeline::dispatch::Inner;

/// Run a freshly decoded symbol through the duplicate filter; emit an event
/// and advance the stop-after trigger when it passes. Returns whether an
/// event was emitted. Callers hold the scanner lock.
pub(crate) fn emit_symbol(
    inner: &mut Inner,
    pts: Option<Duration>,
    symbol: DecodedSymbol,
    events: &flume::Sender<ScanOutput>,
) -> bool {
    // Duplicate equality is exact byte-sequence equality on the raw
    // payload, not on its text rendering.
    if inner.config.suppress_duplicates
        && inner.last_payload.as_deref() == Some(symbol.payload.as_slice())
    {
        debug!("suppressing duplicate symbol ({} bytes)", symbol.payload.len());
        return false;
    }

    let event = SymbolEvent {
        pts,
        family: symbol.family,
        symbol: String::from_utf8_lossy(&symbol.payload).into_owned(),
    };
    if !inner.config.quiet {
        info!("found {event}");
    }
    inner.last_payload = Some(symbol.payload);

    if events.send(ScanOutput::Symbol(event)).is_err() {
        warn!("event receiver dropped, symbol discarded");
        return false;
    }

    inner.found += 1;
    if inner.config.stop_after > 0
        && inner.found >= u64::from(inner.config.stop_after)
        && !inner.eos_sent
    {
        info!(
            "stop-after threshold reached ({} symbols), requesting end-of-stream",
            inner.found
        );
        inner.eos_sent = true;
        let _ = events.send(ScanOutput::EndOfStream);
    }
    true
}

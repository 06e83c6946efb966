use std::fmt;
use std::time::Duration;

use crate::SymbolFamily;

/// Items delivered on the scanner's outbound channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanOutput {
    /// A freshly decoded, de-duplicated symbol
    Symbol(SymbolEvent),
    /// The stop-after threshold was reached; the stream should wind down
    EndOfStream,
}

/// One decoded symbol, ready for downstream consumption.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolEvent {
    /// Presentation timestamp of the frame the symbol was found in
    pub pts: Option<Duration>,
    /// Symbol family the engine decoded
    pub family: SymbolFamily,
    /// Decoded payload rendered as text
    pub symbol: String,
}

impl fmt::Display for SymbolEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.pts {
            Some(pts) => write!(f, "[{:?}] {} {:?}", pts, self.family, self.symbol),
            None => write!(f, "{} {:?}", self.family, self.symbol),
        }
    }
}

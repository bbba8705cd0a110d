//! Instrument metadata: pip size and lot size for the traded symbol.

use serde::{Deserialize, Serialize};

/// Pip and lot conversion for a single symbol.
///
/// The strategy is configured in pips and lots; the platform trades in
/// prices and volume units. All conversion goes through here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Instrument {
    pub symbol: String,
    /// Price increment of one pip (e.g. 0.0001 for EURUSD).
    pub pip_size: f64,
    /// Volume units per lot (e.g. 100_000 for standard forex lots).
    pub lot_size: f64,
}

impl Instrument {
    pub fn new(symbol: impl Into<String>, pip_size: f64, lot_size: f64) -> Self {
        Self {
            symbol: symbol.into(),
            pip_size,
            lot_size,
        }
    }

    /// A standard forex major: 0.0001 pip, 100k lot.
    pub fn forex(symbol: impl Into<String>) -> Self {
        Self::new(symbol, 0.0001, 100_000.0)
    }

    pub fn pips_to_price(&self, pips: f64) -> f64 {
        pips * self.pip_size
    }

    pub fn price_to_pips(&self, price: f64) -> f64 {
        price / self.pip_size
    }

    pub fn lots_to_volume(&self, lots: f64) -> f64 {
        lots * self.lot_size
    }
}

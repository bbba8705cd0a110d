//! Inversion safety closure and session-end liquidation.
//!
//! Runs on every tick, independent of the bar-driven signal state. A
//! position whose band has been breached back in the opposite direction —
//! at 0-bar lag, against the current incomplete bar's extreme — has lost
//! its thesis and is closed immediately. Separately, day-trade mode
//! liquidates every tagged position once the session enters its closing
//! window.

use tracing::{info, warn};

use crate::domain::{BandLevels, BarWindow, Direction, TickExtremes};
use crate::platform::TradingPlatform;

use super::crossing::{crossed_above, crossed_below};
use super::{BOTTOM_BUY_LABEL, TOP_SELL_LABEL};

#[derive(Debug, Clone, Copy)]
pub struct InversionGuard {
    autoclose: bool,
}

impl InversionGuard {
    pub fn new(autoclose: bool) -> Self {
        Self { autoclose }
    }

    /// Close open positions whose band was breached the wrong way on the
    /// forming bar. Returns how many closures were requested.
    pub fn run<P: TradingPlatform + ?Sized>(
        &self,
        platform: &mut P,
        bands: &BandLevels,
        window: &BarWindow,
        tick: &TickExtremes,
    ) -> usize {
        if !self.autoclose {
            return 0;
        }

        let mut closed = 0;

        // A short from the top band dies when the high pushes back above it.
        if crossed_above(window.high_prev1, tick.high, bands.top) {
            for id in platform.find_positions(TOP_SELL_LABEL, Direction::Sell) {
                info!(
                    position = %id,
                    high = tick.high,
                    top = bands.top,
                    "inversion safety closure: high crossed above band top"
                );
                match platform.close_position(id) {
                    Ok(()) => closed += 1,
                    Err(err) => warn!(position = %id, error = %err, "close request failed"),
                }
            }
        }

        // Mirror: a long from the bottom band dies when the low breaks below.
        if crossed_below(window.low_prev1, tick.low, bands.bottom) {
            for id in platform.find_positions(BOTTOM_BUY_LABEL, Direction::Buy) {
                info!(
                    position = %id,
                    low = tick.low,
                    bottom = bands.bottom,
                    "inversion safety closure: low crossed below band bottom"
                );
                match platform.close_position(id) {
                    Ok(()) => closed += 1,
                    Err(err) => warn!(position = %id, error = %err, "close request failed"),
                }
            }
        }

        closed
    }
}

/// Session-end liquidation: close every tagged position, both origins,
/// regardless of inversion state. Returns how many closures were requested.
pub fn close_all_tagged<P: TradingPlatform + ?Sized>(platform: &mut P) -> usize {
    let mut closed = 0;
    let tagged = [
        (TOP_SELL_LABEL, Direction::Sell),
        (BOTTOM_BUY_LABEL, Direction::Buy),
    ];
    for (label, direction) in tagged {
        for id in platform.find_positions(label, direction) {
            info!(position = %id, label, "session closing, liquidating position");
            match platform.close_position(id) {
                Ok(()) => closed += 1,
                Err(err) => warn!(position = %id, error = %err, "close request failed"),
            }
        }
    }
    closed
}

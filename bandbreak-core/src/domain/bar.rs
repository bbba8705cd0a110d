//! Price views handed to the strategy: the two-bar lookback window and the
//! extremes of the current incomplete bar.

use serde::{Deserialize, Serialize};

/// Close/high/low of the last two completed bars.
///
/// `prev1` is the most recently completed bar, `prev2` the one before it.
/// This is everything the crossing detector and trend gate are allowed to
/// see — a read-only slice of the feed, never the forming bar.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BarWindow {
    pub close_prev2: f64,
    pub close_prev1: f64,
    pub high_prev2: f64,
    pub high_prev1: f64,
    pub low_prev2: f64,
    pub low_prev1: f64,
}

impl BarWindow {
    /// Basic sanity: all values finite, highs not below lows.
    pub fn is_sane(&self) -> bool {
        let vals = [
            self.close_prev2,
            self.close_prev1,
            self.high_prev2,
            self.high_prev1,
            self.low_prev2,
            self.low_prev1,
        ];
        vals.iter().all(|v| v.is_finite())
            && self.high_prev2 >= self.low_prev2
            && self.high_prev1 >= self.low_prev1
    }
}

/// High/low of the current incomplete bar.
///
/// Used only by the inversion guard, which runs on every tick and is the
/// one component allowed a 0-bar-lag view.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TickExtremes {
    pub high: f64,
    pub low: f64,
}

//! Crossing detection against the band boundaries.
//!
//! Standard crossing semantics over a 1-bar lag window: the series was on
//! one side of the level on the prior-to-previous bar and at/past it on the
//! previous bar. Two interchangeable modes: candle break-in tests the bar
//! extreme (high against the top band, low against the bottom), close-only
//! tests the close against both bands.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::{BandLevels, BarWindow};

/// Which price series feeds the lagged crossing check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BreakoutMode {
    /// Bar extremes: catches breaks inside the bar's range, not just at close.
    CandleBreakIn,
    /// Close price only.
    CloseOnly,
}

/// Which band boundary was crossed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BandSide {
    Top,
    Bottom,
}

/// A detected crossing on the most recent completed bar.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CrossingEvent {
    pub side: BandSide,
    /// The series value that crossed.
    pub price: f64,
    /// The band value it crossed.
    pub level: f64,
}

/// `true` when the series moved from below `level` to at/above it
/// between the prior-to-previous and previous observations.
pub fn crossed_above(prev2: f64, prev1: f64, level: f64) -> bool {
    prev2 < level && prev1 >= level
}

/// Mirror of [`crossed_above`].
pub fn crossed_below(prev2: f64, prev1: f64, level: f64) -> bool {
    prev2 > level && prev1 <= level
}

/// Detects band-boundary crossings on completed bars.
#[derive(Debug, Clone)]
pub struct CrossingDetector {
    mode: BreakoutMode,
    /// Minimum band height in price units; narrower bands are ignored.
    min_band_height: f64,
}

impl CrossingDetector {
    pub fn new(mode: BreakoutMode, min_band_height: f64) -> Self {
        Self {
            mode,
            min_band_height,
        }
    }

    pub fn mode(&self) -> BreakoutMode {
        self.mode
    }

    /// Evaluate the most recent completed bar against the bands.
    ///
    /// At most one side fires per bar: the top test wins when both would.
    /// Returns `None` when the band is too narrow, regardless of price.
    pub fn detect(&self, window: &BarWindow, bands: &BandLevels) -> Option<CrossingEvent> {
        if !bands.is_wide_enough(self.min_band_height) {
            return None;
        }

        let (top_prev2, top_prev1, bottom_prev2, bottom_prev1) = match self.mode {
            BreakoutMode::CandleBreakIn => (
                window.high_prev2,
                window.high_prev1,
                window.low_prev2,
                window.low_prev1,
            ),
            BreakoutMode::CloseOnly => (
                window.close_prev2,
                window.close_prev1,
                window.close_prev2,
                window.close_prev1,
            ),
        };

        if crossed_above(top_prev2, top_prev1, bands.top) {
            debug!(
                price = top_prev1,
                level = bands.top,
                "price crossed above band top"
            );
            Some(CrossingEvent {
                side: BandSide::Top,
                price: top_prev1,
                level: bands.top,
            })
        } else if crossed_below(bottom_prev2, bottom_prev1, bands.bottom) {
            debug!(
                price = bottom_prev1,
                level = bands.bottom,
                "price crossed below band bottom"
            );
            Some(CrossingEvent {
                side: BandSide::Bottom,
                price: bottom_prev1,
                level: bands.bottom,
            })
        } else {
            None
        }
    }
}

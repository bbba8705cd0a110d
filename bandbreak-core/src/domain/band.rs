//! Band levels — the upper/lower envelope for the last completed bar.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Upper and lower band values for the last completed bar.
///
/// Recomputed by the platform every bar; never persisted. The invariant
/// `top >= bottom` is enforced at construction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BandLevels {
    pub top: f64,
    pub bottom: f64,
}

#[derive(Debug, Error, PartialEq)]
pub enum BandError {
    #[error("inverted band: top {top} is below bottom {bottom}")]
    Inverted { top: f64, bottom: f64 },
    #[error("non-finite band value: top {top}, bottom {bottom}")]
    NonFinite { top: f64, bottom: f64 },
}

impl BandLevels {
    pub fn new(top: f64, bottom: f64) -> Result<Self, BandError> {
        if !top.is_finite() || !bottom.is_finite() {
            return Err(BandError::NonFinite { top, bottom });
        }
        if top < bottom {
            return Err(BandError::Inverted { top, bottom });
        }
        Ok(Self { top, bottom })
    }

    pub fn height(&self) -> f64 {
        self.top - self.bottom
    }

    /// Noise filter: bands narrower than `min_height` (in price units)
    /// are ignored entirely by the crossing detector.
    pub fn is_wide_enough(&self, min_height: f64) -> bool {
        self.height() >= min_height
    }
}

//! Strategy configuration.
//!
//! The parameter surface is supplied and validated by the host (defaults
//! mirror the robot's original parameter defaults); the core does not
//! re-validate it.

use serde::{Deserialize, Serialize};

use crate::strategy::crossing::BreakoutMode;

/// Externally supplied strategy parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StrategyConfig {
    /// Order size in lots.
    pub quantity_lots: f64,
    pub stop_loss_pips: f64,
    pub take_profit_pips: f64,
    /// Minimum band height (pips) below which no crossing is detected.
    pub band_height_pips: f64,
    /// Candle break-in (bar extremes) vs close-only crossing detection.
    pub breakout_mode: BreakoutMode,
    /// Require fading momentum before entering against a breakout.
    pub trend_check: bool,
    /// Force-close positions whose band is breached in the opposite direction.
    pub autoclose_inversion: bool,
    /// Completed bars to wait after a crossing before entry (0-5).
    pub execution_delay: u32,
    /// Forbid holding positions through the session close.
    pub day_trade_only: bool,
    /// Consecutive losing stop-losses allowed per day; `None` disables the check.
    pub daily_stop_loss_limit: Option<u32>,
    /// Deny entries while any position is open for the symbol.
    pub single_position_only: bool,
}

impl Default for StrategyConfig {
    fn default() -> Self {
        Self {
            quantity_lots: 1.0,
            stop_loss_pips: 5.0,
            take_profit_pips: 5.0,
            band_height_pips: 15.0,
            breakout_mode: BreakoutMode::CandleBreakIn,
            trend_check: true,
            autoclose_inversion: true,
            execution_delay: 0,
            day_trade_only: false,
            daily_stop_loss_limit: None,
            single_position_only: false,
        }
    }
}

//! The trading-platform boundary.
//!
//! Everything the strategy needs from the outside world goes through
//! [`TradingPlatform`]: band snapshots, price windows, order submission,
//! position lookup, and the session clock. The host delivers work as
//! [`StrategyEvent`]s on a single serialized queue — the position-closed
//! callback is a queued message like any other, so bar, tick, and closure
//! handling can never interleave.

use chrono::{Duration, NaiveDate};
use thiserror::Error;

use crate::domain::{
    BandLevels, BarWindow, Direction, OrderId, OrderRequest, PositionClosed, PositionId,
    TickExtremes,
};

#[derive(Debug, Error)]
pub enum PlatformError {
    /// Session schedule lookup failed (happens near week boundaries).
    /// The core treats this as "session not closing" and logs it.
    #[error("session schedule unavailable: {0}")]
    SessionUnavailable(String),

    #[error("insufficient history: need {needed} completed bars, have {have}")]
    InsufficientHistory { needed: usize, have: usize },

    #[error("order rejected: {0}")]
    OrderRejected(String),

    #[error("unknown position: {0}")]
    UnknownPosition(PositionId),

    #[error("invalid market data: {0}")]
    InvalidData(String),
}

/// One unit of work delivered to the strategy.
///
/// The host serializes all three kinds through one FIFO queue; within a
/// single bar, `BarClosed` handling always completes before the next event
/// is delivered.
#[derive(Debug, Clone, PartialEq)]
pub enum StrategyEvent {
    /// A bar just completed; a new one is forming.
    BarClosed,
    /// Intrabar price update on the forming bar.
    Tick,
    /// The platform closed a position (stop, target, or by request).
    PositionClosed(PositionClosed),
}

/// Narrow interface the strategy consumes; implemented by the host.
pub trait TradingPlatform {
    /// Upper/lower band values for the last completed bar.
    fn band_levels(&self) -> Result<BandLevels, PlatformError>;

    /// Close/high/low of the last two completed bars.
    fn bar_window(&self) -> Result<BarWindow, PlatformError>;

    /// High/low of the current incomplete bar (tick-path view).
    fn tick_extremes(&self) -> Result<TickExtremes, PlatformError>;

    /// Submit a market order with attached stop-loss/take-profit distances.
    fn submit_order(&mut self, request: OrderRequest) -> Result<OrderId, PlatformError>;

    /// Request closure of an open position.
    fn close_position(&mut self, id: PositionId) -> Result<(), PlatformError>;

    /// Open positions carrying `label` in the given direction.
    fn find_positions(&self, label: &str, direction: Direction) -> Vec<PositionId>;

    /// Count of open positions for the traded symbol, any label or direction.
    fn open_position_count(&self) -> usize;

    /// Time remaining until the session closes. Fails near week boundaries.
    fn session_time_till_close(&self) -> Result<Duration, PlatformError>;

    /// Current calendar date on the platform's timezone-normalized clock.
    fn today(&self) -> NaiveDate;
}

//! BandBreak Core — the signal-and-risk state machine for a band break-in
//! trading strategy.
//!
//! This crate contains the decision core and its boundary:
//! - Domain types (band levels, price windows, instrument, orders/positions)
//! - Crossing detection with candle-break-in and close-only modes
//! - Pending-signal state machine with execution delay
//! - Trend, session, daily-loss, and single-position gates
//! - Tick-path inversion guard and session-end liquidation
//! - The `TradingPlatform` trait the host implements
//!
//! The core performs no I/O and owns no positions; everything external is
//! consumed through [`platform::TradingPlatform`] and the serialized
//! [`platform::StrategyEvent`] queue.

pub mod config;
pub mod domain;
pub mod platform;
pub mod strategy;

pub use config::StrategyConfig;
pub use strategy::BreakInStrategy;

#[cfg(test)]
mod tests {
    use super::*;

    /// Compile-time check: core types are Send + Sync, so a host may drive
    /// the strategy from a worker thread.
    #[allow(dead_code)]
    fn assert_send_sync() {
        fn require_send<T: Send>() {}
        fn require_sync<T: Sync>() {}

        require_send::<domain::BandLevels>();
        require_sync::<domain::BandLevels>();
        require_send::<domain::BarWindow>();
        require_sync::<domain::BarWindow>();
        require_send::<domain::Instrument>();
        require_sync::<domain::Instrument>();
        require_send::<domain::OrderRequest>();
        require_sync::<domain::OrderRequest>();
        require_send::<domain::PositionClosed>();
        require_sync::<domain::PositionClosed>();

        require_send::<config::StrategyConfig>();
        require_sync::<config::StrategyConfig>();

        require_send::<strategy::SignalState>();
        require_sync::<strategy::SignalState>();
        require_send::<strategy::RiskGate>();
        require_sync::<strategy::RiskGate>();
        require_send::<strategy::BreakInStrategy>();
        require_sync::<strategy::BreakInStrategy>();

        require_send::<platform::StrategyEvent>();
        require_sync::<platform::StrategyEvent>();
        require_send::<platform::PlatformError>();
        require_sync::<platform::PlatformError>();
    }
}

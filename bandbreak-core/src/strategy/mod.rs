//! The break-in strategy: per-event orchestration of detection, gating,
//! dispatch, and the tick-path safety nets.
//!
//! Event handling is strictly serialized by the host queue. Within one
//! `BarClosed` cycle the order is fixed: crossing detection updates the
//! pending flags, the risk gate authorizes, dispatch attempts run (top
//! then bottom, independently), and the delay counter ticks last.

pub mod crossing;
pub mod inversion;
pub mod risk;
pub mod signal;
pub mod trend;

pub use crossing::{BandSide, BreakoutMode, CrossingDetector, CrossingEvent};
pub use inversion::InversionGuard;
pub use risk::{Denial, RiskGate};
pub use signal::{Pending, SignalState};
pub use trend::TrendGate;

use tracing::{debug, info, warn};

use crate::config::StrategyConfig;
use crate::domain::{BarWindow, Direction, Instrument, OrderRequest, PositionClosed};
use crate::platform::{StrategyEvent, TradingPlatform};

/// Label on positions opened by a top-band breakout (sell side).
pub const TOP_SELL_LABEL: &str = "Top Line Sell";
/// Label on positions opened by a bottom-band breakout (buy side).
pub const BOTTOM_BUY_LABEL: &str = "Bottom Line Buy";

/// The signal-and-risk state machine.
pub struct BreakInStrategy {
    config: StrategyConfig,
    instrument: Instrument,
    detector: CrossingDetector,
    signals: SignalState,
    trend: TrendGate,
    risk: RiskGate,
    inversion: InversionGuard,
}

impl BreakInStrategy {
    pub fn new(config: StrategyConfig, instrument: Instrument) -> Self {
        let min_band_height = instrument.pips_to_price(config.band_height_pips);
        let detector = CrossingDetector::new(config.breakout_mode, min_band_height);
        let signals = SignalState::new(config.execution_delay);
        let trend = TrendGate::new(config.trend_check);
        let risk = RiskGate::new(&config);
        let inversion = InversionGuard::new(config.autoclose_inversion);
        Self {
            config,
            instrument,
            detector,
            signals,
            trend,
            risk,
            inversion,
        }
    }

    pub fn config(&self) -> &StrategyConfig {
        &self.config
    }

    pub fn signal_state(&self) -> &SignalState {
        &self.signals
    }

    pub fn risk(&self) -> &RiskGate {
        &self.risk
    }

    /// Single entry point; the host feeds events from its serialized queue.
    pub fn handle<P: TradingPlatform + ?Sized>(&mut self, event: StrategyEvent, platform: &mut P) {
        match event {
            StrategyEvent::BarClosed => self.on_bar(platform),
            StrategyEvent::Tick => self.on_tick(platform),
            StrategyEvent::PositionClosed(closed) => {
                self.on_position_closed(&closed, platform);
            }
        }
    }

    fn on_bar<P: TradingPlatform + ?Sized>(&mut self, platform: &mut P) {
        let bands = match platform.band_levels() {
            Ok(bands) => bands,
            Err(err) => {
                warn!(error = %err, "band snapshot unavailable, skipping bar");
                return;
            }
        };
        let window = match platform.bar_window() {
            Ok(window) => window,
            Err(err) => {
                warn!(error = %err, "price window unavailable, skipping bar");
                return;
            }
        };

        if let Some(event) = self.detector.detect(&window, &bands) {
            match event.side {
                BandSide::Top => self.signals.flag_top(),
                BandSide::Bottom => self.signals.flag_bottom(),
            }
        }

        self.risk.update_session(platform.session_time_till_close());
        if self.risk.roll_day(platform.today()) {
            self.signals.reset_delay();
        }

        match self.risk.authorize(platform.open_position_count()) {
            Ok(()) => self.attempt_dispatch(platform, &window),
            Err(denial) => debug!(%denial, "entry authorization denied"),
        }

        // Counter advances after dispatch attempts, never before.
        self.signals.tick();
    }

    /// Top then bottom, each on its own merits; both can fire in one bar.
    fn attempt_dispatch<P: TradingPlatform + ?Sized>(
        &mut self,
        platform: &mut P,
        window: &BarWindow,
    ) {
        let volume = self.instrument.lots_to_volume(self.config.quantity_lots);

        if self.signals.top_pending() && self.signals.is_ready() && self.trend.confirms_sell(window)
        {
            let request = OrderRequest {
                direction: Direction::Sell,
                volume,
                label: TOP_SELL_LABEL.to_string(),
                stop_loss_pips: self.config.stop_loss_pips,
                take_profit_pips: self.config.take_profit_pips,
            };
            match platform.submit_order(request) {
                Ok(order) => {
                    info!(%order, "sell dispatched against band top");
                    self.signals.clear_top();
                }
                Err(err) => {
                    // keep the flag armed; retry on the next eligible bar
                    warn!(error = %err, "sell order rejected");
                }
            }
        }

        if self.signals.bottom_pending()
            && self.signals.is_ready()
            && self.trend.confirms_buy(window)
        {
            let request = OrderRequest {
                direction: Direction::Buy,
                volume,
                label: BOTTOM_BUY_LABEL.to_string(),
                stop_loss_pips: self.config.stop_loss_pips,
                take_profit_pips: self.config.take_profit_pips,
            };
            match platform.submit_order(request) {
                Ok(order) => {
                    info!(%order, "buy dispatched against band bottom");
                    self.signals.clear_bottom();
                }
                Err(err) => {
                    warn!(error = %err, "buy order rejected");
                }
            }
        }
    }

    fn on_tick<P: TradingPlatform + ?Sized>(&mut self, platform: &mut P) {
        if self.config.day_trade_only {
            self.risk.update_session(platform.session_time_till_close());
            if self.risk.must_liquidate_for_session() {
                inversion::close_all_tagged(platform);
            }
        }

        if !self.config.autoclose_inversion {
            return;
        }

        let bands = match platform.band_levels() {
            Ok(bands) => bands,
            Err(err) => {
                warn!(error = %err, "band snapshot unavailable, skipping tick");
                return;
            }
        };
        let window = match platform.bar_window() {
            Ok(window) => window,
            Err(err) => {
                warn!(error = %err, "price window unavailable, skipping tick");
                return;
            }
        };
        let tick = match platform.tick_extremes() {
            Ok(tick) => tick,
            Err(err) => {
                warn!(error = %err, "tick extremes unavailable, skipping tick");
                return;
            }
        };

        self.inversion.run(platform, &bands, &window, &tick);
    }

    fn on_position_closed<P: TradingPlatform + ?Sized>(
        &mut self,
        closed: &PositionClosed,
        platform: &P,
    ) {
        debug!(
            position = %closed.id,
            reason = ?closed.reason,
            net_profit = closed.net_profit,
            "position closed"
        );
        self.risk
            .record_closure(closed.reason, closed.net_profit, platform.today());
    }
}

//! The simulated trading platform behind the replay.
//!
//! Deterministic rules:
//! - market entries fill at the forming bar's open (next-bar-open policy)
//! - stop-loss/take-profit are checked against the forming bar's extremes
//!   with worst-case ordering: when both are touched in one bar, the stop
//!   fills first
//! - requested closures exit at the forming bar's close
//! - the session clock is derived from bar timestamps; the final feed bar
//!   has no successor to measure against, so the lookup fails there the
//!   way a live platform fails near week boundaries

use chrono::{Duration, NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use tracing::debug;

use bandbreak_core::domain::{
    BandLevels, BarWindow, CloseReason, Direction, Instrument, OrderId, OrderRequest,
    PositionClosed, PositionId, TickExtremes,
};
use bandbreak_core::platform::{PlatformError, TradingPlatform};

use crate::data::BandBar;

/// An open position inside the simulator.
#[derive(Debug, Clone)]
struct SimPosition {
    id: PositionId,
    label: String,
    direction: Direction,
    volume: f64,
    entry_price: f64,
    stop_price: f64,
    target_price: f64,
}

/// Journal entry for every closure, kept for the run report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClosureRecord {
    pub label: String,
    pub direction: Direction,
    pub reason: CloseReason,
    pub net_profit: f64,
    pub closed_at: chrono::NaiveDateTime,
}

/// In-memory [`TradingPlatform`] over a validated bar feed.
pub struct SimPlatform {
    instrument: Instrument,
    bars: Vec<BandBar>,
    /// Index of the forming (incomplete) bar. Bars before it are completed.
    cursor: usize,
    session_close: NaiveTime,
    positions: Vec<SimPosition>,
    /// Closures not yet collected by the event loop.
    pending_events: Vec<PositionClosed>,
    journal: Vec<ClosureRecord>,
    orders_submitted: u32,
    next_id: u64,
}

impl SimPlatform {
    /// `bars` must already be validated (see [`crate::data::load_band_bars`]).
    pub fn new(instrument: Instrument, bars: Vec<BandBar>, session_close: NaiveTime) -> Self {
        Self {
            instrument,
            bars,
            cursor: 2,
            session_close,
            positions: Vec::new(),
            pending_events: Vec::new(),
            journal: Vec::new(),
            orders_submitted: 0,
            next_id: 1,
        }
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn bar_count(&self) -> usize {
        self.bars.len()
    }

    pub fn orders_submitted(&self) -> u32 {
        self.orders_submitted
    }

    pub fn journal(&self) -> &[ClosureRecord] {
        &self.journal
    }

    /// Advance to the next forming bar. Returns `false` once the feed ends.
    pub fn advance(&mut self) -> bool {
        if self.cursor + 1 < self.bars.len() {
            self.cursor += 1;
            true
        } else {
            false
        }
    }

    fn forming_bar(&self) -> &BandBar {
        &self.bars[self.cursor]
    }

    /// Drain closures produced since the last call, in occurrence order.
    pub fn take_closed_events(&mut self) -> Vec<PositionClosed> {
        std::mem::take(&mut self.pending_events)
    }

    /// Check stop/target levels against the forming bar's range.
    ///
    /// Worst-case intrabar ordering: the stop is tested before the target.
    pub fn evaluate_intrabar(&mut self) {
        let bar = self.forming_bar().clone();
        let mut still_open = Vec::with_capacity(self.positions.len());
        let mut filled = Vec::new();

        for position in self.positions.drain(..) {
            let exit = match position.direction {
                Direction::Buy => {
                    if bar.low <= position.stop_price {
                        Some((position.stop_price, CloseReason::StopLoss))
                    } else if bar.high >= position.target_price {
                        Some((position.target_price, CloseReason::TakeProfit))
                    } else {
                        None
                    }
                }
                Direction::Sell => {
                    if bar.high >= position.stop_price {
                        Some((position.stop_price, CloseReason::StopLoss))
                    } else if bar.low <= position.target_price {
                        Some((position.target_price, CloseReason::TakeProfit))
                    } else {
                        None
                    }
                }
            };

            match exit {
                Some((price, reason)) => filled.push((position, price, reason)),
                None => still_open.push(position),
            }
        }

        self.positions = still_open;
        for (position, price, reason) in filled {
            self.record_closure(position, price, reason);
        }
    }

    fn record_closure(&mut self, position: SimPosition, exit_price: f64, reason: CloseReason) {
        let net_profit =
            (exit_price - position.entry_price) * position.direction.sign() * position.volume;
        let closed_at = self.forming_bar().timestamp;
        debug!(
            position = %position.id,
            ?reason,
            net_profit,
            "simulated closure"
        );
        self.journal.push(ClosureRecord {
            label: position.label.clone(),
            direction: position.direction,
            reason,
            net_profit,
            closed_at,
        });
        self.pending_events.push(PositionClosed {
            id: position.id,
            label: position.label,
            direction: position.direction,
            reason,
            net_profit,
        });
    }
}

impl TradingPlatform for SimPlatform {
    fn band_levels(&self) -> Result<BandLevels, PlatformError> {
        let last = &self.bars[self.cursor - 1];
        BandLevels::new(last.band_top, last.band_bottom)
            .map_err(|err| PlatformError::InvalidData(err.to_string()))
    }

    fn bar_window(&self) -> Result<BarWindow, PlatformError> {
        if self.cursor < 2 {
            return Err(PlatformError::InsufficientHistory {
                needed: 2,
                have: self.cursor,
            });
        }
        let prev2 = &self.bars[self.cursor - 2];
        let prev1 = &self.bars[self.cursor - 1];
        Ok(BarWindow {
            close_prev2: prev2.close,
            close_prev1: prev1.close,
            high_prev2: prev2.high,
            high_prev1: prev1.high,
            low_prev2: prev2.low,
            low_prev1: prev1.low,
        })
    }

    fn tick_extremes(&self) -> Result<TickExtremes, PlatformError> {
        let bar = self.forming_bar();
        Ok(TickExtremes {
            high: bar.high,
            low: bar.low,
        })
    }

    fn submit_order(&mut self, request: OrderRequest) -> Result<OrderId, PlatformError> {
        if request.volume <= 0.0 {
            return Err(PlatformError::OrderRejected(format!(
                "non-positive volume {}",
                request.volume
            )));
        }
        let entry_price = self.forming_bar().open;
        let stop_offset = self.instrument.pips_to_price(request.stop_loss_pips);
        let target_offset = self.instrument.pips_to_price(request.take_profit_pips);
        let (stop_price, target_price) = match request.direction {
            Direction::Buy => (entry_price - stop_offset, entry_price + target_offset),
            Direction::Sell => (entry_price + stop_offset, entry_price - target_offset),
        };

        let order_id = OrderId(self.next_id);
        let position_id = PositionId(self.next_id);
        self.next_id += 1;
        self.orders_submitted += 1;

        debug!(
            order = %order_id,
            direction = %request.direction,
            entry_price,
            stop_price,
            target_price,
            label = %request.label,
            "order filled"
        );
        self.positions.push(SimPosition {
            id: position_id,
            label: request.label,
            direction: request.direction,
            volume: request.volume,
            entry_price,
            stop_price,
            target_price,
        });
        Ok(order_id)
    }

    fn close_position(&mut self, id: PositionId) -> Result<(), PlatformError> {
        let index = self
            .positions
            .iter()
            .position(|p| p.id == id)
            .ok_or(PlatformError::UnknownPosition(id))?;
        let position = self.positions.remove(index);
        let exit_price = self.forming_bar().close;
        self.record_closure(position, exit_price, CloseReason::Manual);
        Ok(())
    }

    fn find_positions(&self, label: &str, direction: Direction) -> Vec<PositionId> {
        self.positions
            .iter()
            .filter(|p| p.label == label && p.direction == direction)
            .map(|p| p.id)
            .collect()
    }

    fn open_position_count(&self) -> usize {
        self.positions.len()
    }

    fn session_time_till_close(&self) -> Result<Duration, PlatformError> {
        if self.cursor + 1 >= self.bars.len() {
            return Err(PlatformError::SessionUnavailable(
                "no successor bar to anchor the session clock".into(),
            ));
        }
        let now = self.forming_bar().timestamp;
        let close_at = now.date().and_time(self.session_close);
        let remaining = close_at - now;
        Ok(remaining.max(Duration::zero()))
    }

    fn today(&self) -> NaiveDate {
        self.forming_bar().timestamp.date()
    }
}

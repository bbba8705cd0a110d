//! Risk gate: session cutoff, daily consecutive-stop-loss limit, and the
//! single-position constraint, plus the stop-loss bookkeeping that feeds
//! the daily limit.
//!
//! Each check is independently toggleable; a disabled check always passes.
//! The session state it derives (`session_closing`) doubles as the trigger
//! for day-trade session-end liquidation on the tick path.

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{info, warn};

use crate::config::StrategyConfig;
use crate::domain::CloseReason;
use crate::platform::PlatformError;

/// Minutes before session close during which no new orders are authorized.
pub const SESSION_CLOSE_WINDOW_MINUTES: i64 = 5;

/// Why authorization was denied this bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Denial {
    /// Session is inside its pre-close window (day-trade mode).
    SessionClosing,
    /// Today's consecutive stop-loss budget is spent.
    DailyLossLimit,
    /// A position is already open for the symbol.
    PositionOpen,
}

impl fmt::Display for Denial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Denial::SessionClosing => write!(f, "SessionClosing"),
            Denial::DailyLossLimit => write!(f, "DailyLossLimit"),
            Denial::PositionOpen => write!(f, "PositionOpen"),
        }
    }
}

/// Mutable risk state plus the configured toggles.
#[derive(Debug, Clone)]
pub struct RiskGate {
    day_trade_only: bool,
    daily_stop_loss_limit: Option<u32>,
    single_position_only: bool,

    consecutive_losses: u32,
    last_loss_date: Option<NaiveDate>,
    limit_notice_sent: bool,
    session_closing: bool,
}

impl RiskGate {
    pub fn new(config: &StrategyConfig) -> Self {
        Self {
            day_trade_only: config.day_trade_only,
            daily_stop_loss_limit: config.daily_stop_loss_limit,
            single_position_only: config.single_position_only,
            consecutive_losses: 0,
            last_loss_date: None,
            limit_notice_sent: false,
            session_closing: false,
        }
    }

    pub fn consecutive_losses(&self) -> u32 {
        self.consecutive_losses
    }

    pub fn session_closing(&self) -> bool {
        self.session_closing
    }

    /// Whether the tick path must liquidate tagged positions right now.
    pub fn must_liquidate_for_session(&self) -> bool {
        self.day_trade_only && self.session_closing
    }

    /// Refresh `session_closing` from the platform's session clock.
    ///
    /// A failed lookup (week boundaries) is a transient platform error:
    /// assume the session is not closing and log, never propagate.
    pub fn update_session(&mut self, till_close: Result<Duration, PlatformError>) {
        self.session_closing = match till_close {
            Ok(remaining) => remaining <= Duration::minutes(SESSION_CLOSE_WINDOW_MINUTES),
            Err(err) => {
                warn!(error = %err, "session clock unavailable, assuming session open");
                false
            }
        };
    }

    /// New-trading-day bookkeeping for the daily-limit check.
    ///
    /// Returns `true` exactly once per date change: when the calendar date
    /// has moved past the last counted loss, the loss counter and the
    /// notice flag are cleared (the caller also rewinds the delay counter).
    /// A no-op while the daily-limit check is disabled.
    pub fn roll_day(&mut self, today: NaiveDate) -> bool {
        if self.daily_stop_loss_limit.is_none() {
            return false;
        }
        match self.last_loss_date {
            Some(date) if date != today => {
                self.consecutive_losses = 0;
                self.limit_notice_sent = false;
                self.last_loss_date = None;
                info!(%today, "new trading day, stop-loss counter reset");
                true
            }
            _ => false,
        }
    }

    /// The per-bar authorization decision. All enabled checks must pass.
    pub fn authorize(&mut self, open_positions: usize) -> Result<(), Denial> {
        if self.day_trade_only && self.session_closing {
            return Err(Denial::SessionClosing);
        }

        if let Some(limit) = self.daily_stop_loss_limit {
            if self.consecutive_losses >= limit {
                if !self.limit_notice_sent {
                    info!(
                        losses = self.consecutive_losses,
                        limit, "daily stop-loss limit reached, trading suspended for today"
                    );
                    self.limit_notice_sent = true;
                }
                return Err(Denial::DailyLossLimit);
            }
        }

        if self.single_position_only && open_positions > 0 {
            return Err(Denial::PositionOpen);
        }

        Ok(())
    }

    /// Stop-loss bookkeeping, fed by position-closed events.
    ///
    /// A losing stop-loss counts against today; any net-positive closure
    /// clears the streak; everything else leaves it untouched.
    pub fn record_closure(&mut self, reason: CloseReason, net_profit: f64, today: NaiveDate) {
        if reason == CloseReason::StopLoss && net_profit < 0.0 {
            self.consecutive_losses += 1;
            self.last_loss_date = Some(today);
            info!(count = self.consecutive_losses, "losing stop-loss recorded");
        } else if net_profit > 0.0 {
            self.consecutive_losses = 0;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, d).unwrap()
    }

    fn gate(config: StrategyConfig) -> RiskGate {
        RiskGate::new(&config)
    }

    fn all_disabled() -> StrategyConfig {
        StrategyConfig {
            day_trade_only: false,
            daily_stop_loss_limit: None,
            single_position_only: false,
            ..StrategyConfig::default()
        }
    }

    #[test]
    fn disabled_gates_always_authorize() {
        let mut g = gate(all_disabled());
        g.update_session(Ok(Duration::minutes(1)));
        g.record_closure(CloseReason::StopLoss, -10.0, date(1));
        g.record_closure(CloseReason::StopLoss, -10.0, date(1));
        assert_eq!(g.authorize(5), Ok(()));
    }

    #[test]
    fn session_window_denies_in_day_trade_mode() {
        let mut g = gate(StrategyConfig {
            day_trade_only: true,
            ..all_disabled()
        });
        g.update_session(Ok(Duration::minutes(4)));
        assert_eq!(g.authorize(0), Err(Denial::SessionClosing));
        assert!(g.must_liquidate_for_session());

        // outside the window trading resumes
        g.update_session(Ok(Duration::minutes(30)));
        assert_eq!(g.authorize(0), Ok(()));
        assert!(!g.must_liquidate_for_session());
    }

    #[test]
    fn session_window_boundary_is_inclusive() {
        let mut g = gate(StrategyConfig {
            day_trade_only: true,
            ..all_disabled()
        });
        g.update_session(Ok(Duration::minutes(SESSION_CLOSE_WINDOW_MINUTES)));
        assert_eq!(g.authorize(0), Err(Denial::SessionClosing));
    }

    #[test]
    fn session_clock_failure_assumes_open() {
        let mut g = gate(StrategyConfig {
            day_trade_only: true,
            ..all_disabled()
        });
        g.update_session(Ok(Duration::minutes(2)));
        assert!(g.session_closing());
        g.update_session(Err(PlatformError::SessionUnavailable(
            "week boundary".into(),
        )));
        assert!(!g.session_closing());
        assert_eq!(g.authorize(0), Ok(()));
    }

    #[test]
    fn daily_limit_denies_after_streak() {
        let mut g = gate(StrategyConfig {
            daily_stop_loss_limit: Some(3),
            ..all_disabled()
        });
        for _ in 0..3 {
            g.record_closure(CloseReason::StopLoss, -5.0, date(1));
        }
        assert_eq!(g.consecutive_losses(), 3);
        assert_eq!(g.authorize(0), Err(Denial::DailyLossLimit));
        // still denied on the next bar, notice only sent once (flag check)
        assert_eq!(g.authorize(0), Err(Denial::DailyLossLimit));
        assert!(g.limit_notice_sent);
    }

    #[test]
    fn profitable_closure_resets_streak() {
        let mut g = gate(StrategyConfig {
            daily_stop_loss_limit: Some(2),
            ..all_disabled()
        });
        g.record_closure(CloseReason::StopLoss, -5.0, date(1));
        g.record_closure(CloseReason::TakeProfit, 7.0, date(1));
        assert_eq!(g.consecutive_losses(), 0);
        assert_eq!(g.authorize(0), Ok(()));
    }

    #[test]
    fn breakeven_manual_closure_leaves_streak() {
        let mut g = gate(StrategyConfig {
            daily_stop_loss_limit: Some(2),
            ..all_disabled()
        });
        g.record_closure(CloseReason::StopLoss, -5.0, date(1));
        // neither a losing stop-loss nor net-positive: unchanged
        g.record_closure(CloseReason::Manual, 0.0, date(1));
        g.record_closure(CloseReason::StopLoss, 0.0, date(1));
        assert_eq!(g.consecutive_losses(), 1);
    }

    #[test]
    fn roll_day_resets_exactly_once() {
        let mut g = gate(StrategyConfig {
            daily_stop_loss_limit: Some(2),
            ..all_disabled()
        });
        g.record_closure(CloseReason::StopLoss, -5.0, date(1));
        g.record_closure(CloseReason::StopLoss, -5.0, date(1));
        assert_eq!(g.authorize(0), Err(Denial::DailyLossLimit));

        assert!(g.roll_day(date(2)));
        assert_eq!(g.consecutive_losses(), 0);
        assert_eq!(g.authorize(0), Ok(()));
        // subsequent bars of the same new day do not reset again
        assert!(!g.roll_day(date(2)));
        assert!(!g.roll_day(date(2)));
    }

    #[test]
    fn roll_day_same_date_is_noop() {
        let mut g = gate(StrategyConfig {
            daily_stop_loss_limit: Some(2),
            ..all_disabled()
        });
        g.record_closure(CloseReason::StopLoss, -5.0, date(1));
        assert!(!g.roll_day(date(1)));
        assert_eq!(g.consecutive_losses(), 1);
    }

    #[test]
    fn roll_day_disabled_check_is_noop() {
        let mut g = gate(all_disabled());
        g.record_closure(CloseReason::StopLoss, -5.0, date(1));
        assert!(!g.roll_day(date(2)));
        // bookkeeping still ran, the reset just never fires
        assert_eq!(g.consecutive_losses(), 1);
    }

    #[test]
    fn notice_flag_clears_on_new_day() {
        let mut g = gate(StrategyConfig {
            daily_stop_loss_limit: Some(1),
            ..all_disabled()
        });
        g.record_closure(CloseReason::StopLoss, -5.0, date(1));
        assert_eq!(g.authorize(0), Err(Denial::DailyLossLimit));
        assert!(g.limit_notice_sent);
        g.roll_day(date(2));
        assert!(!g.limit_notice_sent);
    }

    #[test]
    fn single_position_denies_any_direction() {
        let mut g = gate(StrategyConfig {
            single_position_only: true,
            ..all_disabled()
        });
        assert_eq!(g.authorize(0), Ok(()));
        assert_eq!(g.authorize(1), Err(Denial::PositionOpen));
        assert_eq!(g.authorize(3), Err(Denial::PositionOpen));
    }

    #[test]
    fn denial_display() {
        assert_eq!(Denial::SessionClosing.to_string(), "SessionClosing");
        assert_eq!(Denial::DailyLossLimit.to_string(), "DailyLossLimit");
        assert_eq!(Denial::PositionOpen.to_string(), "PositionOpen");
    }
}

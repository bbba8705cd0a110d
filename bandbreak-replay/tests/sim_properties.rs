//! Property tests for the simulated fill model.

use chrono::NaiveTime;
use proptest::prelude::*;

use bandbreak_core::domain::{CloseReason, Direction, Instrument, OrderRequest};
use bandbreak_core::platform::TradingPlatform;
use bandbreak_replay::{BandBar, SimPlatform};

const PIP: f64 = 0.0001;
const ENTRY: f64 = 1.1030;

fn bar(ts: &str, open: f64, high: f64, low: f64, close: f64) -> BandBar {
    BandBar {
        timestamp: ts.parse().unwrap(),
        open,
        high,
        low,
        close,
        band_top: 1.1100,
        band_bottom: 1.0960,
    }
}

/// A short entered at bar 2's open, with bar 3's range generated.
fn sim_with_short(high_pips: f64, low_pips: f64) -> SimPlatform {
    let bars = vec![
        bar("2024-06-03T09:00:00", ENTRY, ENTRY + PIP, ENTRY - PIP, ENTRY),
        bar("2024-06-03T09:05:00", ENTRY, ENTRY + PIP, ENTRY - PIP, ENTRY),
        bar("2024-06-03T09:10:00", ENTRY, ENTRY + PIP, ENTRY - PIP, ENTRY),
        bar(
            "2024-06-03T09:15:00",
            ENTRY,
            ENTRY + high_pips * PIP,
            ENTRY - low_pips * PIP,
            ENTRY,
        ),
        bar("2024-06-03T09:20:00", ENTRY, ENTRY + PIP, ENTRY - PIP, ENTRY),
    ];
    let mut platform = SimPlatform::new(
        Instrument::forex("EURUSD"),
        bars,
        NaiveTime::from_hms_opt(21, 55, 0).unwrap(),
    );
    platform
        .submit_order(OrderRequest {
            direction: Direction::Sell,
            volume: 100_000.0,
            label: "Top Line Sell".into(),
            stop_loss_pips: 5.0,
            take_profit_pips: 5.0,
        })
        .unwrap();
    platform
}

proptest! {
    /// The bracket fires iff the forming bar touches it, at most once per
    /// position, with the stop preferred when both sides are in range.
    #[test]
    fn bracket_fill_matches_bar_range(
        high_pips in 0.0..20.0_f64,
        low_pips in 0.0..20.0_f64,
    ) {
        let mut platform = sim_with_short(high_pips, low_pips);
        platform.advance();
        platform.evaluate_intrabar();
        let events = platform.take_closed_events();

        let stop_hit = high_pips >= 5.0;
        let target_hit = low_pips >= 5.0;

        if stop_hit {
            prop_assert_eq!(events.len(), 1);
            prop_assert_eq!(events[0].reason, CloseReason::StopLoss);
            prop_assert!(events[0].net_profit < 0.0);
            prop_assert_eq!(platform.open_position_count(), 0);
        } else if target_hit {
            prop_assert_eq!(events.len(), 1);
            prop_assert_eq!(events[0].reason, CloseReason::TakeProfit);
            prop_assert!(events[0].net_profit > 0.0);
            prop_assert_eq!(platform.open_position_count(), 0);
        } else {
            prop_assert!(events.is_empty());
            prop_assert_eq!(platform.open_position_count(), 1);
        }
    }

    /// Re-evaluating after a fill never produces a second closure.
    #[test]
    fn no_double_fill(high_pips in 5.0..20.0_f64) {
        let mut platform = sim_with_short(high_pips, 0.0);
        platform.advance();
        platform.evaluate_intrabar();
        prop_assert_eq!(platform.take_closed_events().len(), 1);

        platform.evaluate_intrabar();
        prop_assert!(platform.take_closed_events().is_empty());
    }
}

//! The serialized replay event loop.
//!
//! Per forming bar, in order: `BarClosed` (the previous bar just
//! completed), intrabar stop/target fills, then `Tick`. Every closure the
//! simulator produces — fills and requested closes alike — is delivered to
//! the strategy as a queued `PositionClosed` event, never as a reentrant
//! callback, so bar, tick, and closure handling cannot interleave.

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use thiserror::Error;
use tracing::info;

use bandbreak_core::domain::Instrument;
use bandbreak_core::platform::StrategyEvent;
use bandbreak_core::{BreakInStrategy, StrategyConfig};

use crate::data::{BandBar, MIN_BARS};
use crate::report::RunReport;
use crate::sim::SimPlatform;

/// Everything a replay needs besides the bar feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplayConfig {
    pub strategy: StrategyConfig,
    pub instrument: Instrument,
    /// Wall-clock session close used by the simulated session clock.
    pub session_close: NaiveTime,
}

impl ReplayConfig {
    /// Content-addressed identifier: identical configs hash identically.
    pub fn run_id(&self) -> String {
        let json = serde_json::to_string(self).expect("ReplayConfig serialization failed");
        blake3::hash(json.as_bytes()).to_hex().to_string()
    }
}

#[derive(Debug, Error)]
pub enum ReplayError {
    #[error("feed too short for a replay: {0} bars")]
    NotEnoughBars(usize),
}

/// Run the strategy over a validated feed and summarize the outcome.
pub fn run_replay(config: &ReplayConfig, bars: Vec<BandBar>) -> Result<RunReport, ReplayError> {
    if bars.len() < MIN_BARS {
        return Err(ReplayError::NotEnoughBars(bars.len()));
    }

    let bar_count = bars.len();
    let mut platform = SimPlatform::new(
        config.instrument.clone(),
        bars,
        config.session_close,
    );
    let mut strategy = BreakInStrategy::new(config.strategy.clone(), config.instrument.clone());
    let mut queue: VecDeque<StrategyEvent> = VecDeque::new();

    info!(bar_count, run_id = %config.run_id(), "replay started");

    loop {
        queue.push_back(StrategyEvent::BarClosed);
        pump(&mut queue, &mut strategy, &mut platform);

        platform.evaluate_intrabar();
        for closed in platform.take_closed_events() {
            queue.push_back(StrategyEvent::PositionClosed(closed));
        }
        queue.push_back(StrategyEvent::Tick);
        pump(&mut queue, &mut strategy, &mut platform);

        if !platform.advance() {
            break;
        }
    }

    let report = RunReport::from_run(config, &platform, bar_count);
    info!(
        orders = report.orders_submitted,
        closures = report.closures.len(),
        net_profit = report.net_profit,
        "replay finished"
    );
    Ok(report)
}

/// Drain the queue, folding simulator closures back in as events.
fn pump(
    queue: &mut VecDeque<StrategyEvent>,
    strategy: &mut BreakInStrategy,
    platform: &mut SimPlatform,
) {
    while let Some(event) = queue.pop_front() {
        strategy.handle(event, platform);
        for closed in platform.take_closed_events() {
            queue.push_back(StrategyEvent::PositionClosed(closed));
        }
    }
}

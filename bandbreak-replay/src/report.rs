//! Run report: what the replay did, serializable as a JSON artifact.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use bandbreak_core::domain::CloseReason;
use bandbreak_core::platform::TradingPlatform;

use crate::runner::ReplayConfig;
use crate::sim::{ClosureRecord, SimPlatform};

/// Summary of a single replay run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    /// Content hash of the configuration that produced this run.
    pub run_id: String,
    pub bars_replayed: usize,
    pub orders_submitted: u32,
    pub closures: Vec<ClosureRecord>,
    pub stop_loss_closures: u32,
    pub take_profit_closures: u32,
    pub manual_closures: u32,
    pub net_profit: f64,
    pub open_positions_at_end: usize,
}

impl RunReport {
    pub fn from_run(config: &ReplayConfig, platform: &SimPlatform, bars_replayed: usize) -> Self {
        let closures = platform.journal().to_vec();
        let count = |reason: CloseReason| {
            closures.iter().filter(|c| c.reason == reason).count() as u32
        };
        let net_profit: f64 = closures.iter().map(|c| c.net_profit).sum();
        Self {
            run_id: config.run_id(),
            bars_replayed,
            orders_submitted: platform.orders_submitted(),
            stop_loss_closures: count(CloseReason::StopLoss),
            take_profit_closures: count(CloseReason::TakeProfit),
            manual_closures: count(CloseReason::Manual),
            net_profit,
            open_positions_at_end: platform.open_position_count(),
            closures,
        }
    }

    /// One-paragraph human summary for the CLI.
    pub fn summary(&self) -> String {
        format!(
            "replayed {} bars: {} orders, {} closures ({} stop-loss, {} take-profit, {} manual), \
             net profit {:.2}, {} still open",
            self.bars_replayed,
            self.orders_submitted,
            self.closures.len(),
            self.stop_loss_closures,
            self.take_profit_closures,
            self.manual_closures,
            self.net_profit,
            self.open_positions_at_end,
        )
    }
}

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("report serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("report write failed: {0}")]
    Io(#[from] std::io::Error),
}

/// Persist the report as pretty-printed JSON.
pub fn save_report(report: &RunReport, path: &Path) -> Result<(), ReportError> {
    let json = serde_json::to_string_pretty(report)?;
    std::fs::write(path, json)?;
    Ok(())
}

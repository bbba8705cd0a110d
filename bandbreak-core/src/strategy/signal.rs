//! Pending-signal state machine.
//!
//! A crossing arms a pending entry; the shared delay counter then has to
//! reach zero before the dispatcher may act on it. Both sides can be armed
//! at once (`Both`) — flagging one side never clears the other, and the
//! counter is shared: it starts at the configured delay when the first side
//! arms, ticks down once per completed bar while anything is pending, and
//! snaps back to the configured delay when a side is dispatched.

use serde::{Deserialize, Serialize};

/// Which entries are armed, with the bars still to wait.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Pending {
    None,
    Top { bars_left: u32 },
    Bottom { bars_left: u32 },
    Both { bars_left: u32 },
}

/// The pending-flag pair plus delay counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignalState {
    pending: Pending,
    /// Configured execution delay in completed bars.
    delay: u32,
}

impl SignalState {
    pub fn new(delay: u32) -> Self {
        Self {
            pending: Pending::None,
            delay,
        }
    }

    pub fn pending(&self) -> Pending {
        self.pending
    }

    pub fn top_pending(&self) -> bool {
        matches!(self.pending, Pending::Top { .. } | Pending::Both { .. })
    }

    pub fn bottom_pending(&self) -> bool {
        matches!(self.pending, Pending::Bottom { .. } | Pending::Both { .. })
    }

    /// Bars still to wait; 0 when nothing is pending.
    pub fn bars_left(&self) -> u32 {
        match self.pending {
            Pending::None => 0,
            Pending::Top { bars_left }
            | Pending::Bottom { bars_left }
            | Pending::Both { bars_left } => bars_left,
        }
    }

    /// Eligible for dispatch: no bars left to wait.
    pub fn is_ready(&self) -> bool {
        self.bars_left() == 0
    }

    /// Arm the top side. The other side and an in-flight counter survive.
    pub fn flag_top(&mut self) {
        self.pending = match self.pending {
            Pending::None => Pending::Top {
                bars_left: self.delay,
            },
            Pending::Bottom { bars_left } => Pending::Both { bars_left },
            keep @ (Pending::Top { .. } | Pending::Both { .. }) => keep,
        };
    }

    /// Arm the bottom side. Mirror of [`flag_top`](Self::flag_top).
    pub fn flag_bottom(&mut self) {
        self.pending = match self.pending {
            Pending::None => Pending::Bottom {
                bars_left: self.delay,
            },
            Pending::Top { bars_left } => Pending::Both { bars_left },
            keep @ (Pending::Bottom { .. } | Pending::Both { .. }) => keep,
        };
    }

    /// Disarm the top side after dispatch. A surviving bottom side gets a
    /// fresh counter (the shared counter resets on execution).
    pub fn clear_top(&mut self) {
        self.pending = match self.pending {
            Pending::Top { .. } => Pending::None,
            Pending::Both { .. } => Pending::Bottom {
                bars_left: self.delay,
            },
            keep => keep,
        };
    }

    /// Disarm the bottom side after dispatch. Mirror of
    /// [`clear_top`](Self::clear_top).
    pub fn clear_bottom(&mut self) {
        self.pending = match self.pending {
            Pending::Bottom { .. } => Pending::None,
            Pending::Both { .. } => Pending::Top {
                bars_left: self.delay,
            },
            keep => keep,
        };
    }

    /// Per-bar counter advance: decrements only while a side is pending,
    /// never below zero. Runs after dispatch attempts, not before.
    pub fn tick(&mut self) {
        self.pending = match self.pending {
            Pending::None => Pending::None,
            Pending::Top { bars_left } => Pending::Top {
                bars_left: bars_left.saturating_sub(1),
            },
            Pending::Bottom { bars_left } => Pending::Bottom {
                bars_left: bars_left.saturating_sub(1),
            },
            Pending::Both { bars_left } => Pending::Both {
                bars_left: bars_left.saturating_sub(1),
            },
        };
    }

    /// New trading day: pending sides keep their flags but wait the full
    /// configured delay again.
    pub fn reset_delay(&mut self) {
        self.pending = match self.pending {
            Pending::None => Pending::None,
            Pending::Top { .. } => Pending::Top {
                bars_left: self.delay,
            },
            Pending::Bottom { .. } => Pending::Bottom {
                bars_left: self.delay,
            },
            Pending::Both { .. } => Pending::Both {
                bars_left: self.delay,
            },
        };
    }
}

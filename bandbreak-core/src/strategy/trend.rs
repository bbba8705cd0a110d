//! Trend confirmation — a one-bar look-back momentum check.
//!
//! Before shorting a top breakout the gate wants the most recent high to
//! have stopped making new highs; before buying a bottom break it wants the
//! most recent low to have stopped making new lows. Not a trend model —
//! just a guard against entering straight into continuing momentum.

use crate::domain::BarWindow;

#[derive(Debug, Clone, Copy)]
pub struct TrendGate {
    enabled: bool,
}

impl TrendGate {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    /// Sell confirmation: the high two bars ago was strictly above the high
    /// one bar ago. Pass-through when disabled.
    pub fn confirms_sell(&self, window: &BarWindow) -> bool {
        !self.enabled || window.high_prev2 > window.high_prev1
    }

    /// Buy confirmation: the low two bars ago was strictly below the low
    /// one bar ago. Pass-through when disabled.
    pub fn confirms_buy(&self, window: &BarWindow) -> bool {
        !self.enabled || window.low_prev2 < window.low_prev1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn window(high: (f64, f64), low: (f64, f64)) -> BarWindow {
        BarWindow {
            close_prev2: 1.1,
            close_prev1: 1.1,
            high_prev2: high.0,
            high_prev1: high.1,
            low_prev2: low.0,
            low_prev1: low.1,
        }
    }

    #[test]
    fn disabled_gate_always_confirms() {
        let gate = TrendGate::new(false);
        let w = window((1.0, 2.0), (1.0, 2.0));
        assert!(gate.confirms_sell(&w));
        assert!(gate.confirms_buy(&w));
    }

    #[test]
    fn sell_requires_falling_high() {
        let gate = TrendGate::new(true);
        assert!(gate.confirms_sell(&window((1.1060, 1.1055), (1.0, 1.0))));
        assert!(!gate.confirms_sell(&window((1.1055, 1.1060), (1.0, 1.0))));
        // equal highs: momentum not fading, no confirmation
        assert!(!gate.confirms_sell(&window((1.1060, 1.1060), (1.0, 1.0))));
    }

    #[test]
    fn buy_requires_rising_low() {
        let gate = TrendGate::new(true);
        assert!(gate.confirms_buy(&window((2.0, 2.0), (1.1010, 1.1015))));
        assert!(!gate.confirms_buy(&window((2.0, 2.0), (1.1015, 1.1010))));
        assert!(!gate.confirms_buy(&window((2.0, 2.0), (1.1010, 1.1010))));
    }
}

//! Rolling support and resistance levels.

use super::{rolling_max, rolling_min};

/// Support is the lowest low and resistance the highest high over the
/// window. Computed at a long window and a short "recent" window.
pub struct Levels {
    window: usize,
    recent_window: usize,
}

impl Default for Levels {
    fn default() -> Self {
        Self {
            window: 20,
            recent_window: 5,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LevelsOutput {
    pub support: Vec<Option<f64>>,
    pub resistance: Vec<Option<f64>>,
    pub recent_support: Vec<Option<f64>>,
    pub recent_resistance: Vec<Option<f64>>,
}

impl Levels {
    pub fn new(window: usize, recent_window: usize) -> Self {
        Self {
            window,
            recent_window,
        }
    }

    pub fn compute(&self, highs: &[f64], lows: &[f64]) -> LevelsOutput {
        LevelsOutput {
            support: rolling_min(lows, self.window),
            resistance: rolling_max(highs, self.window),
            recent_support: rolling_min(lows, self.recent_window),
            recent_resistance: rolling_max(highs, self.recent_window),
        }
    }
}

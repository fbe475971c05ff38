//! Williams %R indicator.

use super::{rolling_max, rolling_min};

/// Williams %R.
///
/// %R = -100 * (Highest High - Close) / (Highest High - Lowest Low)
///
/// Ranges from -100 (close at the low) to 0 (close at the high). Below -80
/// is conventionally oversold, above -20 overbought.
pub struct WilliamsR {
    period: usize,
}

impl Default for WilliamsR {
    fn default() -> Self {
        Self { period: 14 }
    }
}

impl WilliamsR {
    pub fn new(period: usize) -> Self {
        Self { period }
    }

    pub fn compute(&self, highs: &[f64], lows: &[f64], closes: &[f64]) -> Vec<Option<f64>> {
        let highest = rolling_max(highs, self.period);
        let lowest = rolling_min(lows, self.period);
        closes
            .iter()
            .enumerate()
            .map(|(i, close)| {
                let (hh, ll) = (highest[i]?, lowest[i]?);
                let range = hh - ll;
                if range > 0.0 {
                    Some(-100.0 * (hh - close) / range)
                } else {
                    None
                }
            })
            .collect()
    }
}

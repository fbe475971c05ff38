//! Simple Moving Average (SMA) indicator.

use super::rolling_mean;

/// SMA (Simple Moving Average) indicator.
///
/// Average close over the last `period` bars.
pub struct Sma {
    period: usize,
}

impl Sma {
    pub fn new(period: usize) -> Self {
        Self { period }
    }

    pub fn min_periods(&self) -> usize {
        self.period
    }

    pub fn compute(&self, values: &[f64]) -> Vec<Option<f64>> {
        rolling_mean(values, self.period)
    }
}

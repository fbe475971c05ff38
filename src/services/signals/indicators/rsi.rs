//! Relative Strength Index (RSI) indicator.

/// RSI (Relative Strength Index) indicator.
///
/// Simple rolling averages of gains and losses over `period` close deltas:
/// RSI = 100 - 100 / (1 + avg_gain / avg_loss).
///
/// Values range from 0-100. Zero-division conventions:
/// - no losses, some gains: 100
/// - no gains and no losses (flat window): 50
pub struct Rsi {
    period: usize,
}

impl Default for Rsi {
    fn default() -> Self {
        Self { period: 14 }
    }
}

impl Rsi {
    pub fn new(period: usize) -> Self {
        Self { period }
    }

    pub fn period(&self) -> usize {
        self.period
    }

    /// Bars needed before the first defined value.
    pub fn min_periods(&self) -> usize {
        self.period + 1
    }

    pub fn compute(&self, closes: &[f64]) -> Vec<Option<f64>> {
        let mut out = vec![None; closes.len()];
        if self.period == 0 {
            return out;
        }

        // deltas[i] is the change into bar i; bar 0 has no delta.
        let mut gains = vec![0.0; closes.len()];
        let mut losses = vec![0.0; closes.len()];
        for i in 1..closes.len() {
            let change = closes[i] - closes[i - 1];
            if change > 0.0 {
                gains[i] = change;
            } else {
                losses[i] = -change;
            }
        }

        for i in self.period..closes.len() {
            let window = i + 1 - self.period..=i;
            let avg_gain = gains[window.clone()].iter().sum::<f64>() / self.period as f64;
            let avg_loss = losses[window].iter().sum::<f64>() / self.period as f64;
            out[i] = Some(Self::from_averages(avg_gain, avg_loss));
        }
        out
    }

    fn from_averages(avg_gain: f64, avg_loss: f64) -> f64 {
        if avg_loss == 0.0 {
            return if avg_gain == 0.0 { 50.0 } else { 100.0 };
        }
        let rs = avg_gain / avg_loss;
        (100.0 - 100.0 / (1.0 + rs)).clamp(0.0, 100.0)
    }
}

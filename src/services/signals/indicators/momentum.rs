//! Rate-of-change momentum.

/// Percent change of close over `lookback` bars.
pub struct Momentum {
    lookback: usize,
}

impl Default for Momentum {
    fn default() -> Self {
        Self { lookback: 10 }
    }
}

impl Momentum {
    pub fn new(lookback: usize) -> Self {
        Self { lookback }
    }

    pub fn compute(&self, closes: &[f64]) -> Vec<Option<f64>> {
        closes
            .iter()
            .enumerate()
            .map(|(i, close)| {
                let base = closes[i.checked_sub(self.lookback)?];
                if base == 0.0 {
                    None
                } else {
                    Some((close / base - 1.0) * 100.0)
                }
            })
            .collect()
    }
}

//! Stochastic Oscillator indicator.

use super::{rolling_max, rolling_mean_opt, rolling_min};

/// Stochastic Oscillator.
///
/// Compares closing price to price range over a period:
/// %K = (Current Close - Lowest Low) / (Highest High - Lowest Low) * 100
/// %D = SMA(d_period) of %K
///
/// %K is undefined when the high-low range is zero.
pub struct Stochastic {
    k_period: usize,
    d_period: usize,
}

impl Default for Stochastic {
    fn default() -> Self {
        Self {
            k_period: 14,
            d_period: 3,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StochasticOutput {
    pub k: Vec<Option<f64>>,
    pub d: Vec<Option<f64>>,
}

impl Stochastic {
    pub fn new(k_period: usize, d_period: usize) -> Self {
        Self { k_period, d_period }
    }

    pub fn min_periods(&self) -> usize {
        self.k_period + self.d_period - 1
    }

    pub fn compute(&self, highs: &[f64], lows: &[f64], closes: &[f64]) -> StochasticOutput {
        let highest = rolling_max(highs, self.k_period);
        let lowest = rolling_min(lows, self.k_period);

        let k: Vec<Option<f64>> = closes
            .iter()
            .enumerate()
            .map(|(i, close)| {
                let (hh, ll) = (highest[i]?, lowest[i]?);
                let range = hh - ll;
                if range > 0.0 {
                    Some((close - ll) / range * 100.0)
                } else {
                    None
                }
            })
            .collect();
        let d = rolling_mean_opt(&k, self.d_period);

        StochasticOutput { k, d }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uptrend(count: usize) -> (Vec<f64>, Vec<f64>, Vec<f64>) {
        let base: Vec<f64> = (0..count).map(|i| 100.0 + i as f64 * 1.5).collect();
        (
            base.iter().map(|b| b + 2.0).collect(),
            base.iter().map(|b| b - 1.0).collect(),
            base.iter().map(|b| b + 1.0).collect(),
        )
    }

    #[test]
    fn test_stochastic_min_periods() {
        assert_eq!(Stochastic::default().min_periods(), 16);
    }

    #[test]
    fn test_stochastic_warmup() {
        let (h, l, c) = uptrend(30);
        let out = Stochastic::default().compute(&h, &l, &c);
        assert!(out.k[12].is_none());
        assert!(out.k[13].is_some());
        assert!(out.d[14].is_none());
        assert!(out.d[15].is_some());
    }

    #[test]
    fn test_stochastic_uptrend_high_k() {
        let (h, l, c) = uptrend(30);
        let out = Stochastic::default().compute(&h, &l, &c);
        let k = out.k[29].unwrap();
        assert!(k > 80.0 && k <= 100.0, "got {}", k);
    }

    #[test]
    fn test_stochastic_zero_range_is_none() {
        let flat = vec![10.0; 20];
        let out = Stochastic::default().compute(&flat, &flat, &flat);
        assert!(out.k.iter().all(|v| v.is_none()));
        assert!(out.d.iter().all(|v| v.is_none()));
    }
}

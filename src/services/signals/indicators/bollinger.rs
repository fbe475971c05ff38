//! Bollinger Bands indicator.

use super::{rolling_mean, rolling_std};

/// Bollinger Bands indicator.
///
/// Consists of:
/// - Middle band: SMA(period)
/// - Upper band: SMA + k * StdDev
/// - Lower band: SMA - k * StdDev
///
/// StdDev is the sample standard deviation of the window. Width is
/// `(upper - lower) / middle`; position is `(close - lower) / (upper - lower)`
/// and is undefined when the bands collapse onto each other.
pub struct BollingerBands {
    period: usize,
    std_dev_multiplier: f64,
}

impl Default for BollingerBands {
    fn default() -> Self {
        Self {
            period: 20,
            std_dev_multiplier: 2.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BollingerOutput {
    pub upper: Vec<Option<f64>>,
    pub middle: Vec<Option<f64>>,
    pub lower: Vec<Option<f64>>,
    pub width: Vec<Option<f64>>,
    pub position: Vec<Option<f64>>,
}

impl BollingerBands {
    pub fn new(period: usize, std_dev_multiplier: f64) -> Self {
        Self {
            period,
            std_dev_multiplier,
        }
    }

    pub fn compute(&self, closes: &[f64]) -> BollingerOutput {
        let middle = rolling_mean(closes, self.period);
        let std = rolling_std(closes, self.period);
        let n = closes.len();

        let mut out = BollingerOutput {
            upper: vec![None; n],
            middle: middle.clone(),
            lower: vec![None; n],
            width: vec![None; n],
            position: vec![None; n],
        };

        for i in 0..n {
            let (Some(mid), Some(sd)) = (middle[i], std[i]) else {
                continue;
            };
            let upper = mid + self.std_dev_multiplier * sd;
            let lower = mid - self.std_dev_multiplier * sd;
            let band = upper - lower;

            out.upper[i] = Some(upper);
            out.lower[i] = Some(lower);
            out.width[i] = if mid != 0.0 { Some(band / mid) } else { None };
            out.position[i] = if band > 0.0 {
                Some((closes[i] - lower) / band)
            } else {
                None
            };
        }
        out
    }
}

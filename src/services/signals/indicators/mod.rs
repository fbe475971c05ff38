//! Technical indicator implementations.
//!
//! Every indicator works on whole series and returns one value per input
//! bar. Positions inside the warm-up window are `None`, matching the usual
//! rolling-window semantics.

pub mod bollinger;
pub mod ema;
pub mod levels;
pub mod macd;
pub mod momentum;
pub mod rsi;
pub mod sma;
pub mod stochastic;
pub mod volume;
pub mod vwap;
pub mod williams;

pub use bollinger::{BollingerBands, BollingerOutput};
pub use ema::Ema;
pub use levels::{Levels, LevelsOutput};
pub use macd::{Macd, MacdOutput};
pub use momentum::Momentum;
pub use rsi::Rsi;
pub use sma::Sma;
pub use stochastic::{Stochastic, StochasticOutput};
pub use volume::{VolumeOutput, VolumeProfile};
pub use vwap::Vwap;
pub use williams::WilliamsR;

/// Rolling mean over `window` values.
pub fn rolling_mean(values: &[f64], window: usize) -> Vec<Option<f64>> {
    rolling(values, window, |w| w.iter().sum::<f64>() / w.len() as f64)
}

/// Rolling mean over optional values; a window containing `None` is `None`.
pub fn rolling_mean_opt(values: &[Option<f64>], window: usize) -> Vec<Option<f64>> {
    if window == 0 {
        return vec![None; values.len()];
    }
    (0..values.len())
        .map(|i| {
            if i + 1 < window {
                return None;
            }
            let slice = &values[i + 1 - window..=i];
            let mut sum = 0.0;
            for v in slice {
                sum += (*v)?;
            }
            Some(sum / window as f64)
        })
        .collect()
}

/// Rolling sample standard deviation (n - 1 denominator).
///
/// A window of identical values is exactly 0.0; the inexact mean would
/// otherwise leave a residue around 1e-14.
pub fn rolling_std(values: &[f64], window: usize) -> Vec<Option<f64>> {
    if window < 2 {
        return vec![None; values.len()];
    }
    rolling(values, window, |w| {
        if w.iter().all(|v| *v == w[0]) {
            return 0.0;
        }
        let mean = w.iter().sum::<f64>() / w.len() as f64;
        let variance = w.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (w.len() - 1) as f64;
        variance.sqrt()
    })
}

pub fn rolling_min(values: &[f64], window: usize) -> Vec<Option<f64>> {
    rolling(values, window, |w| w.iter().copied().fold(f64::INFINITY, f64::min))
}

pub fn rolling_max(values: &[f64], window: usize) -> Vec<Option<f64>> {
    rolling(values, window, |w| {
        w.iter().copied().fold(f64::NEG_INFINITY, f64::max)
    })
}

fn rolling<F>(values: &[f64], window: usize, f: F) -> Vec<Option<f64>>
where
    F: Fn(&[f64]) -> f64,
{
    if window == 0 {
        return vec![None; values.len()];
    }
    (0..values.len())
        .map(|i| {
            if i + 1 < window {
                None
            } else {
                Some(f(&values[i + 1 - window..=i]))
            }
        })
        .collect()
}

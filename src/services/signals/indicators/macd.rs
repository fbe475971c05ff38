//! MACD (Moving Average Convergence Divergence) indicator.

use super::Ema;

/// MACD indicator.
///
/// Shows the relationship between two EMAs:
/// - MACD Line = EMA(fast) - EMA(slow)
/// - Signal Line = EMA(signal) of MACD Line
/// - Histogram = MACD Line - Signal Line
pub struct Macd {
    fast_period: usize,
    slow_period: usize,
    signal_period: usize,
}

impl Default for Macd {
    fn default() -> Self {
        Self {
            fast_period: 12,
            slow_period: 26,
            signal_period: 9,
        }
    }
}

/// MACD line, signal line and histogram, aligned with the input.
#[derive(Debug, Clone, PartialEq)]
pub struct MacdOutput {
    pub line: Vec<Option<f64>>,
    pub signal: Vec<Option<f64>>,
    pub histogram: Vec<Option<f64>>,
}

impl Macd {
    pub fn new(fast_period: usize, slow_period: usize, signal_period: usize) -> Self {
        Self {
            fast_period,
            slow_period,
            signal_period,
        }
    }

    pub fn compute(&self, closes: &[f64]) -> MacdOutput {
        let fast = Ema::new(self.fast_period).compute(closes);
        let slow = Ema::new(self.slow_period).compute(closes);

        let line: Vec<f64> = fast.iter().zip(&slow).map(|(f, s)| f - s).collect();
        let signal = Ema::new(self.signal_period).compute(&line);
        let histogram = line.iter().zip(&signal).map(|(m, s)| Some(m - s)).collect();

        MacdOutput {
            line: line.into_iter().map(Some).collect(),
            signal: signal.into_iter().map(Some).collect(),
            histogram,
        }
    }
}

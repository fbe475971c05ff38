//! Exponential Moving Average (EMA) indicator.

/// EMA (Exponential Moving Average) indicator.
///
/// Smoothing factor `alpha = 2 / (span + 1)`. The first output equals the
/// first input and there is no bias adjustment, so every position is
/// defined.
pub struct Ema {
    span: usize,
}

impl Ema {
    pub fn new(span: usize) -> Self {
        Self { span }
    }

    pub fn span(&self) -> usize {
        self.span
    }

    pub fn alpha(&self) -> f64 {
        2.0 / (self.span as f64 + 1.0)
    }

    /// EMA of a plain series.
    pub fn compute(&self, values: &[f64]) -> Vec<f64> {
        let alpha = self.alpha();
        let mut out = Vec::with_capacity(values.len());
        let mut ema = match values.first() {
            Some(first) => *first,
            None => return out,
        };
        out.push(ema);
        for value in &values[1..] {
            ema = alpha * value + (1.0 - alpha) * ema;
            out.push(ema);
        }
        out
    }

    /// EMA as optional values, for uniform storage with the other indicators.
    pub fn compute_opt(&self, values: &[f64]) -> Vec<Option<f64>> {
        self.compute(values).into_iter().map(Some).collect()
    }
}

//! Volume Weighted Average Price (VWAP) indicator.

/// VWAP (Volume Weighted Average Price) indicator.
///
/// VWAP = Cumulative(Close * Volume) / Cumulative(Volume), accumulated from
/// the first bar of the series. There is no session reset, so the caller
/// scopes the series to the window it wants VWAP over.
#[derive(Default)]
pub struct Vwap;

impl Vwap {
    pub fn compute(&self, closes: &[f64], volumes: &[f64]) -> Vec<Option<f64>> {
        let mut cum_pv = 0.0;
        let mut cum_vol = 0.0;
        closes
            .iter()
            .zip(volumes)
            .map(|(close, volume)| {
                cum_pv += close * volume;
                cum_vol += volume;
                if cum_vol > 0.0 {
                    Some(cum_pv / cum_vol)
                } else {
                    None
                }
            })
            .collect()
    }
}

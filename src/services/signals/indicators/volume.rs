//! Rolling average volume and volume ratio.

use super::rolling_mean;

/// Average volume over `period` bars and the current bar's multiple of it.
pub struct VolumeProfile {
    period: usize,
}

impl Default for VolumeProfile {
    fn default() -> Self {
        Self { period: 20 }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct VolumeOutput {
    pub average: Vec<Option<f64>>,
    pub ratio: Vec<Option<f64>>,
}

impl VolumeProfile {
    pub fn new(period: usize) -> Self {
        Self { period }
    }

    pub fn compute(&self, volumes: &[f64]) -> VolumeOutput {
        let average = rolling_mean(volumes, self.period);
        let ratio = volumes
            .iter()
            .zip(&average)
            .map(|(volume, avg)| match avg {
                Some(avg) if *avg > 0.0 => Some(volume / avg),
                _ => None,
            })
            .collect();
        VolumeOutput { average, ratio }
    }
}

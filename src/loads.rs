//! Sampled load time functions and interpolation helpers

use serde::{Deserialize, Serialize};

use crate::error::{FeaError, FeaResult};

/// Piecewise-linear interpolation with end clamping
///
/// `xp` must be monotonically increasing; values outside its range take
/// the first/last ordinate.
pub fn interp(x: f64, xp: &[f64], fp: &[f64]) -> f64 {
    debug_assert_eq!(xp.len(), fp.len());
    if x <= xp[0] {
        return fp[0];
    }
    if x >= xp[xp.len() - 1] {
        return fp[fp.len() - 1];
    }
    let i = match xp.binary_search_by(|probe| probe.partial_cmp(&x).unwrap()) {
        Ok(i) => return fp[i],
        Err(i) => i,
    };
    let t = (x - xp[i - 1]) / (xp[i] - xp[i - 1]);
    fp[i - 1] + t * (fp[i] - fp[i - 1])
}

/// Uniform time grid covering [0, period] at the given increment
pub fn time_grid(period: f64, increment: f64) -> Vec<f64> {
    let steps = (period / increment).round() as usize;
    (0..=steps).map(|i| i as f64 * increment).collect()
}

/// A sampled (time, value) load curve
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeSeries {
    times: Vec<f64>,
    values: Vec<f64>,
}

impl TimeSeries {
    pub fn new(times: Vec<f64>, values: Vec<f64>) -> FeaResult<Self> {
        if times.is_empty() || times.len() != values.len() {
            return Err(FeaError::InvalidConfig(format!(
                "time series needs matching non-empty samples ({} times, {} values)",
                times.len(),
                values.len()
            )));
        }
        if times.windows(2).any(|w| w[1] < w[0]) {
            return Err(FeaError::InvalidConfig(
                "time series samples must be ordered in time".into(),
            ));
        }
        Ok(Self { times, values })
    }

    /// A single-sample series, as used by static load cases
    pub fn constant(time: f64, value: f64) -> Self {
        Self {
            times: vec![time],
            values: vec![value],
        }
    }

    pub fn times(&self) -> &[f64] {
        &self.times
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Value at time `t`, linearly interpolated and end-clamped
    pub fn sample(&self, t: f64) -> f64 {
        interp(t, &self.times, &self.values)
    }

    /// Interpolate the series onto a uniform solver grid
    pub fn resample(&self, grid: &[f64]) -> Vec<f64> {
        grid.iter().map(|&t| self.sample(t)).collect()
    }

    /// The final sample, which a static analysis treats as the load value
    pub fn last_value(&self) -> f64 {
        *self.values.last().unwrap_or(&0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn interpolation_clamps_at_the_ends() {
        let series = TimeSeries::new(vec![1.0, 2.0, 4.0], vec![0.0, 10.0, 0.0]).unwrap();
        assert_relative_eq!(series.sample(0.0), 0.0);
        assert_relative_eq!(series.sample(1.5), 5.0);
        assert_relative_eq!(series.sample(2.0), 10.0);
        assert_relative_eq!(series.sample(3.0), 5.0);
        assert_relative_eq!(series.sample(9.0), 0.0);
        assert_relative_eq!(series.last_value(), 0.0);
    }

    #[test]
    fn grids_cover_the_period() {
        let grid = time_grid(1.0, 0.25);
        assert_eq!(grid.len(), 5);
        assert_relative_eq!(grid[4], 1.0);

        let grid = time_grid(0.2, 0.005);
        assert_eq!(grid.len(), 41);
        assert_relative_eq!(*grid.last().unwrap(), 0.2, epsilon = 1e-12);
    }

    #[test]
    fn invalid_series_are_rejected() {
        assert!(TimeSeries::new(vec![], vec![]).is_err());
        assert!(TimeSeries::new(vec![0.0, 1.0], vec![1.0]).is_err());
        assert!(TimeSeries::new(vec![1.0, 0.5], vec![1.0, 2.0]).is_err());
    }
}

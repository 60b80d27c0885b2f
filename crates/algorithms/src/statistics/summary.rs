//! Descriptive statistics

use lstanom_core::{Error, Result};
use serde::Serialize;

/// Descriptive statistics of a set of values.
///
/// The standard deviation is the population one (divides by `count`).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SummaryStats {
    pub count: usize,
    pub mean: f64,
    pub std_dev: f64,
    pub min: f64,
    pub max: f64,
}

impl SummaryStats {
    /// Describe the finite values of `values`.
    ///
    /// Fails with [`Error::InsufficientData`] when there are none.
    pub fn describe<I: IntoIterator<Item = f64>>(values: I) -> Result<Self> {
        let vals: Vec<f64> = values.into_iter().filter(|v| v.is_finite()).collect();
        if vals.is_empty() {
            return Err(Error::InsufficientData("no defined values to describe".into()));
        }

        let count = vals.len();
        let mean = vals.iter().sum::<f64>() / count as f64;
        let var = vals.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / count as f64;
        let (min, max) = vals
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)));

        Ok(Self {
            count,
            mean,
            std_dev: var.sqrt(),
            min,
            max,
        })
    }

    pub fn range(&self) -> f64 {
        self.max - self.min
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_population_std() {
        let s = SummaryStats::describe([2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]).unwrap();
        assert_eq!(s.count, 8);
        assert_relative_eq!(s.mean, 5.0);
        assert_relative_eq!(s.std_dev, 2.0);
        assert_eq!((s.min, s.max), (2.0, 9.0));
        assert_relative_eq!(s.range(), 7.0);
    }

    #[test]
    fn test_nan_ignored_and_empty_fails() {
        let s = SummaryStats::describe([1.0, f64::NAN, 3.0]).unwrap();
        assert_eq!(s.count, 2);
        assert!(matches!(
            SummaryStats::describe([f64::NAN]),
            Err(Error::InsufficientData(_))
        ));
        assert!(SummaryStats::describe(Vec::new()).is_err());
    }
}

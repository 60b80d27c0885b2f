//! Fixed-width histograms

use lstanom_core::{Error, Result};
use serde::{Deserialize, Serialize};

/// Histogram bucket sizing
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HistogramParams {
    /// Lower bound on the bucket width
    pub min_bucket_width: f64,
    /// Buckets spanning the value range before the width floor applies
    pub max_buckets: usize,
}

impl Default for HistogramParams {
    fn default() -> Self {
        Self {
            min_bucket_width: 0.5,
            max_buckets: 20,
        }
    }
}

impl HistogramParams {
    pub fn validate(&self) -> Result<()> {
        if !(self.min_bucket_width.is_finite() && self.min_bucket_width > 0.0) {
            return Err(Error::InvalidParameter {
                name: "histogram.min_bucket_width",
                value: self.min_bucket_width.to_string(),
                reason: "must be a positive number".into(),
            });
        }
        if self.max_buckets == 0 {
            return Err(Error::InvalidParameter {
                name: "histogram.max_buckets",
                value: "0".into(),
                reason: "must be at least 1".into(),
            });
        }
        Ok(())
    }
}

/// Half-open bucket `[lower, upper)`; the last bucket also holds its upper edge
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HistogramBucket {
    pub lower: f64,
    pub upper: f64,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Histogram {
    pub bucket_width: f64,
    pub buckets: Vec<HistogramBucket>,
}

impl Histogram {
    /// Total number of values counted
    pub fn total(&self) -> usize {
        self.buckets.iter().map(|b| b.count).sum()
    }
}

/// Histogram of the finite values.
///
/// The bucket width is `max(min_bucket_width, range / max_buckets)` and the
/// first edge is the largest multiple of the width not above the minimum.
pub fn histogram<I: IntoIterator<Item = f64>>(values: I, params: &HistogramParams) -> Result<Histogram> {
    params.validate()?;
    let vals: Vec<f64> = values.into_iter().filter(|v| v.is_finite()).collect();
    if vals.is_empty() {
        return Err(Error::InsufficientData("no defined values for histogram".into()));
    }

    let min = vals.iter().copied().fold(f64::INFINITY, f64::min);
    let max = vals.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let width = params
        .min_bucket_width
        .max((max - min) / params.max_buckets as f64);

    let start = (min / width).floor() * width;
    let n = ((max - start) / width).floor() as usize + 1;

    let mut counts = vec![0usize; n];
    for v in vals {
        let idx = (((v - start) / width).floor() as usize).min(n - 1);
        counts[idx] += 1;
    }

    let buckets = counts
        .into_iter()
        .enumerate()
        .map(|(i, count)| HistogramBucket {
            lower: start + i as f64 * width,
            upper: start + (i + 1) as f64 * width,
            count,
        })
        .collect();

    Ok(Histogram {
        bucket_width: width,
        buckets,
    })
}

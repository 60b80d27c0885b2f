//! Statistics over sampled values
//!
//! - **summary**: Count, mean, population standard deviation, min and max
//! - **histogram**: Fixed-width buckets aligned to multiples of the width
//! - **zonal**: Statistics at supplied points, and per-group statistics

mod histogram;
mod summary;
mod zonal;

pub use histogram::{histogram, Histogram, HistogramBucket, HistogramParams};
pub use summary::SummaryStats;
pub use zonal::{grouped_statistics, point_zonal_statistics, PointZonalStats};

//! Point sampling of rasters
//!
//! Random points are drawn uniformly from the area of interest with a seeded
//! generator, so the same seed always yields the same sample.

use lstanom_core::{AreaOfInterest, AttributeValue, ClipMode, Error, Raster, Result, SamplePoint};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::warn;

/// Draw attempts allowed per requested point in polygon mode
const MAX_ATTEMPTS_PER_POINT: usize = 1000;

/// A sample point together with the raster value at its location.
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    pub point: SamplePoint,
    /// `None` when the cell is no-data or the point lies outside the grid
    pub value: Option<f64>,
}

impl Observation {
    /// Numeric attribute of the underlying point
    pub fn attribute(&self, name: &str) -> Option<f64> {
        self.point.get_property(name).and_then(AttributeValue::as_f64)
    }
}

/// Parameters for random point generation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RandomPointsParams {
    /// Number of points
    pub count: usize,
    /// Seed of the random generator
    pub seed: u64,
    /// Extent draws every point in the bounding rectangle; polygon rejects
    /// draws outside the polygons
    pub mode: ClipMode,
}

impl Default for RandomPointsParams {
    fn default() -> Self {
        Self {
            count: 500,
            seed: 0,
            mode: ClipMode::Extent,
        }
    }
}

/// Uniformly distributed random points inside the area of interest.
///
/// Points are numbered `0..count` in their `id`. In polygon mode a very thin
/// area can exhaust the draw budget, in which case fewer points are
/// returned and a warning is logged.
pub fn random_points(aoi: &AreaOfInterest, params: &RandomPointsParams) -> Vec<SamplePoint> {
    let (min_x, min_y, max_x, max_y) = aoi.bounds();
    let mut rng = StdRng::seed_from_u64(params.seed);
    let mut points = Vec::with_capacity(params.count);
    let budget = params.count.saturating_mul(MAX_ATTEMPTS_PER_POINT);

    let mut attempts = 0;
    while points.len() < params.count && attempts < budget {
        attempts += 1;
        let x = rng.random_range(min_x..max_x);
        let y = rng.random_range(min_y..max_y);
        if aoi.contains(x, y, params.mode) {
            let id = points.len();
            points.push(SamplePoint::new(id.to_string(), x, y));
        }
    }

    if points.len() < params.count {
        warn!(
            requested = params.count,
            generated = points.len(),
            "random point budget exhausted"
        );
    }
    points
}

/// Sample `raster` at each point's containing cell.
pub fn sample_points(raster: &Raster<f64>, points: &[SamplePoint]) -> Vec<Observation> {
    points
        .iter()
        .map(|p| Observation {
            point: p.clone(),
            value: raster.value_at(p.x, p.y),
        })
        .collect()
}

/// Observations with a defined value
pub fn defined(observations: &[Observation]) -> impl Iterator<Item = &Observation> {
    observations.iter().filter(|o| o.value.is_some())
}

/// Fail unless `count` fits within `max_points`
pub fn ensure_sample_budget(count: usize, max_points: usize) -> Result<()> {
    if count > max_points {
        return Err(Error::InvalidParameter {
            name: "sampling.points",
            value: count.to_string(),
            reason: format!("exceeds max_sample_points ({max_points})"),
        });
    }
    Ok(())
}

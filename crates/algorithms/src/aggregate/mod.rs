//! Temporal aggregation of masked LST scenes
//!
//! Scenes are streamed from the catalog one at a time (load, mask, resample,
//! accumulate, drop), so only the running sum and count grids stay resident.

mod accumulator;
mod clip;

pub use accumulator::MeanAccumulator;
pub use clip::clip_to_aoi;

use crate::collection::{SceneCatalog, SceneCollection};
use crate::quality::{mask_scene, QaBits};
use lstanom_core::crs;
use lstanom_core::raster::resample_nearest;
use lstanom_core::{Error, GridSpec, Raster, Result, SceneMetadata};
use serde::Serialize;
use tracing::{debug, info, warn};

/// Offset between Kelvin and degrees Celsius
pub const KELVIN_OFFSET: f64 = 273.15;

/// A scene that could not be aggregated
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkippedScene {
    pub id: String,
    pub reason: String,
}

/// Bookkeeping of one aggregation
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AggregationReport {
    pub scenes_used: usize,
    pub skipped: Vec<SkippedScene>,
}

/// Per-pixel temporal mean and observation count over one time series.
#[derive(Debug, Clone)]
pub struct Aggregation {
    /// Mean of the valid observations; NaN where there were none
    pub mean: Raster<f64>,
    /// Number of valid observations per pixel
    pub count: Raster<u32>,
    pub report: AggregationReport,
}

/// Stream a collection through the cloud mask into a per-pixel mean.
///
/// Every scene is resampled by nearest neighbour onto `grid`. A scene that
/// fails to load, lacks a band, or uses a different CRS is logged and
/// skipped. An empty collection yields an all no-data mean.
pub fn temporal_mean<C: SceneCatalog + ?Sized>(
    catalog: &C,
    collection: &SceneCollection,
    grid: &GridSpec,
    bits: &QaBits,
) -> Result<Aggregation> {
    bits.validate()?;
    let mut acc = MeanAccumulator::new(grid.clone());
    let mut report = AggregationReport::default();

    for meta in collection.iter() {
        match masked_on_grid(catalog, meta, grid, bits) {
            Ok(lst) => {
                acc.add(&lst)?;
                report.scenes_used += 1;
                debug!(scene = %meta.id, "scene accumulated");
            }
            Err(e) => {
                warn!(scene = %meta.id, error = %e, "skipping scene");
                report.skipped.push(SkippedScene {
                    id: meta.id.clone(),
                    reason: e.to_string(),
                });
            }
        }
    }

    info!(
        used = report.scenes_used,
        skipped = report.skipped.len(),
        "temporal mean computed"
    );

    let (mean, count) = acc.finish()?;
    Ok(Aggregation { mean, count, report })
}

fn masked_on_grid<C: SceneCatalog + ?Sized>(
    catalog: &C,
    meta: &SceneMetadata,
    grid: &GridSpec,
    bits: &QaBits,
) -> Result<Raster<f64>> {
    let scene = mask_scene(catalog.load(meta)?, bits)?;
    let lst = scene.lst()?;
    if !crs::compatible(lst.crs(), grid.crs.as_ref()) {
        return Err(Error::CrsMismatch(
            lst.crs().map(|c| c.identifier()).unwrap_or_default(),
            grid.crs.as_ref().map(|c| c.identifier()).unwrap_or_default(),
        ));
    }
    Ok(resample_nearest(lst, grid))
}

/// Convert a Kelvin raster to degrees Celsius
pub fn kelvin_to_celsius(kelvin: &Raster<f64>) -> Result<Raster<f64>> {
    crate::anomaly::band_math(kelvin, |k| k - KELVIN_OFFSET)
}

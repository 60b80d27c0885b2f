//! Stage orchestration

use super::config::PipelineConfig;
use super::{target_band, MEAN_LST_BAND};
use crate::aggregate::{clip_to_aoi, kelvin_to_celsius, temporal_mean, AggregationReport};
use crate::anomaly::{absolute_anomaly, percentage_anomaly};
use crate::classification::{cluster_positives, ClusterResult};
use crate::collection::{
    CollectionBuilder, CollectionReport, SceneCatalog, SceneCollection, Truncation,
};
use crate::sampling::{defined, random_points, sample_points, Observation};
use crate::statistics::{histogram, point_zonal_statistics, Histogram, PointZonalStats, SummaryStats};
use lstanom_core::{AreaOfInterest, GridSpec, Raster, Result, SamplePoint, CRS};
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{info, warn};

/// Bookkeeping of one time series
#[derive(Debug, Clone, Serialize)]
pub struct SeriesReport {
    pub label: String,
    pub band: String,
    pub scenes: usize,
    pub truncation: Option<Truncation>,
    pub collection: CollectionReport,
    pub aggregation: AggregationReport,
}

/// Random sample bookkeeping and statistics
#[derive(Debug, Clone, Serialize)]
pub struct SampleReport {
    pub requested: usize,
    pub generated: usize,
    pub defined: usize,
    pub statistics: Option<SummaryStats>,
    pub histogram: Option<Histogram>,
}

/// Zonal and cluster statistics of the supplied points
#[derive(Debug, Clone, Serialize)]
pub struct SuppliedReport {
    pub points: usize,
    pub zonal: PointZonalStats,
    pub clustered_points: usize,
    pub cluster_statistics: BTreeMap<usize, SummaryStats>,
    pub centroids: Vec<Vec<f64>>,
}

/// Everything written to `run_report.json`
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub generated_at: String,
    pub grid: GridSpec,
    pub historical: SeriesReport,
    pub target: SeriesReport,
    pub samples: SampleReport,
    pub supplied_points: Option<SuppliedReport>,
}

/// Analysis of the externally supplied sample points
#[derive(Debug, Clone)]
pub struct SuppliedPointAnalysis {
    pub outcome_column: String,
    pub observations: Vec<Observation>,
    pub zonal: PointZonalStats,
    pub clusters: ClusterResult,
}

/// All products of a run, fully computed in memory
#[derive(Debug, Clone)]
pub struct PipelineOutputs {
    pub historical_label: String,
    pub target_label: String,
    /// Historical mean LST in °C
    pub mean_historical: Raster<f64>,
    /// Target mean LST in °C
    pub mean_target: Raster<f64>,
    /// Valid historical observations per pixel
    pub observation_density: Raster<u32>,
    pub anomaly_abs: Raster<f64>,
    pub anomaly_pct: Raster<f64>,
    /// Random sample of the absolute anomaly
    pub samples: Vec<Observation>,
    pub supplied: Option<SuppliedPointAnalysis>,
    pub report: RunReport,
}

/// The anomaly job over one catalog and area of interest.
pub struct AnomalyPipeline<'a, C: SceneCatalog + ?Sized> {
    config: PipelineConfig,
    catalog: &'a C,
    aoi: AreaOfInterest,
    points: Option<Vec<SamplePoint>>,
}

impl<'a, C: SceneCatalog + ?Sized> AnomalyPipeline<'a, C> {
    pub fn new(config: PipelineConfig, catalog: &'a C, aoi: AreaOfInterest) -> Self {
        Self {
            config,
            catalog,
            aoi,
            points: None,
        }
    }

    /// Supplied sample points for zonal statistics and clustering
    pub fn with_points(mut self, points: Vec<SamplePoint>) -> Self {
        self.points = Some(points);
        self
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Analysis grid: the AOI extent at the configured resolution
    pub fn grid(&self) -> Result<GridSpec> {
        GridSpec::from_extent(
            self.aoi.bounds(),
            self.config.resolution,
            self.config.epsg.map(CRS::from_epsg),
        )
    }

    /// Run every stage. Nothing is written to disk.
    pub fn run(&self) -> Result<PipelineOutputs> {
        let config = &self.config;
        config.validate()?;
        if let Some(points) = &self.points {
            config.validate_points(points)?;
        }
        let historical_label = config.historical_label()?;
        let target_label = config.target_label()?;

        let grid = self.grid()?;
        let extent = self.aoi.bounds();
        info!(rows = grid.rows, cols = grid.cols, resolution = grid.resolution(), "analysis grid");

        // Collection
        let builder = CollectionBuilder::new(config.sensor_policy.clone());
        let historical = builder.build(self.catalog, &config.historical_request(extent))?;
        let target = builder.build(self.catalog, &config.target_request(extent))?;

        // Masking and aggregation
        let hist_agg = temporal_mean(self.catalog, &historical, &grid, &config.qa_bits)?;
        let target_agg = temporal_mean(self.catalog, &target, &grid, &config.qa_bits)?;

        let mean_historical =
            clip_to_aoi(&kelvin_to_celsius(&hist_agg.mean)?, &self.aoi, config.clip)?;
        let mean_target =
            clip_to_aoi(&kelvin_to_celsius(&target_agg.mean)?, &self.aoi, config.clip)?;
        let observation_density = clip_to_aoi(&hist_agg.count, &self.aoi, config.clip)?;

        // Anomalies
        let anomaly_abs = absolute_anomaly(&mean_target, &mean_historical)?;
        let anomaly_pct = percentage_anomaly(&anomaly_abs, &mean_historical)?;
        info!(valid_pixels = anomaly_abs.count_valid(), "anomaly computed");

        // Random sample
        let sample_params = config.random_points();
        let samples = sample_points(&anomaly_abs, &random_points(&self.aoi, &sample_params));
        let sample_values: Vec<f64> = defined(&samples).filter_map(|o| o.value).collect();
        let statistics = SummaryStats::describe(sample_values.iter().copied())
            .inspect_err(|e| warn!(error = %e, "no sample statistics"))
            .ok();
        let sample_histogram = histogram(sample_values.iter().copied(), &config.histogram).ok();
        if let Some(s) = &statistics {
            info!(mean = s.mean, std_dev = s.std_dev, count = s.count, "sample statistics");
        }

        // Supplied points
        let supplied = match &self.points {
            Some(points) => Some(self.analyse_points(&anomaly_abs, points)?),
            None => None,
        };

        let report = RunReport {
            generated_at: chrono::Utc::now().to_rfc3339(),
            grid,
            historical: series_report(
                historical_label.clone(),
                MEAN_LST_BAND.to_string(),
                historical,
                hist_agg.report,
            ),
            target: series_report(
                target_label.clone(),
                target_band(&target_label),
                target,
                target_agg.report,
            ),
            samples: SampleReport {
                requested: sample_params.count,
                generated: samples.len(),
                defined: sample_values.len(),
                statistics,
                histogram: sample_histogram,
            },
            supplied_points: supplied.as_ref().map(|s| SuppliedReport {
                points: s.observations.len(),
                zonal: s.zonal.clone(),
                clustered_points: s.clusters.points.len(),
                cluster_statistics: s.clusters.cluster_stats.clone(),
                centroids: s.clusters.centroids.clone(),
            }),
        };

        Ok(PipelineOutputs {
            historical_label,
            target_label,
            mean_historical,
            mean_target,
            observation_density,
            anomaly_abs,
            anomaly_pct,
            samples,
            supplied,
            report,
        })
    }

    fn analyse_points(
        &self,
        anomaly: &Raster<f64>,
        points: &[SamplePoint],
    ) -> Result<SuppliedPointAnalysis> {
        let outcome_column = self.config.outcome_column.clone();
        let observations = sample_points(anomaly, points);
        let zonal = point_zonal_statistics(&observations, &outcome_column)?;
        let clusters = cluster_positives(&observations, &outcome_column, &self.config.clustering)?;

        Ok(SuppliedPointAnalysis {
            outcome_column,
            observations,
            zonal,
            clusters,
        })
    }
}

fn series_report(
    label: String,
    band: String,
    collection: SceneCollection,
    aggregation: AggregationReport,
) -> SeriesReport {
    SeriesReport {
        label,
        band,
        scenes: collection.len(),
        truncation: collection.truncation,
        collection: collection.report,
        aggregation,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classification::KmeansParams;
    use crate::collection::MemoryCatalog;
    use approx::assert_relative_eq;
    use chrono::NaiveDate;
    use lstanom_core::{AttributeValue, GeoTransform, Scene, SceneMetadata, Sensor};

    fn scene(id: &str, sensor: Sensor, date: (i32, u32, u32), kelvin: f64) -> Scene {
        let date = NaiveDate::from_ymd_opt(date.0, date.1, date.2).unwrap();
        let transform = GeoTransform::north_up(0.0, 300.0, 30.0);
        let mut lst = Raster::filled(10, 10, kelvin);
        lst.set_transform(transform);
        let mut qa = Raster::filled(10, 10, 0u16);
        qa.set_transform(transform);
        Scene::with_lst_and_qa(SceneMetadata::new(id, sensor, date, 2.0), lst, qa)
    }

    fn catalog() -> MemoryCatalog {
        MemoryCatalog::new()
            .with_scene(scene("LT05_1", Sensor::L5, (1988, 7, 10), 293.15))
            .with_scene(scene("LE07_1", Sensor::L7, (2005, 8, 2), 293.15))
            .with_scene(scene("LC08_1", Sensor::L8, (2022, 7, 20), 295.15))
            .with_scene(scene("LC09_1", Sensor::L9, (2022, 8, 3), 295.15))
    }

    fn config() -> PipelineConfig {
        PipelineConfig {
            sampling: crate::pipeline::SamplingConfig {
                points: 40,
                ..Default::default()
            },
            clustering: KmeansParams {
                seed: Some(0),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    #[test]
    fn test_run_without_points() {
        let catalog = catalog();
        let aoi = AreaOfInterest::from_bounds(0.0, 0.0, 300.0, 300.0).unwrap();
        let outputs = AnomalyPipeline::new(config(), &catalog, aoi).run().unwrap();

        // Historical: 20, 20, 22, 22 °C; target: 22 °C
        assert_relative_eq!(outputs.mean_historical.get(5, 5).unwrap(), 21.0, epsilon = 1e-9);
        assert_relative_eq!(outputs.mean_target.get(5, 5).unwrap(), 22.0, epsilon = 1e-9);
        assert_relative_eq!(outputs.anomaly_abs.get(0, 0).unwrap(), 1.0, epsilon = 1e-9);
        assert_eq!(outputs.observation_density.get(3, 3).unwrap(), 4);
        assert_eq!(outputs.samples.len(), 40);
        assert_eq!(outputs.report.historical.scenes, 4);
        assert_eq!(outputs.report.target.scenes, 2);
        assert_eq!(outputs.report.target.band, "LST_2022_C");
        assert!(outputs.supplied.is_none());
    }

    #[test]
    fn test_too_many_clusters_fails_before_computing() {
        let catalog = catalog();
        let aoi = AreaOfInterest::from_bounds(0.0, 0.0, 300.0, 300.0).unwrap();
        let points: Vec<SamplePoint> = (0..3)
            .map(|i| {
                SamplePoint::new(i.to_string(), 15.0 + 30.0 * i as f64, 15.0)
                    .with_property("Results Positive", AttributeValue::Int(1))
            })
            .collect();
        let config = PipelineConfig {
            clustering: KmeansParams { k: 5, ..Default::default() },
            ..config()
        };

        let result = AnomalyPipeline::new(config, &catalog, aoi).with_points(points).run();
        assert!(matches!(
            result,
            Err(lstanom_core::Error::InsufficientObservations { requested: 5, available: 3 })
        ));
    }
}

//! Job configuration
//!
//! A job file is TOML with an `[inputs]` table naming the files to read and
//! an optional `[analysis]` table overriding the analysis defaults:
//!
//! ```toml
//! [inputs]
//! catalog = "scenes"
//! aoi = "aoi.geojson"
//! points = "anaplasma.csv"
//!
//! [analysis]
//! epsg = 32632
//! max_cloud_cover = 15.0
//!
//! [analysis.clustering]
//! k = 3
//! seed = 7
//! ```
//!
//! Dates are quoted `"YYYY-MM-DD"` strings. `analysis.clustering.seed` has
//! no default and must be given.

use crate::classification::KmeansParams;
use crate::collection::{CollectionBuilder, CollectionRequest, RangeSpec, SensorPolicy};
use crate::quality::QaBits;
use crate::sampling::{ensure_sample_budget, RandomPointsParams};
use crate::statistics::HistogramParams;
use lstanom_core::scene::{DateRange, MonthWindow, Sensor};
use lstanom_core::{AttributeValue, ClipMode, Error, Result, SamplePoint};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Random sampling settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplingConfig {
    /// Number of random points drawn in the area of interest
    pub points: usize,
    pub seed: u64,
    /// Upper bound on `points`
    pub max_sample_points: usize,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            points: 500,
            seed: 0,
            max_sample_points: 10_000,
        }
    }
}

/// Analysis parameters. Every field has a default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Ranges averaged into the historical mean
    pub historical: Vec<RangeSpec>,
    /// Ranges averaged into the target mean
    pub target: Vec<RangeSpec>,
    pub months: MonthWindow,
    /// Scenes need cloud cover strictly below this percentage
    pub max_cloud_cover: f64,
    pub max_historical_scenes: usize,
    pub max_target_scenes: usize,
    pub sensor_policy: SensorPolicy,
    pub qa_bits: QaBits,
    /// EPSG code of the analysis grid; all inputs must share it
    pub epsg: Option<u32>,
    /// Cell size of the analysis grid in map units
    pub resolution: f64,
    pub clip: ClipMode,
    pub sampling: SamplingConfig,
    pub histogram: HistogramParams,
    pub clustering: KmeansParams,
    /// Attribute of the supplied points holding the test result (1 = positive)
    pub outcome_column: String,
}

fn years(first: i32, last: i32) -> RangeSpec {
    let start = chrono::NaiveDate::from_ymd_opt(first, 1, 1).unwrap_or_default();
    let end = chrono::NaiveDate::from_ymd_opt(last, 12, 31).unwrap_or_default();
    RangeSpec {
        start,
        end,
        sensors: None,
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        let summer = |month, day| chrono::NaiveDate::from_ymd_opt(2022, month, day).unwrap_or_default();
        Self {
            historical: vec![
                years(1984, 1990),
                years(1991, 1998),
                years(1999, 2002),
                years(2003, 2012),
                years(2013, 2021),
                years(2022, 2022),
            ],
            target: vec![RangeSpec {
                start: summer(7, 1),
                end: summer(8, 31),
                sensors: Some(vec![Sensor::L8, Sensor::L9]),
            }],
            months: MonthWindow::default(),
            max_cloud_cover: 15.0,
            max_historical_scenes: 1000,
            max_target_scenes: 100,
            sensor_policy: SensorPolicy::default(),
            qa_bits: QaBits::default(),
            epsg: None,
            resolution: 30.0,
            clip: ClipMode::Extent,
            sampling: SamplingConfig::default(),
            histogram: HistogramParams::default(),
            clustering: KmeansParams {
                seed: None,
                ..KmeansParams::default()
            },
            outcome_column: "Results Positive".to_string(),
        }
    }
}

impl PipelineConfig {
    /// Parse analysis parameters from TOML text
    pub fn from_toml(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|e| Error::InvalidParameter {
            name: "config",
            value: "<toml>".into(),
            reason: e.to_string(),
        })
    }

    pub fn historical_request(&self, extent: (f64, f64, f64, f64)) -> CollectionRequest {
        CollectionRequest {
            ranges: self.historical.clone(),
            months: self.months,
            max_cloud_cover: self.max_cloud_cover,
            max_scenes: self.max_historical_scenes,
            extent,
        }
    }

    pub fn target_request(&self, extent: (f64, f64, f64, f64)) -> CollectionRequest {
        CollectionRequest {
            ranges: self.target.clone(),
            months: self.months,
            max_cloud_cover: self.max_cloud_cover,
            max_scenes: self.max_target_scenes,
            extent,
        }
    }

    pub fn random_points(&self) -> RandomPointsParams {
        RandomPointsParams {
            count: self.sampling.points,
            seed: self.sampling.seed,
            mode: self.clip,
        }
    }

    /// Label of the historical series, e.g. `1984-2022`
    pub fn historical_label(&self) -> Result<String> {
        span_label(&self.historical, "historical")
    }

    /// Label of the target series, e.g. `2022`
    pub fn target_label(&self) -> Result<String> {
        span_label(&self.target, "target")
    }

    /// Reject invalid parameters before any computation starts
    pub fn validate(&self) -> Result<()> {
        let builder = CollectionBuilder::new(self.sensor_policy.clone());
        let extent = (0.0, 0.0, 1.0, 1.0);
        builder.validate(&self.historical_request(extent))?;
        builder.validate(&self.target_request(extent))?;
        self.qa_bits.validate()?;

        if !(self.resolution.is_finite() && self.resolution > 0.0) {
            return Err(Error::InvalidParameter {
                name: "resolution",
                value: self.resolution.to_string(),
                reason: "must be a positive number".into(),
            });
        }
        ensure_sample_budget(self.sampling.points, self.sampling.max_sample_points)?;
        self.histogram.validate()?;
        self.clustering.validate()?;
        if self.outcome_column.trim().is_empty() {
            return Err(Error::InvalidParameter {
                name: "outcome_column",
                value: String::new(),
                reason: "must name an attribute".into(),
            });
        }
        Ok(())
    }

    /// Fail early when the supplied points cannot yield `k` clusters
    pub fn validate_points(&self, points: &[SamplePoint]) -> Result<()> {
        let positives = points
            .iter()
            .filter(|p| {
                p.get_property(&self.outcome_column)
                    .and_then(AttributeValue::as_f64)
                    == Some(1.0)
            })
            .count();
        if positives < self.clustering.k {
            return Err(Error::InsufficientObservations {
                requested: self.clustering.k,
                available: positives,
            });
        }
        Ok(())
    }
}

fn span_label(ranges: &[RangeSpec], name: &'static str) -> Result<String> {
    let start = ranges.iter().map(|r| r.start).min();
    let end = ranges.iter().map(|r| r.end).max();
    match (start, end) {
        (Some(start), Some(end)) => Ok(DateRange::new(start, end)?.year_label()),
        _ => Err(Error::InvalidParameter {
            name,
            value: "[]".into(),
            reason: "at least one date range is required".into(),
        }),
    }
}

/// Input files of a job
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputConfig {
    /// Catalog directory, or its manifest CSV
    pub catalog: PathBuf,
    /// Area of interest GeoJSON
    pub aoi: PathBuf,
    /// Keep only AOI features containing this (x, y) point
    #[serde(default)]
    pub select_point: Option<[f64; 2]>,
    /// Supplied sample points CSV
    #[serde(default)]
    pub points: Option<PathBuf>,
    #[serde(default = "default_x_column")]
    pub x_column: String,
    #[serde(default = "default_y_column")]
    pub y_column: String,
}

fn default_x_column() -> String {
    "x".to_string()
}

fn default_y_column() -> String {
    "y".to_string()
}

/// A complete job: inputs plus analysis parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobConfig {
    pub inputs: InputConfig,
    #[serde(default)]
    pub analysis: PipelineConfig,
}

impl JobConfig {
    /// Load a job file. Relative input paths are resolved against the
    /// directory containing it.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let mut job: JobConfig = toml::from_str(&text).map_err(|e| Error::InvalidParameter {
            name: "config",
            value: path.display().to_string(),
            reason: e.to_string(),
        })?;

        let base = path.parent().unwrap_or_else(|| Path::new(""));
        let resolve = |p: &mut PathBuf| {
            if p.is_relative() {
                *p = base.join(&*p);
            }
        };
        resolve(&mut job.inputs.catalog);
        resolve(&mut job.inputs.aoi);
        if let Some(points) = job.inputs.points.as_mut() {
            resolve(points);
        }
        Ok(job)
    }

    pub fn validate(&self) -> Result<()> {
        self.analysis.validate()
    }
}

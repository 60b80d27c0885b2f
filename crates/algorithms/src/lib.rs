//! # lstanom Algorithms
//!
//! Processing stages of the land-surface-temperature anomaly pipeline.
//!
//! ## Stages
//!
//! - **collection**: Scene catalogs, sensor eligibility, merged time series
//! - **quality**: QA bitfield cloud masking of the LST band
//! - **aggregate**: Streaming temporal mean and observation density
//! - **anomaly**: Absolute and percentage anomaly rasters
//! - **sampling**: Seeded random points and point sampling
//! - **statistics**: Summary statistics, histograms, zonal statistics at points
//! - **classification**: Feature k-means and anomaly clustering of positive samples
//! - **pipeline**: Job configuration, end-to-end run and export

pub mod aggregate;
pub mod anomaly;
pub mod classification;
pub mod collection;
pub mod pipeline;
pub mod quality;
pub mod sampling;
pub mod statistics;

pub(crate) mod maybe_rayon;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::aggregate::{temporal_mean, Aggregation, AggregationReport};
    pub use crate::anomaly::{absolute_anomaly, percentage_anomaly};
    pub use crate::classification::{cluster_positives, kmeans, ClusterResult, KmeansParams};
    pub use crate::collection::{
        CollectionBuilder, DirectoryCatalog, MemoryCatalog, SceneCatalog, SceneCollection,
        SensorPolicy,
    };
    pub use crate::pipeline::{AnomalyPipeline, PipelineConfig, PipelineOutputs};
    pub use crate::quality::{mask_lst, mask_scene, CloudMask, QaBits};
    pub use crate::sampling::{random_points, sample_points, Observation};
    pub use crate::statistics::{histogram, Histogram, SummaryStats};
    pub use lstanom_core::prelude::*;
}

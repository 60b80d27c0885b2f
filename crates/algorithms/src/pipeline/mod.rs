//! End-to-end LST anomaly job
//!
//! [`AnomalyPipeline::run`] computes every product in memory; only after it
//! succeeds does [`PipelineOutputs::export`] write files, so a failed run
//! leaves the output directory untouched.

mod config;
mod export;
mod run;

pub use config::{InputConfig, JobConfig, PipelineConfig, SamplingConfig};
pub use export::OutputFiles;
pub use run::{
    AnomalyPipeline, PipelineOutputs, RunReport, SampleReport, SeriesReport, SuppliedPointAnalysis,
    SuppliedReport,
};

/// Historical mean band name
pub const MEAN_LST_BAND: &str = "MEAN_LST_C";
/// Absolute anomaly band name
pub const ANOMALY_ABS_BAND: &str = "ANOMALY_ABS_C";
/// Percentage anomaly band name
pub const ANOMALY_PCT_BAND: &str = "ANOMALY_PCT";
/// Cluster label column of the clustered points table
pub const CLUSTER_COLUMN: &str = "cluster";

/// Target mean band name, e.g. `LST_2022_C`
pub fn target_band(label: &str) -> String {
    format!("LST_{label}_C")
}

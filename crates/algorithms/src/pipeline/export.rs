//! Writing pipeline products to disk

use super::run::PipelineOutputs;
use super::{target_band, ANOMALY_ABS_BAND, ANOMALY_PCT_BAND, CLUSTER_COLUMN, MEAN_LST_BAND};
use lstanom_core::io::{write_geotiff, write_table};
use lstanom_core::Result;
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use tracing::info;

/// Name of the JSON run report
pub const REPORT_FILE: &str = "run_report.json";

/// Files written by [`PipelineOutputs::export`]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OutputFiles {
    /// (band name, GeoTIFF path)
    pub rasters: Vec<(String, PathBuf)>,
    pub tables: Vec<PathBuf>,
    pub report: PathBuf,
}

impl OutputFiles {
    /// Every written path
    pub fn paths(&self) -> impl Iterator<Item = &Path> {
        self.rasters
            .iter()
            .map(|(_, p)| p.as_path())
            .chain(self.tables.iter().map(PathBuf::as_path))
            .chain(std::iter::once(self.report.as_path()))
    }
}

impl PipelineOutputs {
    /// Write the rasters, tables and run report into `dir`, creating it if
    /// needed.
    pub fn export<P: AsRef<Path>>(&self, dir: P) -> Result<OutputFiles> {
        let dir = dir.as_ref();
        std::fs::create_dir_all(dir)?;
        let (hist, target) = (&self.historical_label, &self.target_label);
        let mut files = OutputFiles::default();

        let float_rasters = [
            (ANOMALY_ABS_BAND.to_string(), format!("LST_Anomaly_Absolute_{target}_C.tif"), &self.anomaly_abs),
            (ANOMALY_PCT_BAND.to_string(), format!("LST_Anomaly_Percentage_{target}.tif"), &self.anomaly_pct),
            (MEAN_LST_BAND.to_string(), format!("Mean_LST_{hist}_C.tif"), &self.mean_historical),
            (target_band(target), format!("Mean_LST_{target}_C.tif"), &self.mean_target),
        ];
        for (band, name, raster) in float_rasters {
            let path = dir.join(name);
            write_geotiff(raster, &path, None)?;
            files.rasters.push((band, path));
        }

        let density = dir.join(format!("Observation_Density_{hist}.tif"));
        write_geotiff(&self.observation_density, &density, None)?;
        files.rasters.push(("count".to_string(), density));

        let samples = dir.join(format!("LST_Anomaly_Samples_{target}.csv"));
        write_table(
            &samples,
            &[ANOMALY_ABS_BAND],
            self.samples
                .iter()
                .filter_map(|o| o.value)
                .map(|v| vec![v.to_string()]),
        )?;
        files.tables.push(samples);

        if let Some(supplied) = &self.supplied {
            let clustered = dir.join("Anaplasma_Clustered_Points.csv");
            write_table(
                &clustered,
                &[ANOMALY_ABS_BAND, supplied.outcome_column.as_str(), CLUSTER_COLUMN],
                supplied.clusters.points.iter().map(|p| {
                    vec![p.anomaly.to_string(), p.outcome.to_string(), p.cluster.to_string()]
                }),
            )?;
            files.tables.push(clustered);
        }

        files.report = dir.join(REPORT_FILE);
        let writer = BufWriter::new(File::create(&files.report)?);
        serde_json::to_writer_pretty(writer, &self.report).map_err(std::io::Error::from)?;

        info!(dir = %dir.display(), files = files.paths().count(), "outputs exported");
        Ok(files)
    }
}

#[cfg(test)]
mod tests {
    use crate::collection::MemoryCatalog;
    use crate::pipeline::{AnomalyPipeline, PipelineConfig};
    use lstanom_core::AreaOfInterest;

    #[test]
    fn test_export_with_empty_catalog() {
        let catalog = MemoryCatalog::new();
        let aoi = AreaOfInterest::from_bounds(0.0, 0.0, 90.0, 60.0).unwrap();
        let mut config = PipelineConfig::default();
        config.clustering.seed = Some(0);
        let outputs = AnomalyPipeline::new(config, &catalog, aoi)
            .run()
            .unwrap();
        assert_eq!(outputs.anomaly_abs.count_valid(), 0);
        assert!(outputs.report.samples.statistics.is_none());

        let dir = tempfile::tempdir().unwrap();
        let files = outputs.export(dir.path().join("out")).unwrap();

        assert_eq!(files.rasters.len(), 5);
        assert_eq!(files.tables.len(), 1);
        assert!(files.paths().all(|p| p.exists()));
        assert!(dir.path().join("out/Mean_LST_1984-2022_C.tif").exists());
        assert!(dir.path().join("out/Observation_Density_1984-2022.tif").exists());

        let samples = std::fs::read_to_string(dir.path().join("out/LST_Anomaly_Samples_2022.csv")).unwrap();
        assert_eq!(samples, "ANOMALY_ABS_C\n");

        let report: serde_json::Value =
            serde_json::from_reader(std::fs::File::open(&files.report).unwrap()).unwrap();
        assert_eq!(report["historical"]["scenes"], 0);
        let collection = &report["historical"]["collection"];
        assert_eq!(collection["failed_queries"].as_array().unwrap().len(), 0);
        assert_eq!(collection["empty_queries"].as_array().unwrap().len(), 13);
    }
}

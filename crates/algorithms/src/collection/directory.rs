//! Catalog backed by a directory of GeoTIFF scenes
//!
//! The directory holds a `scenes.csv` manifest with one row per acquisition:
//!
//! ```text
//! id,sensor,date,cloud_cover,min_x,min_y,max_x,max_y,lst,qa
//! LC08_194028_20150703,L8,2015-07-03,4.2,380000,5040000,410000,5070000,lst/LC08_194028_20150703.tif,qa/LC08_194028_20150703.tif
//! ```
//!
//! Footprint columns may be left empty. Band paths are relative to the
//! manifest directory.

use super::catalog::SceneCatalog;
use lstanom_core::io::read_geotiff;
use lstanom_core::scene::{parse_date, DateRange, Scene, SceneMetadata, Sensor};
use lstanom_core::{Error, Raster, Result};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Default manifest file name inside a catalog directory
pub const MANIFEST_FILE: &str = "scenes.csv";

#[derive(Debug, Deserialize)]
struct ManifestRow {
    id: String,
    sensor: String,
    date: String,
    cloud_cover: f64,
    min_x: Option<f64>,
    min_y: Option<f64>,
    max_x: Option<f64>,
    max_y: Option<f64>,
    lst: PathBuf,
    qa: PathBuf,
}

#[derive(Debug, Clone)]
struct BandPaths {
    lst: PathBuf,
    qa: PathBuf,
}

/// Scene catalog reading its scenes from GeoTIFF files listed in a manifest.
#[derive(Debug, Clone)]
pub struct DirectoryCatalog {
    root: PathBuf,
    scenes: Vec<SceneMetadata>,
    bands: HashMap<String, BandPaths>,
}

impl DirectoryCatalog {
    /// Open a catalog from a manifest file, or from a directory containing
    /// `scenes.csv`
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let manifest = if path.is_dir() {
            path.join(MANIFEST_FILE)
        } else {
            path.to_path_buf()
        };
        let root = manifest
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();

        let mut reader = csv::Reader::from_path(&manifest)?;
        let mut scenes = Vec::new();
        let mut bands = HashMap::new();

        for (line, row) in reader.deserialize::<ManifestRow>().enumerate() {
            let row = row?;
            let context = |e: Error| {
                Error::Catalog(format!("{} row {}: {e}", manifest.display(), line + 1))
            };

            let sensor: Sensor = row.sensor.parse().map_err(context)?;
            let acquired = parse_date(&row.date).map_err(context)?;
            let mut metadata = SceneMetadata::new(row.id.clone(), sensor, acquired, row.cloud_cover);
            metadata.footprint = match (row.min_x, row.min_y, row.max_x, row.max_y) {
                (Some(a), Some(b), Some(c), Some(d)) => Some((a, b, c, d)),
                _ => None,
            };

            if bands
                .insert(row.id.clone(), BandPaths { lst: row.lst, qa: row.qa })
                .is_some()
            {
                return Err(Error::Catalog(format!(
                    "{}: scene {} listed twice",
                    manifest.display(),
                    row.id
                )));
            }
            scenes.push(metadata);
        }

        Ok(Self { root, scenes, bands })
    }

    /// Directory band paths are resolved against
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// All scenes listed in the manifest
    pub fn scenes(&self) -> &[SceneMetadata] {
        &self.scenes
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }
}

impl SceneCatalog for DirectoryCatalog {
    fn search(
        &self,
        sensor: Sensor,
        range: &DateRange,
        extent: (f64, f64, f64, f64),
    ) -> Result<Vec<SceneMetadata>> {
        Ok(self
            .scenes
            .iter()
            .filter(|m| m.sensor == sensor && range.contains(m.acquired) && m.intersects(extent))
            .cloned()
            .collect())
    }

    fn load(&self, metadata: &SceneMetadata) -> Result<Scene> {
        let paths = self
            .bands
            .get(&metadata.id)
            .ok_or_else(|| Error::Catalog(format!("scene {} not in manifest", metadata.id)))?;

        let lst: Raster<f64> = read_geotiff(self.resolve(&paths.lst))?;
        let qa: Raster<u16> = read_geotiff(self.resolve(&paths.qa))?;

        Ok(Scene::with_lst_and_qa(metadata.clone(), lst, qa))
    }
}

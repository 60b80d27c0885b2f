//! End-to-end runs of the anomaly pipeline over synthetic Landsat scenes.
//!
//! Scenes are written as GeoTIFFs with a `scenes.csv` manifest so the
//! directory catalog, the masking and aggregation stages and the export are
//! exercised exactly as the CLI uses them.

use approx::assert_relative_eq;
use lstanom_algorithms::classification::KmeansParams;
use lstanom_algorithms::collection::{DirectoryCatalog, MANIFEST_FILE};
use lstanom_algorithms::pipeline::{AnomalyPipeline, PipelineConfig, SamplingConfig};
use lstanom_core::io::{read_geotiff, read_sample_points, write_geotiff};
use lstanom_core::{AreaOfInterest, AttributeValue, Error, GeoTransform, Raster, SamplePoint, CRS};
use std::fmt::Write as _;
use std::fs;
use std::path::Path;

const SIZE: usize = 10;
const RES: f64 = 30.0;
const EPSG: u32 = 32632;
const MIN_X: f64 = 390_000.0;
const MAX_Y: f64 = 5_060_300.0;

struct SceneSpec {
    id: &'static str,
    sensor: &'static str,
    date: &'static str,
    cloud: f64,
    kelvin: f64,
}

fn transform() -> GeoTransform {
    GeoTransform::north_up(MIN_X, MAX_Y, RES)
}

/// Write LST/QA GeoTIFFs and the manifest for `scenes` into `dir`.
///
/// Every QA band flags the last row as cloud.
fn write_catalog(dir: &Path, scenes: &[SceneSpec]) {
    let mut manifest = String::from("id,sensor,date,cloud_cover,min_x,min_y,max_x,max_y,lst,qa\n");
    for s in scenes {
        let mut lst = Raster::filled(SIZE, SIZE, s.kelvin);
        lst.set_transform(transform());
        lst.set_crs(Some(CRS::from_epsg(EPSG)));

        let mut qa: Raster<u16> = Raster::filled(SIZE, SIZE, 1 << 6);
        qa.set_transform(transform());
        qa.set_crs(Some(CRS::from_epsg(EPSG)));
        for col in 0..SIZE {
            qa.set(SIZE - 1, col, 1 << 3).unwrap();
        }

        write_geotiff(&lst, dir.join(format!("{}_lst.tif", s.id)), None).unwrap();
        write_geotiff(&qa, dir.join(format!("{}_qa.tif", s.id)), None).unwrap();

        let (min_x, min_y, max_x, max_y) = transform().bounds(SIZE, SIZE);
        writeln!(
            manifest,
            "{},{},{},{},{min_x},{min_y},{max_x},{max_y},{id}_lst.tif,{id}_qa.tif",
            s.id,
            s.sensor,
            s.date,
            s.cloud,
            id = s.id
        )
        .unwrap();
    }
    fs::write(dir.join(MANIFEST_FILE), manifest).unwrap();
}

fn scenes_20_to_22() -> Vec<SceneSpec> {
    vec![
        SceneSpec { id: "LT05_1987", sensor: "L5", date: "1987-07-12", cloud: 3.0, kelvin: 293.15 },
        SceneSpec { id: "LE07_2001", sensor: "L7", date: "2001-08-09", cloud: 8.0, kelvin: 293.15 },
        SceneSpec { id: "LC08_2016", sensor: "L8", date: "2016-07-30", cloud: 1.0, kelvin: 293.15 },
        // Too cloudy and outside the month window: both ignored
        SceneSpec { id: "LC08_cloudy", sensor: "L8", date: "2016-07-31", cloud: 40.0, kelvin: 350.0 },
        SceneSpec { id: "LC08_june", sensor: "L8", date: "2016-06-15", cloud: 1.0, kelvin: 350.0 },
        // Target year
        SceneSpec { id: "LC08_2022", sensor: "L8", date: "2022-07-14", cloud: 2.0, kelvin: 295.15 },
        SceneSpec { id: "LC09_2022", sensor: "L9", date: "2022-08-07", cloud: 4.0, kelvin: 295.15 },
    ]
}

fn aoi() -> AreaOfInterest {
    let (min_x, min_y, max_x, max_y) = transform().bounds(SIZE, SIZE);
    AreaOfInterest::from_bounds(min_x, min_y, max_x, max_y).unwrap()
}

fn config() -> PipelineConfig {
    PipelineConfig {
        historical: vec![
            PipelineConfig::default().historical[0].clone(),
            PipelineConfig::default().historical[2].clone(),
            PipelineConfig::default().historical[4].clone(),
        ],
        epsg: Some(EPSG),
        sampling: SamplingConfig {
            points: 100,
            seed: 0,
            ..Default::default()
        },
        clustering: KmeansParams {
            seed: Some(0),
            ..Default::default()
        },
        ..Default::default()
    }
}

fn supplied_points(values: &[(f64, f64, i64)]) -> Vec<SamplePoint> {
    values
        .iter()
        .enumerate()
        .map(|(i, &(dx, dy, positive))| {
            SamplePoint::new(i.to_string(), MIN_X + dx, MAX_Y - dy)
                .with_property("Results Positive", AttributeValue::Int(positive))
        })
        .collect()
}

#[test]
fn constant_scenes_give_two_degree_anomaly() {
    let dir = tempfile::tempdir().unwrap();
    write_catalog(dir.path(), &scenes_20_to_22());
    let catalog = DirectoryCatalog::open(dir.path()).unwrap();

    let points = supplied_points(&[
        (15.0, 15.0, 1),
        (45.0, 45.0, 1),
        (75.0, 75.0, 1),
        (105.0, 105.0, 0),
        (15.0, 295.0, 1), // cloud-masked row
    ]);
    let config = PipelineConfig {
        clustering: KmeansParams { k: 1, ..Default::default() },
        ..config()
    };
    let outputs = AnomalyPipeline::new(config, &catalog, aoi())
        .with_points(points)
        .run()
        .unwrap();

    assert_eq!(outputs.historical_label, "1984-2021");
    assert_eq!(outputs.report.historical.scenes, 3);
    assert_eq!(outputs.report.target.scenes, 2);

    assert_relative_eq!(outputs.mean_historical.get(0, 0).unwrap(), 20.0, epsilon = 1e-4);
    assert_relative_eq!(outputs.anomaly_abs.get(4, 4).unwrap(), 2.0, epsilon = 1e-4);
    assert_relative_eq!(outputs.anomaly_pct.get(4, 4).unwrap(), 10.0, epsilon = 1e-3);
    assert!(outputs.anomaly_abs.get(SIZE - 1, 0).unwrap().is_nan());
    assert_eq!(outputs.observation_density.get(0, 0).unwrap(), 3);
    assert_eq!(outputs.observation_density.get(SIZE - 1, 0).unwrap(), 0);

    let stats = outputs.report.samples.statistics.unwrap();
    assert_relative_eq!(stats.mean, 2.0, epsilon = 1e-4);
    assert!(stats.std_dev < 1e-4);

    let supplied = outputs.supplied.as_ref().unwrap();
    assert_eq!(supplied.zonal.points, 4);
    assert_eq!(supplied.clusters.points.len(), 3);

    let out = dir.path().join("out");
    let files = outputs.export(&out).unwrap();
    assert_eq!(files.rasters.len(), 5);
    assert_eq!(files.tables.len(), 2);

    let abs: Raster<f64> = read_geotiff(out.join("LST_Anomaly_Absolute_2022_C.tif")).unwrap();
    assert_eq!(abs.crs().and_then(CRS::epsg), Some(EPSG));
    assert_relative_eq!(abs.get(2, 2).unwrap(), 2.0, epsilon = 1e-4);
    assert!(abs.get(SIZE - 1, 3).unwrap().is_nan());

    let clustered = fs::read_to_string(out.join("Anaplasma_Clustered_Points.csv")).unwrap();
    assert_eq!(clustered.lines().next().unwrap(), "ANOMALY_ABS_C,Results Positive,cluster");
    assert_eq!(clustered.lines().count(), 4);
    assert!(out.join("run_report.json").exists());
}

#[test]
fn too_many_clusters_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    write_catalog(dir.path(), &scenes_20_to_22());
    let catalog = DirectoryCatalog::open(dir.path()).unwrap();

    let csv_path = dir.path().join("points.csv");
    fs::write(
        &csv_path,
        format!(
            "x,y,Results Positive\n{},{},1\n{},{},1\n{},{},1\n{},{},0\n",
            MIN_X + 15.0,
            MAX_Y - 15.0,
            MIN_X + 45.0,
            MAX_Y - 15.0,
            MIN_X + 75.0,
            MAX_Y - 15.0,
            MIN_X + 105.0,
            MAX_Y - 15.0
        ),
    )
    .unwrap();
    let points = read_sample_points(&csv_path, "x", "y").unwrap();

    let config = PipelineConfig {
        clustering: KmeansParams { k: 5, ..Default::default() },
        ..config()
    };
    let out = dir.path().join("out");
    let result = AnomalyPipeline::new(config, &catalog, aoi())
        .with_points(points)
        .run()
        .and_then(|outputs| outputs.export(&out));

    assert!(matches!(
        result,
        Err(Error::InsufficientObservations { requested: 5, available: 3 })
    ));
    assert!(!out.exists());
}

#[test]
fn positives_without_anomaly_fail_clustering() {
    let dir = tempfile::tempdir().unwrap();
    write_catalog(dir.path(), &scenes_20_to_22());
    let catalog = DirectoryCatalog::open(dir.path()).unwrap();

    // Two of the three positives sit on the cloud-masked row
    let points = supplied_points(&[(15.0, 15.0, 1), (15.0, 295.0, 1), (45.0, 295.0, 1)]);
    let config = PipelineConfig {
        clustering: KmeansParams { k: 2, ..Default::default() },
        ..config()
    };
    let result = AnomalyPipeline::new(config, &catalog, aoi()).with_points(points).run();

    assert!(matches!(
        result,
        Err(Error::InsufficientObservations { requested: 2, available: 1 })
    ));
}

#[test]
fn constant_anomaly_cannot_fill_default_clusters() {
    let dir = tempfile::tempdir().unwrap();
    write_catalog(dir.path(), &scenes_20_to_22());
    let catalog = DirectoryCatalog::open(dir.path()).unwrap();

    // Every positive sees the same 2 °C anomaly
    let points = supplied_points(&[(15.0, 15.0, 1), (45.0, 45.0, 1), (75.0, 75.0, 1), (105.0, 15.0, 1)]);
    let out = dir.path().join("out");
    let result = AnomalyPipeline::new(config(), &catalog, aoi())
        .with_points(points)
        .run()
        .and_then(|outputs| outputs.export(&out));

    assert!(matches!(
        result,
        Err(Error::InsufficientObservations { requested: 3, available: 1 })
    ));
    assert!(!out.exists());
}

//! # lstanom Core
//!
//! Core types, traits and I/O for the land-surface-temperature anomaly pipeline.
//!
//! This crate provides:
//! - `Raster<T>`: Generic georeferenced raster grid with no-data handling
//! - `GeoTransform` / `GridSpec`: Georeferencing and grid alignment
//! - `CRS`: Coordinate Reference System identification
//! - `Scene`: Multi-band satellite acquisitions with catalog metadata
//! - `AreaOfInterest` / `SamplePoint`: Vector inputs of the analysis
//! - I/O for GeoTIFF rasters, GeoJSON areas and CSV tables

pub mod crs;
pub mod error;
pub mod io;
pub mod raster;
pub mod scene;
pub mod vector;

pub use crs::CRS;
pub use error::{Error, Result};
pub use raster::{GeoTransform, GridSpec, Raster, RasterElement};
pub use scene::{Band, DateRange, MonthWindow, Scene, SceneMetadata, Sensor};
pub use vector::{AreaOfInterest, AttributeValue, ClipMode, SamplePoint};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::crs::CRS;
    pub use crate::error::{Error, Result};
    pub use crate::raster::{GeoTransform, GridSpec, Raster, RasterElement};
    pub use crate::scene::{Band, DateRange, MonthWindow, Scene, SceneMetadata, Sensor};
    pub use crate::vector::{AreaOfInterest, AttributeValue, ClipMode, SamplePoint};
    pub use crate::Algorithm;
}

/// Core trait for the pixel-wise stages of the pipeline.
///
/// Algorithms are pure functions that transform input data according to parameters.
pub trait Algorithm {
    /// Input type for the algorithm
    type Input;
    /// Output type for the algorithm
    type Output;
    /// Parameters controlling algorithm behavior
    type Params: Default;
    /// Error type for algorithm execution
    type Error: std::error::Error;

    /// Returns the algorithm name
    fn name(&self) -> &'static str;

    /// Returns a description of what the algorithm does
    fn description(&self) -> &'static str;

    /// Execute the algorithm
    fn execute(&self, input: Self::Input, params: Self::Params) -> std::result::Result<Self::Output, Self::Error>;

    /// Execute with default parameters
    fn execute_default(&self, input: Self::Input) -> std::result::Result<Self::Output, Self::Error> {
        self.execute(input, Self::Params::default())
    }
}

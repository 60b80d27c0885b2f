//! Error types for lstanom

use thiserror::Error;

/// Main error type for lstanom operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid raster dimensions: {width}x{height}")]
    InvalidDimensions { width: usize, height: usize },

    #[error("Index out of bounds: ({row}, {col}) in raster of size ({rows}, {cols})")]
    IndexOutOfBounds {
        row: usize,
        col: usize,
        rows: usize,
        cols: usize,
    },

    #[error("Raster size mismatch: expected ({er}, {ec}), got ({ar}, {ac})")]
    SizeMismatch { er: usize, ec: usize, ar: usize, ac: usize },

    #[error("Raster grids are not aligned: {0}")]
    GridMismatch(String),

    #[error("CRS mismatch: {0} vs {1}")]
    CrsMismatch(String, String),

    #[error("Unsupported data type: {0}")]
    UnsupportedDataType(String),

    #[error("Scene {scene} has no band named {band}")]
    MissingBand { scene: String, band: String },

    #[error("Invalid parameter: {name} = {value} ({reason})")]
    InvalidParameter {
        name: &'static str,
        value: String,
        reason: String,
    },

    #[error("Invalid date range: {start} is after {end}")]
    InvalidDateRange { start: String, end: String },

    #[error("Date ranges overlap: {first} and {second}")]
    OverlappingDateRanges { first: String, second: String },

    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    #[error("Insufficient observations for requested cluster count: {requested} clusters, {available} observations")]
    InsufficientObservations { requested: usize, available: usize },

    #[error("Catalog error: {0}")]
    Catalog(String),

    #[error("Vector data error: {0}")]
    Vector(String),

    #[error("Table error: {0}")]
    Table(#[from] csv::Error),

    #[error("Algorithm error: {0}")]
    Algorithm(String),

    #[error("{0}")]
    Other(String),
}

/// Result type alias for lstanom operations
pub type Result<T> = std::result::Result<T, Error>;

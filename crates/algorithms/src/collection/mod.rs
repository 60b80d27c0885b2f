//! Scene collections
//!
//! - **catalog**: The `SceneCatalog` interface and an in-memory catalog
//! - **directory**: Catalog backed by a manifest CSV and GeoTIFF bands
//! - **policy**: Which sensors are queried for a date range
//! - **builder**: Merged, filtered and capped time series across ranges

mod builder;
mod catalog;
mod directory;
mod policy;

pub use builder::{
    CollectionBuilder, CollectionReport, CollectionRequest, EmptyQuery, FailedQuery,
    SceneCollection, Truncation,
};
pub use catalog::{MemoryCatalog, SceneCatalog};
pub use directory::{DirectoryCatalog, MANIFEST_FILE};
pub use policy::{RangeSpec, SensorPolicy, SensorRule};

//! I/O for rasters, areas of interest and tabular data
//!
//! - GeoTIFF rasters through the `tiff` crate
//! - Area of interest polygons from GeoJSON
//! - Sample points and result tables as CSV

mod aoi;
mod geotiff;
mod table;

pub use aoi::{read_aoi_geojson, parse_aoi_geojson};
pub use geotiff::{read_geotiff, write_geotiff, GeoTiffOptions};
pub use table::{read_sample_points, write_table};

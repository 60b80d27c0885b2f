//! Grid specification shared by all rasters of one analysis

use crate::crs::{self, CRS};
use crate::error::{Error, Result};
use crate::raster::GeoTransform;
use serde::{Deserialize, Serialize};

/// Shape, georeferencing and CRS of a raster grid.
///
/// Two rasters can only be combined pixel by pixel when their grid
/// specifications match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridSpec {
    pub rows: usize,
    pub cols: usize,
    pub transform: GeoTransform,
    pub crs: Option<CRS>,
}

impl GridSpec {
    pub fn new(rows: usize, cols: usize, transform: GeoTransform, crs: Option<CRS>) -> Self {
        Self {
            rows,
            cols,
            transform,
            crs,
        }
    }

    /// North-up grid covering `(min_x, min_y, max_x, max_y)` with square cells.
    ///
    /// The grid is anchored at the upper-left corner of the extent; partial
    /// cells on the right and bottom edges are included.
    pub fn from_extent(
        extent: (f64, f64, f64, f64),
        resolution: f64,
        crs: Option<CRS>,
    ) -> Result<Self> {
        let (min_x, min_y, max_x, max_y) = extent;
        if !(resolution.is_finite() && resolution > 0.0) {
            return Err(Error::InvalidParameter {
                name: "resolution",
                value: resolution.to_string(),
                reason: "must be a positive number".into(),
            });
        }
        if !(max_x > min_x && max_y > min_y) {
            return Err(Error::InvalidParameter {
                name: "extent",
                value: format!("({min_x}, {min_y}, {max_x}, {max_y})"),
                reason: "extent must have positive width and height".into(),
            });
        }

        let cols = ((max_x - min_x) / resolution).ceil() as usize;
        let rows = ((max_y - min_y) / resolution).ceil() as usize;

        Ok(Self::new(
            rows.max(1),
            cols.max(1),
            GeoTransform::north_up(min_x, max_y, resolution),
            crs,
        ))
    }

    /// Dimensions as (rows, cols)
    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    /// Total number of cells
    pub fn len(&self) -> usize {
        self.rows * self.cols
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Cell size in map units
    pub fn resolution(&self) -> f64 {
        self.transform.cell_size()
    }

    /// Extent as (min_x, min_y, max_x, max_y)
    pub fn bounds(&self) -> (f64, f64, f64, f64) {
        self.transform.bounds(self.cols, self.rows)
    }

    /// Center of the cell at (row, col)
    pub fn cell_center(&self, row: usize, col: usize) -> (f64, f64) {
        self.transform.pixel_to_geo(col, row)
    }

    /// Cell containing the map coordinate, if any
    pub fn cell_at(&self, x: f64, y: f64) -> Option<(usize, usize)> {
        let (col, row) = self.transform.geo_to_pixel(x, y);
        if !(col.is_finite() && row.is_finite()) || col < 0.0 || row < 0.0 {
            return None;
        }
        let (row, col) = (row.floor() as usize, col.floor() as usize);
        (row < self.rows && col < self.cols).then_some((row, col))
    }

    /// Whether both grids share shape, lattice and CRS
    pub fn matches(&self, other: &GridSpec) -> bool {
        self.shape() == other.shape()
            && self.transform.approx_eq(&other.transform)
            && crs::compatible(self.crs.as_ref(), other.crs.as_ref())
    }

    /// Fail with a descriptive error unless both grids match
    pub fn ensure_matches(&self, other: &GridSpec) -> Result<()> {
        if self.shape() != other.shape() {
            return Err(Error::SizeMismatch {
                er: self.rows,
                ec: self.cols,
                ar: other.rows,
                ac: other.cols,
            });
        }
        if !crs::compatible(self.crs.as_ref(), other.crs.as_ref()) {
            return Err(Error::CrsMismatch(
                self.crs.as_ref().map(|c| c.identifier()).unwrap_or_default(),
                other.crs.as_ref().map(|c| c.identifier()).unwrap_or_default(),
            ));
        }
        if !self.transform.approx_eq(&other.transform) {
            return Err(Error::GridMismatch(format!(
                "transform {:?} differs from {:?}",
                self.transform, other.transform
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_extent_rounds_up_partial_cells() {
        let spec = GridSpec::from_extent((0.0, 0.0, 95.0, 60.0), 30.0, None).unwrap();
        assert_eq!(spec.shape(), (2, 4));
        assert_eq!(spec.transform.origin_y, 60.0);
    }

    #[test]
    fn test_from_extent_rejects_bad_resolution() {
        assert!(GridSpec::from_extent((0.0, 0.0, 10.0, 10.0), 0.0, None).is_err());
        assert!(GridSpec::from_extent((0.0, 0.0, 0.0, 10.0), 1.0, None).is_err());
    }

    #[test]
    fn test_cell_at() {
        let spec = GridSpec::from_extent((0.0, 0.0, 90.0, 90.0), 30.0, None).unwrap();
        assert_eq!(spec.cell_at(5.0, 85.0), Some((0, 0)));
        assert_eq!(spec.cell_at(89.0, 1.0), Some((2, 2)));
        assert_eq!(spec.cell_at(-1.0, 50.0), None);
        assert_eq!(spec.cell_at(50.0, 91.0), None);
    }

    #[test]
    fn test_matches_detects_crs_difference() {
        let a = GridSpec::from_extent((0.0, 0.0, 90.0, 90.0), 30.0, Some(CRS::utm(32, true)))
            .unwrap();
        let mut b = a.clone();
        assert!(a.matches(&b));
        b.crs = Some(CRS::utm(33, true));
        assert!(!a.matches(&b));
        assert!(matches!(a.ensure_matches(&b), Err(Error::CrsMismatch(_, _))));
    }
}

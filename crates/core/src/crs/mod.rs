//! Coordinate Reference System handling
//!
//! The pipeline never reprojects: scenes, the area of interest and the sample
//! points must share one projected CRS. This type only identifies a CRS well
//! enough to detect when two grids disagree.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Coordinate Reference System representation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CRS {
    /// WKT representation
    wkt: Option<String>,
    /// EPSG code if known
    epsg: Option<u32>,
}

impl CRS {
    /// Create a CRS from an EPSG code
    pub fn from_epsg(code: u32) -> Self {
        Self {
            wkt: None,
            epsg: Some(code),
        }
    }

    /// Create a CRS from a WKT string
    pub fn from_wkt(wkt: impl Into<String>) -> Self {
        Self {
            wkt: Some(wkt.into()),
            epsg: None,
        }
    }

    /// UTM zone CRS on WGS84 (EPSG 326xx north, 327xx south)
    pub fn utm(zone: u32, north: bool) -> Self {
        let base = if north { 32600 } else { 32700 };
        Self::from_epsg(base + zone)
    }

    /// Get EPSG code if known
    pub fn epsg(&self) -> Option<u32> {
        self.epsg
    }

    /// Get WKT representation
    pub fn wkt(&self) -> Option<&str> {
        self.wkt.as_deref()
    }

    /// Check if two CRS are equivalent
    pub fn is_equivalent(&self, other: &CRS) -> bool {
        if let (Some(a), Some(b)) = (self.epsg, other.epsg) {
            return a == b;
        }

        // Textual comparison only; no WKT normalization
        if let (Some(a), Some(b)) = (&self.wkt, &other.wkt) {
            return a == b;
        }

        false
    }

    /// Get a string identifier for this CRS
    pub fn identifier(&self) -> String {
        if let Some(code) = self.epsg {
            return format!("EPSG:{}", code);
        }
        if let Some(wkt) = &self.wkt {
            return format!("WKT:{}", &wkt[..wkt.len().min(50)]);
        }
        "Unknown".to_string()
    }
}

impl fmt::Display for CRS {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.identifier())
    }
}

/// Whether two optional CRS values may be combined in one pixel-wise operation.
///
/// A missing CRS on either side is accepted: synthetic and test rasters are
/// usually built without one.
pub fn compatible(a: Option<&CRS>, b: Option<&CRS>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => a.is_equivalent(b),
        _ => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_crs_epsg() {
        let crs = CRS::from_epsg(32632);
        assert_eq!(crs.epsg(), Some(32632));
        assert_eq!(crs.identifier(), "EPSG:32632");
    }

    #[test]
    fn test_utm_zone_codes() {
        assert!(CRS::utm(32, true).is_equivalent(&CRS::from_epsg(32632)));
        assert_eq!(CRS::utm(19, false).epsg(), Some(32719));
    }

    #[test]
    fn test_compatible_with_missing_crs() {
        let a = CRS::utm(32, true);
        let b = CRS::utm(33, true);
        assert!(compatible(Some(&a), None));
        assert!(compatible(None, None));
        assert!(!compatible(Some(&a), Some(&b)));
    }
}

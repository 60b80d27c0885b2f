//! Vector inputs: the area of interest and sample points

use crate::error::{Error, Result};
use geo::{BoundingRect, Contains};
use geo_types::{Coord, MultiPolygon, Point, Polygon, Rect};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Attribute value types
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
}

impl AttributeValue {
    /// Parse a table cell, preferring numbers over text
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        if raw.is_empty() {
            AttributeValue::Null
        } else if let Ok(i) = raw.parse::<i64>() {
            AttributeValue::Int(i)
        } else if let Ok(f) = raw.parse::<f64>() {
            AttributeValue::Float(f)
        } else if let Ok(b) = raw.parse::<bool>() {
            AttributeValue::Bool(b)
        } else {
            AttributeValue::String(raw.to_string())
        }
    }

    /// Numeric view of the value
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            AttributeValue::Int(i) => Some(*i as f64),
            AttributeValue::Float(f) => Some(*f),
            AttributeValue::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            AttributeValue::Null | AttributeValue::String(_) => None,
        }
    }
}

impl fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttributeValue::Null => Ok(()),
            AttributeValue::Bool(b) => write!(f, "{b}"),
            AttributeValue::Int(i) => write!(f, "{i}"),
            AttributeValue::Float(v) => write!(f, "{v}"),
            AttributeValue::String(s) => f.write_str(s),
        }
    }
}

/// A point location with attributes.
///
/// Random points carry a generated id; supplied points carry the attribute
/// columns of their input table (e.g. a laboratory test result).
#[derive(Debug, Clone, PartialEq)]
pub struct SamplePoint {
    pub id: String,
    pub x: f64,
    pub y: f64,
    pub properties: BTreeMap<String, AttributeValue>,
}

impl SamplePoint {
    pub fn new(id: impl Into<String>, x: f64, y: f64) -> Self {
        Self {
            id: id.into(),
            x,
            y,
            properties: BTreeMap::new(),
        }
    }

    /// Set an attribute
    pub fn set_property(&mut self, key: impl Into<String>, value: AttributeValue) {
        self.properties.insert(key.into(), value);
    }

    /// Builder-style variant of [`SamplePoint::set_property`]
    pub fn with_property(mut self, key: impl Into<String>, value: AttributeValue) -> Self {
        self.set_property(key, value);
        self
    }

    /// Get an attribute
    pub fn get_property(&self, key: &str) -> Option<&AttributeValue> {
        self.properties.get(key)
    }

    pub fn point(&self) -> Point<f64> {
        Point::new(self.x, self.y)
    }
}

/// How rasters are clipped to the area of interest
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClipMode {
    /// Keep every cell of the bounding rectangle
    #[default]
    Extent,
    /// Keep only cells whose center lies inside the polygons
    Polygon,
}

/// The fixed spatial extent bounding the whole analysis.
#[derive(Debug, Clone, PartialEq)]
pub struct AreaOfInterest {
    geometry: MultiPolygon<f64>,
    extent: Rect<f64>,
}

impl AreaOfInterest {
    pub fn new(geometry: MultiPolygon<f64>) -> Result<Self> {
        let extent = geometry
            .bounding_rect()
            .ok_or_else(|| Error::Vector("area of interest has no polygons".into()))?;
        if extent.width() <= 0.0 || extent.height() <= 0.0 {
            return Err(Error::Vector("area of interest has zero area".into()));
        }
        Ok(Self { geometry, extent })
    }

    /// Rectangular area of interest
    pub fn from_bounds(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Result<Self> {
        let rect = Rect::new(Coord { x: min_x, y: min_y }, Coord { x: max_x, y: max_y });
        Self::new(MultiPolygon::new(vec![rect.to_polygon()]))
    }

    pub fn from_polygon(polygon: Polygon<f64>) -> Result<Self> {
        Self::new(MultiPolygon::new(vec![polygon]))
    }

    pub fn geometry(&self) -> &MultiPolygon<f64> {
        &self.geometry
    }

    /// Bounding rectangle as (min_x, min_y, max_x, max_y)
    pub fn bounds(&self) -> (f64, f64, f64, f64) {
        let (min, max) = (self.extent.min(), self.extent.max());
        (min.x, min.y, max.x, max.y)
    }

    /// Whether the coordinate lies inside the area for the given clip mode
    pub fn contains(&self, x: f64, y: f64, mode: ClipMode) -> bool {
        match mode {
            ClipMode::Extent => {
                let (min_x, min_y, max_x, max_y) = self.bounds();
                x >= min_x && x <= max_x && y >= min_y && y <= max_y
            }
            ClipMode::Polygon => self.geometry.contains(&Point::new(x, y)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo_types::polygon;

    #[test]
    fn test_attribute_parsing() {
        assert_eq!(AttributeValue::parse("1"), AttributeValue::Int(1));
        assert_eq!(AttributeValue::parse("0.5"), AttributeValue::Float(0.5));
        assert_eq!(AttributeValue::parse(""), AttributeValue::Null);
        assert_eq!(AttributeValue::parse("bovine"), AttributeValue::String("bovine".into()));
        assert_eq!(AttributeValue::parse("true").as_f64(), Some(1.0));
    }

    #[test]
    fn test_aoi_contains_by_mode() {
        let triangle = polygon![(x: 0.0, y: 0.0), (x: 100.0, y: 0.0), (x: 0.0, y: 100.0)];
        let aoi = AreaOfInterest::from_polygon(triangle).unwrap();

        assert_eq!(aoi.bounds(), (0.0, 0.0, 100.0, 100.0));
        assert!(aoi.contains(90.0, 90.0, ClipMode::Extent));
        assert!(!aoi.contains(90.0, 90.0, ClipMode::Polygon));
        assert!(aoi.contains(10.0, 10.0, ClipMode::Polygon));
    }

    #[test]
    fn test_degenerate_aoi_rejected() {
        assert!(AreaOfInterest::from_bounds(0.0, 0.0, 0.0, 10.0).is_err());
        assert!(AreaOfInterest::new(MultiPolygon::new(vec![])).is_err());
    }
}

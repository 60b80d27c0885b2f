//! Area of interest from GeoJSON

use crate::error::{Error, Result};
use crate::vector::AreaOfInterest;
use geo::Intersects;
use geo_types::{Geometry, MultiPolygon, Point, Polygon};
use geojson::GeoJson;
use std::path::Path;

/// Read an area of interest from a GeoJSON file.
///
/// Accepts a bare geometry, a feature, or a feature collection. Polygon and
/// multi-polygon geometries are kept; other geometry types are ignored. When
/// `select_point` is given, only features intersecting that point are used
/// (e.g. one administrative unit out of a regional layer).
pub fn read_aoi_geojson<P: AsRef<Path>>(path: P, select_point: Option<(f64, f64)>) -> Result<AreaOfInterest> {
    let text = std::fs::read_to_string(path.as_ref())?;
    parse_aoi_geojson(&text, select_point)
}

/// Parse an area of interest from GeoJSON text
pub fn parse_aoi_geojson(text: &str, select_point: Option<(f64, f64)>) -> Result<AreaOfInterest> {
    let geojson: GeoJson = text
        .parse()
        .map_err(|e: geojson::Error| Error::Vector(format!("invalid GeoJSON: {e}")))?;

    let geometries: Vec<geojson::Geometry> = match geojson {
        GeoJson::Geometry(g) => vec![g],
        GeoJson::Feature(f) => f.geometry.into_iter().collect(),
        GeoJson::FeatureCollection(fc) => fc.features.into_iter().filter_map(|f| f.geometry).collect(),
    };

    let mut polygons: Vec<Polygon<f64>> = Vec::new();
    for geometry in geometries {
        let geometry = Geometry::<f64>::try_from(geometry)
            .map_err(|e| Error::Vector(format!("unsupported geometry: {e}")))?;
        let parts = match geometry {
            Geometry::Polygon(p) => MultiPolygon::new(vec![p]),
            Geometry::MultiPolygon(mp) => mp,
            _ => continue,
        };
        if let Some((x, y)) = select_point {
            if !parts.intersects(&Point::new(x, y)) {
                continue;
            }
        }
        polygons.extend(parts.0);
    }

    if polygons.is_empty() {
        return Err(Error::Vector(match select_point {
            Some((x, y)) => format!("no polygon of the area of interest contains ({x}, {y})"),
            None => "no polygon geometry found in GeoJSON".into(),
        }));
    }

    AreaOfInterest::new(MultiPolygon::new(polygons))
}

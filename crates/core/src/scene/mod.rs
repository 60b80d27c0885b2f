/*! Satellite scenes, sensors and acquisition time windows. */

mod time;

pub use time::{ensure_disjoint, parse_date, DateRange, MonthWindow};

use crate::error::{Error, Result};
use crate::raster::{GridSpec, Raster};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Name of the land-surface-temperature band (Kelvin).
pub const LST_BAND: &str = "LST";

/// Name of the packed per-pixel quality band.
pub const QA_BAND: &str = "QA_PIXEL";

/// The Landsat missions carrying a thermal instrument used for LST.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Sensor {
    /// Landsat 5 TM
    L5,
    /// Landsat 7 ETM+
    L7,
    /// Landsat 8 OLI/TIRS
    L8,
    /// Landsat 9 OLI-2/TIRS-2
    L9,
}

impl Sensor {
    pub const ALL: [Sensor; 4] = [Sensor::L5, Sensor::L7, Sensor::L8, Sensor::L9];

    /// Short identifier used in catalogs and configuration files.
    pub fn name(&self) -> &'static str {
        use Sensor::*;

        match self {
            L5 => "L5",
            L7 => "L7",
            L8 => "L8",
            L9 => "L9",
        }
    }
}

impl fmt::Display for Sensor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Sensor {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let upper = s.trim().to_ascii_uppercase();
        let key = upper
            .strip_prefix("LANDSAT")
            .map(|rest| format!("L{}", rest.trim_start_matches(['_', '-', ' '])))
            .unwrap_or(upper);
        Sensor::ALL
            .into_iter()
            .find(|sensor| sensor.name() == key)
            .ok_or_else(|| Error::InvalidParameter {
                name: "sensor",
                value: s.to_string(),
                reason: "expected one of L5, L7, L8, L9".into(),
            })
    }
}

/// Catalog metadata of a single acquisition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneMetadata {
    /// Unique scene identifier
    pub id: String,
    pub sensor: Sensor,
    /// Acquisition date (UTC)
    pub acquired: NaiveDate,
    /// Scene-level cloud cover in percent
    pub cloud_cover: f64,
    /// Footprint as (min_x, min_y, max_x, max_y), when known
    pub footprint: Option<(f64, f64, f64, f64)>,
}

impl SceneMetadata {
    pub fn new(id: impl Into<String>, sensor: Sensor, acquired: NaiveDate, cloud_cover: f64) -> Self {
        Self {
            id: id.into(),
            sensor,
            acquired,
            cloud_cover,
            footprint: None,
        }
    }

    /// Whether the footprint intersects the extent. Unknown footprints match.
    pub fn intersects(&self, extent: (f64, f64, f64, f64)) -> bool {
        match self.footprint {
            Some((min_x, min_y, max_x, max_y)) => {
                min_x <= extent.2 && max_x >= extent.0 && min_y <= extent.3 && max_y >= extent.1
            }
            None => true,
        }
    }
}

/// One band of a scene.
#[derive(Debug, Clone)]
pub enum Band {
    /// Physical quantity, e.g. temperature in Kelvin
    Continuous(Raster<f64>),
    /// Packed quality bitfield
    Bitfield(Raster<u16>),
}

impl Band {
    pub fn grid_spec(&self) -> GridSpec {
        match self {
            Band::Continuous(r) => r.grid_spec(),
            Band::Bitfield(r) => r.grid_spec(),
        }
    }
}

/// A multi-band acquisition together with its catalog metadata.
#[derive(Debug, Clone)]
pub struct Scene {
    pub metadata: SceneMetadata,
    bands: BTreeMap<String, Band>,
    quality_masked: bool,
}

impl Scene {
    pub fn new(metadata: SceneMetadata) -> Self {
        Self {
            metadata,
            bands: BTreeMap::new(),
            quality_masked: false,
        }
    }

    /// Scene with a Kelvin LST band and its QA bitfield
    pub fn with_lst_and_qa(metadata: SceneMetadata, lst: Raster<f64>, qa: Raster<u16>) -> Self {
        Self::new(metadata)
            .with_band(LST_BAND, Band::Continuous(lst))
            .with_band(QA_BAND, Band::Bitfield(qa))
    }

    pub fn with_band(mut self, name: impl Into<String>, band: Band) -> Self {
        self.bands.insert(name.into(), band);
        self
    }

    pub fn id(&self) -> &str {
        &self.metadata.id
    }

    pub fn band(&self, name: &str) -> Option<&Band> {
        self.bands.get(name)
    }

    pub fn band_names(&self) -> impl Iterator<Item = &str> {
        self.bands.keys().map(String::as_str)
    }

    /// Continuous band by name
    pub fn continuous(&self, name: &str) -> Result<&Raster<f64>> {
        match self.bands.get(name) {
            Some(Band::Continuous(r)) => Ok(r),
            Some(Band::Bitfield(_)) => Err(Error::UnsupportedDataType(format!(
                "band {name} of scene {} is a bitfield",
                self.id()
            ))),
            None => Err(self.missing(name)),
        }
    }

    /// Bitfield band by name
    pub fn bitfield(&self, name: &str) -> Result<&Raster<u16>> {
        match self.bands.get(name) {
            Some(Band::Bitfield(r)) => Ok(r),
            Some(Band::Continuous(_)) => Err(Error::UnsupportedDataType(format!(
                "band {name} of scene {} is not a bitfield",
                self.id()
            ))),
            None => Err(self.missing(name)),
        }
    }

    /// The land-surface-temperature band
    pub fn lst(&self) -> Result<&Raster<f64>> {
        self.continuous(LST_BAND)
    }

    /// Whether the cloud/quality mask has been applied
    pub fn is_quality_masked(&self) -> bool {
        self.quality_masked
    }

    /// Scene carrying only a masked LST band
    pub fn masked_lst(metadata: SceneMetadata, lst: Raster<f64>) -> Self {
        Self {
            metadata,
            bands: BTreeMap::from([(LST_BAND.to_string(), Band::Continuous(lst))]),
            quality_masked: true,
        }
    }

    fn missing(&self, band: &str) -> Error {
        Error::MissingBand {
            scene: self.id().to_string(),
            band: band.to_string(),
        }
    }
}

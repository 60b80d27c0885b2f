//! Cloud and quality masking from the QA_PIXEL bitfield
//!
//! A pixel is discarded when any of the dilated-cloud, cirrus, cloud or
//! cloud-shadow bits is set, or when the QA band itself is no-data.

use crate::maybe_rayon::*;
use lstanom_core::scene::{Scene, QA_BAND};
use lstanom_core::{Algorithm, Error, Raster, Result};
use serde::{Deserialize, Serialize};

/// Bit positions of the quality flags in the QA band.
///
/// Defaults follow the Landsat Collection 2 QA_PIXEL layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QaBits {
    pub dilated_cloud: u8,
    pub cirrus: u8,
    pub cloud: u8,
    pub cloud_shadow: u8,
}

impl Default for QaBits {
    fn default() -> Self {
        Self {
            dilated_cloud: 1,
            cirrus: 2,
            cloud: 3,
            cloud_shadow: 4,
        }
    }
}

impl QaBits {
    /// Positions must fit a 16-bit band and name four different bits
    pub fn validate(&self) -> Result<()> {
        let bits = [
            ("qa_bits.dilated_cloud", self.dilated_cloud),
            ("qa_bits.cirrus", self.cirrus),
            ("qa_bits.cloud", self.cloud),
            ("qa_bits.cloud_shadow", self.cloud_shadow),
        ];
        for (i, &(name, bit)) in bits.iter().enumerate() {
            if bit >= 16 {
                return Err(Error::InvalidParameter {
                    name,
                    value: bit.to_string(),
                    reason: "bit position must be below 16".into(),
                });
            }
            if let Some(&(other, _)) = bits[..i].iter().find(|&&(_, b)| b == bit) {
                return Err(Error::InvalidParameter {
                    name,
                    value: bit.to_string(),
                    reason: format!("same bit as {other}"),
                });
            }
        }
        Ok(())
    }

    /// Combined mask of all rejected bits
    pub fn mask(&self) -> u16 {
        [self.dilated_cloud, self.cirrus, self.cloud, self.cloud_shadow]
            .into_iter()
            .fold(0u16, |acc, bit| acc | (1u16 << bit))
    }
}

/// Set LST pixels to no-data (NaN) wherever a rejected QA bit is set.
///
/// Both rasters must lie on the same grid. Applying the mask twice gives the
/// same result as applying it once.
pub fn mask_lst(lst: &Raster<f64>, qa: &Raster<u16>, bits: &QaBits) -> Result<Raster<f64>> {
    lst.ensure_aligned(qa)?;
    bits.validate()?;

    let (rows, cols) = lst.shape();
    let reject = bits.mask();

    let data: Vec<f64> = (0..rows)
        .into_par_iter()
        .flat_map(|row| {
            let mut row_data = vec![f64::NAN; cols];
            for col in 0..cols {
                let v = unsafe { lst.get_unchecked(row, col) };
                let flags = unsafe { qa.get_unchecked(row, col) };
                if lst.is_nodata(v) || qa.is_nodata(flags) || flags & reject != 0 {
                    continue;
                }
                row_data[col] = v;
            }
            row_data
        })
        .collect();

    let mut output = lst.with_data(data)?;
    output.set_nodata(Some(f64::NAN));
    Ok(output)
}

/// Mask a scene, keeping only its LST band.
///
/// A scene that is already masked is returned unchanged.
pub fn mask_scene(scene: Scene, bits: &QaBits) -> Result<Scene> {
    if scene.is_quality_masked() {
        return Ok(scene);
    }
    let masked = mask_lst(scene.lst()?, scene.bitfield(QA_BAND)?, bits)?;
    Ok(Scene::masked_lst(scene.metadata, masked))
}

/// Cloud/quality masking as a pipeline stage
#[derive(Debug, Clone, Copy, Default)]
pub struct CloudMask;

impl Algorithm for CloudMask {
    type Input = Scene;
    type Output = Scene;
    type Params = QaBits;
    type Error = Error;

    fn name(&self) -> &'static str {
        "CloudMask"
    }

    fn description(&self) -> &'static str {
        "Mask cloud, cloud shadow, dilated cloud and cirrus pixels of the LST band"
    }

    fn execute(&self, input: Scene, params: QaBits) -> Result<Scene> {
        mask_scene(input, &params)
    }
}

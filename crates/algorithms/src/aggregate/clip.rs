//! Clipping rasters to the area of interest

use crate::maybe_rayon::*;
use lstanom_core::{AreaOfInterest, ClipMode, Raster, RasterElement, Result};

/// Set every cell whose center lies outside the area of interest to no-data.
///
/// Float rasters use NaN; integer rasters use their no-data value, or
/// `T::default_nodata()` which then becomes the raster's no-data value.
pub fn clip_to_aoi<T: RasterElement>(
    raster: &Raster<T>,
    aoi: &AreaOfInterest,
    mode: ClipMode,
) -> Result<Raster<T>> {
    let fill = if T::is_float() {
        T::default_nodata()
    } else {
        raster.nodata().unwrap_or_else(T::default_nodata)
    };
    let (rows, cols) = raster.shape();
    let grid = raster.grid_spec();

    let data: Vec<T> = (0..rows)
        .into_par_iter()
        .flat_map(|row| {
            let mut row_data = vec![fill; cols];
            for col in 0..cols {
                let (x, y) = grid.cell_center(row, col);
                if aoi.contains(x, y, mode) {
                    row_data[col] = unsafe { raster.get_unchecked(row, col) };
                }
            }
            row_data
        })
        .collect();

    let mut output = raster.with_data(data)?;
    output.set_nodata(Some(fill));
    Ok(output)
}

//! Nearest-neighbour resampling onto a target grid

use crate::raster::{GridSpec, Raster, RasterElement};

/// Resample `src` onto `grid` by nearest neighbour.
///
/// Each target cell takes the source cell containing its center. Target
/// cells outside the source extent become no-data: NaN for float rasters,
/// the source no-data value (or `T::default_nodata()`) for integer rasters.
/// When `src` already lies on `grid` a copy is returned unchanged.
pub fn resample_nearest<T: RasterElement>(src: &Raster<T>, grid: &GridSpec) -> Raster<T> {
    if src.grid_spec().matches(grid) {
        return src.clone();
    }

    let fill = if T::is_float() {
        T::default_nodata()
    } else {
        src.nodata().unwrap_or_else(T::default_nodata)
    };

    let src_grid = src.grid_spec();
    let mut out = Raster::from_grid(grid, fill);
    out.set_nodata(if T::is_float() { src.nodata() } else { Some(fill) });

    let view = src.view();
    for ((row, col), cell) in out.data_mut().indexed_iter_mut() {
        let (x, y) = grid.cell_center(row, col);
        if let Some((sr, sc)) = src_grid.cell_at(x, y) {
            *cell = view[(sr, sc)];
        }
    }

    out
}

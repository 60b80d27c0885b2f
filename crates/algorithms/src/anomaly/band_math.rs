//! Pixel-wise raster algebra
//!
//! No-data in any input produces no-data (NaN) in the output.

use crate::maybe_rayon::*;
use lstanom_core::{Raster, Result};

/// Binary operations for band math
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BandMathOp {
    Subtract,
    /// Division; cells with a divisor within 1e-10 of zero become no-data
    Divide,
}

/// Divisors closer to zero than this are treated as zero
pub const DIVISION_EPSILON: f64 = 1e-10;

/// Apply a unary function to every valid cell of a raster.
pub fn band_math<F>(raster: &Raster<f64>, f: F) -> Result<Raster<f64>>
where
    F: Fn(f64) -> f64 + Sync + Send,
{
    let (rows, cols) = raster.shape();

    let data: Vec<f64> = (0..rows)
        .into_par_iter()
        .flat_map(|row| {
            let mut row_data = vec![f64::NAN; cols];
            for col in 0..cols {
                let val = unsafe { raster.get_unchecked(row, col) };
                if raster.is_nodata(val) {
                    continue;
                }
                row_data[col] = f(val);
            }
            row_data
        })
        .collect();

    let mut output = raster.with_data(data)?;
    output.set_nodata(Some(f64::NAN));
    Ok(output)
}

/// Apply a binary operation between two aligned rasters.
///
/// Fails with a size, CRS or grid mismatch error unless both rasters lie on
/// the same grid.
pub fn band_math_binary(a: &Raster<f64>, b: &Raster<f64>, op: BandMathOp) -> Result<Raster<f64>> {
    a.ensure_aligned(b)?;
    let (rows, cols) = a.shape();

    let data: Vec<f64> = (0..rows)
        .into_par_iter()
        .flat_map(|row| {
            let mut row_data = vec![f64::NAN; cols];
            for col in 0..cols {
                let va = unsafe { a.get_unchecked(row, col) };
                let vb = unsafe { b.get_unchecked(row, col) };
                if a.is_nodata(va) || b.is_nodata(vb) {
                    continue;
                }

                row_data[col] = match op {
                    BandMathOp::Subtract => va - vb,
                    BandMathOp::Divide => {
                        if vb.abs() < DIVISION_EPSILON {
                            f64::NAN
                        } else {
                            va / vb
                        }
                    }
                };
            }
            row_data
        })
        .collect();

    let mut output = a.with_data(data)?;
    output.set_nodata(Some(f64::NAN));
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use lstanom_core::GeoTransform;

    fn make_band(value: f64) -> Raster<f64> {
        let mut r = Raster::filled(5, 5, value);
        r.set_transform(GeoTransform::new(0.0, 5.0, 1.0, -1.0));
        r
    }

    #[test]
    fn test_band_math_preserves_nan() {
        let mut input = make_band(300.0);
        input.set(2, 2, f64::NAN).unwrap();

        let result = band_math(&input, |v| v - 273.15).unwrap();
        assert!(result.get(2, 2).unwrap().is_nan());
        assert!((result.get(0, 0).unwrap() - 26.85).abs() < 1e-10);
    }

    #[test]
    fn test_explicit_nodata_value_respected() {
        let mut input = make_band(300.0);
        input.set_nodata(Some(0.0));
        input.set(1, 1, 0.0).unwrap();

        let result = band_math(&input, |v| v * 2.0).unwrap();
        assert!(result.get(1, 1).unwrap().is_nan());
    }

    #[test]
    fn test_divide_by_zero_is_nodata() {
        let a = make_band(10.0);
        let mut b = make_band(4.0);
        b.set(0, 0, 0.0).unwrap();
        b.set(0, 1, 1e-12).unwrap();

        let result = band_math_binary(&a, &b, BandMathOp::Divide).unwrap();
        assert!((result.get(2, 2).unwrap() - 2.5).abs() < 1e-10);
        assert!(result.get(0, 0).unwrap().is_nan());
        assert!(result.get(0, 1).unwrap().is_nan());
        assert!(result.data().iter().all(|v| !v.is_infinite()));
    }

    #[test]
    fn test_misaligned_rasters_rejected() {
        let a = make_band(1.0);
        let mut b = make_band(1.0);
        b.set_transform(GeoTransform::new(30.0, 5.0, 1.0, -1.0));
        assert!(band_math_binary(&a, &b, BandMathOp::Subtract).is_err());
        assert!(band_math_binary(&a, &Raster::filled(4, 5, 1.0), BandMathOp::Subtract).is_err());
    }
}

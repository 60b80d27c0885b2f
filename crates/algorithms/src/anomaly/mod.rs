//! Anomaly rasters
//!
//! - **absolute**: target minus historical mean, in °C
//! - **percentage**: absolute anomaly relative to the historical mean, in %

mod band_math;

pub use band_math::{band_math, band_math_binary, BandMathOp, DIVISION_EPSILON};

use lstanom_core::{Raster, Result};

/// Absolute anomaly: `target - historical`.
///
/// No-data where either input is no-data.
pub fn absolute_anomaly(target: &Raster<f64>, historical: &Raster<f64>) -> Result<Raster<f64>> {
    band_math_binary(target, historical, BandMathOp::Subtract)
}

/// Percentage anomaly: `absolute / historical * 100`.
///
/// No-data where the historical mean is no-data or zero; never infinite.
pub fn percentage_anomaly(absolute: &Raster<f64>, historical: &Raster<f64>) -> Result<Raster<f64>> {
    let ratio = band_math_binary(absolute, historical, BandMathOp::Divide)?;
    band_math(&ratio, |r| r * 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_constant_inputs() {
        let historical = Raster::filled(4, 4, 20.0);
        let target = Raster::filled(4, 4, 22.0);

        let abs = absolute_anomaly(&target, &historical).unwrap();
        let pct = percentage_anomaly(&abs, &historical).unwrap();

        assert_relative_eq!(abs.get(3, 3).unwrap(), 2.0, epsilon = 1e-12);
        assert_relative_eq!(pct.get(0, 0).unwrap(), 10.0, epsilon = 1e-9);
    }

    #[test]
    fn test_zero_historical_mean_is_nodata() {
        let mut historical = Raster::filled(2, 2, 20.0);
        historical.set(0, 0, 0.0).unwrap();
        historical.set(0, 1, f64::NAN).unwrap();
        let target = Raster::filled(2, 2, 1.0);

        let abs = absolute_anomaly(&target, &historical).unwrap();
        let pct = percentage_anomaly(&abs, &historical).unwrap();

        assert_eq!(abs.get(0, 0).unwrap(), 1.0);
        assert!(pct.get(0, 0).unwrap().is_nan());
        assert!(abs.get(0, 1).unwrap().is_nan());
        assert!(pct.get(0, 1).unwrap().is_nan());
        assert_relative_eq!(pct.get(1, 1).unwrap(), -95.0, epsilon = 1e-9);
    }
}

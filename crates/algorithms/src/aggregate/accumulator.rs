//! Running per-pixel sum and count

use lstanom_core::{GridSpec, Raster, Result};
use ndarray::{Array2, Zip};

/// Accumulates valid observations on a fixed grid.
#[derive(Debug, Clone)]
pub struct MeanAccumulator {
    grid: GridSpec,
    sum: Array2<f64>,
    count: Array2<u32>,
    layers: usize,
}

impl MeanAccumulator {
    pub fn new(grid: GridSpec) -> Self {
        let shape = grid.shape();
        Self {
            grid,
            sum: Array2::zeros(shape),
            count: Array2::zeros(shape),
            layers: 0,
        }
    }

    /// Add one observation layer. No-data cells are ignored.
    pub fn add(&mut self, layer: &Raster<f64>) -> Result<()> {
        self.grid.ensure_matches(&layer.grid_spec())?;
        Zip::from(&mut self.sum)
            .and(&mut self.count)
            .and(layer.data())
            .for_each(|s, c, &v| {
                if !layer.is_nodata(v) {
                    *s += v;
                    *c += 1;
                }
            });
        self.layers += 1;
        Ok(())
    }

    /// Number of layers added so far
    pub fn layers(&self) -> usize {
        self.layers
    }

    /// Mean raster (NaN where no observation was valid) and count raster
    pub fn finish(self) -> Result<(Raster<f64>, Raster<u32>)> {
        let mean_data: Vec<f64> = self
            .sum
            .iter()
            .zip(self.count.iter())
            .map(|(&s, &c)| if c > 0 { s / c as f64 } else { f64::NAN })
            .collect();

        let mut mean = Raster::from_grid(&self.grid, f64::NAN).with_data(mean_data)?;
        mean.set_nodata(Some(f64::NAN));

        let mut count = Raster::from_grid(&self.grid, 0u32);
        *count.data_mut() = self.count;

        Ok((mean, count))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_observations_are_nodata_not_zero() {
        let grid = GridSpec::from_extent((0.0, 0.0, 60.0, 60.0), 30.0, None).unwrap();
        let mut acc = MeanAccumulator::new(grid.clone());

        let mut a = Raster::from_grid(&grid, 10.0);
        a.set(0, 0, f64::NAN).unwrap();
        let b = Raster::from_grid(&grid, 20.0);
        let mut c = Raster::from_grid(&grid, f64::NAN);
        c.set(1, 1, 60.0).unwrap();
        acc.add(&a).unwrap();
        acc.add(&b).unwrap();
        acc.add(&c).unwrap();
        assert_eq!(acc.layers(), 3);

        let (mean, count) = acc.finish().unwrap();
        assert_eq!(mean.get(0, 0).unwrap(), 20.0);
        assert_eq!(mean.get(0, 1).unwrap(), 15.0);
        assert_eq!(mean.get(1, 1).unwrap(), 30.0);
        assert_eq!(count.get(0, 0).unwrap(), 1);
        assert_eq!(count.get(1, 1).unwrap(), 3);

        let empty = MeanAccumulator::new(grid).finish().unwrap().0;
        assert!(empty.get(0, 0).unwrap().is_nan());
    }

    #[test]
    fn test_layer_on_other_grid_rejected() {
        let grid = GridSpec::from_extent((0.0, 0.0, 60.0, 60.0), 30.0, None).unwrap();
        let mut acc = MeanAccumulator::new(grid);
        assert!(acc.add(&Raster::filled(3, 3, 1.0)).is_err());
    }
}

//! Scene catalog interface

use lstanom_core::scene::{DateRange, Scene, SceneMetadata, Sensor};
use lstanom_core::{Error, Result};
use std::collections::BTreeSet;

/// Source of satellite scenes.
///
/// `search` only returns metadata so that a collection can be built, ordered
/// and capped without touching pixel data; `load` materializes one scene at
/// a time.
pub trait SceneCatalog {
    /// Scenes of `sensor` acquired within `range` whose footprint intersects
    /// `extent` (min_x, min_y, max_x, max_y)
    fn search(
        &self,
        sensor: Sensor,
        range: &DateRange,
        extent: (f64, f64, f64, f64),
    ) -> Result<Vec<SceneMetadata>>;

    /// Load the bands of a scene found by `search`
    fn load(&self, metadata: &SceneMetadata) -> Result<Scene>;
}

/// Catalog holding scenes in memory.
#[derive(Debug, Default, Clone)]
pub struct MemoryCatalog {
    scenes: Vec<Scene>,
    offline: BTreeSet<Sensor>,
}

impl MemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, scene: Scene) {
        self.scenes.push(scene);
    }

    pub fn with_scene(mut self, scene: Scene) -> Self {
        self.insert(scene);
        self
    }

    /// Make every search for `sensor` fail, as an unreachable archive would
    pub fn with_offline_sensor(mut self, sensor: Sensor) -> Self {
        self.offline.insert(sensor);
        self
    }

    pub fn len(&self) -> usize {
        self.scenes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scenes.is_empty()
    }
}

impl SceneCatalog for MemoryCatalog {
    fn search(
        &self,
        sensor: Sensor,
        range: &DateRange,
        extent: (f64, f64, f64, f64),
    ) -> Result<Vec<SceneMetadata>> {
        if self.offline.contains(&sensor) {
            return Err(Error::Catalog(format!("{sensor} archive is offline")));
        }
        Ok(self
            .scenes
            .iter()
            .map(|s| &s.metadata)
            .filter(|m| m.sensor == sensor && range.contains(m.acquired) && m.intersects(extent))
            .cloned()
            .collect())
    }

    fn load(&self, metadata: &SceneMetadata) -> Result<Scene> {
        self.scenes
            .iter()
            .find(|s| s.id() == metadata.id)
            .cloned()
            .ok_or_else(|| Error::Catalog(format!("scene {} not found", metadata.id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use lstanom_core::Raster;

    fn scene(id: &str, sensor: Sensor, date: (i32, u32, u32)) -> Scene {
        let date = NaiveDate::from_ymd_opt(date.0, date.1, date.2).unwrap();
        Scene::with_lst_and_qa(
            SceneMetadata::new(id, sensor, date, 5.0),
            Raster::filled(2, 2, 300.0),
            Raster::new(2, 2),
        )
    }

    #[test]
    fn test_search_by_sensor_and_range() {
        let catalog = MemoryCatalog::new()
            .with_scene(scene("a", Sensor::L8, (2015, 7, 3)))
            .with_scene(scene("b", Sensor::L7, (2015, 7, 4)))
            .with_scene(scene("c", Sensor::L8, (2011, 7, 3)));

        let range = DateRange::years(2013, 2021).unwrap();
        let found = catalog.search(Sensor::L8, &range, (0.0, 0.0, 1.0, 1.0)).unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, "a");
    }

    #[test]
    fn test_offline_sensor_and_missing_scene() {
        let catalog = MemoryCatalog::new().with_offline_sensor(Sensor::L5);
        let range = DateRange::years(1984, 1990).unwrap();
        assert!(matches!(
            catalog.search(Sensor::L5, &range, (0.0, 0.0, 1.0, 1.0)),
            Err(Error::Catalog(_))
        ));

        let meta = scene("x", Sensor::L7, (1990, 7, 1)).metadata;
        assert!(catalog.load(&meta).is_err());
    }
}

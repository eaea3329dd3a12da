/*!
World settings backed by the loaded configuration.
*/

use ahash::AHashMap;
use islegrid_config::IslegridConfig;

use crate::traits::{WorldGrid, WorldSettings};
use crate::types::WorldId;

/// Fixed set of worlds and their grids
#[derive(Debug, Clone, Default)]
pub struct ConfiguredWorlds {
    grids: AHashMap<WorldId, WorldGrid>,
}

impl ConfiguredWorlds {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every `[worlds.<name>]` section of the configuration
    pub fn from_config(config: &IslegridConfig) -> Self {
        let grids = config
            .worlds
            .iter()
            .map(|(name, world)| (WorldId::new(name), WorldGrid::from(world)))
            .collect();
        Self { grids }
    }

    pub fn with_world(mut self, world: WorldId, grid: WorldGrid) -> Self {
        self.insert(world, grid);
        self
    }

    pub fn insert(&mut self, world: WorldId, grid: WorldGrid) {
        self.grids.insert(world, grid);
    }

    pub fn worlds(&self) -> impl Iterator<Item = &WorldId> {
        self.grids.keys()
    }
}

impl WorldSettings for ConfiguredWorlds {
    fn world_grid(&self, world: &WorldId) -> Option<WorldGrid> {
        self.grids.get(world).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_config_maps_every_world() {
        let mut config = IslegridConfig::default();
        let mut caves = config.worlds["world"].clone();
        caves.island_distance = 96;
        caves.use_own_generator = true;
        config.worlds.insert("caves".to_string(), caves);

        let worlds = ConfiguredWorlds::from_config(&config);
        assert_eq!(worlds.worlds().count(), 2);

        let grid = worlds.world_grid(&WorldId::from("caves")).unwrap();
        assert_eq!(grid.island_distance, 96);
        assert!(grid.uses_own_generator);
        assert!(worlds.world_grid(&WorldId::from("end")).is_none());
    }
}

/*!
World configuration lookup.

Copyright 2025 Neuraville Inc.
Licensed under the Apache License, Version 2.0
*/

use islegrid_config::WorldConfig;
use serde::{Deserialize, Serialize};

use crate::types::{Cell, WorldId};

/// Island grid parameters of one world
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorldGrid {
    /// Half the spacing between island anchors
    pub island_distance: i32,
    pub start_x: i32,
    pub start_z: i32,
    pub x_offset: i32,
    pub z_offset: i32,
    pub island_height: i32,
    /// Fully synthetic worlds never have obstructing terrain
    pub uses_own_generator: bool,
}

impl WorldGrid {
    /// Where a search starts when the world has no stored origin
    pub fn default_origin(&self) -> Cell {
        Cell::new(
            self.x_offset.saturating_add(self.start_x),
            self.z_offset.saturating_add(self.start_z),
        )
    }

    /// Distance between neighbouring anchors
    pub fn step(&self) -> i32 {
        self.island_distance.saturating_mul(2)
    }
}

impl From<&WorldConfig> for WorldGrid {
    fn from(config: &WorldConfig) -> Self {
        Self {
            island_distance: config.island_distance,
            start_x: config.start_x,
            start_z: config.start_z,
            x_offset: config.x_offset,
            z_offset: config.z_offset,
            island_height: config.island_height,
            uses_own_generator: config.use_own_generator,
        }
    }
}

/// Per-world configuration source
pub trait WorldSettings: Send + Sync {
    /// Grid parameters of `world`, or `None` if the world is not managed
    fn world_grid(&self, world: &WorldId) -> Option<WorldGrid>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_origin_adds_offset_and_start() {
        let grid = WorldGrid::from(&WorldConfig {
            start_x: 1000,
            start_z: -200,
            x_offset: 5,
            z_offset: 7,
            ..WorldConfig::default()
        });
        assert_eq!(grid.default_origin(), Cell::new(1005, -193));
        assert_eq!(grid.step(), 800);
    }
}

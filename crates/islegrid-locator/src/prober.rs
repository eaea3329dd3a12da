// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Occupancy probing of a single candidate anchor.
//!
//! The prober only reads its collaborators. When terrain obstructs a slot it
//! returns `Blocked { register: true }` and leaves the registration to the
//! caller.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, trace};

use crate::traits::{DeletionRegistry, IslandRegistry, TerrainBackend, TerrainSnapshot, WorldGrid};
use crate::types::{BlockPos, Cell, OccupiedBy, ProbeError, ProbeOutcome, WorldId};

/// Offsets inspected around the anchor block at island height: the block
/// itself, its six faces, and the ten horizontal compass directions
pub const INSPECTION_OFFSETS: [(i32, i32, i32); 19] = [
    (0, 0, 0),
    (0, 0, -1),
    (1, 0, 0),
    (0, 0, 1),
    (-1, 0, 0),
    (0, 1, 0),
    (0, -1, 0),
    (1, 0, -1),
    (-1, 0, -1),
    (1, 0, 1),
    (-1, 0, 1),
    (-2, 0, -1),
    (-1, 0, -2),
    (1, 0, -2),
    (2, 0, -1),
    (2, 0, 1),
    (1, 0, 2),
    (-1, 0, 2),
    (-2, 0, 1),
];

/// Classifies candidate anchors of one world
pub struct OccupancyProber {
    world: WorldId,
    grid: WorldGrid,
    islands: Arc<dyn IslandRegistry>,
    deletions: Arc<dyn DeletionRegistry>,
    terrain: Arc<dyn TerrainBackend>,
    timeout: Duration,
}

impl OccupancyProber {
    pub fn new(
        world: WorldId,
        grid: WorldGrid,
        islands: Arc<dyn IslandRegistry>,
        deletions: Arc<dyn DeletionRegistry>,
        terrain: Arc<dyn TerrainBackend>,
        timeout: Duration,
    ) -> Self {
        Self {
            world,
            grid,
            islands,
            deletions,
            terrain,
            timeout,
        }
    }

    pub fn world(&self) -> &WorldId {
        &self.world
    }

    /// The anchor plus the four corners of its footprint
    pub fn inspection_points(&self, anchor: Cell) -> [Cell; 5] {
        let d = self.grid.island_distance;
        [
            anchor,
            anchor.offset(-d, -d),
            anchor.offset(-d, d - 1),
            anchor.offset(d - 1, -d),
            anchor.offset(d - 1, d - 1),
        ]
    }

    /// Classify `anchor`
    ///
    /// Registry checks short-circuit before any terrain is loaded; terrain
    /// is only loaded for natural-terrain worlds whose footprint has been
    /// generated.
    ///
    /// # Errors
    /// * `ProbeError::TerrainLoad` - The backend failed to load the area
    /// * `ProbeError::Timeout` - The load exceeded the probe timeout
    pub async fn probe(&self, anchor: Cell) -> Result<ProbeOutcome, ProbeError> {
        // The anchor comes first, so a known island short-circuits on the
        // first lookup
        let mut generated = false;
        for point in self.inspection_points(anchor) {
            if self.islands.island_at(&self.world, point).is_some() {
                trace!(target: "islegrid-locator", %anchor, %point, "Footprint overlaps a known island");
                return Ok(ProbeOutcome::Occupied {
                    by: OccupiedBy::Island,
                });
            }
            if self.deletions.in_deletion(&self.world, point) {
                return Ok(ProbeOutcome::Occupied {
                    by: OccupiedBy::Deletion,
                });
            }
            if self.terrain.is_chunk_generated(&self.world, point.chunk()) {
                generated = true;
            }
        }

        if !generated {
            return Ok(ProbeOutcome::Free { generated: false });
        }

        if self.grid.uses_own_generator {
            return Ok(ProbeOutcome::Free { generated: true });
        }

        let snapshot = self.load(anchor).await?;
        if self.obstructed(anchor, &snapshot) {
            debug!(target: "islegrid-locator", world = %self.world, %anchor, "Blocks found around unregistered anchor");
            return Ok(ProbeOutcome::Blocked { register: true });
        }

        Ok(ProbeOutcome::Free { generated: true })
    }

    async fn load(&self, anchor: Cell) -> Result<TerrainSnapshot, ProbeError> {
        tokio::time::timeout(self.timeout, self.terrain.load_terrain(&self.world, anchor))
            .await
            .map_err(|_| ProbeError::Timeout(self.timeout))?
    }

    fn obstructed(&self, anchor: Cell, snapshot: &TerrainSnapshot) -> bool {
        let center = anchor.at_height(self.grid.island_height);
        INSPECTION_OFFSETS
            .iter()
            .map(|&offset| center.relative(offset))
            .any(|pos: BlockPos| snapshot.block_at(pos).obstructs())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::impls::memory::{InMemoryDeletionRegistry, InMemoryIslandRegistry, InMemoryTerrain};
    use crate::impls::ConfiguredWorlds;
    use crate::traits::BlockKind;
    use crate::types::ChunkPos;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const DISTANCE: i32 = 64;
    const HEIGHT: i32 = 100;

    struct Fixture {
        world: WorldId,
        islands: Arc<InMemoryIslandRegistry>,
        deletions: Arc<InMemoryDeletionRegistry>,
        terrain: Arc<InMemoryTerrain>,
        prober: OccupancyProber,
    }

    fn fixture(uses_own_generator: bool) -> Fixture {
        let world = WorldId::from("skyblock");
        let grid = WorldGrid {
            island_distance: DISTANCE,
            start_x: 0,
            start_z: 0,
            x_offset: 0,
            z_offset: 0,
            island_height: HEIGHT,
            uses_own_generator,
        };
        let worlds = Arc::new(ConfiguredWorlds::new().with_world(world.clone(), grid));
        let islands = Arc::new(InMemoryIslandRegistry::new(worlds.clone()));
        let deletions = Arc::new(InMemoryDeletionRegistry::new(worlds));
        let terrain = Arc::new(InMemoryTerrain::new());
        let prober = OccupancyProber::new(
            world.clone(),
            grid,
            islands.clone(),
            deletions.clone(),
            terrain.clone(),
            Duration::from_millis(200),
        );
        Fixture {
            world,
            islands,
            deletions,
            terrain,
            prober,
        }
    }

    #[tokio::test]
    async fn test_known_anchor_is_occupied() {
        let f = fixture(false);
        f.islands.register_island(&f.world, Cell::new(0, 0));

        let outcome = f.prober.probe(Cell::new(0, 0)).await.unwrap();
        assert_eq!(outcome, ProbeOutcome::Occupied { by: OccupiedBy::Island });
        assert_eq!(f.terrain.load_count(), 0);
    }

    /// Island registry that counts lookups
    struct CountingIslands {
        inner: InMemoryIslandRegistry,
        lookups: AtomicUsize,
    }

    impl IslandRegistry for CountingIslands {
        fn island_at(&self, world: &WorldId, point: Cell) -> Option<crate::traits::IslandSlot> {
            self.lookups.fetch_add(1, Ordering::Relaxed);
            self.inner.island_at(world, point)
        }

        fn register_island(&self, world: &WorldId, anchor: Cell) -> bool {
            self.inner.register_island(world, anchor)
        }
    }

    fn counting_prober() -> (WorldId, Arc<CountingIslands>, OccupancyProber) {
        let f = fixture(false);
        let worlds = Arc::new(ConfiguredWorlds::new().with_world(f.world.clone(), f.prober.grid));
        let islands = Arc::new(CountingIslands {
            inner: InMemoryIslandRegistry::new(worlds),
            lookups: AtomicUsize::new(0),
        });
        let prober = OccupancyProber::new(
            f.world.clone(),
            f.prober.grid,
            islands.clone(),
            f.deletions.clone(),
            f.terrain.clone(),
            Duration::from_millis(200),
        );
        (f.world, islands, prober)
    }

    #[tokio::test]
    async fn test_each_inspection_point_is_looked_up_once() {
        let (_world, islands, prober) = counting_prober();

        let outcome = prober.probe(Cell::new(256, 0)).await.unwrap();
        assert_eq!(outcome, ProbeOutcome::Free { generated: false });
        assert_eq!(islands.lookups.load(Ordering::Relaxed), 5);
    }

    #[tokio::test]
    async fn test_known_anchor_needs_a_single_lookup() {
        let (world, islands, prober) = counting_prober();
        islands.register_island(&world, Cell::new(0, 0));

        let outcome = prober.probe(Cell::new(0, 0)).await.unwrap();
        assert_eq!(outcome, ProbeOutcome::Occupied { by: OccupiedBy::Island });
        assert_eq!(islands.lookups.load(Ordering::Relaxed), 1);
    }

    #[tokio::test]
    async fn test_corner_overlap_is_occupied() {
        let f = fixture(false);
        // Off-grid island whose footprint covers the candidate's far corner
        f.islands.register_island(&f.world, Cell::new(128 + 70, 128 + 70));

        let outcome = f.prober.probe(Cell::new(128, 128)).await.unwrap();
        assert_eq!(outcome, ProbeOutcome::Occupied { by: OccupiedBy::Island });
    }

    #[tokio::test]
    async fn test_pending_deletion_is_occupied() {
        let f = fixture(false);
        f.deletions.mark_for_deletion(&f.world, Cell::new(-128, 0));

        let outcome = f.prober.probe(Cell::new(-128, 0)).await.unwrap();
        assert_eq!(outcome, ProbeOutcome::Occupied { by: OccupiedBy::Deletion });
    }

    #[tokio::test]
    async fn test_ungenerated_footprint_is_free_without_loading() {
        let f = fixture(false);
        let outcome = f.prober.probe(Cell::new(256, 0)).await.unwrap();
        assert_eq!(outcome, ProbeOutcome::Free { generated: false });
        assert_eq!(f.terrain.load_count(), 0);
    }

    #[tokio::test]
    async fn test_solid_terrain_is_blocked() {
        let f = fixture(false);
        f.terrain
            .set_block(&f.world, BlockPos::new(2, HEIGHT, 1), BlockKind::Solid);

        let outcome = f.prober.probe(Cell::new(0, 0)).await.unwrap();
        assert_eq!(outcome, ProbeOutcome::Blocked { register: true });
        // Classification leaves the registry untouched
        assert!(f.islands.island_at(&f.world, Cell::new(0, 0)).is_none());
    }

    #[tokio::test]
    async fn test_liquid_terrain_is_free() {
        let f = fixture(false);
        f.terrain
            .set_block(&f.world, BlockPos::new(0, HEIGHT, 0), BlockKind::Liquid);
        f.terrain
            .set_block(&f.world, BlockPos::new(0, HEIGHT - 1, 0), BlockKind::Liquid);
        // Solid, but outside the inspected neighbourhood
        f.terrain
            .set_block(&f.world, BlockPos::new(0, HEIGHT + 2, 0), BlockKind::Solid);

        let outcome = f.prober.probe(Cell::new(0, 0)).await.unwrap();
        assert_eq!(outcome, ProbeOutcome::Free { generated: true });
        assert_eq!(f.terrain.load_count(), 1);
    }

    #[tokio::test]
    async fn test_own_generator_skips_terrain() {
        let f = fixture(true);
        f.terrain
            .set_block(&f.world, BlockPos::new(0, HEIGHT, 0), BlockKind::Solid);

        let outcome = f.prober.probe(Cell::new(0, 0)).await.unwrap();
        assert_eq!(outcome, ProbeOutcome::Free { generated: true });
        assert_eq!(f.terrain.load_count(), 0);
    }

    #[tokio::test]
    async fn test_load_failure_propagates() {
        let f = fixture(false);
        f.terrain.mark_generated(&f.world, ChunkPos::new(0, 0));
        f.terrain.fail_loads_at(&f.world, Cell::new(0, 0));

        let err = f.prober.probe(Cell::new(0, 0)).await.unwrap_err();
        assert!(matches!(err, ProbeError::TerrainLoad { .. }));
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_load_times_out() {
        let f = fixture(false);
        f.terrain.mark_generated(&f.world, ChunkPos::new(0, 0));
        f.terrain.set_load_delay(Duration::from_secs(5));

        let err = f.prober.probe(Cell::new(0, 0)).await.unwrap_err();
        assert_eq!(err, ProbeError::Timeout(Duration::from_millis(200)));
    }

    #[test]
    fn test_inspection_points_span_footprint() {
        let f = fixture(false);
        let points = f.prober.inspection_points(Cell::new(0, 0));
        assert_eq!(points[0], Cell::new(0, 0));
        assert!(points.contains(&Cell::new(-64, -64)));
        assert!(points.contains(&Cell::new(63, 63)));
        for point in points {
            assert!(Cell::new(0, 0).footprint_contains(point, DISTANCE));
        }
    }
}

// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
In-memory collaborators.

Thread-safe implementations of the registries, the origin store and the
terrain backend, used by the `locate_island` tool and by tests. Island
footprints are resolved against the world's configured island distance.
*/

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use ahash::{AHashMap, AHashSet};
use async_trait::async_trait;
use parking_lot::RwLock;

use crate::traits::{
    BlockKind, DeletionRegistry, IslandRegistry, IslandSlot, SearchOriginStore, TerrainBackend,
    TerrainSnapshot, WorldSettings,
};
use crate::types::{BlockPos, Cell, ChunkPos, ProbeError, WorldId};

/// Horizontal reach of a loaded snapshot around the anchor
const SNAPSHOT_RADIUS: i32 = 2;

/// Anchors per world, resolved to footprints with the world's island distance
struct FootprintIndex {
    worlds: Arc<dyn WorldSettings>,
    anchors: RwLock<AHashMap<WorldId, AHashSet<Cell>>>,
}

impl FootprintIndex {
    fn new(worlds: Arc<dyn WorldSettings>) -> Self {
        Self {
            worlds,
            anchors: RwLock::new(AHashMap::new()),
        }
    }

    fn covering(&self, world: &WorldId, point: Cell) -> Option<Cell> {
        let distance = self.worlds.world_grid(world)?.island_distance;
        let anchors = self.anchors.read();
        anchors
            .get(world)?
            .iter()
            .copied()
            .find(|anchor| anchor.footprint_contains(point, distance))
    }

    fn insert(&self, world: &WorldId, anchor: Cell) -> bool {
        self.anchors
            .write()
            .entry(world.clone())
            .or_default()
            .insert(anchor)
    }

    fn remove(&self, world: &WorldId, anchor: Cell) -> bool {
        self.anchors
            .write()
            .get_mut(world)
            .map_or(false, |set| set.remove(&anchor))
    }

    fn sorted(&self, world: &WorldId) -> Vec<Cell> {
        let mut cells: Vec<Cell> = self
            .anchors
            .read()
            .get(world)
            .map(|set| set.iter().copied().collect())
            .unwrap_or_default();
        cells.sort();
        cells
    }
}

/// Known islands, kept in memory
pub struct InMemoryIslandRegistry {
    index: FootprintIndex,
}

impl InMemoryIslandRegistry {
    pub fn new(worlds: Arc<dyn WorldSettings>) -> Self {
        Self {
            index: FootprintIndex::new(worlds),
        }
    }

    /// All registered anchors of `world`, sorted
    pub fn islands(&self, world: &WorldId) -> Vec<Cell> {
        self.index.sorted(world)
    }

    pub fn island_count(&self, world: &WorldId) -> usize {
        self.index.anchors.read().get(world).map_or(0, |set| set.len())
    }
}

impl IslandRegistry for InMemoryIslandRegistry {
    fn island_at(&self, world: &WorldId, point: Cell) -> Option<IslandSlot> {
        self.index
            .covering(world, point)
            .map(|anchor| IslandSlot { anchor })
    }

    fn register_island(&self, world: &WorldId, anchor: Cell) -> bool {
        self.index.insert(world, anchor)
    }
}

/// Islands pending deletion, kept in memory
pub struct InMemoryDeletionRegistry {
    index: FootprintIndex,
}

impl InMemoryDeletionRegistry {
    pub fn new(worlds: Arc<dyn WorldSettings>) -> Self {
        Self {
            index: FootprintIndex::new(worlds),
        }
    }

    pub fn mark_for_deletion(&self, world: &WorldId, anchor: Cell) -> bool {
        self.index.insert(world, anchor)
    }

    /// Deletion finished; the slot is reusable
    pub fn finish_deletion(&self, world: &WorldId, anchor: Cell) -> bool {
        self.index.remove(world, anchor)
    }
}

impl DeletionRegistry for InMemoryDeletionRegistry {
    fn in_deletion(&self, world: &WorldId, point: Cell) -> bool {
        self.index.covering(world, point).is_some()
    }
}

/// Per-world search origins, kept in memory
#[derive(Default)]
pub struct InMemoryOriginStore {
    origins: RwLock<AHashMap<WorldId, Cell>>,
}

impl InMemoryOriginStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SearchOriginStore for InMemoryOriginStore {
    fn last_search_origin(&self, world: &WorldId) -> Option<Cell> {
        self.origins.read().get(world).copied()
    }

    fn set_last_search_origin(&self, world: &WorldId, origin: Cell) {
        self.origins.write().insert(world.clone(), origin);
    }
}

/// Programmable terrain
///
/// Placing a block marks its chunk as generated. Loads can be delayed or
/// made to fail per anchor, and every load is counted.
#[derive(Default)]
pub struct InMemoryTerrain {
    generated: RwLock<AHashMap<WorldId, AHashSet<ChunkPos>>>,
    blocks: RwLock<AHashMap<WorldId, AHashMap<BlockPos, BlockKind>>>,
    failing: RwLock<AHashSet<(WorldId, Cell)>>,
    load_delay: RwLock<Option<Duration>>,
    loads: AtomicU64,
}

impl InMemoryTerrain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mark_generated(&self, world: &WorldId, chunk: ChunkPos) {
        self.generated
            .write()
            .entry(world.clone())
            .or_default()
            .insert(chunk);
    }

    pub fn set_block(&self, world: &WorldId, pos: BlockPos, kind: BlockKind) {
        self.mark_generated(world, pos.column().chunk());
        let mut blocks = self.blocks.write();
        let world_blocks = blocks.entry(world.clone()).or_default();
        if kind == BlockKind::Empty {
            world_blocks.remove(&pos);
        } else {
            world_blocks.insert(pos, kind);
        }
    }

    /// Make every load around `anchor` fail
    pub fn fail_loads_at(&self, world: &WorldId, anchor: Cell) {
        self.failing.write().insert((world.clone(), anchor));
    }

    /// Delay every load by `delay`
    pub fn set_load_delay(&self, delay: Duration) {
        *self.load_delay.write() = Some(delay);
    }

    /// Number of `load_terrain` calls so far
    pub fn load_count(&self) -> u64 {
        self.loads.load(Ordering::Relaxed)
    }

    fn snapshot_around(&self, world: &WorldId, anchor: Cell) -> TerrainSnapshot {
        let blocks = self.blocks.read();
        let Some(world_blocks) = blocks.get(world) else {
            return TerrainSnapshot::new();
        };
        world_blocks
            .iter()
            .filter(|(pos, _)| {
                (pos.x - anchor.x).abs() <= SNAPSHOT_RADIUS
                    && (pos.z - anchor.z).abs() <= SNAPSHOT_RADIUS
            })
            .map(|(pos, kind)| (*pos, *kind))
            .collect()
    }
}

#[async_trait]
impl TerrainBackend for InMemoryTerrain {
    async fn load_terrain(&self, world: &WorldId, anchor: Cell) -> Result<TerrainSnapshot, ProbeError> {
        self.loads.fetch_add(1, Ordering::Relaxed);

        let delay = *self.load_delay.read();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        if self.failing.read().contains(&(world.clone(), anchor)) {
            return Err(ProbeError::TerrainLoad {
                chunk: anchor.chunk(),
                reason: "chunk could not be read".to_string(),
            });
        }

        Ok(self.snapshot_around(world, anchor))
    }

    fn is_chunk_generated(&self, world: &WorldId, chunk: ChunkPos) -> bool {
        self.generated
            .read()
            .get(world)
            .map_or(false, |chunks| chunks.contains(&chunk))
    }
}

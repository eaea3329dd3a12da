/*!
Terrain backend interface.

The backend turns a candidate anchor into loaded block data. Loading may be
slow (chunk I/O, generation), so it is asynchronous; the generated check is
expected to be a cheap lookup.

Copyright 2025 Neuraville Inc.
Licensed under the Apache License, Version 2.0
*/

use ahash::AHashMap;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::types::{BlockPos, Cell, ChunkPos, ProbeError, WorldId};

/// The only block property the locator cares about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockKind {
    #[default]
    Empty,
    /// Water and similar; islands may be placed over it
    Liquid,
    Solid,
}

impl BlockKind {
    pub fn obstructs(self) -> bool {
        self == BlockKind::Solid
    }
}

/// Loaded blocks around a probed anchor
///
/// Positions not present read as `BlockKind::Empty`.
#[derive(Debug, Clone, Default)]
pub struct TerrainSnapshot {
    blocks: AHashMap<BlockPos, BlockKind>,
}

impl TerrainSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_block(mut self, pos: BlockPos, kind: BlockKind) -> Self {
        self.set_block(pos, kind);
        self
    }

    pub fn set_block(&mut self, pos: BlockPos, kind: BlockKind) {
        if kind == BlockKind::Empty {
            self.blocks.remove(&pos);
        } else {
            self.blocks.insert(pos, kind);
        }
    }

    pub fn block_at(&self, pos: BlockPos) -> BlockKind {
        self.blocks.get(&pos).copied().unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }
}

impl FromIterator<(BlockPos, BlockKind)> for TerrainSnapshot {
    fn from_iter<I: IntoIterator<Item = (BlockPos, BlockKind)>>(iter: I) -> Self {
        let mut snapshot = TerrainSnapshot::new();
        for (pos, kind) in iter {
            snapshot.set_block(pos, kind);
        }
        snapshot
    }
}

/// Terrain loading backend (transport-agnostic)
#[async_trait]
pub trait TerrainBackend: Send + Sync {
    /// Load the terrain around `anchor`
    ///
    /// The snapshot must cover at least the blocks within two blocks of the
    /// anchor column horizontally and one block vertically of island height.
    ///
    /// # Errors
    /// * `ProbeError::TerrainLoad` - The area could not be loaded
    async fn load_terrain(&self, world: &WorldId, anchor: Cell) -> Result<TerrainSnapshot, ProbeError>;

    /// True if the chunk has ever been generated (materialized on disk)
    fn is_chunk_generated(&self, world: &WorldId, chunk: ChunkPos) -> bool;
}

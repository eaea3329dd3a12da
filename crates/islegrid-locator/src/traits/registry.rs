/*!
Occupancy registries and the per-world search origin store.

Implementations are shared between concurrent probes and searches, so every
method takes `&self`. Registering the same anchor twice must be harmless.

Copyright 2025 Neuraville Inc.
Licensed under the Apache License, Version 2.0
*/

use serde::{Deserialize, Serialize};

use crate::types::{Cell, WorldId};

/// A known occupied slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IslandSlot {
    pub anchor: Cell,
}

/// Registry of known islands
pub trait IslandRegistry: Send + Sync {
    /// The island whose footprint covers `point`, if any
    fn island_at(&self, world: &WorldId, point: Cell) -> Option<IslandSlot>;

    /// Record an occupied slot at `anchor`
    ///
    /// Returns `true` if the slot was not known before.
    fn register_island(&self, world: &WorldId, anchor: Cell) -> bool;
}

/// Registry of islands currently being deleted
pub trait DeletionRegistry: Send + Sync {
    /// True if `point` lies inside an island that is pending deletion
    fn in_deletion(&self, world: &WorldId, point: Cell) -> bool;
}

/// Where each world's next search resumes
pub trait SearchOriginStore: Send + Sync {
    fn last_search_origin(&self, world: &WorldId) -> Option<Cell>;

    fn set_last_search_origin(&self, world: &WorldId, origin: Cell);
}

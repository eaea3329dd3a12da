// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
Locator error types.

Probe errors stay inside a search: the aggregator counts them as blocked
cells. Only `LocatorError` reaches callers of the locator.
*/

use std::time::Duration;

use thiserror::Error;

use super::{ChunkPos, WorldId};
use crate::aggregator::SaturationReport;

/// Failure of a single occupancy probe
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProbeError {
    /// Terrain backend could not load the area around the candidate
    #[error("Terrain load failed for chunk {chunk}: {reason}")]
    TerrainLoad { chunk: ChunkPos, reason: String },

    /// Terrain did not load within the probe timeout
    #[error("Terrain load timed out after {0:?}")]
    Timeout(Duration),

    /// The probe task panicked or was cancelled
    #[error("Probe task failed: {0}")]
    TaskFailed(String),
}

/// Errors surfaced by `IslandLocator`
#[derive(Error, Debug, Clone)]
pub enum LocatorError {
    /// Tolerance exhausted before any free slot was found
    #[error("No free island location in world '{world}': {report}")]
    Saturated {
        world: WorldId,
        report: SaturationReport,
    },

    /// The world has no grid configuration
    #[error("Unknown world: {0}")]
    UnknownWorld(WorldId),

    /// The world's grid configuration cannot be walked
    #[error("Invalid grid configuration for world '{world}': {reason}")]
    InvalidWorld { world: WorldId, reason: String },

    /// Every probe finished without the search reaching a decision
    #[error("Search in world '{0}' ended without a decision")]
    Interrupted(WorldId),
}

/// Result type for locator operations
pub type LocatorResult<T> = Result<T, LocatorError>;

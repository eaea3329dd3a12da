// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Collaborator implementations shipped with the locator.

pub mod configured;
pub mod memory;
pub mod tracing_sink;

pub use configured::ConfiguredWorlds;
pub use memory::{InMemoryDeletionRegistry, InMemoryIslandRegistry, InMemoryOriginStore, InMemoryTerrain};
pub use tracing_sink::TracingSink;

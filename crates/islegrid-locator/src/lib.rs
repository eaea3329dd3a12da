// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # islegrid Locator
//!
//! Finds the next free island slot on a world's spiral grid.
//!
//! ## Architecture
//!
//! - **walker**: deterministic outward square spiral over island anchors
//! - **prober**: classifies one anchor as occupied, blocked or free
//! - **aggregator**: tolerance counters and the first-free-wins decision
//! - **locator**: fans probes out over tokio tasks and drains them back in
//! - **traits**: the registries, terrain and settings the locator talks to
//! - **impls**: in-memory and configuration-backed collaborators
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use islegrid_config::IslegridConfig;
//! use islegrid_locator::impls::*;
//! use islegrid_locator::{IslandLocator, LocatorHost, LocatorSettings, WorldId};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let config = IslegridConfig::default();
//! let worlds = Arc::new(ConfiguredWorlds::from_config(&config));
//! let host = LocatorHost {
//!     worlds: worlds.clone(),
//!     islands: Arc::new(InMemoryIslandRegistry::new(worlds.clone())),
//!     deletions: Arc::new(InMemoryDeletionRegistry::new(worlds)),
//!     terrain: Arc::new(InMemoryTerrain::new()),
//!     origins: Arc::new(InMemoryOriginStore::new()),
//!     diagnostics: Arc::new(TracingSink),
//! };
//! let locator = IslandLocator::new(LocatorSettings::from(&config.search), host);
//!
//! let cell = locator.find_next_location(&WorldId::from("world")).await?;
//! println!("next island at {cell}");
//! # Ok(())
//! # }
//! ```

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod aggregator;
pub mod impls;
pub mod locator;
pub mod prober;
pub mod traits;
pub mod types;
pub mod walker;

pub use aggregator::{
    Decision, ResultAggregator, SaturationReport, SearchState, ToleranceCounters, DEFAULT_TOLERANCE,
};
pub use locator::{IslandLocator, LocatorHost, LocatorSettings};
pub use prober::{OccupancyProber, INSPECTION_OFFSETS};
pub use traits::*;
pub use types::*;
pub use walker::{next_cell, GridWalker};

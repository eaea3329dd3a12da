//! # islegrid - Spiral-grid island placement
//!
//! islegrid finds the next free island slot in a world laid out as a square
//! grid of island anchors. Candidates are visited on an outward spiral,
//! checked concurrently against the island registry, pending deletions and
//! loaded terrain, and the first free slot wins. A search gives up once too
//! many candidates turn out to be obstructed by terrain.
//!
//! ## Quick Start
//!
//! ```toml
//! [dependencies]
//! islegrid = "0.1"  # Default: locator + config + logging setup
//! ```
//!
//! ## Feature Flags
//!
//! - **`observability`** (default): `tracing` subscriber setup with per-crate
//!   debug flags
//! - **`file-logging`**: rolling log files with retention cleanup
//!
//! ## Usage Examples
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use islegrid::prelude::*;
//! use islegrid::locator::impls::*;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config(None, None)?;
//! let worlds = Arc::new(ConfiguredWorlds::from_config(&config));
//! let islands = Arc::new(InMemoryIslandRegistry::new(worlds.clone()));
//! let locator = IslandLocator::new(
//!     LocatorSettings::from(&config.search),
//!     LocatorHost {
//!         worlds: worlds.clone(),
//!         islands: islands.clone(),
//!         deletions: Arc::new(InMemoryDeletionRegistry::new(worlds)),
//!         terrain: Arc::new(InMemoryTerrain::new()),
//!         origins: Arc::new(InMemoryOriginStore::new()),
//!         diagnostics: Arc::new(TracingSink),
//!     },
//! );
//!
//! let world = WorldId::from("world");
//! let cell = locator.find_next_location(&world).await?;
//! islands.register_island(&world, cell);
//! # Ok(())
//! # }
//! ```

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// Re-export the workspace crates
pub use islegrid_config as config;
pub use islegrid_locator as locator;

#[cfg(feature = "observability")]
pub use islegrid_observability as observability;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::config::{load_config, IslegridConfig, SearchConfig, WorldConfig};
    pub use crate::locator::{
        Cell, IslandLocator, IslandRegistry, LocatorError, LocatorHost, LocatorResult,
        LocatorSettings, SaturationReport, SearchOriginStore, WorldGrid, WorldId,
    };

    #[cfg(feature = "observability")]
    pub use crate::observability::{init_logging, parse_debug_flags, CrateDebugFlags, ObservabilityConfig};
}

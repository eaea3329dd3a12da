/*!
Collaborator traits.

The locator owns the search; everything it learns about the world comes
through these interfaces, provided by the host.

Copyright 2025 Neuraville Inc.
Licensed under the Apache License, Version 2.0
*/

pub mod diagnostics;
pub mod registry;
pub mod terrain;
pub mod world;

pub use diagnostics::DiagnosticSink;
pub use registry::{DeletionRegistry, IslandRegistry, IslandSlot, SearchOriginStore};
pub use terrain::{BlockKind, TerrainBackend, TerrainSnapshot};
pub use world::{WorldGrid, WorldSettings};

// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
Search orchestration.

`IslandLocator` walks the spiral from the world's last search origin,
keeps up to `max_in_flight` probes running in a `JoinSet`, and folds each
completion into a `ResultAggregator` owned by the calling task. Once the
search is decided, outstanding probes are aborted and drained, the new
origin is persisted and the result returned.

Searches of the same world are serialised; different worlds search
concurrently.
*/

use std::sync::Arc;
use std::time::Duration;

use ahash::AHashMap;
use islegrid_config::SearchConfig;
use parking_lot::Mutex;
use tokio::runtime::Handle;
use tokio::task::{JoinError, JoinSet};
use tracing::{debug, info, warn};

use crate::aggregator::{Decision, ResultAggregator, SearchState, DEFAULT_TOLERANCE};
use crate::prober::OccupancyProber;
use crate::traits::{
    DeletionRegistry, DiagnosticSink, IslandRegistry, SearchOriginStore, TerrainBackend,
    WorldSettings,
};
use crate::types::{Cell, LocatorError, LocatorResult, ProbeError, ProbeReport, WorldId};
use crate::walker::GridWalker;

/// Tunables of a search
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocatorSettings {
    /// Blocked outcomes tolerated before the search fails
    pub tolerance: u32,
    /// Upper bound on concurrently running probes (at least 1)
    pub max_in_flight: usize,
    pub probe_timeout: Duration,
}

impl Default for LocatorSettings {
    fn default() -> Self {
        Self {
            tolerance: DEFAULT_TOLERANCE,
            max_in_flight: 32,
            probe_timeout: Duration::from_millis(5000),
        }
    }
}

impl From<&SearchConfig> for LocatorSettings {
    fn from(config: &SearchConfig) -> Self {
        Self {
            tolerance: config.tolerance,
            max_in_flight: config.max_in_flight,
            probe_timeout: Duration::from_millis(config.probe_timeout_ms),
        }
    }
}

/// Collaborators the locator reads from and writes to
#[derive(Clone)]
pub struct LocatorHost {
    pub worlds: Arc<dyn WorldSettings>,
    pub islands: Arc<dyn IslandRegistry>,
    pub deletions: Arc<dyn DeletionRegistry>,
    pub terrain: Arc<dyn TerrainBackend>,
    pub origins: Arc<dyn SearchOriginStore>,
    pub diagnostics: Arc<dyn DiagnosticSink>,
}

type WorldGate = Arc<tokio::sync::Mutex<()>>;

/// Finds the next free island slot of a world
pub struct IslandLocator {
    settings: LocatorSettings,
    host: LocatorHost,
    gates: Mutex<AHashMap<WorldId, WorldGate>>,
}

impl IslandLocator {
    pub fn new(settings: LocatorSettings, host: LocatorHost) -> Self {
        Self {
            settings,
            host,
            gates: Mutex::new(AHashMap::new()),
        }
    }

    pub fn settings(&self) -> &LocatorSettings {
        &self.settings
    }

    pub fn host(&self) -> &LocatorHost {
        &self.host
    }

    /// Search `world` for the next free island anchor
    ///
    /// Cells found obstructed by terrain are registered as islands along the
    /// way. The accepted cell becomes the world's next search origin; it is
    /// not registered, so callers that build on it must register it.
    ///
    /// # Errors
    /// * `LocatorError::UnknownWorld` - `world` has no grid configuration
    /// * `LocatorError::InvalidWorld` - The grid has a non-positive distance
    /// * `LocatorError::Saturated` - Tolerance exhausted before a free cell
    /// * `LocatorError::Interrupted` - The walk ran off the coordinate range
    ///   with every probe finished and nothing decided
    pub async fn find_next_location(&self, world: &WorldId) -> LocatorResult<Cell> {
        let grid = self
            .host
            .worlds
            .world_grid(world)
            .ok_or_else(|| LocatorError::UnknownWorld(world.clone()))?;
        if grid.island_distance <= 0 {
            return Err(LocatorError::InvalidWorld {
                world: world.clone(),
                reason: format!("island distance must be positive, got {}", grid.island_distance),
            });
        }

        // Gates exist only for configured worlds
        let gate = self.gate(world);
        let _search = gate.lock().await;

        let origin = self
            .host
            .origins
            .last_search_origin(world)
            .unwrap_or_else(|| grid.default_origin());
        info!(
            target: "islegrid-locator",
            %world,
            %origin,
            tolerance = self.settings.tolerance,
            "Searching for next island location"
        );

        let prober = Arc::new(OccupancyProber::new(
            world.clone(),
            grid,
            Arc::clone(&self.host.islands),
            Arc::clone(&self.host.deletions),
            Arc::clone(&self.host.terrain),
            self.settings.probe_timeout,
        ));
        let max_in_flight = self.settings.max_in_flight.max(1);
        let mut walker = GridWalker::new(origin, grid.island_distance);
        let mut aggregator = ResultAggregator::new(self.settings.tolerance);
        let mut probes: JoinSet<ProbeReport> = JoinSet::new();
        let mut walk_ended = false;

        while !aggregator.is_terminal() {
            while !walk_ended && probes.len() < max_in_flight {
                let cell = walker.advance();
                if walker.current() == cell {
                    warn!(target: "islegrid-locator", %world, %cell, "Spiral reached the edge of the coordinate range");
                    walk_ended = true;
                }
                let prober = Arc::clone(&prober);
                probes.spawn(async move {
                    let result = prober.probe(cell).await;
                    ProbeReport::from_result(cell, result)
                });
            }

            let Some(joined) = probes.join_next().await else {
                break;
            };
            let report = report_from_join(joined);
            self.apply_effects(world, &report);
            self.log_decision(world, &report, aggregator.report(&report));
        }

        probes.abort_all();
        while let Some(joined) = probes.join_next().await {
            if let Err(err) = &joined {
                if err.is_cancelled() {
                    continue;
                }
            }
            let report = report_from_join(joined);
            self.apply_effects(world, &report);
            aggregator.report(&report);
        }

        match aggregator.into_state() {
            SearchState::Accepted(cell) => {
                self.host.origins.set_last_search_origin(world, cell);
                info!(target: "islegrid-locator", %world, %cell, "Found free island location");
                Ok(cell)
            }
            SearchState::Failed(report) => {
                self.host
                    .origins
                    .set_last_search_origin(world, walker.current());
                self.host.diagnostics.saturated(world, &report);
                Err(LocatorError::Saturated {
                    world: world.clone(),
                    report,
                })
            }
            SearchState::Searching => Err(LocatorError::Interrupted(world.clone())),
        }
    }

    /// Blocking wrapper around [`find_next_location`](Self::find_next_location)
    ///
    /// Must not be called from within an asynchronous context of `handle`'s
    /// runtime.
    pub fn find_next_location_blocking(&self, handle: &Handle, world: &WorldId) -> LocatorResult<Cell> {
        handle.block_on(self.find_next_location(world))
    }

    fn gate(&self, world: &WorldId) -> WorldGate {
        let mut gates = self.gates.lock();
        Arc::clone(gates.entry(world.clone()).or_default())
    }

    fn apply_effects(&self, world: &WorldId, report: &ProbeReport) {
        if let ProbeReport::Completed { cell, outcome } = report {
            if outcome.wants_registration() && self.host.islands.register_island(world, *cell) {
                debug!(target: "islegrid-locator", %world, %cell, "Registered obstructed cell as island");
            }
        }
    }

    fn log_decision(&self, world: &WorldId, report: &ProbeReport, decision: Decision) {
        match report {
            ProbeReport::Completed { cell, outcome } => {
                debug!(target: "islegrid-locator", %world, %cell, outcome = %outcome.kind(), ?decision, "Probe completed");
            }
            ProbeReport::Failed { cell, error } => {
                warn!(target: "islegrid-locator", %world, ?cell, %error, ?decision, "Probe failed, counting cell as blocked");
            }
        }
    }
}

fn report_from_join(joined: Result<ProbeReport, JoinError>) -> ProbeReport {
    joined.unwrap_or_else(|err| ProbeReport::Failed {
        cell: None,
        error: ProbeError::TaskFailed(err.to_string()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregator::SaturationReport;
    use crate::impls::{
        ConfiguredWorlds, InMemoryDeletionRegistry, InMemoryIslandRegistry, InMemoryOriginStore,
        InMemoryTerrain,
    };
    use crate::traits::{BlockKind, TerrainSnapshot, WorldGrid};
    use crate::types::{BlockPos, ChunkPos};
    use async_trait::async_trait;

    const DISTANCE: i32 = 64;
    const HEIGHT: i32 = 100;

    #[derive(Default)]
    struct RecordingSink {
        reports: Mutex<Vec<(WorldId, SaturationReport)>>,
    }

    impl DiagnosticSink for RecordingSink {
        fn saturated(&self, world: &WorldId, report: &SaturationReport) {
            self.reports.lock().push((world.clone(), *report));
        }
    }

    struct PanickingTerrain;

    #[async_trait]
    impl TerrainBackend for PanickingTerrain {
        async fn load_terrain(&self, _world: &WorldId, _anchor: Cell) -> Result<TerrainSnapshot, ProbeError> {
            panic!("terrain backend crashed");
        }

        fn is_chunk_generated(&self, _world: &WorldId, _chunk: ChunkPos) -> bool {
            true
        }
    }

    struct Fixture {
        world: WorldId,
        islands: Arc<InMemoryIslandRegistry>,
        terrain: Arc<InMemoryTerrain>,
        origins: Arc<InMemoryOriginStore>,
        sink: Arc<RecordingSink>,
        locator: IslandLocator,
    }

    fn grid(island_distance: i32) -> WorldGrid {
        WorldGrid {
            island_distance,
            start_x: 0,
            start_z: 0,
            x_offset: 0,
            z_offset: 0,
            island_height: HEIGHT,
            uses_own_generator: false,
        }
    }

    fn fixture_with(settings: LocatorSettings, terrain_override: Option<Arc<dyn TerrainBackend>>) -> Fixture {
        let world = WorldId::from("skyblock");
        let worlds = Arc::new(
            ConfiguredWorlds::new()
                .with_world(world.clone(), grid(DISTANCE))
                .with_world(WorldId::from("broken"), grid(0)),
        );
        let islands = Arc::new(InMemoryIslandRegistry::new(worlds.clone()));
        let deletions = Arc::new(InMemoryDeletionRegistry::new(worlds.clone()));
        let terrain = Arc::new(InMemoryTerrain::new());
        let origins = Arc::new(InMemoryOriginStore::new());
        let sink = Arc::new(RecordingSink::default());
        let host = LocatorHost {
            worlds,
            islands: islands.clone(),
            deletions,
            terrain: terrain_override.unwrap_or_else(|| terrain.clone() as Arc<dyn TerrainBackend>),
            origins: origins.clone(),
            diagnostics: sink.clone(),
        };
        Fixture {
            world,
            islands,
            terrain,
            origins,
            sink,
            locator: IslandLocator::new(settings, host),
        }
    }

    fn sequential(tolerance: u32) -> LocatorSettings {
        LocatorSettings {
            tolerance,
            max_in_flight: 1,
            probe_timeout: Duration::from_secs(5),
        }
    }

    fn block(f: &Fixture, x: i32, z: i32) {
        f.terrain
            .set_block(&f.world, BlockPos::new(x, HEIGHT, z), BlockKind::Solid);
    }

    #[tokio::test]
    async fn test_empty_world_returns_origin() {
        let f = fixture_with(LocatorSettings::default(), None);

        let cell = f.locator.find_next_location(&f.world).await.unwrap();
        assert_eq!(cell, Cell::new(0, 0));
        assert_eq!(f.origins.last_search_origin(&f.world), Some(Cell::new(0, 0)));
    }

    #[tokio::test]
    async fn test_unknown_and_invalid_worlds() {
        let f = fixture_with(LocatorSettings::default(), None);

        let err = f
            .locator
            .find_next_location(&WorldId::from("nether"))
            .await
            .unwrap_err();
        assert!(matches!(err, LocatorError::UnknownWorld(w) if w.as_str() == "nether"));

        let err = f
            .locator
            .find_next_location(&WorldId::from("broken"))
            .await
            .unwrap_err();
        assert!(matches!(err, LocatorError::InvalidWorld { .. }));
    }

    #[tokio::test]
    async fn test_blocked_cells_are_registered_and_skipped() {
        let f = fixture_with(sequential(20), None);
        block(&f, 0, 0);
        block(&f, 0, 128);

        let cell = f.locator.find_next_location(&f.world).await.unwrap();
        assert_eq!(cell, Cell::new(128, 128));
        assert_eq!(f.islands.islands(&f.world), vec![Cell::new(0, 0), Cell::new(0, 128)]);
        assert_eq!(f.terrain.load_count(), 2);
    }

    #[tokio::test]
    async fn test_saturation_reports_once_and_moves_origin() {
        let f = fixture_with(sequential(3), None);
        block(&f, 0, 0);
        block(&f, 0, 128);
        block(&f, 128, 128);

        let err = f.locator.find_next_location(&f.world).await.unwrap_err();
        let LocatorError::Saturated { report, .. } = err else {
            panic!("expected saturation");
        };
        assert_eq!(report.counters.blocked, 3);
        assert_eq!(report.tolerance, 3);

        let reports = f.sink.reports.lock();
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].0, f.world);
        // Next search resumes after the last dispatched cell
        assert_eq!(f.origins.last_search_origin(&f.world), Some(Cell::new(128, 0)));
    }

    #[tokio::test]
    async fn test_failed_loads_count_toward_tolerance() {
        let f = fixture_with(sequential(2), None);
        for anchor in [Cell::new(0, 0), Cell::new(0, 128)] {
            f.terrain.mark_generated(&f.world, anchor.chunk());
            f.terrain.fail_loads_at(&f.world, anchor);
        }

        let err = f.locator.find_next_location(&f.world).await.unwrap_err();
        let LocatorError::Saturated { report, .. } = err else {
            panic!("expected saturation");
        };
        assert_eq!(report.counters.failed_probes, 2);
        assert_eq!(report.counters.blocked, 2);
        // Failures are not obstructions
        assert!(f.islands.islands(&f.world).is_empty());
    }

    #[tokio::test]
    async fn test_panicking_probe_counts_as_blocked() {
        let f = fixture_with(sequential(1), Some(Arc::new(PanickingTerrain)));

        let err = f.locator.find_next_location(&f.world).await.unwrap_err();
        let LocatorError::Saturated { report, .. } = err else {
            panic!("expected saturation");
        };
        assert_eq!(report.counters.failed_probes, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_same_world_searches_are_serialised() {
        let f = fixture_with(sequential(20), None);
        block(&f, 0, 0);
        f.terrain.set_load_delay(Duration::from_millis(50));

        let (first, second) = tokio::join!(
            f.locator.find_next_location(&f.world),
            f.locator.find_next_location(&f.world)
        );

        assert_eq!(first.unwrap(), Cell::new(0, 128));
        assert_eq!(second.unwrap(), Cell::new(0, 128));
        // The second search starts from the first one's result
        assert_eq!(f.terrain.load_count(), 1);
    }

    #[tokio::test]
    async fn test_parallel_probes_still_accept_a_free_cell() {
        let f = fixture_with(
            LocatorSettings {
                tolerance: 20,
                max_in_flight: 8,
                probe_timeout: Duration::from_secs(5),
            },
            None,
        );
        block(&f, 0, 0);

        let cell = f.locator.find_next_location(&f.world).await.unwrap();
        assert_ne!(cell, Cell::new(0, 0));
        assert_eq!(f.origins.last_search_origin(&f.world), Some(cell));

        // The accepted cell is unregistered and untouched by terrain
        assert!(f.islands.island_at(&f.world, cell).is_none());
        assert!(!f.terrain.is_chunk_generated(&f.world, cell.chunk()));
        // The obstructed origin finished loading alongside the others
        assert_eq!(f.islands.islands(&f.world), vec![Cell::new(0, 0)]);
    }

    /// Terrain that records every anchor whose load returned
    #[derive(Default)]
    struct LoadLog {
        inner: InMemoryTerrain,
        completed: Mutex<Vec<Cell>>,
    }

    #[async_trait]
    impl TerrainBackend for LoadLog {
        async fn load_terrain(&self, world: &WorldId, anchor: Cell) -> Result<TerrainSnapshot, ProbeError> {
            let snapshot = self.inner.load_terrain(world, anchor).await?;
            self.completed.lock().push(anchor);
            Ok(snapshot)
        }

        fn is_chunk_generated(&self, world: &WorldId, chunk: ChunkPos) -> bool {
            self.inner.is_chunk_generated(world, chunk)
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_blocked_cells_finished_during_drain_are_registered() {
        let terrain = Arc::new(LoadLog::default());
        let f = fixture_with(
            LocatorSettings {
                tolerance: 20,
                max_in_flight: 16,
                probe_timeout: Duration::from_secs(5),
            },
            Some(terrain.clone() as Arc<dyn TerrainBackend>),
        );
        let spiral: Vec<Cell> = GridWalker::new(Cell::new(0, 0), DISTANCE).take(64).collect();
        let obstructed = &spiral[..12];
        for cell in obstructed {
            terrain
                .inner
                .set_block(&f.world, cell.at_height(HEIGHT), BlockKind::Solid);
        }

        let cell = f.locator.find_next_location(&f.world).await.unwrap();

        // Every obstructed anchor that finished loading is
        // registered, whether it finished before or after acceptance
        let mut completed = terrain.completed.lock().clone();
        completed.sort();
        assert!(completed.iter().all(|c| obstructed.contains(c)));
        assert_eq!(f.islands.islands(&f.world), completed);

        // The answer is the accepted free cell and nothing drained later
        // replaced it
        let position = spiral.iter().position(|c| *c == cell).unwrap();
        assert!(position >= obstructed.len());
        assert!(f.islands.island_at(&f.world, cell).is_none());
        assert_eq!(f.origins.last_search_origin(&f.world), Some(cell));
        assert!(f.sink.reports.lock().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_worlds_leave_no_gate_behind() {
        let f = fixture_with(LocatorSettings::default(), None);

        for i in 0..100 {
            let world = WorldId::new(format!("missing-{i}"));
            let err = f.locator.find_next_location(&world).await.unwrap_err();
            assert!(matches!(err, LocatorError::UnknownWorld(_)));
        }
        assert!(f.locator.gates.lock().is_empty());

        f.locator.find_next_location(&f.world).await.unwrap();
        assert_eq!(f.locator.gates.lock().len(), 1);
    }

    #[test]
    fn test_blocking_wrapper() {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_time()
            .build()
            .unwrap();
        let f = fixture_with(LocatorSettings::default(), None);

        let cell = f
            .locator
            .find_next_location_blocking(runtime.handle(), &f.world)
            .unwrap();
        assert_eq!(cell, Cell::new(0, 0));
    }

    #[test]
    fn test_settings_from_search_config() {
        let config = SearchConfig {
            tolerance: 7,
            max_in_flight: 2,
            probe_timeout_ms: 250,
        };
        let settings = LocatorSettings::from(&config);
        assert_eq!(settings.tolerance, 7);
        assert_eq!(settings.max_in_flight, 2);
        assert_eq!(settings.probe_timeout, Duration::from_millis(250));
    }
}

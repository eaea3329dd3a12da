// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Tolerance-based aggregation of probe reports.
//!
//! Reports arrive in completion order, not dispatch order. The decision only
//! depends on commutative counters plus "first free report wins", so any
//! interleaving of the same reports yields the same verdict for the same
//! first free cell.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::types::{Cell, OutcomeKind, ProbeReport};

/// Blocked outcomes tolerated before a search gives up
pub const DEFAULT_TOLERANCE: u32 = 20;

/// Per-kind tallies for one search; they only grow
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToleranceCounters {
    pub occupied: u32,
    pub blocked: u32,
    /// Probes that errored; each also counts as blocked
    pub failed_probes: u32,
}

impl ToleranceCounters {
    pub fn count(&self, kind: OutcomeKind) -> u32 {
        match kind {
            OutcomeKind::Occupied => self.occupied,
            OutcomeKind::Blocked => self.blocked,
            OutcomeKind::Free => 0,
        }
    }

    fn record(&mut self, kind: OutcomeKind) {
        match kind {
            OutcomeKind::Occupied => self.occupied = self.occupied.saturating_add(1),
            OutcomeKind::Blocked => self.blocked = self.blocked.saturating_add(1),
            OutcomeKind::Free => {}
        }
    }
}

/// Why a search gave up
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaturationReport {
    pub counters: ToleranceCounters,
    pub tolerance: u32,
}

impl fmt::Display for SaturationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "blocks around candidate locations: {} (max {}), known islands: {} (max unlimited), failed probes: {}",
            self.counters.blocked, self.tolerance, self.counters.occupied, self.counters.failed_probes
        )
    }
}

/// Search lifecycle; `Accepted` and `Failed` are terminal
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchState {
    Searching,
    Accepted(Cell),
    Failed(SaturationReport),
}

impl SearchState {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, SearchState::Searching)
    }
}

/// Effect of one report
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Counted; keep searching
    Continue,
    /// This report's cell is the answer
    Accept(Cell),
    /// This report exhausted the tolerance
    Saturated,
    /// The search was already decided; nothing changed
    Ignored,
}

/// Owns the tolerance counters and the search state of one search
#[derive(Debug, Clone)]
pub struct ResultAggregator {
    tolerance: u32,
    counters: ToleranceCounters,
    state: SearchState,
}

impl ResultAggregator {
    pub fn new(tolerance: u32) -> Self {
        Self {
            tolerance,
            counters: ToleranceCounters::default(),
            state: SearchState::Searching,
        }
    }

    /// Fold one probe report into the search
    ///
    /// Failed probes count as blocked. A non-free report that brings the
    /// blocked count to the tolerance fails the search; the first free
    /// report is accepted. Reports after either are ignored.
    pub fn report(&mut self, report: &ProbeReport) -> Decision {
        if self.state.is_terminal() {
            return Decision::Ignored;
        }

        if let ProbeReport::Completed { cell, outcome } = report {
            if outcome.kind() == OutcomeKind::Free {
                self.state = SearchState::Accepted(*cell);
                return Decision::Accept(*cell);
            }
        }

        if matches!(report, ProbeReport::Failed { .. }) {
            self.counters.failed_probes = self.counters.failed_probes.saturating_add(1);
        }
        self.counters.record(report.counted_kind());

        if self.counters.blocked >= self.tolerance {
            self.state = SearchState::Failed(self.saturation_report());
            return Decision::Saturated;
        }
        Decision::Continue
    }

    pub fn counters(&self) -> ToleranceCounters {
        self.counters
    }

    pub fn tolerance(&self) -> u32 {
        self.tolerance
    }

    pub fn state(&self) -> &SearchState {
        &self.state
    }

    pub fn is_terminal(&self) -> bool {
        self.state.is_terminal()
    }

    pub fn accepted(&self) -> Option<Cell> {
        match self.state {
            SearchState::Accepted(cell) => Some(cell),
            _ => None,
        }
    }

    pub fn into_state(self) -> SearchState {
        self.state
    }

    fn saturation_report(&self) -> SaturationReport {
        SaturationReport {
            counters: self.counters,
            tolerance: self.tolerance,
        }
    }
}

impl Default for ResultAggregator {
    fn default() -> Self {
        Self::new(DEFAULT_TOLERANCE)
    }
}

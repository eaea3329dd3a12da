//! Probe classification results.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::{Cell, ProbeError};

/// What makes an occupied cell occupied
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OccupiedBy {
    /// A known island covers the anchor or one of the footprint corners
    Island,
    /// An island covering the footprint is being deleted
    Deletion,
}

/// Classification of one probed cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum ProbeOutcome {
    Occupied { by: OccupiedBy },
    /// Terrain obstructs the slot and no island is registered there.
    /// `register` asks the caller to record the anchor as an island so the
    /// next probe of this footprint short-circuits.
    Blocked { register: bool },
    /// Nothing occupies the slot; `generated` is false when none of the
    /// footprint's terrain exists yet
    Free { generated: bool },
}

impl ProbeOutcome {
    pub fn kind(&self) -> OutcomeKind {
        match self {
            ProbeOutcome::Occupied { .. } => OutcomeKind::Occupied,
            ProbeOutcome::Blocked { .. } => OutcomeKind::Blocked,
            ProbeOutcome::Free { .. } => OutcomeKind::Free,
        }
    }

    /// True when the anchor should be registered as an occupied slot
    pub fn wants_registration(&self) -> bool {
        matches!(self, ProbeOutcome::Blocked { register: true })
    }
}

/// Outcome kind, the key of the tolerance counters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeKind {
    Occupied,
    Blocked,
    Free,
}

impl fmt::Display for OutcomeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OutcomeKind::Occupied => "occupied",
            OutcomeKind::Blocked => "blocked",
            OutcomeKind::Free => "free",
        };
        f.write_str(name)
    }
}

/// One completed probe, as delivered to the aggregator
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeReport {
    Completed { cell: Cell, outcome: ProbeOutcome },
    /// The probe errored or its task died. `cell` is `None` when the task
    /// panicked before it could say which cell it was probing.
    Failed { cell: Option<Cell>, error: ProbeError },
}

impl ProbeReport {
    pub fn from_result(cell: Cell, result: Result<ProbeOutcome, ProbeError>) -> Self {
        match result {
            Ok(outcome) => ProbeReport::Completed { cell, outcome },
            Err(error) => ProbeReport::Failed {
                cell: Some(cell),
                error,
            },
        }
    }

    pub fn cell(&self) -> Option<Cell> {
        match self {
            ProbeReport::Completed { cell, .. } => Some(*cell),
            ProbeReport::Failed { cell, .. } => *cell,
        }
    }

    /// Kind this report counts as; failures count as blocked
    pub fn counted_kind(&self) -> OutcomeKind {
        match self {
            ProbeReport::Completed { outcome, .. } => outcome.kind(),
            ProbeReport::Failed { .. } => OutcomeKind::Blocked,
        }
    }
}

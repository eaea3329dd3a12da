/*!
Diagnostic sink for search failures.

Copyright 2025 Neuraville Inc.
Licensed under the Apache License, Version 2.0
*/

use crate::aggregator::SaturationReport;
use crate::types::WorldId;

/// Receives one report per failed search
pub trait DiagnosticSink: Send + Sync {
    /// The search in `world` exhausted its tolerance without a free slot
    fn saturated(&self, world: &WorldId, report: &SaturationReport);
}

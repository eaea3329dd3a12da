/*!
Diagnostic sink that writes saturation reports to the log.
*/

use tracing::error;

use crate::aggregator::SaturationReport;
use crate::traits::DiagnosticSink;
use crate::types::WorldId;

/// Logs each saturation report at error level
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn saturated(&self, world: &WorldId, report: &SaturationReport) {
        error!(target: "islegrid-locator", %world, "Could not find a free spot for islands! Is this world empty?");
        error!(
            target: "islegrid-locator",
            %world,
            blocked = report.counters.blocked,
            tolerance = report.tolerance,
            "Blocks around center locations: {} max {}",
            report.counters.blocked,
            report.tolerance
        );
        error!(
            target: "islegrid-locator",
            %world,
            occupied = report.counters.occupied,
            failed_probes = report.counters.failed_probes,
            "Known islands: {} max unlimited.",
            report.counters.occupied
        );
    }
}

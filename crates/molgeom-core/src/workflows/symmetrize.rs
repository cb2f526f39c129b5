use crate::core::models::geometry::Geometry;
use crate::engine::config::SymmetrizationConfig;
use crate::engine::error::EngineError;
use crate::engine::progress::{Progress, ProgressReporter};
use crate::engine::symmetry::{SymmetrizationResult, symmetrize};
use tracing::{info, instrument, warn};

/// Refines a near-symmetric geometry onto its detected point group.
///
/// This is the phased, logged wrapper around
/// [`symmetrize`](crate::engine::symmetry::symmetrize); per-iteration
/// progress events from the engine loop pass through `reporter` unchanged.
///
/// # Errors
///
/// Propagates [`EngineError`] from detection (empty input).
#[instrument(skip_all, name = "symmetrization_workflow")]
pub fn run(
    geometry: &Geometry,
    config: &SymmetrizationConfig,
    reporter: &ProgressReporter,
) -> Result<SymmetrizationResult, EngineError> {
    reporter.report(Progress::PhaseStart {
        name: "Symmetrization",
    });
    info!(atoms = geometry.len(), "Starting symmetrization.");

    let result = symmetrize(geometry, config, reporter)?;

    if result.converged {
        info!(
            point_group = %result.point_group,
            iterations = result.iterations,
            "Symmetrization converged."
        );
    } else {
        warn!(
            point_group = %result.point_group,
            iterations = result.iterations,
            max_shift = result.max_shift,
            "Symmetrization stopped without converging."
        );
    }
    reporter.report(Progress::PhaseFinish);

    Ok(result)
}

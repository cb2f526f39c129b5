use crate::core::models::geometry::Geometry;
use crate::engine::bonds::{BondGraph, build_bonds};
use crate::engine::config::AnalysisConfig;
use crate::engine::error::EngineError;
use crate::engine::progress::{Progress, ProgressReporter};
use crate::engine::symmetry::{SymmetryAnalysis, detect_point_group};
use tracing::{info, instrument};

/// The combined structural picture of a geometry: its bond connectivity and
/// its point-group analysis.
#[derive(Debug, Clone)]
pub struct AnalysisReport {
    pub bond_graph: BondGraph,
    pub symmetry: SymmetryAnalysis,
}

/// Runs bond perception and point-group detection on a geometry.
///
/// # Errors
///
/// Propagates [`EngineError`] from bond perception (unknown elements) and
/// from detection (empty input).
#[instrument(skip_all, name = "analysis_workflow")]
pub fn run(
    geometry: &Geometry,
    config: &AnalysisConfig,
    reporter: &ProgressReporter,
) -> Result<AnalysisReport, EngineError> {
    reporter.report(Progress::PhaseStart {
        name: "Bond Perception",
    });
    info!(atoms = geometry.len(), "Starting structural analysis.");
    let bond_graph = build_bonds(geometry, &config.bonding)?;
    info!(bonds = bond_graph.bond_count(), "Bond perception finished.");
    reporter.report(Progress::PhaseFinish);

    reporter.report(Progress::PhaseStart {
        name: "Symmetry Detection",
    });
    let symmetry = detect_point_group(geometry, &config.symmetry)?;
    info!(point_group = %symmetry.point_group, "Symmetry detection finished.");
    reporter.report(Progress::PhaseFinish);

    Ok(AnalysisReport {
        bond_graph,
        symmetry,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::symmetry::PointGroup;
    use nalgebra::Point3;
    use std::sync::Mutex;

    fn water() -> (Geometry, Vec<crate::core::models::ids::AtomId>) {
        Geometry::from_records([
            ("O", Point3::new(0.0, 0.0, 0.0)),
            ("H", Point3::new(0.757, 0.586, 0.0)),
            ("H", Point3::new(-0.757, 0.586, 0.0)),
        ])
    }

    #[test]
    fn water_report_combines_bonds_and_point_group() {
        let (geometry, ids) = water();
        let mut config = AnalysisConfig::default();
        config.symmetry.distance_tolerance = 0.1;

        let report = run(&geometry, &config, &ProgressReporter::new()).unwrap();
        assert_eq!(report.bond_graph.bond_count(), 2);
        assert!(report.bond_graph.are_bonded(ids[0], ids[1]));
        assert!(!report.bond_graph.are_bonded(ids[1], ids[2]));
        assert_eq!(report.symmetry.point_group, PointGroup::Cnv(2));
    }

    #[test]
    fn phases_are_reported_in_order() {
        let (geometry, _) = water();
        let phases = Mutex::new(Vec::new());
        let reporter = ProgressReporter::with_callback(Box::new(|event| {
            if let Progress::PhaseStart { name } = event {
                phases.lock().unwrap().push(name);
            }
        }));
        run(&geometry, &AnalysisConfig::default(), &reporter).unwrap();
        drop(reporter);
        assert_eq!(
            phases.into_inner().unwrap(),
            vec!["Bond Perception", "Symmetry Detection"]
        );
    }

    #[test]
    fn unknown_element_aborts_the_workflow() {
        let (geometry, _) = Geometry::from_records([("Xx", Point3::origin())]);
        let err = run(
            &geometry,
            &AnalysisConfig::default(),
            &ProgressReporter::new(),
        )
        .unwrap_err();
        assert!(matches!(err, EngineError::UnknownElement { .. }));
    }
}

use super::detect::{SymmetryAnalysis, detect_point_group, sites_in_centroid_frame};
use super::operations::{Site, generate_group, permutation_under};
use super::point_group::PointGroup;
use crate::core::models::geometry::Geometry;
use crate::core::models::ids::AtomId;
use crate::engine::config::SymmetrizationConfig;
use crate::engine::error::EngineError;
use crate::engine::progress::{Progress, ProgressReporter};
use nalgebra::{Matrix3, Point3};
use std::collections::BTreeMap;

/// The outcome of iterative symmetrization.
#[derive(Debug, Clone)]
pub struct SymmetrizationResult {
    /// The adjusted geometry, ids preserved.
    pub geometry: Geometry,
    /// The point group the final geometry satisfies.
    pub point_group: PointGroup,
    /// Maps every atom id to the lowest id in its symmetry-equivalence class.
    pub equivalence_classes: BTreeMap<AtomId, AtomId>,
    /// Number of averaging iterations performed.
    pub iterations: usize,
    /// Whether the loop reached a fixed point within the iteration budget.
    /// `false` is a warning, not an error: `geometry` still holds the best
    /// iterate found.
    pub converged: bool,
    /// Largest positional shift (Angstroms) of the final iteration.
    pub max_shift: f64,
}

/// Nudges a near-symmetric geometry onto the closest configuration that
/// satisfies its detected point group essentially exactly.
///
/// Each iteration detects the point group, closes the detected generators
/// into the full operation group, and replaces every position with its orbit
/// average: the mean of `R_gᵀ · q_image(g)` over all group operations `g`
/// whose atom permutation holds. Averaging preserves the centroid; it never
/// relabels or reorders atoms. The loop stops once the detected group is
/// stable and the largest shift drops below `config.convergence_epsilon`, or
/// after `config.max_iterations` rounds, whichever comes first. Hitting the
/// budget logs a warning and reports `converged: false`.
///
/// Linear molecules are handled by projecting every atom onto the principal
/// axis (and averaging inversion partners for centrosymmetric ones), since
/// their symmetry group is continuous. A `C1` or `Kh` input has nothing to
/// average and is returned unchanged.
///
/// One [`Progress::Iteration`] event is reported per round.
///
/// # Errors
///
/// Returns [`EngineError::DegenerateInput`] for an empty geometry.
pub fn symmetrize(
    geometry: &Geometry,
    config: &SymmetrizationConfig,
    reporter: &ProgressReporter,
) -> Result<SymmetrizationResult, EngineError> {
    let tolerance = config.symmetry.distance_tolerance;
    let mut current = geometry.clone();
    let mut analysis = detect_point_group(&current, &config.symmetry)?;

    let mut iterations = 0;
    let mut max_shift = 0.0;
    let mut converged = matches!(analysis.point_group, PointGroup::Kh | PointGroup::C1);

    if !converged {
        while iterations < config.max_iterations {
            let updates = match analysis.point_group {
                PointGroup::Cinfv | PointGroup::Dinfh => {
                    linear_updates(&current, &analysis, tolerance)?
                }
                _ => orbit_average_updates(&current, &analysis, tolerance)?,
            };
            max_shift = apply_updates(&mut current, &updates);
            let previous_group = analysis.point_group;
            iterations += 1;

            reporter.report(Progress::Iteration {
                index: iterations - 1,
                point_group: previous_group.to_string(),
                max_shift,
            });
            tracing::debug!(
                iteration = iterations,
                point_group = %previous_group,
                max_shift,
                "symmetrization iteration"
            );

            analysis = detect_point_group(&current, &config.symmetry)?;
            if analysis.point_group == previous_group && max_shift < config.convergence_epsilon {
                converged = true;
                break;
            }
        }
        if !converged {
            tracing::warn!(
                iterations,
                max_shift,
                point_group = %analysis.point_group,
                "symmetrization hit the iteration budget before converging"
            );
        }
    }

    let matrices: Vec<Matrix3<f64>> =
        analysis.operations.iter().map(|op| op.matrix).collect();
    let group = generate_group(&matrices);
    let (_, sites) = sites_in_centroid_frame(&current)?;
    let equivalence_classes = equivalence_classes(&sites, &group, tolerance);

    Ok(SymmetrizationResult {
        geometry: current,
        point_group: analysis.point_group,
        equivalence_classes,
        iterations,
        converged,
        max_shift,
    })
}

/// One round of orbit averaging over the closed operation group.
fn orbit_average_updates(
    current: &Geometry,
    analysis: &SymmetryAnalysis,
    tolerance: f64,
) -> Result<Vec<(AtomId, Point3<f64>)>, EngineError> {
    let (centroid, sites) = sites_in_centroid_frame(current)?;
    let index_of: BTreeMap<AtomId, usize> = sites
        .iter()
        .enumerate()
        .map(|(index, site)| (site.id, index))
        .collect();

    let matrices: Vec<Matrix3<f64>> =
        analysis.operations.iter().map(|op| op.matrix).collect();
    let group = generate_group(&matrices);

    let mut sums = vec![nalgebra::Vector3::zeros(); sites.len()];
    let mut used = 0usize;
    for matrix in &group {
        // Operations whose permutation no longer holds on the current iterate
        // (an artifact of tolerant closure) are skipped.
        let Some(permutation) = permutation_under(&sites, matrix, tolerance) else {
            continue;
        };
        used += 1;
        for (index, site) in sites.iter().enumerate() {
            let image = sites[index_of[&permutation[&site.id]]].position.coords;
            sums[index] += matrix.transpose() * image;
        }
    }

    // Exactly coincident same-label atoms defeat the bijective matching for
    // every operation, the identity included. Fail instead of dividing by
    // zero and flooding the geometry with NaN.
    if used == 0 {
        return Err(EngineError::DegenerateInput {
            reason: "coincident same-label atoms defeat symmetry-operation matching".to_string(),
        });
    }

    Ok(sites
        .iter()
        .enumerate()
        .map(|(index, site)| (site.id, centroid + sums[index] / used as f64))
        .collect())
}

/// Projects a linear molecule onto its principal axis; for a centrosymmetric
/// one, additionally averages each atom with its inversion partner.
fn linear_updates(
    current: &Geometry,
    analysis: &SymmetryAnalysis,
    tolerance: f64,
) -> Result<Vec<(AtomId, Point3<f64>)>, EngineError> {
    let (centroid, sites) = sites_in_centroid_frame(current)?;
    let axis = analysis.principal_axes[0].into_inner();

    let mut projected: Vec<Site> = sites
        .iter()
        .map(|site| Site {
            id: site.id,
            symbol: site.symbol.clone(),
            position: Point3::from(axis * site.position.coords.dot(&axis)),
        })
        .collect();

    if analysis.point_group == PointGroup::Dinfh {
        let inversion = -Matrix3::<f64>::identity();
        if let Some(permutation) = permutation_under(&projected, &inversion, tolerance) {
            let index_of: BTreeMap<AtomId, usize> = projected
                .iter()
                .enumerate()
                .map(|(index, site)| (site.id, index))
                .collect();
            let averaged: Vec<Point3<f64>> = projected
                .iter()
                .map(|site| {
                    let image =
                        projected[index_of[&permutation[&site.id]]].position.coords;
                    Point3::from((site.position.coords - image) / 2.0)
                })
                .collect();
            for (site, position) in projected.iter_mut().zip(averaged) {
                site.position = position;
            }
        }
    }

    Ok(projected
        .iter()
        .map(|site| (site.id, centroid + site.position.coords))
        .collect())
}

/// Writes updated positions back and returns the largest shift.
fn apply_updates(geometry: &mut Geometry, updates: &[(AtomId, Point3<f64>)]) -> f64 {
    let mut max_shift = 0.0f64;
    for (id, position) in updates {
        let atom = geometry.atom_mut(*id).expect("id from the same geometry");
        max_shift = max_shift.max((atom.position - position).norm());
        atom.position = *position;
    }
    max_shift
}

/// Unions atoms related by any holding group operation; every atom maps to
/// the lowest id of its class.
fn equivalence_classes(
    sites: &[Site],
    group: &[Matrix3<f64>],
    tolerance: f64,
) -> BTreeMap<AtomId, AtomId> {
    let mut parent: BTreeMap<AtomId, AtomId> =
        sites.iter().map(|site| (site.id, site.id)).collect();
    for matrix in group {
        if let Some(permutation) = permutation_under(sites, matrix, tolerance) {
            for (a, b) in permutation {
                union(&mut parent, a, b);
            }
        }
    }
    let ids: Vec<AtomId> = parent.keys().copied().collect();
    for id in ids {
        let root = find(&mut parent, id);
        parent.insert(id, root);
    }
    parent
}

fn find(parent: &mut BTreeMap<AtomId, AtomId>, id: AtomId) -> AtomId {
    let up = parent[&id];
    if up == id {
        return id;
    }
    let root = find(parent, up);
    parent.insert(id, root);
    root
}

fn union(parent: &mut BTreeMap<AtomId, AtomId>, a: AtomId, b: AtomId) {
    let root_a = find(parent, a);
    let root_b = find(parent, b);
    if root_a == root_b {
        return;
    }
    // Keep the lowest id as the class representative.
    let (root, child) = if root_a < root_b {
        (root_a, root_b)
    } else {
        (root_b, root_a)
    };
    parent.insert(child, root);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::config::SymmetryConfig;
    use std::sync::Mutex;

    fn distorted_water() -> (Geometry, Vec<AtomId>) {
        // Water with one hydrogen pulled off the ideal C2v arrangement.
        Geometry::from_records([
            ("O", Point3::new(0.0, 0.0, 0.0)),
            ("H", Point3::new(0.757, 0.626, -0.03)),
            ("H", Point3::new(-0.757, 0.586, 0.0)),
        ])
    }

    fn water_config() -> SymmetrizationConfig {
        SymmetrizationConfig::builder().distance_tolerance(0.1).build()
    }

    #[test]
    fn distorted_water_recovers_c2v_with_equal_bond_lengths() {
        let (geometry, ids) = distorted_water();
        let result =
            symmetrize(&geometry, &water_config(), &ProgressReporter::new()).unwrap();

        assert!(result.converged);
        assert_eq!(result.point_group, PointGroup::Cnv(2));

        let o = result.geometry.atom(ids[0]).unwrap().position;
        let h1 = result.geometry.atom(ids[1]).unwrap().position;
        let h2 = result.geometry.atom(ids[2]).unwrap().position;
        assert!(((o - h1).norm() - (o - h2).norm()).abs() < 1e-6);
    }

    #[test]
    fn symmetrization_moves_the_geometry_toward_the_ideal_arrangement() {
        let (geometry, ids) = distorted_water();
        let mut reference = geometry.clone();
        reference.atom_mut(ids[1]).unwrap().position = Point3::new(0.757, 0.586, 0.0);

        let before =
            crate::engine::align::rmsd_over_matching_ids(&geometry, &reference).unwrap();
        let result =
            symmetrize(&geometry, &water_config(), &ProgressReporter::new()).unwrap();
        let after =
            crate::engine::align::rmsd_over_matching_ids(&result.geometry, &reference)
                .unwrap();
        assert!(after < before);
    }

    #[test]
    fn symmetrization_is_idempotent() {
        let (geometry, _) = distorted_water();
        let first =
            symmetrize(&geometry, &water_config(), &ProgressReporter::new()).unwrap();
        let second =
            symmetrize(&first.geometry, &water_config(), &ProgressReporter::new()).unwrap();

        assert_eq!(second.point_group, first.point_group);
        assert!(second.converged);
        assert!(second.max_shift < 1e-6);
    }

    #[test]
    fn symmetrized_output_passes_detection_at_a_much_tighter_tolerance() {
        let (geometry, _) = distorted_water();
        let result =
            symmetrize(&geometry, &water_config(), &ProgressReporter::new()).unwrap();

        let strict = SymmetryConfig {
            distance_tolerance: 1e-4,
            ..SymmetryConfig::default()
        };
        let analysis = detect_point_group(&result.geometry, &strict).unwrap();
        assert_eq!(analysis.point_group, PointGroup::Cnv(2));
    }

    #[test]
    fn water_equivalence_classes_pair_the_hydrogens() {
        let (geometry, ids) = distorted_water();
        let result =
            symmetrize(&geometry, &water_config(), &ProgressReporter::new()).unwrap();

        assert_eq!(result.equivalence_classes[&ids[0]], ids[0]);
        let h_rep = ids[1].min(ids[2]);
        assert_eq!(result.equivalence_classes[&ids[1]], h_rep);
        assert_eq!(result.equivalence_classes[&ids[2]], h_rep);
    }

    #[test]
    fn asymmetric_scatter_is_returned_unchanged() {
        let (geometry, ids) = Geometry::from_records([
            ("C", Point3::new(0.0, 0.0, 0.0)),
            ("N", Point3::new(1.3, 0.2, -0.1)),
            ("O", Point3::new(-0.4, 1.1, 0.7)),
            ("H", Point3::new(0.8, -0.9, 1.2)),
        ]);
        let result = symmetrize(
            &geometry,
            &SymmetrizationConfig::default(),
            &ProgressReporter::new(),
        )
        .unwrap();

        assert_eq!(result.point_group, PointGroup::C1);
        assert!(result.converged);
        assert_eq!(result.iterations, 0);
        for id in &ids {
            assert_eq!(
                result.geometry.atom(*id).unwrap().position,
                geometry.atom(*id).unwrap().position
            );
            // Every atom is its own class.
            assert_eq!(result.equivalence_classes[id], *id);
        }
    }

    #[test]
    fn single_atom_is_returned_unchanged_as_kh() {
        let (geometry, ids) = Geometry::from_records([("Ne", Point3::new(1.0, -2.0, 3.0))]);
        let result = symmetrize(
            &geometry,
            &SymmetrizationConfig::default(),
            &ProgressReporter::new(),
        )
        .unwrap();
        assert_eq!(result.point_group, PointGroup::Kh);
        assert!(result.converged);
        assert_eq!(
            result.geometry.atom(ids[0]).unwrap().position,
            Point3::new(1.0, -2.0, 3.0)
        );
    }

    #[test]
    fn bent_linear_molecule_is_straightened_and_centered() {
        let (geometry, ids) = Geometry::from_records([
            ("O", Point3::new(0.03, 0.0, 1.16)),
            ("C", Point3::new(0.0, 0.0, 0.01)),
            ("O", Point3::new(0.0, 0.0, -1.16)),
        ]);
        let result = symmetrize(
            &geometry,
            &SymmetrizationConfig::builder().distance_tolerance(0.1).build(),
            &ProgressReporter::new(),
        )
        .unwrap();

        assert!(result.converged);
        assert_eq!(result.point_group, PointGroup::Dinfh);

        let o1 = result.geometry.atom(ids[0]).unwrap().position;
        let c = result.geometry.atom(ids[1]).unwrap().position;
        let o2 = result.geometry.atom(ids[2]).unwrap().position;
        assert!((o1 - c).cross(&(o2 - c)).norm() < 1e-6);
        assert!(((o1 - c).norm() - (o2 - c).norm()).abs() < 1e-6);
        assert_eq!(result.equivalence_classes[&ids[0]], ids[0].min(ids[2]));
        assert_eq!(result.equivalence_classes[&ids[2]], ids[0].min(ids[2]));
    }

    #[test]
    fn zero_iteration_budget_reports_non_convergence() {
        let (geometry, _) = distorted_water();
        let config = SymmetrizationConfig::builder()
            .distance_tolerance(0.1)
            .max_iterations(0)
            .build();
        let result = symmetrize(&geometry, &config, &ProgressReporter::new()).unwrap();
        assert!(!result.converged);
        assert_eq!(result.iterations, 0);
    }

    #[test]
    fn iteration_events_reach_the_progress_callback() {
        let (geometry, _) = distorted_water();
        let events = Mutex::new(Vec::new());
        let reporter = ProgressReporter::with_callback(Box::new(|event| {
            if let Progress::Iteration { index, .. } = event {
                events.lock().unwrap().push(index);
            }
        }));
        symmetrize(&geometry, &water_config(), &reporter).unwrap();
        drop(reporter);

        let events = events.into_inner().unwrap();
        assert!(!events.is_empty());
        assert_eq!(events[0], 0);
    }

    #[test]
    fn coincident_atoms_fail_orbit_averaging_instead_of_producing_nan() {
        use super::super::operations::SymmetryOperation;
        use nalgebra::{Unit, Vector3};

        // Two hydrogens at exactly the same point: no operation, not even the
        // identity, induces a bijective atom map.
        let (geometry, _) = Geometry::from_records([
            ("O", Point3::new(0.0, 0.0, 0.0)),
            ("H", Point3::new(0.95, 0.0, 0.0)),
            ("H", Point3::new(0.95, 0.0, 0.0)),
            ("H", Point3::new(0.0, 0.95, 0.0)),
        ]);
        let analysis = SymmetryAnalysis {
            point_group: PointGroup::Cs,
            operations: vec![SymmetryOperation::identity()],
            centroid: geometry.centroid().unwrap(),
            principal_moments: [0.0; 3],
            principal_axes: [
                Unit::new_normalize(Vector3::x()),
                Unit::new_normalize(Vector3::y()),
                Unit::new_normalize(Vector3::z()),
            ],
        };

        let err = orbit_average_updates(&geometry, &analysis, 0.1).unwrap_err();
        assert!(matches!(err, EngineError::DegenerateInput { .. }));
    }

    #[test]
    fn empty_geometry_is_degenerate() {
        let err = symmetrize(
            &Geometry::new(),
            &SymmetrizationConfig::default(),
            &ProgressReporter::new(),
        )
        .unwrap_err();
        assert!(matches!(err, EngineError::DegenerateInput { .. }));
    }
}

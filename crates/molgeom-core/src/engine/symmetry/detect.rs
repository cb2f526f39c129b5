use super::operations::{Site, SymmetryOperation, permutation_under};
use super::point_group::PointGroup;
use crate::core::models::geometry::Geometry;
use crate::engine::config::SymmetryConfig;
use crate::engine::error::EngineError;
use nalgebra::{Matrix3, Point3, SymmetricEigen, Unit, Vector3};

/// Atoms closer than this to an axis or plane contribute no usable direction
/// when generating candidate axes.
const DIRECTION_EPSILON: f64 = 1e-3;

/// Two candidate directions closer than ~2 degrees are treated as the same
/// axis or plane normal.
const PARALLEL_DOT: f64 = 0.9994;

/// The outcome of point-group detection.
///
/// All operations are expressed in the centroid frame: translate a geometry
/// by `-centroid` before applying an operation matrix.
#[derive(Debug, Clone)]
pub struct SymmetryAnalysis {
    pub point_group: PointGroup,
    /// Every symmetry operation found during detection (always at least the
    /// identity). This is a generating set, not necessarily the full group.
    pub operations: Vec<SymmetryOperation>,
    pub centroid: Point3<f64>,
    /// Principal moments of inertia, ascending.
    pub principal_moments: [f64; 3],
    /// Principal axes corresponding to `principal_moments`.
    pub principal_axes: [Unit<Vector3<f64>>; 3],
}

/// Classifies the point group of a geometry within a numeric tolerance.
///
/// The identity-weighted inertia tensor about the centroid is diagonalized
/// and the degeneracy pattern of its principal moments selects the rotor
/// class (linear, spherical, symmetric, or asymmetric top), which bounds the
/// candidate symmetry axes. Each candidate operation is accepted when it maps
/// every atom onto a same-label atom within `config.distance_tolerance`
/// (nearest-neighbor matching, ties broken by lowest atom id). The detected
/// generator set is combined into a label via the standard molecular
/// point-group decision tree.
///
/// Identity weighting is used rather than atomic masses: the engine carries
/// no mass table, and for label-preserving operations the detected group is
/// the same.
///
/// A geometry satisfying no nontrivial operation is `C1`, a successful
/// result, not an error. Loosening the tolerance never shrinks the detected
/// operation set.
///
/// # Errors
///
/// Returns [`EngineError::DegenerateInput`] for an empty geometry.
pub fn detect_point_group(
    geometry: &Geometry,
    config: &SymmetryConfig,
) -> Result<SymmetryAnalysis, EngineError> {
    let (centroid, sites) = sites_in_centroid_frame(geometry)?;

    let inertia = inertia_tensor(&sites);
    let (moments, axes) = sorted_eigensystem(&inertia);

    let mut detector = Detector {
        sites,
        tolerance: config.distance_tolerance,
        max_order: config.max_rotation_order.max(2),
        found: vec![SymmetryOperation::identity()],
    };

    let point_group = if detector.sites.len() == 1 || moments[2] < 1e-12 {
        PointGroup::Kh
    } else {
        let spread_low = (moments[1] - moments[0]) / moments[2];
        let spread_high = (moments[2] - moments[1]) / moments[2];
        let tol = config.moment_tolerance;

        if moments[0] / moments[2] < tol && spread_high < tol {
            detector.analyse_linear()
        } else if spread_low < tol && spread_high < tol {
            detector.analyse_spherical(&axes)
        } else if spread_low < tol {
            detector.analyse_symmetric(axes[2], &axes)
        } else if spread_high < tol {
            detector.analyse_symmetric(axes[0], &axes)
        } else {
            detector.analyse_asymmetric(&axes)
        }
    };

    Ok(SymmetryAnalysis {
        point_group,
        operations: detector.found,
        centroid,
        principal_moments: moments,
        principal_axes: axes,
    })
}

/// Shifts a geometry into its centroid frame as match sites, in ascending id
/// order for deterministic matching.
pub(crate) fn sites_in_centroid_frame(
    geometry: &Geometry,
) -> Result<(Point3<f64>, Vec<Site>), EngineError> {
    let centroid = geometry
        .centroid()
        .ok_or_else(|| EngineError::DegenerateInput {
            reason: "cannot analyse an empty geometry".to_string(),
        })?;
    let mut sites: Vec<Site> = geometry
        .iter()
        .map(|(id, atom)| Site {
            id,
            symbol: atom.symbol.clone(),
            position: Point3::from(atom.position - centroid),
        })
        .collect();
    sites.sort_by_key(|site| site.id);
    Ok((centroid, sites))
}

fn inertia_tensor(sites: &[Site]) -> Matrix3<f64> {
    let mut tensor = Matrix3::zeros();
    for site in sites {
        let r = site.position.coords;
        tensor += Matrix3::identity() * r.norm_squared() - r * r.transpose();
    }
    tensor
}

fn sorted_eigensystem(tensor: &Matrix3<f64>) -> ([f64; 3], [Unit<Vector3<f64>>; 3]) {
    let eigen = SymmetricEigen::new(*tensor);
    let mut order = [0usize, 1, 2];
    order.sort_by(|&a, &b| {
        eigen.eigenvalues[a]
            .partial_cmp(&eigen.eigenvalues[b])
            .expect("inertia moments are finite")
    });
    let moments = [
        eigen.eigenvalues[order[0]],
        eigen.eigenvalues[order[1]],
        eigen.eigenvalues[order[2]],
    ];
    let axes = [
        Unit::new_normalize(eigen.eigenvectors.column(order[0]).into_owned()),
        Unit::new_normalize(eigen.eigenvectors.column(order[1]).into_owned()),
        Unit::new_normalize(eigen.eigenvectors.column(order[2]).into_owned()),
    ];
    (moments, axes)
}

struct Detector {
    sites: Vec<Site>,
    tolerance: f64,
    max_order: u32,
    found: Vec<SymmetryOperation>,
}

impl Detector {
    /// Tests a candidate operation and records it when it holds.
    fn try_op(&mut self, op: SymmetryOperation) -> bool {
        if permutation_under(&self.sites, &op.matrix, self.tolerance).is_none() {
            return false;
        }
        let already_known = self
            .found
            .iter()
            .any(|known| (known.matrix - op.matrix).abs().max() < 1e-6);
        if !already_known {
            self.found.push(op);
        }
        true
    }

    /// Highest proper rotation order (within the search bound) about `axis`;
    /// 1 when no rotation holds.
    fn highest_proper_order(&mut self, axis: Unit<Vector3<f64>>) -> u32 {
        for order in (2..=self.max_order).rev() {
            if self.try_op(SymmetryOperation::proper(order, axis)) {
                return order;
            }
        }
        1
    }

    fn has_inversion(&mut self) -> bool {
        self.try_op(SymmetryOperation::inversion())
    }

    fn has_mirror(&mut self, normal: Unit<Vector3<f64>>) -> bool {
        self.try_op(SymmetryOperation::mirror(normal))
    }

    // --- Rotor-class analyses -------------------------------------------

    fn analyse_linear(&mut self) -> PointGroup {
        if self.has_inversion() {
            PointGroup::Dinfh
        } else {
            PointGroup::Cinfv
        }
    }

    fn analyse_spherical(&mut self, axes: &[Unit<Vector3<f64>>; 3]) -> PointGroup {
        let mut best = 1;
        for axis in self.spherical_axis_candidates() {
            best = best.max(self.highest_proper_order(axis));
        }
        let has_inversion = self.has_inversion();
        match best {
            order if order >= 5 => {
                if has_inversion {
                    PointGroup::Ih
                } else {
                    PointGroup::I
                }
            }
            4 => {
                if has_inversion {
                    PointGroup::Oh
                } else {
                    PointGroup::O
                }
            }
            3 => {
                if has_inversion {
                    PointGroup::Th
                } else if self.any_global_mirror(axes) {
                    PointGroup::Td
                } else {
                    PointGroup::T
                }
            }
            // Accidental moment degeneracy without cubic symmetry: fall back
            // to the asymmetric-top tree over the principal axes.
            _ => self.analyse_asymmetric(axes),
        }
    }

    fn analyse_symmetric(
        &mut self,
        unique_axis: Unit<Vector3<f64>>,
        axes: &[Unit<Vector3<f64>>; 3],
    ) -> PointGroup {
        let order = self.highest_proper_order(unique_axis);
        if order == 1 {
            // Accidental degeneracy without rotational symmetry about the
            // unique axis.
            return self.analyse_asymmetric(axes);
        }
        if self.any_perpendicular_c2(unique_axis) {
            self.classify_dihedral(order, unique_axis)
        } else {
            self.classify_cyclic(order, unique_axis)
        }
    }

    fn analyse_asymmetric(&mut self, axes: &[Unit<Vector3<f64>>; 3]) -> PointGroup {
        let c2_axes: Vec<Unit<Vector3<f64>>> = axes
            .iter()
            .copied()
            .filter(|&axis| self.try_op(SymmetryOperation::proper(2, axis)))
            .collect();

        match c2_axes.len() {
            0 => {
                if self.any_global_mirror(axes) {
                    PointGroup::Cs
                } else if self.has_inversion() {
                    PointGroup::Ci
                } else {
                    PointGroup::C1
                }
            }
            1 => self.classify_cyclic(2, c2_axes[0]),
            // Two C2 axes imply the third; an asymmetric top tops out at the
            // D2 family.
            _ => self.classify_dihedral(2, c2_axes[0]),
        }
    }

    // --- Family classification ------------------------------------------

    fn classify_dihedral(&mut self, order: u32, axis: Unit<Vector3<f64>>) -> PointGroup {
        if self.has_mirror(axis) {
            PointGroup::Dnh(order)
        } else if self.any_sigma_v(axis) {
            PointGroup::Dnd(order)
        } else {
            PointGroup::Dn(order)
        }
    }

    fn classify_cyclic(&mut self, order: u32, axis: Unit<Vector3<f64>>) -> PointGroup {
        if self.has_mirror(axis) {
            PointGroup::Cnh(order)
        } else if self.any_sigma_v(axis) {
            PointGroup::Cnv(order)
        } else if self.try_op(SymmetryOperation::improper(2 * order, axis)) {
            PointGroup::Sn(2 * order)
        } else {
            PointGroup::Cn(order)
        }
    }

    // --- Candidate generation -------------------------------------------

    /// True when any C2 axis perpendicular to `axis` holds. Mathematically a
    /// single such axis already promotes Cn to Dn, so the scan records every
    /// passing axis (for downstream group generation) but only existence
    /// matters for classification.
    fn any_perpendicular_c2(&mut self, axis: Unit<Vector3<f64>>) -> bool {
        let mut found = false;
        for candidate in self.perpendicular_axis_candidates(axis) {
            if self.try_op(SymmetryOperation::proper(2, candidate)) {
                found = true;
            }
        }
        found
    }

    /// True when any mirror plane containing `axis` holds.
    fn any_sigma_v(&mut self, axis: Unit<Vector3<f64>>) -> bool {
        let mut found = false;
        for normal in self.sigma_v_normal_candidates(axis) {
            if self.has_mirror(normal) {
                found = true;
            }
        }
        found
    }

    /// True when any mirror plane at all holds (used for Cs and Td).
    fn any_global_mirror(&mut self, axes: &[Unit<Vector3<f64>>; 3]) -> bool {
        let mut found = false;
        for normal in self.global_mirror_normal_candidates(axes) {
            if self.has_mirror(normal) {
                found = true;
            }
        }
        found
    }

    /// Candidate C2 axes perpendicular to `axis`: in-plane projections of the
    /// atoms and of midpoints of same-label pairs.
    fn perpendicular_axis_candidates(
        &self,
        axis: Unit<Vector3<f64>>,
    ) -> Vec<Unit<Vector3<f64>>> {
        let mut candidates = Vec::new();
        for site in &self.sites {
            push_direction(&mut candidates, project_off_axis(site.position.coords, axis));
        }
        for (a, b) in self.same_symbol_pairs() {
            let midpoint = (a.coords + b.coords) / 2.0;
            push_direction(&mut candidates, project_off_axis(midpoint, axis));
        }
        candidates
    }

    /// Candidate normals of mirror planes containing `axis`: in-plane
    /// components of same-label pair differences, and normals of the planes
    /// spanned by `axis` and each atom.
    fn sigma_v_normal_candidates(&self, axis: Unit<Vector3<f64>>) -> Vec<Unit<Vector3<f64>>> {
        let mut candidates = Vec::new();
        for (a, b) in self.same_symbol_pairs() {
            push_direction(&mut candidates, project_off_axis(a.coords - b.coords, axis));
        }
        for site in &self.sites {
            if let Some(in_plane) = unit_or_none(project_off_axis(site.position.coords, axis)) {
                push_direction(&mut candidates, axis.cross(&in_plane));
            }
        }
        candidates
    }

    /// Candidate mirror normals with no orientation constraint: same-label
    /// pair differences plus the principal axes (which cover the molecular
    /// plane of a planar geometry).
    fn global_mirror_normal_candidates(
        &self,
        axes: &[Unit<Vector3<f64>>; 3],
    ) -> Vec<Unit<Vector3<f64>>> {
        let mut candidates = Vec::new();
        for (a, b) in self.same_symbol_pairs() {
            push_direction(&mut candidates, a.coords - b.coords);
        }
        for axis in axes {
            push_direction(&mut candidates, axis.into_inner());
        }
        candidates
    }

    /// Candidate axes for a spherical top: atom directions, midpoints of
    /// same-label pairs (edge axes), and centroids of same-label triples
    /// (face axes).
    fn spherical_axis_candidates(&self) -> Vec<Unit<Vector3<f64>>> {
        let mut candidates = Vec::new();
        for site in &self.sites {
            push_direction(&mut candidates, site.position.coords);
        }
        for (a, b) in self.same_symbol_pairs() {
            push_direction(&mut candidates, (a.coords + b.coords) / 2.0);
        }
        for index_a in 0..self.sites.len() {
            for index_b in index_a + 1..self.sites.len() {
                for index_c in index_b + 1..self.sites.len() {
                    let (sa, sb, sc) = (
                        &self.sites[index_a],
                        &self.sites[index_b],
                        &self.sites[index_c],
                    );
                    if sa.symbol == sb.symbol && sb.symbol == sc.symbol {
                        let face = (sa.position.coords
                            + sb.position.coords
                            + sc.position.coords)
                            / 3.0;
                        push_direction(&mut candidates, face);
                    }
                }
            }
        }
        candidates
    }

    fn same_symbol_pairs(&self) -> Vec<(Point3<f64>, Point3<f64>)> {
        let mut pairs = Vec::new();
        for index_a in 0..self.sites.len() {
            for index_b in index_a + 1..self.sites.len() {
                if self.sites[index_a].symbol == self.sites[index_b].symbol {
                    pairs.push((self.sites[index_a].position, self.sites[index_b].position));
                }
            }
        }
        pairs
    }
}

fn project_off_axis(vector: Vector3<f64>, axis: Unit<Vector3<f64>>) -> Vector3<f64> {
    vector - axis.into_inner() * vector.dot(&axis)
}

fn unit_or_none(vector: Vector3<f64>) -> Option<Unit<Vector3<f64>>> {
    if vector.norm() < DIRECTION_EPSILON {
        None
    } else {
        Some(Unit::new_normalize(vector))
    }
}

/// Appends a direction candidate, ignoring near-zero vectors and directions
/// (anti)parallel to one already present.
fn push_direction(candidates: &mut Vec<Unit<Vector3<f64>>>, vector: Vector3<f64>) {
    let Some(direction) = unit_or_none(vector) else {
        return;
    };
    let known = candidates
        .iter()
        .any(|existing| existing.dot(&direction).abs() > PARALLEL_DOT);
    if !known {
        candidates.push(direction);
    }
}

use crate::core::models::ids::AtomId;
use nalgebra::{Matrix3, Point3, Unit, Vector3};
use std::collections::{BTreeMap, BTreeSet};
use std::f64::consts::PI;

/// Hard cap on the number of operations the group closure will generate.
/// The largest finite molecular point group handled here (Ih) has order 120;
/// the cap only fires when numerically inconsistent generators fail to close.
pub const MAX_GROUP_ORDER: usize = 200;

/// Tolerance used when deciding that two operation matrices are the same
/// element of the group. Deliberately loose: generators detected from noisy
/// coordinates multiply into products that agree only approximately.
const MATRIX_MATCH_TOLERANCE: f64 = 0.1;

/// The geometric kind of a symmetry operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationKind {
    Identity,
    /// Proper rotation by 2π/order.
    Proper { order: u32 },
    /// Reflection through a plane.
    Mirror,
    /// Point inversion through the origin.
    Inversion,
    /// Rotation by 2π/order followed by reflection through the plane
    /// perpendicular to the axis.
    Improper { order: u32 },
}

/// A rigid symmetry operation about the origin: an orthogonal matrix together
/// with the descriptive kind and axis it was constructed from.
#[derive(Debug, Clone, PartialEq)]
pub struct SymmetryOperation {
    pub kind: OperationKind,
    /// Rotation axis or mirror-plane normal; `None` for identity/inversion.
    pub axis: Option<Unit<Vector3<f64>>>,
    pub matrix: Matrix3<f64>,
}

impl SymmetryOperation {
    pub fn identity() -> Self {
        Self {
            kind: OperationKind::Identity,
            axis: None,
            matrix: Matrix3::identity(),
        }
    }

    pub fn proper(order: u32, axis: Unit<Vector3<f64>>) -> Self {
        Self {
            kind: OperationKind::Proper { order },
            matrix: rotation_matrix(&axis, 2.0 * PI / f64::from(order)),
            axis: Some(axis),
        }
    }

    pub fn mirror(normal: Unit<Vector3<f64>>) -> Self {
        Self {
            kind: OperationKind::Mirror,
            matrix: reflection_matrix(&normal),
            axis: Some(normal),
        }
    }

    pub fn inversion() -> Self {
        Self {
            kind: OperationKind::Inversion,
            axis: None,
            matrix: -Matrix3::identity(),
        }
    }

    pub fn improper(order: u32, axis: Unit<Vector3<f64>>) -> Self {
        Self {
            kind: OperationKind::Improper { order },
            matrix: reflection_matrix(&axis) * rotation_matrix(&axis, 2.0 * PI / f64::from(order)),
            axis: Some(axis),
        }
    }
}

/// Rotation by `angle` about `axis` (right-handed).
pub fn rotation_matrix(axis: &Unit<Vector3<f64>>, angle: f64) -> Matrix3<f64> {
    nalgebra::Rotation3::from_axis_angle(axis, angle).into_inner()
}

/// Householder reflection through the plane with unit normal `normal`.
pub fn reflection_matrix(normal: &Unit<Vector3<f64>>) -> Matrix3<f64> {
    Matrix3::identity() - 2.0 * normal.into_inner() * normal.into_inner().transpose()
}

/// A labeled site in the centroid frame, the unit the matching test works on.
#[derive(Debug, Clone)]
pub struct Site {
    pub id: AtomId,
    pub symbol: String,
    pub position: Point3<f64>,
}

/// Tests whether `matrix` maps the site set onto itself within `tolerance`.
///
/// Each transformed site must land within `tolerance` of an atom carrying the
/// same label, the nearest such atom is its image (ties broken by lowest atom
/// id), and the induced map must be a permutation. Sites are expected in
/// ascending id order so the result is deterministic.
///
/// # Return
///
/// The induced permutation `id -> image id`, or `None` if any site has no
/// acceptable image or two sites claim the same image.
pub fn permutation_under(
    sites: &[Site],
    matrix: &Matrix3<f64>,
    tolerance: f64,
) -> Option<BTreeMap<AtomId, AtomId>> {
    let mut mapping = BTreeMap::new();
    let mut used: BTreeSet<AtomId> = BTreeSet::new();

    for site in sites {
        let moved = matrix * site.position;
        let mut best: Option<(f64, AtomId)> = None;
        for candidate in sites {
            if candidate.symbol != site.symbol {
                continue;
            }
            let distance = (candidate.position - moved).norm();
            // Strict "<" keeps the lowest-id candidate on exact ties, since
            // sites are scanned in ascending id order.
            if best.is_none_or(|(best_distance, _)| distance < best_distance) {
                best = Some((distance, candidate.id));
            }
        }
        match best {
            Some((distance, image)) if distance <= tolerance && used.insert(image) => {
                mapping.insert(site.id, image);
            }
            _ => return None,
        }
    }
    Some(mapping)
}

/// Generates the full operation group by closing a generator set under matrix
/// multiplication.
///
/// Products are deduplicated with a tolerant matrix comparison so that
/// generators detected from slightly distorted coordinates still close; the
/// closure is capped at [`MAX_GROUP_ORDER`] elements as a guard against
/// inconsistent generator sets.
pub fn generate_group(generators: &[Matrix3<f64>]) -> Vec<Matrix3<f64>> {
    let mut group: Vec<Matrix3<f64>> = vec![Matrix3::identity()];
    for generator in generators {
        push_unique(&mut group, *generator);
    }

    loop {
        let mut grew = false;
        let snapshot = group.clone();
        'products: for a in &snapshot {
            for b in &snapshot {
                if group.len() >= MAX_GROUP_ORDER {
                    break 'products;
                }
                if push_unique(&mut group, a * b) {
                    grew = true;
                }
            }
        }
        if !grew || group.len() >= MAX_GROUP_ORDER {
            break;
        }
    }
    group
}

fn push_unique(group: &mut Vec<Matrix3<f64>>, candidate: Matrix3<f64>) -> bool {
    let duplicate = group
        .iter()
        .any(|existing| (existing - candidate).abs().max() < MATRIX_MATCH_TOLERANCE);
    if duplicate {
        false
    } else {
        group.push(candidate);
        true
    }
}

use crate::core::models::geometry::Geometry;
use crate::core::models::ids::AtomId;
use crate::engine::error::EngineError;
use nalgebra::{Matrix3, Point3, Vector3};

/// A proper rigid-body transform mapping a source point to a target point as
/// `target ≈ rotation · source + translation`.
#[derive(Debug, Clone, PartialEq)]
pub struct RigidTransform {
    /// Proper orthogonal rotation (det = +1).
    pub rotation: Matrix3<f64>,
    pub translation: Vector3<f64>,
}

impl RigidTransform {
    /// Applies the transform to a single point.
    pub fn apply_point(&self, point: &Point3<f64>) -> Point3<f64> {
        Point3::from(self.rotation * point.coords + self.translation)
    }

    /// Applies the transform to every atom of a geometry, returning a
    /// transformed copy with ids preserved.
    pub fn apply(&self, geometry: &Geometry) -> Geometry {
        let mut transformed = geometry.clone();
        for id in geometry.ids().collect::<Vec<_>>() {
            let atom = transformed.atom_mut(id).expect("id from the same geometry");
            atom.position = self.apply_point(&atom.position);
        }
        transformed
    }
}

/// Options for [`superpose`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AlignmentOptions {
    /// When set, inputs with fewer than 3 non-collinear points are rejected
    /// with [`EngineError::DegenerateInput`] instead of returning one of the
    /// (non-unique) optimal rotations.
    pub require_unique_rotation: bool,
}

/// The result of rigidly superimposing a source geometry onto a target.
#[derive(Debug, Clone)]
pub struct Alignment {
    /// The source geometry with the fitted transform applied, ids preserved.
    pub aligned: Geometry,
    pub transform: RigidTransform,
    /// Root-mean-square deviation between the aligned source and the target.
    pub rmsd: f64,
}

/// Computes the rotation and translation that best superimpose `source` onto
/// `target` in the least-squares sense (the closed-form Kabsch solution) and
/// applies it.
///
/// Both geometries must cover exactly the same atom ids; correspondence is
/// taken from the ids and never inferred or reordered. The rotation is forced
/// proper (no reflection) via the sign-corrected SVD reconstruction, and the
/// computation is deterministic for identical inputs.
///
/// # Errors
///
/// - [`EngineError::AlignmentIdMismatch`] when the id sets differ.
/// - [`EngineError::DegenerateInput`] for empty inputs, or for rank-deficient
///   inputs when [`AlignmentOptions::require_unique_rotation`] is set.
pub fn superpose(
    source: &Geometry,
    target: &Geometry,
    options: &AlignmentOptions,
) -> Result<Alignment, EngineError> {
    let source_ids: Vec<AtomId> = source.ids().collect();
    check_id_sets(&source_ids, target)?;

    let source_centroid = source
        .centroid()
        .ok_or_else(|| EngineError::DegenerateInput {
            reason: "cannot align empty geometries".to_string(),
        })?;
    let target_centroid = target.centroid().expect("same non-empty id set");

    // Cross-covariance of the centered point sets, accumulated in id order so
    // the summation order (and thus the result) is reproducible bit-for-bit.
    let mut sorted_ids = source_ids;
    sorted_ids.sort();
    let mut h = Matrix3::zeros();
    for &id in &sorted_ids {
        let s = source.atom(id).expect("checked above").position - source_centroid;
        let t = target.atom(id).expect("checked above").position - target_centroid;
        h += s * t.transpose();
    }

    let svd = h.svd(true, true);
    let u = svd
        .u
        .ok_or_else(|| EngineError::Internal("SVD did not produce U".to_string()))?;
    let v_t = svd
        .v_t
        .ok_or_else(|| EngineError::Internal("SVD did not produce V^T".to_string()))?;

    if options.require_unique_rotation {
        // A unique rotation needs at least two significant covariance
        // directions; collinear or near-empty point sets have at most one.
        let scale = svd.singular_values[0].max(f64::MIN_POSITIVE);
        if sorted_ids.len() < 3 || svd.singular_values[1] / scale < 1e-9 {
            return Err(EngineError::DegenerateInput {
                reason: format!(
                    "rotation is under-determined for {} point(s) of rank < 2",
                    sorted_ids.len()
                ),
            });
        }
    }

    // Sign correction: guarantees det(R) = +1 even when the unconstrained
    // least-squares optimum would be a reflection.
    let d = (v_t.transpose() * u.transpose()).determinant().signum();
    let rotation = v_t.transpose() * Matrix3::from_diagonal(&Vector3::new(1.0, 1.0, d)) * u.transpose();
    let translation = target_centroid.coords - rotation * source_centroid.coords;

    let transform = RigidTransform {
        rotation,
        translation,
    };
    let aligned = transform.apply(source);
    let rmsd = rmsd_over_matching_ids(&aligned, target).expect("same non-empty id set");

    Ok(Alignment {
        aligned,
        transform,
        rmsd,
    })
}

/// Root-mean-square deviation over the ids shared by both geometries.
///
/// # Return
///
/// Returns `None` when the geometries share no ids.
pub fn rmsd_over_matching_ids(a: &Geometry, b: &Geometry) -> Option<f64> {
    let mut squared_dist_sum = 0.0;
    let mut count = 0usize;
    for (id, atom_a) in a.iter() {
        if let Some(atom_b) = b.atom(id) {
            squared_dist_sum += (atom_a.position - atom_b.position).norm_squared();
            count += 1;
        }
    }
    if count == 0 {
        None
    } else {
        Some((squared_dist_sum / count as f64).sqrt())
    }
}

fn check_id_sets(source_ids: &[AtomId], target: &Geometry) -> Result<(), EngineError> {
    let only_in_source = source_ids.iter().filter(|id| !target.contains(**id)).count();
    let only_in_target = target.len() + only_in_source - source_ids.len();
    if only_in_source > 0 || only_in_target > 0 {
        return Err(EngineError::AlignmentIdMismatch {
            only_in_source,
            only_in_target,
        });
    }
    Ok(())
}

use crate::core::models::ids::AtomId;
use crate::engine::bonds::BondGraph;
use crate::engine::error::EngineError;
use std::collections::BTreeSet;

/// Enumerates the coordination sphere of `center` in a bond graph.
///
/// Standard breadth-first expansion: level 0 is `{center}`, level k+1 is the
/// set of neighbors of level k not yet visited at an earlier level. With
/// `only_surface` the result is exactly level `n_sphere`; otherwise it is the
/// union of levels `0..=n_sphere`.
///
/// A shell index beyond the graph's eccentricity from the center yields an
/// empty surface set, which is a valid result rather than an error.
///
/// # Errors
///
/// Returns [`EngineError::UnknownAtom`] if `center` is not a node of `graph`.
pub fn coordination_sphere(
    graph: &BondGraph,
    center: AtomId,
    n_sphere: usize,
    only_surface: bool,
) -> Result<BTreeSet<AtomId>, EngineError> {
    if !graph.contains(center) {
        return Err(EngineError::UnknownAtom { id: center });
    }

    let mut visited: BTreeSet<AtomId> = BTreeSet::from([center]);
    let mut frontier: BTreeSet<AtomId> = BTreeSet::from([center]);
    let mut accumulated: BTreeSet<AtomId> = BTreeSet::from([center]);

    for _ in 0..n_sphere {
        let mut next = BTreeSet::new();
        for &atom in &frontier {
            for &neighbor in graph.neighbors(atom).into_iter().flatten() {
                if visited.insert(neighbor) {
                    next.insert(neighbor);
                }
            }
        }
        frontier = next;
        accumulated.extend(frontier.iter().copied());
    }

    Ok(if only_surface { frontier } else { accumulated })
}

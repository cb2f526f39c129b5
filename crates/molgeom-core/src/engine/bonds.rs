use crate::core::elements;
use crate::core::models::geometry::Geometry;
use crate::core::models::ids::AtomId;
use crate::engine::config::BondingConfig;
use crate::engine::error::EngineError;
use std::collections::{BTreeMap, BTreeSet};

/// An undirected graph over atom ids whose edges represent inferred chemical
/// bonds.
///
/// The adjacency relation is symmetric and irreflexive by construction, and
/// every atom of the source geometry appears as a node even when it has no
/// bonds. A bond graph is derived data: it is always recomputable from a
/// [`Geometry`] and is never mutated independently of one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BondGraph {
    adjacency: BTreeMap<AtomId, BTreeSet<AtomId>>,
}

impl BondGraph {
    fn with_nodes<I: IntoIterator<Item = AtomId>>(ids: I) -> Self {
        Self {
            adjacency: ids.into_iter().map(|id| (id, BTreeSet::new())).collect(),
        }
    }

    fn insert_bond(&mut self, a: AtomId, b: AtomId) {
        debug_assert_ne!(a, b);
        self.adjacency.entry(a).or_default().insert(b);
        self.adjacency.entry(b).or_default().insert(a);
    }

    /// Returns the set of atoms bonded to `id`, or `None` if the atom is not
    /// a node of this graph.
    pub fn neighbors(&self, id: AtomId) -> Option<&BTreeSet<AtomId>> {
        self.adjacency.get(&id)
    }

    /// Returns whether the graph contains `id` as a node.
    pub fn contains(&self, id: AtomId) -> bool {
        self.adjacency.contains_key(&id)
    }

    /// Returns whether atoms `a` and `b` are bonded.
    pub fn are_bonded(&self, a: AtomId, b: AtomId) -> bool {
        self.adjacency.get(&a).is_some_and(|n| n.contains(&b))
    }

    /// Returns an iterator over the node ids in ascending id order.
    pub fn ids(&self) -> impl Iterator<Item = AtomId> + '_ {
        self.adjacency.keys().copied()
    }

    /// Returns the number of undirected bonds in the graph.
    pub fn bond_count(&self) -> usize {
        self.adjacency.values().map(|n| n.len()).sum::<usize>() / 2
    }

    /// Exposes the full adjacency mapping `id -> set of bonded ids`.
    pub fn adjacency(&self) -> &BTreeMap<AtomId, BTreeSet<AtomId>> {
        &self.adjacency
    }
}

/// Builds the bond graph of a geometry from interatomic distances.
///
/// For every unordered pair of atoms, an edge is emitted when the Euclidean
/// distance does not exceed the sum of the two covalent radii scaled by
/// `config.tolerance_factor`. Radii come from `config.radius_overrides`
/// first and the static table second.
///
/// The pairwise scan is O(n²); at the molecule sizes this library targets a
/// spatial prefilter has not been worth its complexity.
///
/// # Errors
///
/// Returns [`EngineError::UnknownElement`] when an atom's symbol is neither
/// tabulated nor overridden. "No bonds found" is a valid, successful outcome.
pub fn build_bonds(geometry: &Geometry, config: &BondingConfig) -> Result<BondGraph, EngineError> {
    // Resolve every radius up front so unknown labels fail before any work.
    let mut sites = Vec::with_capacity(geometry.len());
    for (id, atom) in geometry.iter() {
        let radius = config
            .radius_overrides
            .get(&atom.symbol)
            .copied()
            .or_else(|| elements::covalent_radius(&atom.symbol))
            .ok_or_else(|| EngineError::UnknownElement {
                symbol: atom.symbol.clone(),
            })?;
        sites.push((id, atom.position, radius));
    }

    let mut graph = BondGraph::with_nodes(sites.iter().map(|(id, _, _)| *id));
    for (i, (id_a, pos_a, r_a)) in sites.iter().enumerate() {
        for (id_b, pos_b, r_b) in &sites[i + 1..] {
            let threshold = (r_a + r_b) * config.tolerance_factor;
            if (pos_a - pos_b).norm_squared() <= threshold * threshold {
                graph.insert_bond(*id_a, *id_b);
            }
        }
    }
    Ok(graph)
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Point3;

    fn water() -> (Geometry, Vec<AtomId>) {
        Geometry::from_records([
            ("O", Point3::new(0.0, 0.0, 0.0)),
            ("H", Point3::new(0.757, 0.586, 0.0)),
            ("H", Point3::new(-0.757, 0.586, 0.0)),
        ])
    }

    #[test]
    fn water_yields_two_oh_bonds_and_no_hh_bond() {
        let (geometry, ids) = water();
        let graph = build_bonds(&geometry, &BondingConfig::default()).unwrap();
        let (o, h1, h2) = (ids[0], ids[1], ids[2]);

        assert!(graph.are_bonded(o, h1));
        assert!(graph.are_bonded(o, h2));
        assert!(!graph.are_bonded(h1, h2));
        assert_eq!(graph.bond_count(), 2);
        assert_eq!(
            graph.neighbors(o).unwrap().iter().copied().collect::<Vec<_>>(),
            {
                let mut expected = vec![h1, h2];
                expected.sort();
                expected
            }
        );
    }

    #[test]
    fn displaced_hydrogen_loses_its_bond() {
        let (mut geometry, ids) = water();
        geometry.atom_mut(ids[1]).unwrap().position = Point3::new(5.0, 0.586, 0.0);
        let graph = build_bonds(&geometry, &BondingConfig::default()).unwrap();

        assert!(!graph.are_bonded(ids[0], ids[1]));
        assert!(graph.are_bonded(ids[0], ids[2]));
        assert!(graph.neighbors(ids[1]).unwrap().is_empty());
        assert_eq!(graph.bond_count(), 1);
    }

    #[test]
    fn adjacency_is_symmetric_and_irreflexive() {
        let (geometry, _) = water();
        let graph = build_bonds(&geometry, &BondingConfig::default()).unwrap();
        for (&i, neighbors) in graph.adjacency() {
            assert!(!neighbors.contains(&i));
            for &j in neighbors {
                assert!(graph.neighbors(j).unwrap().contains(&i));
            }
        }
    }

    #[test]
    fn unknown_element_fails_naming_the_label() {
        let (geometry, _) = Geometry::from_records([
            ("Xx", Point3::origin()),
            ("H", Point3::new(1.0, 0.0, 0.0)),
        ]);
        let err = build_bonds(&geometry, &BondingConfig::default()).unwrap_err();
        match err {
            EngineError::UnknownElement { symbol } => assert_eq!(symbol, "Xx"),
            other => panic!("expected UnknownElement, got {other:?}"),
        }
    }

    #[test]
    fn radius_override_admits_unknown_elements() {
        let (geometry, ids) = Geometry::from_records([
            ("Xx", Point3::origin()),
            ("H", Point3::new(1.0, 0.0, 0.0)),
        ]);
        let mut config = BondingConfig::default();
        config.radius_overrides.insert("Xx".to_string(), 0.66);
        let graph = build_bonds(&geometry, &config).unwrap();
        assert!(graph.are_bonded(ids[0], ids[1]));
    }

    #[test]
    fn tolerance_factor_controls_the_cutoff() {
        let (geometry, ids) = water();
        // A factor below 0.96 / (r_O + r_H) ~ 0.99 removes the O-H bonds.
        let config = BondingConfig {
            tolerance_factor: 0.9,
            ..BondingConfig::default()
        };
        let graph = build_bonds(&geometry, &config).unwrap();
        assert!(!graph.are_bonded(ids[0], ids[1]));
        assert_eq!(graph.bond_count(), 0);
    }

    #[test]
    fn empty_geometry_yields_empty_graph() {
        let graph = build_bonds(&Geometry::new(), &BondingConfig::default()).unwrap();
        assert_eq!(graph.bond_count(), 0);
        assert_eq!(graph.ids().count(), 0);
    }
}

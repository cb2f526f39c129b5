use super::atom::Atom;
use super::ids::AtomId;
use nalgebra::{Point3, Vector3};
use slotmap::SlotMap;

/// Represents an ordered collection of atoms in Cartesian space.
///
/// This struct is the central data store over which all engines operate. Atoms
/// are keyed by stable [`AtomId`]s that are assigned at insertion and never
/// reused within the store's lifetime. Cloning a geometry, extracting a subset,
/// or transforming positions all preserve ids, so results produced from a
/// geometry remain addressable by the ids of the original. Constructing a
/// fresh geometry from records assigns a new id range; callers must not assume
/// id preservation across operations without checking the operation's
/// documentation.
#[derive(Debug, Clone, Default)]
pub struct Geometry {
    /// Primary storage for atoms using a slot map for stable ID management.
    atoms: SlotMap<AtomId, Atom>,
    /// Insertion order of the atoms, so the store behaves as an ordered
    /// sequence even after removals.
    order: Vec<AtomId>,
}

impl Geometry {
    /// Creates a new, empty geometry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a geometry from an ordered sequence of `(label, position)`
    /// records, assigning a fresh contiguous range of ids in record order.
    ///
    /// # Arguments
    ///
    /// * `records` - The element label and position of each atom.
    ///
    /// # Return
    ///
    /// The new geometry together with the assigned ids, in record order.
    pub fn from_records<'a, I>(records: I) -> (Self, Vec<AtomId>)
    where
        I: IntoIterator<Item = (&'a str, Point3<f64>)>,
    {
        let mut geometry = Self::new();
        let ids = records
            .into_iter()
            .map(|(symbol, position)| geometry.add_atom(symbol, position))
            .collect();
        (geometry, ids)
    }

    /// Adds an atom to the end of the sequence and returns its id.
    ///
    /// # Arguments
    ///
    /// * `symbol` - The element symbol of the atom.
    /// * `position` - The 3D coordinates of the atom.
    pub fn add_atom(&mut self, symbol: &str, position: Point3<f64>) -> AtomId {
        let id = self.atoms.insert(Atom::new(symbol, position));
        self.order.push(id);
        id
    }

    /// Retrieves an immutable reference to an atom by its ID.
    ///
    /// # Return
    ///
    /// Returns `Some(&Atom)` if the atom exists, otherwise `None`.
    pub fn atom(&self, id: AtomId) -> Option<&Atom> {
        self.atoms.get(id)
    }

    /// Retrieves a mutable reference to an atom by its ID.
    ///
    /// # Return
    ///
    /// Returns `Some(&mut Atom)` if the atom exists, otherwise `None`.
    pub fn atom_mut(&mut self, id: AtomId) -> Option<&mut Atom> {
        self.atoms.get_mut(id)
    }

    /// Returns whether the given id refers to an atom in this geometry.
    pub fn contains(&self, id: AtomId) -> bool {
        self.atoms.contains_key(id)
    }

    /// Returns the number of atoms in the geometry.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Returns `true` if the geometry contains no atoms.
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Returns an iterator over all atoms in insertion order.
    ///
    /// # Return
    ///
    /// An iterator yielding `(AtomId, &Atom)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (AtomId, &Atom)> + '_ {
        self.order.iter().map(move |&id| (id, &self.atoms[id]))
    }

    /// Returns an iterator over all atom ids in insertion order.
    pub fn ids(&self) -> impl Iterator<Item = AtomId> + '_ {
        self.order.iter().copied()
    }

    /// Computes the unweighted centroid of the atom positions.
    ///
    /// # Return
    ///
    /// Returns `Some(centroid)` for a non-empty geometry, otherwise `None`.
    pub fn centroid(&self) -> Option<Point3<f64>> {
        if self.is_empty() {
            return None;
        }
        let sum: Vector3<f64> = self
            .iter()
            .map(|(_, atom)| atom.position.coords)
            .sum::<Vector3<f64>>();
        Some(Point3::from(sum / self.len() as f64))
    }

    /// Extracts the sub-geometry containing exactly the given ids.
    ///
    /// Ids are preserved: the returned geometry's atoms keep the ids they had
    /// in `self`, and the original insertion order is retained among the kept
    /// atoms.
    ///
    /// # Arguments
    ///
    /// * `ids` - The ids of the atoms to keep.
    ///
    /// # Return
    ///
    /// Returns `None` if any requested id is not present in this geometry.
    pub fn subset<I>(&self, ids: I) -> Option<Geometry>
    where
        I: IntoIterator<Item = AtomId>,
    {
        let keep: std::collections::BTreeSet<AtomId> = ids.into_iter().collect();
        if keep.iter().any(|id| !self.contains(*id)) {
            return None;
        }
        let mut subset = self.clone();
        subset.order.retain(|id| keep.contains(id));
        let drop: Vec<AtomId> = subset
            .atoms
            .keys()
            .filter(|id| !keep.contains(id))
            .collect();
        for id in drop {
            subset.atoms.remove(id);
        }
        Some(subset)
    }

    /// Translates every atom by the given displacement.
    pub fn translate(&mut self, displacement: &Vector3<f64>) {
        for (_, atom) in self.atoms.iter_mut() {
            atom.position += displacement;
        }
    }
}

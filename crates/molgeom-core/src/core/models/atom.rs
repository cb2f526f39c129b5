use nalgebra::Point3;

/// Represents a single atom in a Cartesian molecular geometry.
///
/// An atom is nothing more than an element label and a position; everything
/// else (bonding, symmetry equivalence, coordination) is derived data computed
/// by the engines from a snapshot of the whole geometry.
#[derive(Debug, Clone, PartialEq)]
pub struct Atom {
    /// The element symbol (e.g., "C", "H", "Cl"), stored in canonical
    /// capitalization.
    pub symbol: String,
    /// The 3D coordinates of the atom in Angstroms.
    pub position: Point3<f64>,
}

impl Atom {
    /// Creates a new `Atom` with the given element symbol and position.
    ///
    /// The symbol is canonicalized to the conventional capitalization
    /// (first letter uppercase, rest lowercase) so that lookups into the
    /// covalent radius table and same-element comparisons are consistent
    /// regardless of how the input records were cased.
    ///
    /// # Arguments
    ///
    /// * `symbol` - The element symbol of the atom.
    /// * `position` - The 3D coordinates of the atom.
    pub fn new(symbol: &str, position: Point3<f64>) -> Self {
        Self {
            symbol: crate::core::elements::canonical_symbol(symbol),
            position,
        }
    }
}

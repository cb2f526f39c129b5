//! # Symmetry Module
//!
//! Point-group detection and iterative symmetrization of Cartesian molecular
//! geometries.
//!
//! ## Architecture
//!
//! - [`operations`] - Orthogonal operation matrices (rotations, mirrors,
//!   inversion, improper rotations), the "transform then nearest same-label
//!   match" permutation test, and tolerant group closure
//! - [`point_group`] - The Schoenflies point-group label enumeration
//! - [`detect`] - Inertia-tensor rotor classification and the molecular
//!   point-group decision tree
//! - [`symmetrize`] - Fixed-point orbit averaging onto the detected group
//!
//! Detection answers "which operations does this geometry satisfy within a
//! tolerance"; symmetrization adjusts positions so the detected operations
//! are satisfied essentially exactly.

pub mod detect;
pub mod operations;
pub mod point_group;
pub mod symmetrize;

pub use detect::{SymmetryAnalysis, detect_point_group};
pub use point_group::PointGroup;
pub use symmetrize::{SymmetrizationResult, symmetrize};

//! # Engine Module
//!
//! This module implements the four geometry engines and their supporting
//! plumbing.
//!
//! ## Architecture
//!
//! - **Bond Detection** ([`bonds`]) - Undirected bond graph from interatomic
//!   distances and covalent radii
//! - **Coordination Spheres** ([`sphere`]) - Breadth-first shell enumeration
//!   over the bond graph
//! - **Rigid Alignment** ([`align`]) - Closed-form least-squares
//!   superposition of two geometries with matching ids
//! - **Symmetry** ([`symmetry`]) - Point-group detection and iterative
//!   symmetrization
//! - **Configuration** ([`config`]) - Explicit per-call numeric parameters
//!   with TOML loading
//! - **Progress Monitoring** ([`progress`]) - Callback-based progress events
//! - **Error Handling** ([`error`]) - Engine-specific error types
//!
//! All engine operations are pure, synchronous computations over an immutable
//! geometry snapshot; none hold shared mutable state, so they are safely
//! callable concurrently with independent inputs.

pub mod align;
pub mod bonds;
pub mod config;
pub mod error;
pub mod progress;
pub mod sphere;
pub mod symmetry;

//! # Core Module
//!
//! This module provides the fundamental building blocks for molecular geometry
//! analysis, serving as the stateless foundation of the library.
//!
//! ## Overview
//!
//! The core module defines the data structures that represent a Cartesian
//! molecular geometry and the static chemical knowledge the engines consume.
//! It contains no algorithms beyond simple accessors and frame manipulations;
//! everything stateful or iterative lives in the [`crate::engine`] layer.
//!
//! - **Molecular Representation** ([`models`]) - Atoms, stable atom ids, and
//!   the ordered geometry store
//! - **Chemical Knowledge** ([`elements`]) - Covalent radii used for bond
//!   detection

pub mod elements;
pub mod models;

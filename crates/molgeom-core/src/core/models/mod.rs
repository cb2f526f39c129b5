//! # Core Models Module
//!
//! This module contains the fundamental data structures used to represent
//! Cartesian molecular geometries.
//!
//! ## Key Components
//!
//! - [`ids`] - Unique, stable identifier type for atoms
//! - [`atom`] - Individual atom representation: element symbol and position
//! - [`geometry`] - The ordered geometry store over which all engines operate
//!
//! ## Usage
//!
//! Most operations start by constructing a [`geometry::Geometry`] from
//! `(label, x, y, z)` records and passing it to one of the engines.
//!
//! ```
//! use molgeom::core::models::geometry::Geometry;
//! use nalgebra::Point3;
//!
//! let mut water = Geometry::new();
//! let o = water.add_atom("O", Point3::new(0.0, 0.0, 0.0));
//! let h1 = water.add_atom("H", Point3::new(0.757, 0.586, 0.0));
//! let h2 = water.add_atom("H", Point3::new(-0.757, 0.586, 0.0));
//! assert_eq!(water.len(), 3);
//! # let _ = (o, h1, h2);
//! ```

pub mod atom;
pub mod geometry;
pub mod ids;

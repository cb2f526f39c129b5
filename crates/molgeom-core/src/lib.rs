//! # molgeom Core Library
//!
//! A library for deriving chemical and geometric structure from raw Cartesian
//! molecular geometries: which atoms are bonded, how atoms cluster into
//! coordination spheres around a center, how two copies of (approximately) the
//! same molecule can be rigidly superimposed, and what point-group symmetry a
//! geometry exhibits or can be forced to exhibit.
//!
//! ## Architectural Philosophy
//!
//! The library is designed with a strict three-layer architecture to ensure a
//! clear separation of concerns, making it modular, testable, and extensible.
//!
//! - **[`core`]: The Foundation.** Contains stateless data models
//!   (`Geometry`, `Atom`) and static chemical knowledge (the covalent radius
//!   table).
//!
//! - **[`engine`]: The Logic Core.** The geometry engines (bond-graph
//!   construction, coordination-sphere traversal, rigid alignment, and the
//!   symmetry engine) plus their configuration, error, and progress-reporting
//!   plumbing. Every engine is a pure function over an immutable geometry
//!   snapshot, configured by explicit per-call numeric parameters.
//!
//! - **[`workflows`]: The Public API.** High-level entry points that tie the
//!   engines together into complete procedures such as structural analysis
//!   and iterative symmetrization, with progress reporting and structured
//!   logging.

pub mod core;
pub mod engine;
pub mod workflows;

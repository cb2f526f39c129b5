//! # Workflows Module
//!
//! High-level entry points that orchestrate the engine components into
//! complete analyses.
//!
//! ## Overview
//!
//! Workflows are the top-level API of the crate. Each one wires together the
//! relevant engine pieces, reports phase-level progress through a
//! [`ProgressReporter`](crate::engine::progress::ProgressReporter), and emits
//! structured log events, so callers get a single function to invoke instead
//! of a sequence of engine calls.
//!
//! - [`analyze`] - Bond perception followed by point-group detection on a
//!   single geometry.
//! - [`symmetrize`] - Iterative refinement of a near-symmetric geometry onto
//!   its detected point group.

pub mod analyze;
pub mod symmetrize;

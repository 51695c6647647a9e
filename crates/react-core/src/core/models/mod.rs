//! # Core Models Module
//!
//! Plain data structures shared by the file readers and the analysis engine.
//!
//! - [`atom`] - An element symbol with a Cartesian position
//! - [`geometry`] - An ordered snapshot of atoms (one optimization step or animation frame)
//! - [`record`] - The normalized [`record::OutputRecord`] extracted from one output file
//!
//! Readers fill these opportunistically: a section that is absent from a file leaves the
//! corresponding field as `None` or empty, and consumers branch on presence explicitly.

pub mod atom;
pub mod geometry;
pub mod record;

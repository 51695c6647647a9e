//! # Core Module
//!
//! Stateless building blocks shared by every analysis: the data extracted from an
//! output file, the readers that extract it, and the units energies are shown in.
//!
//! ## Architecture
//!
//! - **Data Models** ([`models`]) - Atoms, geometries and the normalized output record
//! - **File I/O** ([`io`]) - Format detection, Gaussian and ORCA readers, XYZ and ORCA input writing
//! - **Units** ([`units`]) - Hartree, kcal/mol and kJ/mol conversion for presentation
//!
//! Nothing in this layer keeps state between calls. Every reader takes a buffered
//! stream or a path and returns a fresh [`models::record::OutputRecord`].

pub mod io;
pub mod models;
pub mod units;

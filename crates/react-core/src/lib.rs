//! # REACT++ Core Library
//!
//! Analysis of Gaussian and ORCA output files along a reaction coordinate: relative
//! energies of the states of a reaction, thermochemistry, solvation and basis-set
//! corrections, and animation of vibrational normal modes.
//!
//! ## Architectural Philosophy
//!
//! The library follows a strict three-layer architecture.
//!
//! - **[`core`]: The Foundation.** Stateless data models (`OutputRecord`, `Geometry`),
//!   the output-file readers with their format detection, and energy units.
//!
//! - **[`engine`]: The Logic Core.** The state/slot registry that assigns files to the
//!   states of a reaction, the relative-energetics aggregator that composes
//!   thermal, solvation and big-basis corrections against state 1, and the
//!   vibrational displacement generator.
//!
//! - **[`workflows`]: The Public API.** End-to-end procedures (`analyse`, `animate`,
//!   `inspect`, `setup`) that tie the layers together, plus the presentation helpers that turn
//!   results into tables, diagram series and CSV.
//!
//! All energies are carried in Hartree. Units are applied only when values leave the
//! library for display or export.

pub mod core;
pub mod engine;
pub mod workflows;

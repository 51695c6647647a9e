//! # Workflows Module
//!
//! High-level entry points that combine output parsing, the state registry and the
//! energetics engine into complete tasks.
//!
//! ## Overview
//!
//! Each workflow takes a validated configuration, loads the files it names, reports
//! progress through a [`ProgressReporter`](crate::engine::progress::ProgressReporter)
//! and returns plain result values. Rendering those values for people is left to
//! [`report`].
//!
//! ## Architecture
//!
//! - **Inspection** ([`inspect`]) - Extraction of a single output file and export of its final geometry
//! - **Analysis** ([`analyse`]) - Slot assignment across states followed by relative energetics
//! - **Animation** ([`animate`]) - XYZ snapshots along one vibrational mode
//! - **Input Setup** ([`setup`]) - New ORCA inputs from the final geometry of a finished calculation
//! - **Reporting** ([`report`]) - Text tables, diagram series and CSV export

pub mod analyse;
pub mod animate;
pub mod inspect;
pub mod report;
pub mod setup;

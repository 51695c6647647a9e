//! # Engine Module
//!
//! The stateful logic of a reaction analysis: which files belong to which state,
//! how their energies combine into relative energetics, and how a normal mode is
//! turned into displaced geometries.
//!
//! ## Architecture
//!
//! - **Configuration** ([`config`]) - Files per state and slot, animation and input setup parameters
//! - **State Registry** ([`registry`]) - The four fixed slots of every state and their records
//! - **Relative Energetics** ([`energetics`]) - Main, thermal, solvation and big-basis deltas against state 1
//! - **Vibrations** ([`vibration`]) - Mode selection and sinusoidal displacement frames
//! - **Bond Scans** ([`scan`]) - Geometries along a stretched or compressed bond
//! - **Progress Monitoring** ([`progress`]) - Progress reporting for long-running workflows
//! - **Error Handling** ([`error`]) - Engine-level error type wrapping the layer errors
//!
//! The aggregator reads the registry through a shared reference and never mutates it,
//! so the registry can be rebuilt or edited between runs without any locking.

pub mod config;
pub mod energetics;
pub mod error;
pub mod progress;
pub mod registry;
pub mod scan;
pub mod vibration;

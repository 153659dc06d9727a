//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - input configuration (`ColumnMap`, `FitConfig`)
//! - cleaned monitoring observations (`BlastRecord`, `ScaledRecord`)
//! - fit outputs (`AttenuationModel`, `FitResult`, `CurveFile`, etc.)

pub mod types;

pub use types::*;

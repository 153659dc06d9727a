//! Plot rendering.
//!
//! - deterministic ASCII scatter+curve plots for the terminal (`ascii`)
//! - SVG chart files via Plotters (`charts`)

pub mod ascii;
pub mod charts;

pub use ascii::*;
pub use charts::*;

//! Dataset helpers: the synthetic monitoring-data generator.

pub mod synth;

pub use synth::*;

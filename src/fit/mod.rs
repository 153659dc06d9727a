//! Scaled-distance transform and the attenuation regression.
//!
//! Responsibilities:
//!
//! - derive SD, ln(PPV), ln(SD) from cleaned records (`scale`)
//! - solve the log-linear OLS and back-transform K, alpha (`fitter`)

pub mod fitter;
pub mod scale;

pub use fitter::*;
pub use scale::*;

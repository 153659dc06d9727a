//! Mathematical utilities: the least-squares solver behind the fitter.

pub mod ols;

pub use ols::*;

//! Input/output helpers.
//!
//! - CSV ingest + validation (`ingest`)
//! - derived-record CSV export (`export`)
//! - curve JSON read/write + grid evaluation (`curve`)

pub mod curve;
pub mod export;
pub mod ingest;

pub use curve::*;
pub use export::*;
pub use ingest::*;

//! Output generation for batch runs.
//!
//! - [`json`]: Writes the per-URL results array to a JSON file

pub mod json;

//! Configuration loader and validator.
//!
//! Responsibilities:
//! - Populate [`ParserConfig`] and [`DirectoryConfig`] from environment
//!   variables, falling back to defaults when values are missing
//! - Validate constraints (sizes > 0, overlap < chunk size, ...)
//!
//! Config file support is deliberately left to the embedding application;
//! this crate only understands ENV overrides and defaults.

pub mod model;

pub use model::{DirectoryConfig, ParserConfig};

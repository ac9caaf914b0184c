//! # Tonegen Common Library
//!
//! Shared code for the tonegen binaries:
//! - Bootstrap configuration (TOML file, platform config directory)
//! - Logging initialization
//! - Common error types

pub mod config;
pub mod error;
pub mod logging;

pub use error::{Error, Result};

//! # Huemood Common Library
//!
//! Shared code for Huemood services:
//! - Common error and result types
//! - Bootstrap configuration (TOML) and config file discovery

pub mod config;
pub mod error;

pub use error::{Error, Result};

//! CLI command implementations.

pub mod common;
pub mod config;
pub mod sweep;
pub mod trial;
